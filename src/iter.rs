//! Order-preserving cursors over a `Dictionary`.
//!
//! Every cursor owns its position. `Iter` walks the sequence index lazily;
//! `IterMut` snapshots the live entries sorted by sequence, since mutable
//! references have to be split off the slot array up front.

use crate::dictionary::Entry;
use std::collections::btree_map;

/// Iterator over `(&K, &V)`, oldest write first.
pub struct Iter<'a, K, V> {
    slots: &'a [Option<Entry<K, V>>],
    order: btree_map::Values<'a, u64, usize>,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(
        slots: &'a [Option<Entry<K, V>>],
        order: btree_map::Values<'a, u64, usize>,
    ) -> Self {
        Self { slots, order }
    }

    #[inline]
    fn resolve(&self, slot: usize) -> Option<(&'a K, &'a V)> {
        self.slots.get(slot)?.as_ref().map(|e| (&e.key, &e.value))
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let slot = *self.order.next()?;
        self.resolve(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        let slot = *self.order.next_back()?;
        self.resolve(slot)
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots,
            order: self.order.clone(),
        }
    }
}

/// Iterator over `(&K, &mut V)`, oldest write first.
pub struct IterMut<'a, K, V> {
    live: std::vec::IntoIter<(u64, &'a K, &'a mut V)>,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(crate) fn new(mut live: Vec<(u64, &'a K, &'a mut V)>) -> Self {
        live.sort_unstable_by_key(|(sequence, _, _)| *sequence);
        Self {
            live: live.into_iter(),
        }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.live.next().map(|(_, k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.live.size_hint()
    }
}

impl<'a, K, V> ExactSizeIterator for IterMut<'a, K, V> {}

/// Owning iterator over `(K, V)`, oldest write first.
pub struct IntoIter<K, V> {
    slots: Vec<Option<Entry<K, V>>>,
    order: btree_map::IntoValues<u64, usize>,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(
        slots: Vec<Option<Entry<K, V>>>,
        order: btree_map::IntoValues<u64, usize>,
    ) -> Self {
        Self { slots, order }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);
    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.order.next()?;
        self.slots
            .get_mut(slot)?
            .take()
            .map(|e| (e.key, e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

#[cfg(test)]
mod tests {
    use crate::Dictionary;

    fn sample() -> Dictionary<String, i32> {
        let mut d = Dictionary::new();
        for (i, k) in ["c", "a", "d", "b", "e", "f"].iter().enumerate() {
            d.insert((*k).to_string(), i as i32).unwrap();
        }
        d
    }

    /// Invariant: two cursors over the same dictionary advance independently.
    #[test]
    fn nested_iterations_are_independent() {
        let d = sample();
        let mut pairs = Vec::new();
        for (outer, _) in d.iter() {
            for (inner, _) in d.iter() {
                pairs.push((outer.clone(), inner.clone()));
            }
        }
        assert_eq!(pairs.len(), 36);
        assert_eq!(pairs[0], ("c".to_string(), "c".to_string()));
        assert_eq!(pairs[35], ("f".to_string(), "f".to_string()));

        let mut a = d.iter();
        let b = a.clone();
        a.next();
        assert_eq!(a.len(), 5);
        assert_eq!(b.len(), 6);
    }

    /// Invariant: reverse iteration visits the newest write first.
    #[test]
    fn reverse_order() {
        let d = sample();
        let keys: Vec<&str> = d.iter().rev().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["f", "e", "b", "d", "a", "c"]);
    }

    /// Invariant: `iter_mut` follows write order and its updates stick.
    #[test]
    fn iter_mut_in_order() {
        let mut d = sample();
        let mut seen = Vec::new();
        for (k, v) in d.iter_mut() {
            seen.push(k.clone());
            *v += 100;
        }
        assert_eq!(seen, ["c", "a", "d", "b", "e", "f"]);
        assert_eq!(d.get("c"), Some(&100));
        assert_eq!(d.get("f"), Some(&105));
    }

    /// Invariant: consuming iteration yields owned pairs in write order.
    #[test]
    fn into_iter_in_order() {
        let mut d = sample();
        d.insert("c".to_string(), -1).unwrap();
        let owned: Vec<(String, i32)> = d.into_iter().collect();
        let keys: Vec<&str> = owned.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["a", "d", "b", "e", "f", "c"]);
        assert_eq!(owned.last(), Some(&("c".to_string(), -1)));
    }
}
