//! Dictionary: direct-addressed slot array with insertion-order bookkeeping.

use crate::config::DictConfig;
use crate::error::DictError;
use crate::iter::{IntoIter, Iter, IterMut};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, BuildHasherDefault, Hash};
use core::ops::Index;
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, TryReserveError};

/// SipHash with fixed keys, so a key lands in the same slot on every run.
type FixedState = BuildHasherDefault<DefaultHasher>;

#[derive(Debug, Clone)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    hash: u64,
    sequence: u64,
}

/// Insertion-ordered map over a slot array with one candidate slot per key.
///
/// A key lives at `hash(key) % capacity`. There is no probing: when a write
/// lands on a slot held by a different key, the whole table is rebuilt at
/// `capacity * growth_multiplier` and the write is retried. Overwriting a key
/// moves it to the end of iteration order.
///
/// ```
/// use slot_dict::Dictionary;
///
/// let mut d = Dictionary::new();
/// d.insert("b", 2).unwrap();
/// d.insert("a", 1).unwrap();
/// d.insert("b", 3).unwrap();
/// assert_eq!(d.items(), vec![(&"a", &1), (&"b", &3)]);
/// assert_eq!(d.to_string(), r#"{"a": 1, "b": 3}"#);
/// ```
#[derive(Clone)]
pub struct Dictionary<K, V> {
    hasher: FixedState,
    slots: Vec<Option<Entry<K, V>>>,
    order: BTreeMap<u64, usize>, // sequence -> slot index, one record per occupied slot
    growth_multiplier: usize,
    next_sequence: u64,
}

#[derive(Debug, Clone, Copy)]
enum GrowCause {
    Load,
    Collision,
}

/// What a write found in its slot.
enum Occupant {
    Vacant,
    SameKey,
    Foreign { hash: u64 },
}

struct Placed<V> {
    slot: usize,
    previous: Option<V>,
}

/// Allocates `capacity` empty slots, failing instead of aborting when the
/// byte size of the array overflows or the allocator refuses it.
fn empty_slots<K, V>(capacity: usize) -> Result<Vec<Option<Entry<K, V>>>, TryReserveError> {
    let mut slots = Vec::new();
    slots.try_reserve_exact(capacity)?;
    slots.resize_with(capacity, || None);
    Ok(slots)
}

#[inline]
fn slot_in(hash: u64, capacity: usize) -> usize {
    (hash % capacity as u64) as usize
}

impl<K, V> Dictionary<K, V>
where
    K: Eq + Hash,
{
    /// Empty dictionary with 4 slots and a growth multiplier of 2.
    pub fn new() -> Self {
        let config = DictConfig::new();
        let slots = core::iter::repeat_with(|| None)
            .take(config.initial_capacity)
            .collect();
        Self::from_parts(config, slots)
    }

    /// Empty dictionary with `capacity` slots and the default multiplier.
    ///
    /// Unlike `HashMap::with_capacity` this can fail: a zero capacity is
    /// rejected with `ZeroCapacity`, and a slot array too large to allocate
    /// with `CapacityOverflow`.
    pub fn with_capacity(capacity: usize) -> Result<Self, DictError> {
        Self::with_config(DictConfig::new().initial_capacity(capacity))
    }

    /// Validate `config`, then allocate its initial slot array.
    pub fn with_config(config: DictConfig) -> Result<Self, DictError> {
        config.validate()?;
        let slots = empty_slots(config.initial_capacity).map_err(|_| {
            DictError::CapacityOverflow {
                capacity: config.initial_capacity,
                multiplier: 1,
            }
        })?;
        Ok(Self::from_parts(config, slots))
    }

    fn from_parts(config: DictConfig, slots: Vec<Option<Entry<K, V>>>) -> Self {
        Self {
            hasher: FixedState::default(),
            slots,
            order: BTreeMap::new(),
            growth_multiplier: config.growth_multiplier,
            next_sequence: 0,
        }
    }

    /// Build from key/value pairs; later pairs overwrite earlier ones.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, DictError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut d = Self::new();
        d.update(pairs)?;
        Ok(d)
    }

    /// Build a dictionary mapping every key to its own clone of `value`.
    pub fn from_keys<I>(keys: I, value: V) -> Result<Self, DictError>
    where
        I: IntoIterator<Item = K>,
        V: Clone,
    {
        let mut d = Self::new();
        for key in keys {
            d.insert(key, value.clone())?;
        }
        Ok(d)
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Slot index `key` maps to at the current capacity.
    pub fn slot_of<Q>(&self, q: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        slot_in(self.make_hash(q), self.capacity())
    }

    fn find_slot<Q>(&self, q: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        let slot = slot_in(hash, self.capacity());
        match &self.slots[slot] {
            Some(e) if e.hash == hash && e.key.borrow() == q => Some(slot),
            _ => None,
        }
    }

    /// Membership test; never fails and never writes.
    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find_slot(q).is_some()
    }

    /// Single-slot read: `None` when the key's slot is empty or holds a
    /// different key.
    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let slot = self.find_slot(q)?;
        self.slots[slot].as_ref().map(|e| &e.value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let slot = self.find_slot(q)?;
        self.slots[slot].as_mut().map(|e| &mut e.value)
    }

    pub fn get_or<'a, Q>(&'a self, q: &Q, default: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(q).unwrap_or(default)
    }

    /// Indexed read that reports a miss as `KeyNotFound`.
    pub fn lookup<Q>(&self, q: &Q) -> Result<&V, DictError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(q).ok_or(DictError::KeyNotFound)
    }

    /// Write `value` under `key`, returning the value it replaced.
    ///
    /// An overwrite takes a fresh insertion sequence, so the key moves to
    /// the end of iteration order.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, DictError> {
        self.write(key, value).map(|placed| placed.previous)
    }

    fn write(&mut self, key: K, value: V) -> Result<Placed<V>, DictError> {
        if self.len() >= self.capacity() {
            self.grow(GrowCause::Load)?;
        }
        let hash = self.make_hash(&key);
        self.place(key, value, hash)
    }

    fn place(&mut self, key: K, value: V, hash: u64) -> Result<Placed<V>, DictError> {
        let slot = slot_in(hash, self.capacity());
        let occupant = match &self.slots[slot] {
            None => Occupant::Vacant,
            Some(e) if e.hash == hash && e.key == key => Occupant::SameKey,
            Some(e) => Occupant::Foreign { hash: e.hash },
        };

        let sequence = self.next_sequence;
        match occupant {
            Occupant::Vacant => {
                self.slots[slot] = Some(Entry {
                    key,
                    value,
                    hash,
                    sequence,
                });
                self.order.insert(sequence, slot);
                self.next_sequence += 1;
                Ok(Placed {
                    slot,
                    previous: None,
                })
            }
            Occupant::SameKey => {
                let Some(e) = self.slots[slot].as_mut() else {
                    return Err(DictError::KeyNotFound);
                };
                let previous = core::mem::replace(&mut e.value, value);
                self.order.remove(&e.sequence);
                e.sequence = sequence;
                self.order.insert(sequence, slot);
                self.next_sequence += 1;
                Ok(Placed {
                    slot,
                    previous: Some(previous),
                })
            }
            Occupant::Foreign { hash: occupant_hash } => {
                self.resize_and_retry(key, value, hash, occupant_hash)
            }
        }
    }

    /// Collision resolution: grow the whole table, then place again.
    fn resize_and_retry(
        &mut self,
        key: K,
        value: V,
        hash: u64,
        occupant_hash: u64,
    ) -> Result<Placed<V>, DictError> {
        // Equal hashes share a slot at every capacity.
        if occupant_hash == hash {
            tracing::trace!(capacity = self.capacity(), hash, "rejecting unplaceable key");
            return Err(DictError::UnplaceableKey);
        }
        self.grow(GrowCause::Collision)?;
        self.place(key, value, hash)
    }

    /// Rebuild at `capacity * growth_multiplier`, re-placing entries in
    /// insertion order with their original sequence numbers.
    ///
    /// The new array is allocated before anything moves, so a failed growth
    /// leaves the dictionary untouched.
    fn grow(&mut self, cause: GrowCause) -> Result<(), DictError> {
        let old_capacity = self.capacity();
        let overflow = DictError::CapacityOverflow {
            capacity: old_capacity,
            multiplier: self.growth_multiplier,
        };
        let new_capacity = old_capacity
            .checked_mul(self.growth_multiplier)
            .ok_or(overflow)?;
        let mut slots = empty_slots(new_capacity).map_err(|_| {
            tracing::warn!(old_capacity, new_capacity, "slot array allocation failed");
            overflow
        })?;
        let mut order = BTreeMap::new();
        for (sequence, old_slot) in core::mem::take(&mut self.order) {
            if let Some(entry) = self.slots[old_slot].take() {
                // Stored hashes: `K: Hash` is never called during a rebuild.
                let slot = slot_in(entry.hash, new_capacity);
                debug_assert!(slots[slot].is_none(), "rebuild placed two entries in one slot");
                order.insert(sequence, slot);
                slots[slot] = Some(entry);
            }
        }
        self.slots = slots;
        self.order = order;

        tracing::debug!(
            ?cause,
            old_capacity,
            new_capacity,
            len = self.len(),
            "dictionary grew"
        );
        Ok(())
    }

    /// Delete `key`, returning its value.
    pub fn remove<Q>(&mut self, q: &Q) -> Result<V, DictError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, q: &Q) -> Result<(K, V), DictError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let slot = self.find_slot(q).ok_or(DictError::KeyNotFound)?;
        let entry = self.slots[slot].take().ok_or(DictError::KeyNotFound)?;
        self.order.remove(&entry.sequence);
        Ok((entry.key, entry.value))
    }

    /// Remove `key` and return its value, or `default` when absent.
    ///
    /// `None` means no default was given; a miss is then `KeyNotFound`.
    pub fn pop<Q>(&mut self, q: &Q, default: Option<V>) -> Result<V, DictError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove(q).or_else(|e| default.ok_or(e))
    }

    /// Remove the most recently written entry.
    pub fn pop_item(&mut self) -> Result<(K, V), DictError> {
        let (_, slot) = self.order.pop_last().ok_or(DictError::KeyNotFound)?;
        let entry = self.slots[slot].take().ok_or(DictError::KeyNotFound)?;
        Ok((entry.key, entry.value))
    }

    pub fn set_default(&mut self, key: K, value: V) -> Result<&mut V, DictError> {
        self.set_default_with(key, || value)
    }

    /// Write `default()` if `key` is absent, then return the stored value.
    /// `default` runs only on a miss.
    pub fn set_default_with<F>(&mut self, key: K, default: F) -> Result<&mut V, DictError>
    where
        F: FnOnce() -> V,
    {
        let slot = match self.find_slot(&key) {
            Some(slot) => slot,
            None => self.write(key, default())?.slot,
        };
        self.slots[slot]
            .as_mut()
            .map(|e| &mut e.value)
            .ok_or(DictError::KeyNotFound)
    }

    /// Write every pair in order; later pairs overwrite earlier ones.
    pub fn update<I>(&mut self, pairs: I) -> Result<(), DictError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (k, v) in pairs {
            self.insert(k, v)?;
        }
        Ok(())
    }

    /// Snapshot into a plain hash map; order is not kept.
    pub fn as_plain_map(&self) -> hashbrown::HashMap<K, V>
    where
        K: Clone,
        V: Clone,
    {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl<K, V> Dictionary<K, V> {
    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.order.len()
    }
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
    /// Current slot count. Only growth changes it; it never shrinks.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
    pub fn growth_multiplier(&self) -> usize {
        self.growth_multiplier
    }

    /// Empty every slot. Capacity is kept.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.order.clear();
    }

    /// Cursor over `(&K, &V)`, oldest write first. Each call gets its own
    /// position, so iterations may be nested freely.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.slots, self.order.values())
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let live = self
            .slots
            .iter_mut()
            .flatten()
            .map(|e| (e.sequence, &e.key, &mut e.value))
            .collect();
        IterMut::new(live)
    }

    pub fn items(&self) -> Vec<(&K, &V)> {
        self.iter().collect()
    }
    pub fn keys(&self) -> Vec<&K> {
        self.iter().map(|(k, _)| k).collect()
    }
    pub fn values(&self) -> Vec<&V> {
        self.iter().map(|(_, v)| v).collect()
    }
}

impl<K, V> Default for Dictionary<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Equality is order-sensitive: same pairs written in a different order
/// compare unequal.
impl<K, V> PartialEq for Dictionary<K, V>
where
    K: Eq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K, V> Eq for Dictionary<K, V>
where
    K: Eq,
    V: Eq,
{
}

impl<K, V, Q> Index<&Q> for Dictionary<K, V>
where
    K: Eq + Hash + Borrow<Q>,
    Q: ?Sized + Hash + Eq,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present; use [`Dictionary::lookup`] for a
    /// `Result`.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("key not found in Dictionary")
    }
}

impl<'a, K, V> IntoIterator for &'a Dictionary<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut Dictionary<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V> IntoIterator for Dictionary<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;
    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.slots, self.order.into_values())
    }
}

/// `{k: v, ...}` in insertion order; `{:#}` puts one pair per line.
impl<K, V> fmt::Display for Dictionary<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> fmt::Debug for Dictionary<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Dictionary(")?;
        f.debug_list().entries(self.iter()).finish()?;
        write!(
            f,
            ", capacity={}, growth_multiplier={})",
            self.capacity(),
            self.growth_multiplier
        )
    }
}
