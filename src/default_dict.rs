//! DefaultDict: a `Dictionary` whose materializing read fills a miss from an
//! injected value factory.

use crate::config::DictConfig;
use crate::dictionary::Dictionary;
use crate::error::DictError;
use core::fmt;
use core::hash::Hash;
use core::ops::{Deref, DerefMut};

/// Strategy producing the value stored for a missing key.
///
/// Implemented for every `FnMut() -> V`; implement it directly for stateful
/// factories that should be inspectable afterwards.
pub trait ValueFactory<V> {
    fn make(&mut self) -> V;
}

impl<V, F> ValueFactory<V> for F
where
    F: FnMut() -> V,
{
    #[inline]
    fn make(&mut self) -> V {
        self()
    }
}

/// A `Dictionary` plus a value factory that fills misses of the indexed
/// read.
///
/// [`DefaultDict::lookup`] and [`DefaultDict::get_or_create`] write
/// `factory.make()` for an absent key instead of failing. `get` and
/// `contains_key` stay plain queries and never write. `dd[key]` goes through
/// `Index`, which only has `&self`, so it cannot materialize and still
/// panics on a miss. Every other dictionary operation is reached through
/// `Deref`/`DerefMut` and behaves exactly as on a plain `Dictionary`.
///
/// ```
/// use slot_dict::DefaultDict;
///
/// let mut groups: DefaultDict<&str, Vec<u32>, _> = DefaultDict::new(Vec::new);
/// for (k, v) in [("odd", 1), ("even", 2), ("odd", 3)] {
///     groups.get_or_create(k).unwrap().push(v);
/// }
/// assert_eq!(groups.lookup("odd"), Ok(&mut vec![1, 3]));
/// assert_eq!(groups.get("none"), None);
/// assert_eq!(groups.lookup("none"), Ok(&mut vec![]));
/// assert_eq!(groups.len(), 3);
/// ```
#[derive(Clone)]
pub struct DefaultDict<K, V, F = fn() -> V> {
    dict: Dictionary<K, V>,
    factory: F,
}

impl<K, V, F> DefaultDict<K, V, F>
where
    K: Eq + Hash,
    F: ValueFactory<V>,
{
    pub fn new(factory: F) -> Self {
        Self::from_dictionary(Dictionary::new(), factory)
    }

    pub fn with_config(config: DictConfig, factory: F) -> Result<Self, DictError> {
        Ok(Self::from_dictionary(Dictionary::with_config(config)?, factory))
    }

    /// Wrap an existing dictionary; its entries and layout are kept.
    pub fn from_dictionary(dict: Dictionary<K, V>, factory: F) -> Self {
        Self { dict, factory }
    }

    /// Read `key`, writing `factory.make()` first when it is absent.
    ///
    /// The factory runs at most once per call and never on a hit.
    pub fn get_or_create(&mut self, key: K) -> Result<&mut V, DictError> {
        let factory = &mut self.factory;
        self.dict.set_default_with(key, || factory.make())
    }

    /// Indexed read. A miss is filled from the factory rather than reported
    /// as `KeyNotFound`; the only failures are those of the write.
    pub fn lookup(&mut self, key: K) -> Result<&mut V, DictError> {
        self.get_or_create(key)
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn into_inner(self) -> Dictionary<K, V> {
        self.dict
    }

    pub fn into_parts(self) -> (Dictionary<K, V>, F) {
        (self.dict, self.factory)
    }
}

impl<K, V> DefaultDict<K, V>
where
    K: Eq + Hash,
{
    /// Builder whose `build` fails with `MissingFactory` unless a factory
    /// was supplied.
    pub fn builder() -> DefaultDictBuilder<fn() -> V> {
        DefaultDictBuilder {
            config: DictConfig::default(),
            factory: None,
        }
    }
}

/// Staged construction of a [`DefaultDict`].
#[derive(Debug, Clone)]
pub struct DefaultDictBuilder<F> {
    config: DictConfig,
    factory: Option<F>,
}

impl<F> DefaultDictBuilder<F> {
    pub fn config(mut self, config: DictConfig) -> Self {
        self.config = config;
        self
    }

    pub fn factory<G>(self, factory: G) -> DefaultDictBuilder<G> {
        DefaultDictBuilder {
            config: self.config,
            factory: Some(factory),
        }
    }

    pub fn build<K, V>(self) -> Result<DefaultDict<K, V, F>, DictError>
    where
        K: Eq + Hash,
        F: ValueFactory<V>,
    {
        let factory = self.factory.ok_or(DictError::MissingFactory)?;
        DefaultDict::with_config(self.config, factory)
    }
}

impl<K, V, F> Deref for DefaultDict<K, V, F> {
    type Target = Dictionary<K, V>;
    fn deref(&self) -> &Dictionary<K, V> {
        &self.dict
    }
}

impl<K, V, F> DerefMut for DefaultDict<K, V, F> {
    fn deref_mut(&mut self) -> &mut Dictionary<K, V> {
        &mut self.dict
    }
}

/// Compares contents only; factories are not comparable.
impl<K, V, F, G> PartialEq<DefaultDict<K, V, G>> for DefaultDict<K, V, F>
where
    K: Eq,
    V: PartialEq,
{
    fn eq(&self, other: &DefaultDict<K, V, G>) -> bool {
        self.dict == other.dict
    }
}

impl<K, V, F> fmt::Display for DefaultDict<K, V, F>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.dict, f)
    }
}

impl<K, V, F> fmt::Debug for DefaultDict<K, V, F>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DefaultDict({}, {:?})", core::any::type_name::<F>(), self.dict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        calls: usize,
    }
    impl ValueFactory<usize> for Counter {
        fn make(&mut self) -> usize {
            self.calls += 1;
            self.calls * 100
        }
    }

    /// Invariant: a hit never runs the factory; a miss runs it once.
    #[test]
    fn factory_runs_only_on_miss() {
        let mut d: DefaultDict<&str, usize, Counter> = DefaultDict::new(Counter { calls: 0 });
        assert_eq!(*d.get_or_create("a").unwrap(), 100);
        assert_eq!(*d.get_or_create("a").unwrap(), 100);
        assert_eq!(*d.get_or_create("b").unwrap(), 200);
        assert_eq!(d.factory().calls, 2);
        assert_eq!(d.len(), 2);
    }

    /// Invariant: the factory keeps working after the inner table has grown.
    #[test]
    fn factory_survives_growth() {
        let mut d: DefaultDict<u32, usize, Counter> = DefaultDict::new(Counter { calls: 0 });
        for i in 0..50u32 {
            d.get_or_create(i).unwrap();
        }
        assert!(d.capacity() >= 50);
        assert_eq!(d.factory().calls, 50);
        assert_eq!(d.get(&49), Some(&5000));
        assert_eq!(*d.get_or_create(50).unwrap(), 5100);
    }

    /// Invariant: building without a factory is an invalid construction.
    #[test]
    fn builder_requires_factory() {
        let built: Result<DefaultDict<String, i32>, DictError> =
            DefaultDict::<String, i32>::builder().build();
        assert_eq!(built.err(), Some(DictError::MissingFactory));

        let d: DefaultDict<String, i32, _> = DefaultDict::<String, i32>::builder()
            .config(DictConfig::new().initial_capacity(8).growth_multiplier(3))
            .factory(|| 7)
            .build()
            .unwrap();
        assert_eq!(d.capacity(), 8);
        assert_eq!(d.growth_multiplier(), 3);
    }

    /// Invariant: a bad config is reported even when a factory is present.
    #[test]
    fn builder_validates_config() {
        let r: Result<DefaultDict<u8, u8, _>, _> = DefaultDict::<u8, u8>::builder()
            .factory(|| 0u8)
            .config(DictConfig::new().growth_multiplier(1))
            .build();
        assert_eq!(
            r.err(),
            Some(DictError::GrowthMultiplierTooSmall { multiplier: 1 })
        );
    }

    /// Invariant: the indexed read materializes a miss; `get` and
    /// `contains_key` never do.
    #[test]
    fn lookup_materializes_miss() {
        let mut d: DefaultDict<&str, usize, Counter> = DefaultDict::new(Counter { calls: 0 });
        assert_eq!(d.get("k"), None);
        assert!(!d.contains_key("k"));
        assert_eq!(d.factory().calls, 0);
        assert_eq!(d.lookup("k"), Ok(&mut 100));
        assert_eq!(d.lookup("k"), Ok(&mut 100));
        assert_eq!(d.factory().calls, 1);
        assert_eq!(d.dict.lookup("absent"), Err(DictError::KeyNotFound));
    }

    #[test]
    fn debug_names_factory() {
        let mut d: DefaultDict<&str, i32> = DefaultDict::new((|| 0) as fn() -> i32);
        d.get_or_create("x").unwrap();
        let s = format!("{d:?}");
        assert!(s.starts_with("DefaultDict(fn() -> i32, Dictionary("), "{s}");
        assert_eq!(d.to_string(), r#"{"x": 0}"#);
    }
}
