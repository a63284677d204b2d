//! Ordered map (de)serialization, enabled by the `serde` feature.

use crate::dictionary::Dictionary;
use core::fmt;
use core::hash::Hash;
use core::marker::PhantomData;
use serde::de::{Error as _, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

impl<K, V> Serialize for Dictionary<K, V>
where
    K: Serialize,
    V: Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

struct DictionaryVisitor<K, V>(PhantomData<fn() -> (K, V)>);

impl<'de, K, V> Visitor<'de> for DictionaryVisitor<K, V>
where
    K: Deserialize<'de> + Eq + Hash,
    V: Deserialize<'de>,
{
    type Value = Dictionary<K, V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut dict = Dictionary::new();
        while let Some((k, v)) = access.next_entry()? {
            dict.insert(k, v).map_err(A::Error::custom)?;
        }
        Ok(dict)
    }
}

/// Entries are written in document order; a repeated key takes the later
/// value and position.
impl<'de, K, V> Deserialize<'de> for Dictionary<K, V>
where
    K: Deserialize<'de> + Eq + Hash,
    V: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DictionaryVisitor(PhantomData))
    }
}
