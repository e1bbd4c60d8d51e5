//! `Serialize` and `Deserialize` implementations for the treap façades. Maps serialize as
//! serde maps and sets as serde sequences, both in ascending key order; deserialization
//! rebuilds the tree through ordinary inserts, so priorities and shape are reproduced from the
//! keys alone.

use crate::treap::map::TreapMap;
use crate::treap::set::TreapSet;
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

impl<T, U> Serialize for TreapMap<T, U>
where
    T: Serialize,
    U: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

struct TreapMapVisitor<T, U> {
    marker: PhantomData<TreapMap<T, U>>,
}

impl<'de, T, U> Visitor<'de> for TreapMapVisitor<T, U>
where
    T: Deserialize<'de> + Ord + Clone + Hash,
    U: Deserialize<'de> + Clone,
{
    type Value = TreapMap<T, U>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut map = TreapMap::new();
        while let Some((key, value)) = access.next_entry()? {
            map = map.insert(key, value);
        }
        Ok(map)
    }
}

impl<'de, T, U> Deserialize<'de> for TreapMap<T, U>
where
    T: Deserialize<'de> + Ord + Clone + Hash,
    U: Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(TreapMapVisitor {
            marker: PhantomData,
        })
    }
}

impl<T> Serialize for TreapSet<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for key in self {
            seq.serialize_element(key)?;
        }
        seq.end()
    }
}

struct TreapSetVisitor<T> {
    marker: PhantomData<TreapSet<T>>,
}

impl<'de, T> Visitor<'de> for TreapSetVisitor<T>
where
    T: Deserialize<'de> + Ord + Clone + Hash,
{
    type Value = TreapSet<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut set = TreapSet::new();
        while let Some(key) = access.next_element()? {
            set = set.insert(key);
        }
        Ok(set)
    }
}

impl<'de, T> Deserialize<'de> for TreapSet<T>
where
    T: Deserialize<'de> + Ord + Clone + Hash,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(TreapSetVisitor {
            marker: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::treap::{TreapMap, TreapSet};
    use serde_test::{assert_tokens, Token};

    #[test]
    fn test_ser_de_map() {
        let map = TreapMap::new().insert(1, 10).insert(2, 20);

        assert_tokens(
            &map,
            &[
                Token::Map { len: Some(2) },
                Token::I32(1),
                Token::I32(10),
                Token::I32(2),
                Token::I32(20),
                Token::MapEnd,
            ],
        );
    }

    #[test]
    fn test_ser_de_set() {
        let set = TreapSet::new().insert(3).insert(1).insert(2);

        assert_tokens(
            &set,
            &[
                Token::Seq { len: Some(3) },
                Token::I32(1),
                Token::I32(2),
                Token::I32(3),
                Token::SeqEnd,
            ],
        );
    }
}
