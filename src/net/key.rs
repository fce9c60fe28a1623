use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::net::ids::{SpeciesId, TransitionId};

/// The identifier a net presents to the outside: the entity's name when the
/// net is labelled, its 1-based index otherwise.
///
/// Map keys in JSON and TOML are always strings, so a string of digits
/// deserializes as an index, the same way [`FromStr`] reads it.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize)]
#[serde(untagged)]
pub enum Key {
    Index(u32),
    Name(String),
}

impl Key {
    pub fn name(&self) -> Option<&str> {
        match self {
            Key::Name(name) => Some(name),
            Key::Index(_) => None,
        }
    }

    /// The other reading of a key spelled with digits: `Index(1)` for
    /// `Name("1")` and back. Lookups try it when the key itself misses.
    pub fn alias(&self) -> Option<Key> {
        match self {
            Key::Index(idx) => Some(Key::Name(idx.to_string())),
            Key::Name(name) => name.parse::<u32>().ok().map(Key::Index),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(idx) => write!(f, "{idx}"),
            Key::Name(name) => f.write_str(name),
        }
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Index(u32),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Index(idx) => Key::Index(idx),
            Raw::Text(text) => {
                let Ok(key) = text.parse::<Key>();
                key
            }
        })
    }
}

/// Digits parse as an index, anything else as a name.
impl FromStr for Key {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<u32>().map_or_else(|_| Key::from(s), Key::Index))
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Name(value.to_owned())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Name(value)
    }
}

impl From<u32> for Key {
    fn from(value: u32) -> Self {
        Key::Index(value)
    }
}

impl From<SpeciesId> for Key {
    fn from(value: SpeciesId) -> Self {
        Key::Index(value.raw())
    }
}

impl From<TransitionId> for Key {
    fn from(value: TransitionId) -> Self {
        Key::Index(value.raw())
    }
}
