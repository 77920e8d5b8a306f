//! Typed identifiers for items, actors, and comments
//!
//! All identifiers are 64-bit integers backed by the relational store's
//! primary keys. Wrapping them in distinct types keeps an `ActorId` from
//! ever being passed where an `ItemId` is expected.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Error when parsing an identifier from string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdParseError {
    #[error("invalid identifier format")]
    InvalidFormat,
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(i64);

        impl $name {
            /// Create an identifier from its raw value
            #[inline]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the inner i64 value
            #[inline]
            pub const fn into_inner(self) -> i64 {
                self.0
            }

            /// Parse from string representation
            pub fn parse(s: &str) -> Result<Self, IdParseError> {
                s.trim()
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|_| IdParseError::InvalidFormat)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        // Serialize as string for JSON (JavaScript BigInt safety)
        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(&self.0.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                #[derive(Deserialize)]
                #[serde(untagged)]
                enum Raw {
                    Text(String),
                    Number(i64),
                }

                match Raw::deserialize(deserializer)? {
                    Raw::Text(s) => Self::parse(&s).map_err(serde::de::Error::custom),
                    Raw::Number(n) => Ok(Self(n)),
                }
            }
        }
    };
}

define_id!(
    /// Identifier of a published piece of content (story/post)
    ItemId
);

define_id!(
    /// Identifier of the user performing an engagement action
    ActorId
);

define_id!(
    /// Identifier of a comment row
    CommentId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(ItemId::parse("42"), Ok(ItemId::new(42)));
        assert_eq!(ActorId::parse(" 7 "), Ok(ActorId::new(7)));
        assert_eq!(ItemId::parse("abc"), Err(IdParseError::InvalidFormat));
    }

    #[test]
    fn test_serde_string_and_number() {
        let id = ItemId::new(1234);
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"1234\"");

        let from_str: ItemId = serde_json::from_str("\"1234\"").unwrap();
        let from_num: ItemId = serde_json::from_str("1234").unwrap();
        assert_eq!(from_str, id);
        assert_eq!(from_num, id);
    }

    #[test]
    fn test_display_and_conversions() {
        let id = CommentId::from(99);
        assert_eq!(id.to_string(), "99");
        assert_eq!(i64::from(id), 99);
    }
}
