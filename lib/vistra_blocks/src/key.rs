//! Namespaced block keys.
use std::fmt::{Display, Formatter};

use hashbrown::Equivalent;
use kstring::{KString, KStringRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Namespace assumed for block keys written without one, per the host platform.
pub const DEFAULT_BLOCK_DOMAIN: &str = "minecraft";

/// Error returned when a string does not have the `namespace:key` shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("`{input}` is not a legal block key (expected `[a-z0-9_]+` namespace and key)")]
pub struct KeyParseError {
    /// The rejected input string.
    pub input: String,
}

fn valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .bytes()
            .all(|b| matches!(b, b'a'..=b'z' | b'0'..=b'9' | b'_'))
}

/// An owned namespaced block key, e.g. `minecraft:chest`.
///
/// Keys arriving as strings go through [`BlockKey::parse`], which validates both
/// segments; [`BlockKey::new`] and [`BlockKey::minecraft`] trust their input and are
/// meant for segments already known to be well-formed.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize, Deserialize)]
pub struct BlockKey {
    /// The namespace
    pub ns: KString,
    /// The block name, unique in the namespace
    pub key: KString,
}

/// Borrowed form of [`BlockKey`], cheap to build for map lookups.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub struct BlockKeyRef<'n> {
    /// The namespace
    pub ns: KStringRef<'n>,
    /// The block name, unique in the namespace
    pub key: KStringRef<'n>,
}

impl BlockKey {
    /// Constructs a key from trusted namespace and name segments.
    pub fn new(ns: &str, key: &str) -> Self {
        Self {
            ns: KString::from_ref(ns),
            key: KString::from_ref(key),
        }
    }

    /// Constructs a key in the default namespace.
    pub fn minecraft(key: &str) -> Self {
        Self {
            ns: KString::from_static(DEFAULT_BLOCK_DOMAIN),
            key: KString::from_ref(key),
        }
    }

    /// Parses a `namespace:key` string. Bare names land in the default namespace,
    /// so `"chest"` parses as `minecraft:chest`; both segments must match
    /// `[a-z0-9_]+`.
    pub fn parse(input: &str) -> Result<Self, KeyParseError> {
        let (ns, key) = input
            .split_once(':')
            .unwrap_or((DEFAULT_BLOCK_DOMAIN, input));
        if valid_segment(ns) && valid_segment(key) {
            Ok(Self::new(ns, key))
        } else {
            Err(KeyParseError {
                input: input.to_owned(),
            })
        }
    }

    /// Borrows this key for lookups.
    pub fn as_ref(&self) -> BlockKeyRef<'_> {
        BlockKeyRef {
            ns: self.ns.as_ref(),
            key: self.key.as_ref(),
        }
    }
}

impl<'n> BlockKeyRef<'n> {
    /// Constructs a key reference in the default namespace.
    pub fn minecraft(key: impl Into<KStringRef<'n>>) -> Self {
        Self {
            ns: KStringRef::from_static(DEFAULT_BLOCK_DOMAIN),
            key: key.into(),
        }
    }

    /// Copies the borrowed segments into an owned key.
    pub fn to_owned(self) -> BlockKey {
        BlockKey {
            ns: self.ns.into(),
            key: self.key.into(),
        }
    }
}

// Owned and borrowed keys hash identically (kstring hashes as the underlying str),
// which is what lets the registry index be queried with either form.
impl Equivalent<BlockKey> for BlockKeyRef<'_> {
    fn equivalent(&self, key: &BlockKey) -> bool {
        key.as_ref() == *self
    }
}

impl Equivalent<BlockKeyRef<'_>> for BlockKey {
    fn equivalent(&self, key: &BlockKeyRef) -> bool {
        self.as_ref() == *key
    }
}

impl Display for BlockKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.as_ref(), f)
    }
}

impl Display for BlockKeyRef<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.ns, self.key)
    }
}
