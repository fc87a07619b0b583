//! Entity addressing for log operations.
//!
//! An operation names the node or edge it touches in one of two ways:
//!
//! - **New**: an entity created earlier in the same log, named either by
//!   its creation order ([`NewNodeId::Seq`], dense and 0-based) or by a
//!   caller-chosen string ([`NewNodeId::Named`]).
//! - **Existing**: an entity already present in the base graph, named by
//!   its [`GlobalNodeId`], which is stable across every partition.
//!
//! [`EntityAddress::resolve`] collapses either form to a numeric slot.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sentinel returned when an address cannot be resolved to a number.
pub const UNKNOWN_HOST: u64 = u64::MAX;

// ---------------------------------------------------------------------------
// GlobalNodeId
// ---------------------------------------------------------------------------

/// Identifier of an entity in the base graph, stable across partitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalNodeId(u64);

impl GlobalNodeId {
    /// Wrap a raw global identifier.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GlobalNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// NewNodeId
// ---------------------------------------------------------------------------

/// Identifier of an entity created earlier in the same log.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewNodeId {
    /// The n-th entity created by this log, counting from 0.
    Seq(u64),
    /// A caller-chosen name given at creation.
    Named(String),
}

impl fmt::Display for NewNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seq(n) => write!(f, "new#{n}"),
            Self::Named(name) => write!(f, "new:{name}"),
        }
    }
}

// ---------------------------------------------------------------------------
// EntityAddress
// ---------------------------------------------------------------------------

/// Either a not-yet-materialized entity or one already in the base graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityAddress {
    /// Created earlier in this log.
    New(NewNodeId),
    /// Present in the base graph.
    Existing(GlobalNodeId),
}

impl EntityAddress {
    /// Address the `n`-th entity created by this log.
    #[must_use]
    pub const fn seq(n: u64) -> Self {
        Self::New(NewNodeId::Seq(n))
    }

    /// Address a new entity by its caller-chosen name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::New(NewNodeId::Named(name.into()))
    }

    /// Address an entity of the base graph.
    #[must_use]
    pub const fn existing(id: u64) -> Self {
        Self::Existing(GlobalNodeId::new(id))
    }

    /// Whether this addresses an entity created within the log.
    #[must_use]
    pub const fn is_new(&self) -> bool {
        matches!(self, Self::New(_))
    }

    /// Collapse the address to a numeric slot.
    ///
    /// Global and sequence identifiers are returned as-is. A named new entity
    /// is parsed as an integer literal with C-style base detection (`0x` hex,
    /// leading `0` octal, otherwise decimal); if no digits can be read the
    /// result is [`UNKNOWN_HOST`]. Names are not looked up in any registry.
    // TODO: confirm with the ingest owners whether numeric-string names are a
    // deliberate compatibility path or should become a hard failure.
    #[must_use]
    pub fn resolve(&self) -> u64 {
        match self {
            Self::Existing(id) => id.get(),
            Self::New(NewNodeId::Seq(n)) => *n,
            Self::New(NewNodeId::Named(name)) => parse_int_literal(name).unwrap_or(UNKNOWN_HOST),
        }
    }
}

impl From<GlobalNodeId> for EntityAddress {
    fn from(id: GlobalNodeId) -> Self {
        Self::Existing(id)
    }
}

impl From<NewNodeId> for EntityAddress {
    fn from(id: NewNodeId) -> Self {
        Self::New(id)
    }
}

impl fmt::Display for EntityAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New(id) => fmt::Display::fmt(id, f),
            Self::Existing(id) => fmt::Display::fmt(id, f),
        }
    }
}

/// Parse the longest integer literal prefix of `s`, `strtoul`-style.
///
/// Leading whitespace and one sign are accepted; a `-` negates modulo 2^64.
/// Trailing garbage after the digits is ignored. Returns `None` when no
/// digit is present or the value overflows `u64`.
fn parse_int_literal(s: &str) -> Option<u64> {
    let s = s.trim_start();
    let (negative, s) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let bytes = s.as_bytes();
    let (radix, digits) = match bytes {
        [b'0', b'x' | b'X', next, ..] if next.is_ascii_hexdigit() => (16, &s[2..]),
        [b'0', ..] => (8, s),
        _ => (10, s),
    };

    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_digit(radix))
        .map_or(digits.len(), |(i, _)| i);
    if end == 0 {
        return None;
    }
    let value = u64::from_str_radix(&digits[..end], radix).ok()?;
    Some(if negative { value.wrapping_neg() } else { value })
}
