//! Rank values
//!
//! A rank is a non-empty string over the base-36 alphabet `0-9a-z`, read as the
//! fraction `0.d1d2...dn`. Byte-wise comparison of canonical ranks (no trailing
//! `0`) matches numeric comparison, so ranks can be stored as plain text and
//! ordered by the store without decoding.

use super::errors::RankError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered symbol set. ASCII order of these bytes is the rank order.
pub const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Number of symbols in [`ALPHABET`].
pub const BASE: u8 = 36;

/// Hard upper bound on the length of any rank accepted by [`RankValue::parse`].
pub const MAX_PARSE_LENGTH: usize = 65_536;

/// Digit value of an alphabet symbol.
pub(crate) fn digit_of(symbol: u8) -> Option<u8> {
    match symbol {
        b'0'..=b'9' => Some(symbol - b'0'),
        b'a'..=b'z' => Some(symbol - b'a' + 10),
        _ => None,
    }
}

/// Alphabet symbol of a digit value. Panics are impossible for `digit < BASE`.
pub(crate) fn symbol_of(digit: u8) -> u8 {
    ALPHABET[digit as usize]
}

/// Immutable position value.
///
/// Construct through [`RankValue::parse`] or the allocator; the inner string is
/// always non-empty and over [`ALPHABET`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RankValue(String);

impl RankValue {
    /// Validate a stored rank.
    pub fn parse(s: &str) -> Result<Self, RankError> {
        if s.is_empty() {
            return Err(RankError::InvalidFormat {
                rank: String::new(),
                reason: "empty rank".into(),
            });
        }
        if s.len() > MAX_PARSE_LENGTH {
            return Err(RankError::InvalidFormat {
                rank: truncate_for_display(s),
                reason: format!("length {} exceeds {}", s.len(), MAX_PARSE_LENGTH),
            });
        }
        if let Some(pos) = s.bytes().position(|b| digit_of(b).is_none()) {
            return Err(RankError::InvalidFormat {
                rank: truncate_for_display(s),
                reason: format!("illegal symbol at offset {}", pos),
            });
        }
        Ok(Self(s.to_owned()))
    }

    /// Build from digit values produced by the allocator.
    pub(crate) fn from_digits(digits: &[u8]) -> Self {
        debug_assert!(!digits.is_empty());
        debug_assert!(digits.iter().all(|d| *d < BASE));
        let text = digits.iter().map(|d| symbol_of(*d) as char).collect();
        Self(text)
    }

    /// Digit values, most significant first.
    pub(crate) fn digits(&self) -> Vec<u8> {
        // Construction guarantees every byte is a legal symbol.
        self.0.bytes().filter_map(digit_of).collect()
    }

    /// The encoded text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of symbols (the rank's precision).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the rank has no trailing `0` symbol.
    ///
    /// Non-canonical ranks are valid but leave no gap directly above them.
    pub fn is_canonical(&self) -> bool {
        !self.0.ends_with('0')
    }
}

fn truncate_for_display(s: &str) -> String {
    s.chars().take(32).collect()
}

impl fmt::Display for RankValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RankValue {
    type Err = RankError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RankValue {
    type Error = RankError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RankValue> for String {
    fn from(value: RankValue) -> Self {
        value.0
    }
}

impl AsRef<str> for RankValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
