//! Participant identifiers and their sort order
//!
//! Provides [`ParticipantKey`], the derived ordering key for identifiers such
//! as `a10`: a lowercase letter group followed by a numeric suffix.
//!
//! Identifiers of any other shape collapse into [`ParticipantKey::Malformed`],
//! which orders strictly after every well-formed key. Parsing never fails;
//! rejecting bad identifiers is the validator's job.

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

/// Sort key derived from a participant identifier
///
/// # Examples
/// - `a2` → group `a`, number `2`
/// - `B010` → group `b`, number `10`
/// - `1a`, `a-1`, `""` → [`ParticipantKey::Malformed`]
///
/// Ordering is group first (lexicographic), then numeric value, with every
/// malformed identifier after every valid one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParticipantKey {
    /// Identifier of the shape `letters+digits`
    Valid {
        /// Lowercased letter prefix
        group: String,
        /// Numeric suffix
        number: ParticipantNumber,
    },

    /// Anything else; sorts last
    Malformed,
}

impl ParticipantKey {
    /// Derive the key for an identifier
    ///
    /// Matches the fixed shape `^([a-zA-Z]+)([0-9]+)$` regardless of the
    /// configured validation pattern, so that ordering of stored data never
    /// depends on configuration.
    #[must_use]
    pub fn parse(identifier: &str) -> Self {
        let split = identifier
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(identifier.len());
        let (letters, digits) = identifier.split_at(split);

        if letters.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Self::Malformed;
        }

        Self::Valid {
            group: letters.to_ascii_lowercase(),
            number: ParticipantNumber::from_digits(digits),
        }
    }

    /// Whether the identifier had the `letters+digits` shape
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }

    /// Group label (lowercased letter prefix), if well-formed
    #[inline]
    #[must_use]
    pub fn group(&self) -> Option<&str> {
        match self {
            Self::Valid { group, .. } => Some(group),
            Self::Malformed => None,
        }
    }

    /// Numeric suffix, if well-formed
    #[inline]
    #[must_use]
    pub fn number(&self) -> Option<&ParticipantNumber> {
        match self {
            Self::Valid { number, .. } => Some(number),
            Self::Malformed => None,
        }
    }
}

impl Display for ParticipantKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid { group, number } => write!(f, "{group}{number}"),
            Self::Malformed => f.write_str("<malformed>"),
        }
    }
}

/// Arbitrary-length non-negative integer taken from an identifier suffix
///
/// Stored as its decimal digits without leading zeros, so `007` and `7`
/// compare equal and there is no upper bound on the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParticipantNumber(String);

impl ParticipantNumber {
    fn from_digits(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        if trimmed.is_empty() {
            Self("0".to_string())
        } else {
            Self(trimmed.to_string())
        }
    }

    /// Canonical decimal digits
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value as `u64`, if it fits
    #[inline]
    #[must_use]
    pub fn to_u64(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl Ord for ParticipantNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        // no leading zeros, so more digits means a larger value
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for ParticipantNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for ParticipantNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sort identifiers in place by [`ParticipantKey`]
///
/// Stable: malformed identifiers keep their relative order at the end.
pub fn sort_participants<S: AsRef<str>>(ids: &mut [S]) {
    ids.sort_by_cached_key(|id| ParticipantKey::parse(id.as_ref()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(id: &str) -> ParticipantKey {
        ParticipantKey::parse(id)
    }

    #[test]
    fn parses_group_and_number() {
        let k = key("Ab12");
        assert_eq!(k.group(), Some("ab"));
        assert_eq!(k.number().map(ParticipantNumber::as_str), Some("12"));
        assert_eq!(k.to_string(), "ab12");
    }

    #[test]
    fn numeric_order_within_group() {
        assert!(key("a2") < key("a10"));
        assert!(key("a10") < key("b1"));
    }

    #[test]
    fn group_is_case_insensitive() {
        assert_eq!(key("A3"), key("a3"));
    }

    #[test]
    fn leading_zeros_do_not_change_value() {
        assert_eq!(key("a007"), key("a7"));
        assert_eq!(key("a000").number().map(ParticipantNumber::as_str), Some("0"));
    }

    #[test]
    fn large_numbers_have_no_upper_bound() {
        let big = key("a123456789012345678901234567890");
        assert!(big.is_valid());
        assert!(key("a99999999999999999999") < big);
        assert_eq!(big.number().and_then(ParticipantNumber::to_u64), None);
    }

    #[test]
    fn malformed_shapes() {
        for id in ["", "a", "12", "1a", "a1b", "a-1", "a 1", "é1", "a١"] {
            assert_eq!(key(id), ParticipantKey::Malformed, "{id:?}");
        }
    }

    #[test]
    fn malformed_sorts_after_valid() {
        assert!(key("zzzz999999") < key("1"));
        assert!(key("z1") < key(""));
    }

    #[test]
    fn sort_example() {
        let mut ids = vec!["b2", "a10", "a2"];
        sort_participants(&mut ids);
        assert_eq!(ids, vec!["a2", "a10", "b2"]);
    }

    #[test]
    fn sort_keeps_malformed_order() {
        let mut ids = vec!["x-2", "b1", "", "a1", "x-1"];
        sort_participants(&mut ids);
        assert_eq!(ids, vec!["a1", "b1", "x-2", "", "x-1"]);
    }
}
