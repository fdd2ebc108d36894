//! Questionnaire responses
//!
//! A [`Response`] is one participant submission: an identifier, rating slots
//! keyed `rating_<n>` and open-answer slots keyed `open_<n>` (both 1-indexed).
//! Slot maps keep insertion order so the persisted file lists slots in
//! question order.

use crate::participant::ParticipantKey;
use indexmap::IndexMap;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

/// Key of the rating slot at zero-based position `slot`
#[inline]
#[must_use]
pub fn rating_key(slot: usize) -> String {
    format!("rating_{}", slot + 1)
}

/// Key of the open-answer slot at zero-based position `slot`
#[inline]
#[must_use]
pub fn open_key(slot: usize) -> String {
    format!("open_{}", slot + 1)
}

/// Raw stored rating
///
/// Persisted as a JSON number or string. Empty placeholders and non-numeric
/// input are kept as [`RatingValue::Text`]. Fractional numbers written by
/// other tools are kept verbatim as [`RatingValue::Real`].
#[derive(Debug, Clone)]
pub enum RatingValue {
    /// Integer rating
    Score(i64),
    /// Number with a fractional part or exponent, as stored
    Real(f64),
    /// Empty placeholder or any non-numeric text
    Text(String),
}

impl RatingValue {
    /// Empty placeholder
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    /// Coerce form input
    ///
    /// The trimmed input becomes a [`RatingValue::Score`] when it consists
    /// only of ASCII digits (and fits in `i64`); otherwise the trimmed text
    /// is kept unchanged.
    #[must_use]
    pub fn from_input(raw: &str) -> Self {
        let trimmed = raw.trim();
        if is_digit_literal(trimmed) {
            if let Ok(score) = trimmed.parse() {
                return Self::Score(score);
            }
        }
        Self::Text(trimmed.to_string())
    }

    /// Empty placeholder
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }

    /// Integer value, if any
    ///
    /// Scores pass through, signed ones included. Text counts only when it
    /// is a digit literal. Reals are not integers.
    #[must_use]
    pub fn as_score(&self) -> Option<i64> {
        match self {
            Self::Score(score) => Some(*score),
            Self::Text(text) if is_digit_literal(text) => text.parse().ok(),
            Self::Text(_) | Self::Real(_) => None,
        }
    }
}

fn is_digit_literal(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

impl PartialEq for RatingValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Score(a), Self::Score(b)) => a == b,
            (Self::Real(a), Self::Real(b)) => a.to_bits() == b.to_bits(),
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for RatingValue {}

impl Hash for RatingValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Score(score) => score.hash(state),
            Self::Real(real) => real.to_bits().hash(state),
            Self::Text(text) => text.hash(state),
        }
    }
}

impl Default for RatingValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl Display for RatingValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Score(score) => write!(f, "{score}"),
            Self::Real(real) => write!(f, "{real:?}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<i64> for RatingValue {
    fn from(score: i64) -> Self {
        Self::Score(score)
    }
}

impl From<&str> for RatingValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl Serialize for RatingValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Score(score) => serializer.serialize_i64(*score),
            Self::Real(real) => serializer.serialize_f64(*real),
            Self::Text(text) => serializer.serialize_str(text),
        }
    }
}

impl<'de> Deserialize<'de> for RatingValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RatingValueVisitor)
    }
}

/// Lenient reader: files edited by hand may hold any JSON scalar
struct RatingValueVisitor;

impl Visitor<'_> for RatingValueVisitor {
    type Value = RatingValue;

    fn expecting(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("a numeric rating or a string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(RatingValue::Score(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        // beyond i64 no scale can hold it; keep the digits
        Ok(i64::try_from(v).map_or_else(|_| RatingValue::Text(v.to_string()), RatingValue::Score))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(RatingValue::Real(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(RatingValue::Text(v.to_string()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(RatingValue::Text(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(RatingValue::Text(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(RatingValue::empty())
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(RatingValue::empty())
    }
}

/// One participant submission
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Response {
    /// Participant identifier; empty while the response is an unsaved draft
    #[serde(default)]
    pub participant_number: String,

    /// `rating_<n>` → raw value
    #[serde(default)]
    pub ratings: IndexMap<String, RatingValue>,

    /// `open_<n>` → free text
    #[serde(default)]
    pub open_answers: IndexMap<String, String>,
}

impl Response {
    /// Response with every slot empty and no participant
    #[must_use]
    pub fn blank(rating_slots: usize, open_slots: usize) -> Self {
        Self {
            participant_number: String::new(),
            ratings: (0..rating_slots)
                .map(|slot| (rating_key(slot), RatingValue::empty()))
                .collect(),
            open_answers: (0..open_slots)
                .map(|slot| (open_key(slot), String::new()))
                .collect(),
        }
    }

    /// Build a response from slot values in question order
    #[must_use]
    pub fn new(
        participant_number: impl Into<String>,
        ratings: impl IntoIterator<Item = RatingValue>,
        open_answers: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            participant_number: participant_number.into(),
            ratings: ratings
                .into_iter()
                .enumerate()
                .map(|(slot, value)| (rating_key(slot), value))
                .collect(),
            open_answers: open_answers
                .into_iter()
                .enumerate()
                .map(|(slot, text)| (open_key(slot), text))
                .collect(),
        }
    }

    /// Raw rating at zero-based `slot`, if stored
    #[inline]
    #[must_use]
    pub fn rating(&self, slot: usize) -> Option<&RatingValue> {
        self.ratings.get(&rating_key(slot))
    }

    /// Open answer at zero-based `slot`, if stored
    #[inline]
    #[must_use]
    pub fn open_answer(&self, slot: usize) -> Option<&str> {
        self.open_answers.get(&open_key(slot)).map(String::as_str)
    }

    /// Derived sort key
    #[inline]
    #[must_use]
    pub fn participant_key(&self) -> ParticipantKey {
        ParticipantKey::parse(&self.participant_number)
    }

    /// Not yet saved with a participant identifier
    #[inline]
    #[must_use]
    pub fn is_draft(&self) -> bool {
        self.participant_number.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn slot_keys_are_one_indexed() {
        assert_eq!(rating_key(0), "rating_1");
        assert_eq!(open_key(2), "open_3");
    }

    #[test]
    fn from_input_coerces_digits() {
        assert_eq!(RatingValue::from_input(" 4 "), RatingValue::Score(4));
        assert_eq!(RatingValue::from_input("007"), RatingValue::Score(7));
        assert_eq!(RatingValue::from_input(""), RatingValue::empty());
        assert_eq!(RatingValue::from_input("n/a"), RatingValue::from("n/a"));
        assert_eq!(RatingValue::from_input("-1"), RatingValue::from("-1"));
        assert_eq!(RatingValue::from_input("3.5"), RatingValue::from("3.5"));
    }

    #[test]
    fn from_input_keeps_overflowing_digits_as_text() {
        let raw = "99999999999999999999999";
        assert_eq!(RatingValue::from_input(raw), RatingValue::from(raw));
    }

    #[test]
    fn as_score_reads_digit_text() {
        assert_eq!(RatingValue::from("5").as_score(), Some(5));
        assert_eq!(RatingValue::Score(2).as_score(), Some(2));
        assert_eq!(RatingValue::empty().as_score(), None);
        assert_eq!(RatingValue::from("x").as_score(), None);
    }

    #[test]
    fn blank_response_layout() {
        let blank = Response::blank(2, 1);
        assert!(blank.is_draft());
        assert_eq!(
            blank.ratings.keys().collect::<Vec<_>>(),
            vec!["rating_1", "rating_2"]
        );
        assert!(blank.ratings.values().all(RatingValue::is_empty));
        assert_eq!(blank.open_answer(0), Some(""));
    }

    #[test]
    fn serializes_in_slot_order() {
        let response = Response::new(
            "a1",
            [RatingValue::Score(3), RatingValue::empty()],
            ["fine".to_string()],
        );
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(
            json,
            r#"{"participant_number":"a1","ratings":{"rating_1":3,"rating_2":""},"open_answers":{"open_1":"fine"}}"#
        );
    }

    #[test]
    fn deserializes_lenient_values() {
        let response: Response = serde_json::from_str(
            r#"{"participant_number":"a1","ratings":{"rating_1":4.5,"rating_2":null,"rating_3":-2,"rating_4":"x"}}"#,
        )
        .unwrap();
        assert_eq!(response.rating(0), Some(&RatingValue::Real(4.5)));
        assert_eq!(response.rating(1), Some(&RatingValue::empty()));
        assert_eq!(response.rating(2), Some(&RatingValue::Score(-2)));
        assert_eq!(response.rating(3), Some(&RatingValue::from("x")));
        assert!(response.open_answers.is_empty());
    }

    #[test]
    fn stored_numbers_keep_their_json_type() {
        let raw = r#"{"participant_number":"a1","ratings":{"rating_1":-2,"rating_2":4.0,"rating_3":3,"rating_4":"7"},"open_answers":{}}"#;
        let response: Response = serde_json::from_str(raw).unwrap();
        assert_eq!(response.rating(0).and_then(RatingValue::as_score), Some(-2));
        assert_eq!(response.rating(1).and_then(RatingValue::as_score), None);
        assert_eq!(response.rating(3).and_then(RatingValue::as_score), Some(7));
        assert_eq!(serde_json::to_string(&response).unwrap(), raw);
    }

    #[test]
    fn oversized_integers_keep_their_digits() {
        let value: RatingValue = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(value, RatingValue::from("18446744073709551615"));
    }

    #[test]
    fn missing_slot_reads_as_none() {
        let response = Response::blank(1, 0);
        assert_eq!(response.rating(5), None);
        assert_eq!(response.open_answer(0), None);
    }
}
