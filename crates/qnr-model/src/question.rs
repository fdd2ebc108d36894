//! Question definitions and the rating scale
//!
//! These are read-only inputs to the pipeline. A [`Questionnaire`] is built
//! once from configuration and handed to the validator, store and
//! transformer; slot counts are never inferred from stored data.

use crate::response::Response;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// A Likert-style rating question
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct RatingQuestion {
    /// Statement shown to the participant
    #[serde(default)]
    pub statement: String,

    /// Higher raw values mean a less favourable answer
    ///
    /// Only affects transformation; stored values are never rewritten.
    #[serde(default)]
    pub is_negative: bool,
}

impl RatingQuestion {
    /// Positively phrased question
    #[inline]
    #[must_use]
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            is_negative: false,
        }
    }

    /// Negatively phrased question
    #[inline]
    #[must_use]
    pub fn negative(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            is_negative: true,
        }
    }
}

/// Inclusive rating range, serialized as `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(i64, i64)", into = "(i64, i64)")]
pub struct RatingScale {
    /// Lowest selectable value
    pub start: i64,
    /// Highest selectable value
    pub end: i64,
}

impl RatingScale {
    /// Create scale `start..=end`
    #[inline]
    #[must_use]
    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Start does not exceed end
    #[inline]
    #[must_use]
    pub const fn is_well_formed(&self) -> bool {
        self.start <= self.end
    }

    /// Selectable values, in order
    #[inline]
    #[must_use]
    pub fn values(&self) -> RangeInclusive<i64> {
        self.start..=self.end
    }

    /// Whether a raw score lies on the scale
    #[inline]
    #[must_use]
    pub fn contains(&self, score: i64) -> bool {
        self.values().contains(&score)
    }

    /// Whether a transformed value lies on the scale
    #[inline]
    #[must_use]
    pub fn contains_value(&self, value: f64) -> bool {
        #[allow(clippy::cast_precision_loss)]
        let (lo, hi) = (self.start as f64, self.end as f64);
        value >= lo && value <= hi
    }

    /// Polarity inversion: `(end + 1) - value`
    ///
    /// For a scale starting at 1 this mirrors the value across the midpoint
    /// (`2` on `[1, 5]` becomes `4`). Applying it twice is the identity.
    #[inline]
    #[must_use]
    pub fn reflect(&self, value: f64) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let pivot = self.end as f64 + 1.0;
        pivot - value
    }
}

impl Default for RatingScale {
    fn default() -> Self {
        Self::new(1, 5)
    }
}

impl From<(i64, i64)> for RatingScale {
    fn from((start, end): (i64, i64)) -> Self {
        Self::new(start, end)
    }
}

impl From<RatingScale> for (i64, i64) {
    fn from(scale: RatingScale) -> Self {
        (scale.start, scale.end)
    }
}

/// The active question configuration
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Questionnaire {
    /// Rating questions, one per rating slot
    pub ratings: Vec<RatingQuestion>,
    /// Open questions, one per open slot
    pub open: Vec<String>,
    /// Scale shared by every rating question
    pub scale: RatingScale,
}

impl Questionnaire {
    /// Create questionnaire
    #[inline]
    #[must_use]
    pub fn new(ratings: Vec<RatingQuestion>, open: Vec<String>, scale: RatingScale) -> Self {
        Self {
            ratings,
            open,
            scale,
        }
    }

    /// Number of rating slots
    #[inline]
    #[must_use]
    pub fn rating_slots(&self) -> usize {
        self.ratings.len()
    }

    /// Number of open-answer slots
    #[inline]
    #[must_use]
    pub fn open_slots(&self) -> usize {
        self.open.len()
    }

    /// Response with every slot empty
    #[inline]
    #[must_use]
    pub fn blank_response(&self) -> Response {
        Response::blank(self.rating_slots(), self.open_slots())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflect_on_one_to_five() {
        let scale = RatingScale::new(1, 5);
        assert_eq!(scale.reflect(2.0), 4.0);
        assert_eq!(scale.reflect(1.0), 5.0);
        assert_eq!(scale.reflect(3.0), 3.0);
    }

    #[test]
    fn reflect_is_involution() {
        let scale = RatingScale::new(0, 10);
        for v in 0..=10 {
            let v = f64::from(v);
            assert_eq!(scale.reflect(scale.reflect(v)), v);
        }
    }

    #[test]
    fn contains_checks_bounds() {
        let scale = RatingScale::new(1, 7);
        assert!(scale.contains(1));
        assert!(scale.contains(7));
        assert!(!scale.contains(0));
        assert!(!scale.contains(8));
        assert!(!scale.contains(-1));
        assert!(!scale.contains(i64::MAX));
    }

    #[test]
    fn reflect_at_the_top_of_i64_does_not_overflow() {
        let scale = RatingScale::new(1, i64::MAX);
        #[allow(clippy::cast_precision_loss)]
        let end = i64::MAX as f64;
        assert_eq!(scale.reflect(end), 1.0);
    }

    #[test]
    fn scale_serializes_as_pair() {
        let scale: RatingScale = serde_json::from_str("[1, 7]").unwrap();
        assert_eq!(scale, RatingScale::new(1, 7));
        assert_eq!(serde_json::to_string(&scale).unwrap(), "[1,7]");
    }

    #[test]
    fn question_defaults_missing_fields() {
        let q: RatingQuestion = serde_json::from_str(r#"{"statement": "Easy to use"}"#).unwrap();
        assert!(!q.is_negative);
    }

    #[test]
    fn blank_response_matches_slot_counts() {
        let questionnaire = Questionnaire::new(
            vec![RatingQuestion::new("a"), RatingQuestion::negative("b")],
            vec!["why?".to_string()],
            RatingScale::default(),
        );
        let blank = questionnaire.blank_response();
        assert_eq!(blank.ratings.len(), 2);
        assert_eq!(blank.open_answers.len(), 1);
    }
}
