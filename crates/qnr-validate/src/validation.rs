//! Validation of form input before it reaches the store
//!
//! [`Validator`] turns raw form strings into a [`Response`] or rejects them.
//! Validation always completes before any store mutation, so a rejected save
//! leaves the store untouched.

use qnr_model::{Questionnaire, RatingScale, RatingValue, Response};
use regex::Regex;
use std::fmt::{self, Display, Formatter};

/// Identifier pattern used when configuration does not provide one
pub const DEFAULT_PARTICIPANT_PATTERN: &str = r"^[a-zA-Z]+\d+$";

/// Save-time validator for one questionnaire configuration
///
/// Built once from the active [`Questionnaire`]; slot counts and scale are
/// fixed for its lifetime.
#[derive(Debug, Clone)]
pub struct Validator {
    participant_pattern: Regex,
    pattern_source: String,
    force_ratings: bool,
    rating_slots: usize,
    open_slots: usize,
    scale: RatingScale,
}

impl Validator {
    /// Create validator
    ///
    /// The pattern is matched from the start of the identifier only; add `$`
    /// to require a full match (the default pattern does).
    ///
    /// # Errors
    /// Returns `ValidationError::InvalidPattern` if `participant_pattern`
    /// does not compile.
    pub fn new(
        questionnaire: &Questionnaire,
        participant_pattern: &str,
        force_ratings: bool,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            participant_pattern: compile_participant_pattern(participant_pattern)?,
            pattern_source: participant_pattern.to_string(),
            force_ratings,
            rating_slots: questionnaire.rating_slots(),
            open_slots: questionnaire.open_slots(),
            scale: questionnaire.scale,
        })
    }

    /// Configured identifier pattern, as written
    #[inline]
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern_source
    }

    /// Whether every slot must be answered
    #[inline]
    #[must_use]
    pub fn force_ratings(&self) -> bool {
        self.force_ratings
    }

    /// Validate a full form submission
    ///
    /// Checks run in form order: identifier, slot counts, rating slots, open
    /// slots. The first failure is returned.
    ///
    /// # Errors
    /// - `InvalidParticipantId` if the trimmed identifier does not match
    /// - `SlotCountMismatch` if the input count differs from the configuration
    /// - `MissingRating` / `MissingOpenAnswer` for empty slots when forced
    /// - `RatingOutOfRange` for a numeric rating off the scale
    pub fn validate<R, O>(
        &self,
        candidate_id: &str,
        rating_inputs: &[R],
        open_inputs: &[O],
    ) -> Result<Response, ValidationError>
    where
        R: AsRef<str>,
        O: AsRef<str>,
    {
        let participant = self.check_participant_id(candidate_id)?;

        check_count(SlotKind::Rating, self.rating_slots, rating_inputs.len())?;
        check_count(SlotKind::Open, self.open_slots, open_inputs.len())?;

        let mut ratings = Vec::with_capacity(rating_inputs.len());
        for (i, input) in rating_inputs.iter().enumerate() {
            let value = RatingValue::from_input(input.as_ref());
            if self.force_ratings && value.is_empty() {
                return Err(ValidationError::MissingRating { slot: i + 1 });
            }
            if let RatingValue::Score(score) = value {
                if !self.scale.contains(score) {
                    return Err(ValidationError::RatingOutOfRange {
                        slot: i + 1,
                        value: score,
                        scale: self.scale,
                    });
                }
            }
            ratings.push(value);
        }

        let mut answers = Vec::with_capacity(open_inputs.len());
        for (i, input) in open_inputs.iter().enumerate() {
            let answer = input.as_ref().trim();
            if self.force_ratings && answer.is_empty() {
                return Err(ValidationError::MissingOpenAnswer { slot: i + 1 });
            }
            answers.push(answer.to_string());
        }

        Ok(Response::new(participant, ratings, answers))
    }

    /// Check identifier format, returning the trimmed identifier
    ///
    /// # Errors
    /// Returns `ValidationError::InvalidParticipantId` on mismatch.
    pub fn check_participant_id(&self, candidate_id: &str) -> Result<String, ValidationError> {
        let trimmed = candidate_id.trim();
        if trimmed.is_empty() || !self.participant_pattern.is_match(trimmed) {
            return Err(ValidationError::InvalidParticipantId {
                id: trimmed.to_string(),
            });
        }
        Ok(trimmed.to_string())
    }

    /// Check that no other response already uses `id`
    ///
    /// `editing` is the position being overwritten, which may keep its id.
    ///
    /// # Errors
    /// Returns `ValidationError::DuplicateParticipantId` on collision.
    pub fn check_unique(
        id: &str,
        existing: &[Response],
        editing: Option<usize>,
    ) -> Result<(), ValidationError> {
        let clash = existing
            .iter()
            .enumerate()
            .any(|(i, r)| Some(i) != editing && r.participant_number == id);

        if clash {
            return Err(ValidationError::DuplicateParticipantId { id: id.to_string() });
        }
        Ok(())
    }
}

/// Compile an identifier pattern the way [`Validator`] matches it
///
/// The pattern is anchored at the start of the identifier only.
///
/// # Errors
/// Returns `ValidationError::InvalidPattern` if the pattern does not compile.
pub fn compile_participant_pattern(pattern: &str) -> Result<Regex, ValidationError> {
    Regex::new(&format!("^(?:{pattern})")).map_err(|source| ValidationError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn check_count(kind: SlotKind, expected: usize, actual: usize) -> Result<(), ValidationError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ValidationError::SlotCountMismatch {
            kind,
            expected,
            actual,
        })
    }
}

/// Which family of slots an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Rating slots
    Rating,
    /// Open-answer slots
    Open,
}

impl Display for SlotKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rating => f.write_str("rating"),
            Self::Open => f.write_str("open answer"),
        }
    }
}

/// Validation errors with the offending field
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Identifier does not match the configured pattern
    #[error("invalid participant id '{id}' (e.g. 'a1', 'a2', 'b1')")]
    InvalidParticipantId {
        /// Trimmed identifier as entered
        id: String,
    },

    /// Identifier already used by another response
    #[error("participant id '{id}' is already used by another response")]
    DuplicateParticipantId {
        /// Trimmed identifier as entered
        id: String,
    },

    /// Empty rating while all ratings are required
    #[error("rating {slot} is not answered; please answer all rating questions")]
    MissingRating {
        /// 1-based slot number
        slot: usize,
    },

    /// Empty open answer while all answers are required
    #[error("open question {slot} is not answered; please fill all open questions")]
    MissingOpenAnswer {
        /// 1-based slot number
        slot: usize,
    },

    /// Numeric rating outside the configured scale
    #[error("rating {slot} is {value}, outside the scale {}-{}", .scale.start, .scale.end)]
    RatingOutOfRange {
        /// 1-based slot number
        slot: usize,
        /// Entered value
        value: i64,
        /// Active scale
        scale: RatingScale,
    },

    /// Form produced a different number of inputs than configured
    #[error("expected {expected} {kind} inputs, got {actual}")]
    SlotCountMismatch {
        /// Slot family
        kind: SlotKind,
        /// Configured slot count
        expected: usize,
        /// Inputs received
        actual: usize,
    },

    /// Configured identifier pattern is not a valid regular expression
    #[error("invalid participant pattern '{pattern}': {source}")]
    InvalidPattern {
        /// Pattern as configured
        pattern: String,
        /// Compilation failure
        #[source]
        source: regex::Error,
    },
}

impl ValidationError {
    /// Whether the operator can fix this by editing the form
    #[inline]
    #[must_use]
    pub fn is_user_correctable(&self) -> bool {
        !matches!(
            self,
            Self::InvalidPattern { .. } | Self::SlotCountMismatch { .. }
        )
    }

    /// Name of the offending form field
    #[must_use]
    pub fn field(&self) -> String {
        match self {
            Self::InvalidParticipantId { .. } | Self::DuplicateParticipantId { .. } => {
                "participant_number".to_string()
            }
            Self::MissingRating { slot } | Self::RatingOutOfRange { slot, .. } => {
                qnr_model::rating_key(slot - 1)
            }
            Self::MissingOpenAnswer { slot } => qnr_model::open_key(slot - 1),
            Self::SlotCountMismatch { kind: SlotKind::Rating, .. } => "ratings".to_string(),
            Self::SlotCountMismatch { kind: SlotKind::Open, .. } => "open_answers".to_string(),
            Self::InvalidPattern { .. } => "app_settings.participant_regex".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use qnr_model::RatingQuestion;

    fn questionnaire() -> Questionnaire {
        Questionnaire::new(
            vec![RatingQuestion::new("clear"), RatingQuestion::negative("confusing")],
            vec!["comments".to_string()],
            RatingScale::new(1, 5),
        )
    }

    fn forced() -> Validator {
        Validator::new(&questionnaire(), DEFAULT_PARTICIPANT_PATTERN, true).unwrap()
    }

    fn lenient() -> Validator {
        Validator::new(&questionnaire(), DEFAULT_PARTICIPANT_PATTERN, false).unwrap()
    }

    fn saved(id: &str) -> Response {
        Response {
            participant_number: id.to_string(),
            ..Response::default()
        }
    }

    #[test]
    fn accepts_complete_form() {
        let response = forced().validate(" a1 ", &["3", " 5"], &[" fine "]).unwrap();
        assert_eq!(response.participant_number, "a1");
        assert_eq!(response.rating(0), Some(&RatingValue::Score(3)));
        assert_eq!(response.rating(1), Some(&RatingValue::Score(5)));
        assert_eq!(response.open_answer(0), Some("fine"));
    }

    #[test]
    fn rejects_bad_participant_ids() {
        for id in ["", "  ", "1a", "a", "a1b", "a 1"] {
            let result = forced().validate(id, &["3", "3"], &["x"]);
            assert!(
                matches!(result, Err(ValidationError::InvalidParticipantId { .. })),
                "{id:?}"
            );
        }
    }

    #[test]
    fn forced_rejects_empty_rating() {
        let result = forced().validate("a1", &["3", "  "], &["x"]);
        assert!(matches!(result, Err(ValidationError::MissingRating { slot: 2 })));
    }

    #[test]
    fn forced_rejects_empty_open_answer() {
        let result = forced().validate("a1", &["3", "4"], &[" \n"]);
        assert!(matches!(result, Err(ValidationError::MissingOpenAnswer { slot: 1 })));
    }

    #[test]
    fn rating_checked_before_open_answers() {
        let result = forced().validate("a1", &["", "4"], &[""]);
        assert!(matches!(result, Err(ValidationError::MissingRating { slot: 1 })));
    }

    #[test]
    fn lenient_stores_empty_placeholders() {
        let response = lenient().validate("b2", &["", "2"], &[""]).unwrap();
        assert_eq!(response.rating(0), Some(&RatingValue::empty()));
        assert_eq!(response.open_answer(0), Some(""));
    }

    #[test]
    fn keeps_non_numeric_rating_text() {
        let response = lenient().validate("b2", &["n/a", "2"], &[""]).unwrap();
        assert_eq!(response.rating(0), Some(&RatingValue::from("n/a")));
    }

    #[test]
    fn rejects_out_of_range_score() {
        let result = lenient().validate("a1", &["6", "1"], &[""]);
        assert!(matches!(
            result,
            Err(ValidationError::RatingOutOfRange { slot: 1, value: 6, .. })
        ));
    }

    #[test]
    fn rejects_wrong_slot_count() {
        let result = lenient().validate("a1", &["1"], &[""]);
        assert!(matches!(
            result,
            Err(ValidationError::SlotCountMismatch {
                kind: SlotKind::Rating,
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn custom_pattern_is_prefix_matched() {
        let validator = Validator::new(&questionnaire(), r"P\d{3}", false).unwrap();
        assert!(validator.check_participant_id("P001").is_ok());
        assert!(validator.check_participant_id("P001-extra").is_ok());
        assert!(validator.check_participant_id("xP001").is_err());
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = Validator::new(&questionnaire(), "([a-z]+", false).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidPattern { .. }));
        assert!(!err.is_user_correctable());
    }

    #[test]
    fn duplicate_ids_detected_except_self() {
        let existing = vec![saved("a1"), saved("a2")];
        assert!(Validator::check_unique("a1", &existing, Some(0)).is_ok());
        assert!(matches!(
            Validator::check_unique("a1", &existing, Some(1)),
            Err(ValidationError::DuplicateParticipantId { .. })
        ));
        assert!(Validator::check_unique("a3", &existing, None).is_ok());
    }

    #[test]
    fn errors_name_their_field() {
        assert_eq!(ValidationError::MissingRating { slot: 2 }.field(), "rating_2");
        assert_eq!(ValidationError::MissingOpenAnswer { slot: 1 }.field(), "open_1");
        assert_eq!(
            ValidationError::InvalidParticipantId { id: String::new() }.field(),
            "participant_number"
        );
    }
}
