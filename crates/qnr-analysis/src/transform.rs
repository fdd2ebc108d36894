//! Score normalization
//!
//! Turns stored raw ratings into numbers aligned with the configured
//! questions, reversing negatively worded questions.

use qnr_model::{Questionnaire, RatingValue, Response};

/// Normalizes stored rating rows against the active questions
#[derive(Debug, Clone, Copy)]
pub struct ScoreTransformer<'q> {
    questionnaire: &'q Questionnaire,
}

impl<'q> ScoreTransformer<'q> {
    /// Create transformer for `questionnaire`
    #[inline]
    #[must_use]
    pub fn new(questionnaire: &'q Questionnaire) -> Self {
        Self { questionnaire }
    }

    /// Questions this transformer normalizes against
    #[inline]
    #[must_use]
    pub fn questionnaire(&self) -> &'q Questionnaire {
        self.questionnaire
    }

    /// Numeric value of a raw rating
    ///
    /// Integers pass through with their sign, digit-only text is parsed and
    /// anything else is missing.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn raw_value(raw: &RatingValue) -> Option<f64> {
        raw.as_score().map(|score| score as f64)
    }

    /// One value per configured question, in question order
    ///
    /// Present values of negative questions are reflected on the scale. A
    /// question with no stored slot yields `None`.
    #[must_use]
    pub fn normalize(&self, response: &Response) -> Vec<Option<f64>> {
        let scale = self.questionnaire.scale;
        self.questionnaire
            .ratings
            .iter()
            .enumerate()
            .map(|(slot, question)| {
                let value = response.rating(slot).and_then(Self::raw_value)?;
                Some(if question.is_negative {
                    scale.reflect(value)
                } else {
                    value
                })
            })
            .collect()
    }
}
