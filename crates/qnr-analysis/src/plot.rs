//! Custom plot host
//!
//! A [`PlotScript`] turns a read-only [`PlotInput`] into a [`Figure`].
//! Scripts see the stored responses and question definitions but hold no
//! handle to the store, so running one can never change saved data.

use crate::aggregate::{mean_of_present, Aggregator};
use crate::figure::{Bar, BarChart, Figure};
use crate::transform::ScoreTransformer;
use qnr_model::{Questionnaire, RatingScale, Response};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Plot script failures
#[derive(Debug, Error)]
pub enum PlotError {
    /// No script registered under the name
    #[error("unknown plot script '{name}'")]
    UnknownScript {
        /// Requested name
        name: String,
    },

    /// Script needs saved responses and there are none
    #[error("plot script '{script}' has no saved responses to draw")]
    NoData {
        /// Script name
        script: String,
    },

    /// Script ran but could not produce a figure
    #[error("plot script '{script}' failed: {reason}")]
    Failed {
        /// Script name
        script: String,
        /// Failure description
        reason: String,
    },
}

/// Read-only view handed to plot scripts
#[derive(Debug, Clone, Copy)]
pub struct PlotInput<'a> {
    responses: &'a [Response],
    questionnaire: &'a Questionnaire,
}

impl<'a> PlotInput<'a> {
    /// Create input
    #[inline]
    #[must_use]
    pub fn new(responses: &'a [Response], questionnaire: &'a Questionnaire) -> Self {
        Self {
            responses,
            questionnaire,
        }
    }

    /// Every stored response, drafts included
    #[inline]
    #[must_use]
    pub fn responses(&self) -> &'a [Response] {
        self.responses
    }

    /// Responses with a participant id
    pub fn saved(&self) -> impl Iterator<Item = &'a Response> {
        self.responses.iter().filter(|response| !response.is_draft())
    }

    /// Active question definitions
    #[inline]
    #[must_use]
    pub fn questionnaire(&self) -> &'a Questionnaire {
        self.questionnaire
    }

    /// Active rating scale
    #[inline]
    #[must_use]
    pub fn scale(&self) -> RatingScale {
        self.questionnaire.scale
    }

    /// Score normalizer over the active questions
    #[inline]
    #[must_use]
    pub fn transformer(&self) -> ScoreTransformer<'a> {
        ScoreTransformer::new(self.questionnaire)
    }

    /// Aggregator over the active questions
    #[inline]
    #[must_use]
    pub fn aggregator(&self) -> Aggregator<'a> {
        Aggregator::new(self.questionnaire)
    }
}

/// A named figure generator
pub trait PlotScript {
    /// Registry name
    fn name(&self) -> &str;

    /// One-line description for listings
    fn description(&self) -> &str {
        ""
    }

    /// Produce a figure from `input`
    ///
    /// # Errors
    /// Any [`PlotError`] the script decides to report
    fn run(&self, input: &PlotInput<'_>) -> Result<Figure, PlotError>;
}

/// Bar chart of each participant's mean raw rating, in stored order
///
/// Ratings are averaged as stored, without reversing negative questions.
/// Participants with no numeric rating get no bar.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParticipantMeans;

impl ParticipantMeans {
    /// Registry name of this script
    pub const NAME: &'static str = "participant-means";
}

impl PlotScript for ParticipantMeans {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Average raw rating per participant"
    }

    fn run(&self, input: &PlotInput<'_>) -> Result<Figure, PlotError> {
        let bars: Vec<Bar> = input
            .saved()
            .map(|response| {
                let raw: Vec<Option<f64>> = response
                    .ratings
                    .values()
                    .map(ScoreTransformer::raw_value)
                    .collect();
                Bar {
                    label: response.participant_number.clone(),
                    value: mean_of_present(&raw),
                }
            })
            .collect();

        if bars.is_empty() {
            return Err(PlotError::NoData {
                script: Self::NAME.to_string(),
            });
        }

        Ok(Figure::Bar(BarChart {
            title: "Average ratings per participant".to_string(),
            x_label: "participant".to_string(),
            y_label: "average rating".to_string(),
            bars,
        }))
    }
}

/// Registry of plot scripts by name
#[derive(Default)]
pub struct PlotRegistry {
    scripts: BTreeMap<String, Box<dyn PlotScript>>,
}

impl fmt::Debug for PlotRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlotRegistry")
            .field("scripts", &self.names())
            .finish()
    }
}

impl PlotRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create registry with built-in scripts
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ParticipantMeans);
        registry
    }

    /// Register a script, replacing any script of the same name
    pub fn register<S: PlotScript + 'static>(&mut self, script: S) -> Option<Box<dyn PlotScript>> {
        self.scripts.insert(script.name().to_string(), Box::new(script))
    }

    /// Check if a script exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
    }

    /// Remove script
    pub fn remove(&mut self, name: &str) -> Option<Box<dyn PlotScript>> {
        self.scripts.remove(name)
    }

    /// Script by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn PlotScript> {
        self.scripts.get(name).map(AsRef::as_ref)
    }

    /// Registered names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.scripts.keys().map(String::as_str).collect()
    }

    /// Number of registered scripts
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    /// Run the script registered under `name`
    ///
    /// # Errors
    /// - `PlotError::UnknownScript` if nothing is registered under `name`
    /// - whatever the script itself reports
    pub fn run(&self, name: &str, input: &PlotInput<'_>) -> Result<Figure, PlotError> {
        let script = self.get(name).ok_or_else(|| PlotError::UnknownScript {
            name: name.to_string(),
        })?;
        tracing::debug!("Running plot script {}", name);
        script.run(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use qnr_model::{RatingQuestion, RatingValue};

    fn questionnaire() -> Questionnaire {
        Questionnaire::new(
            vec![RatingQuestion::new("q1"), RatingQuestion::negative("q2")],
            Vec::new(),
            RatingScale::default(),
        )
    }

    struct Fixed;

    impl PlotScript for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn run(&self, _input: &PlotInput<'_>) -> Result<Figure, PlotError> {
            Err(PlotError::Failed {
                script: "fixed".into(),
                reason: "no figure produced".into(),
            })
        }
    }

    #[test]
    fn defaults_include_participant_means() {
        let registry = PlotRegistry::with_defaults();
        assert!(registry.contains(ParticipantMeans::NAME));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn participant_means_uses_raw_values() {
        let q = questionnaire();
        let responses = vec![
            Response::new("b1", [RatingValue::Score(1), RatingValue::Score(5)], Vec::<String>::new()),
            Response::new("a1", [RatingValue::empty(), RatingValue::from("x")], Vec::<String>::new()),
            q.blank_response(),
        ];

        let figure = PlotRegistry::with_defaults()
            .run(ParticipantMeans::NAME, &PlotInput::new(&responses, &q))
            .unwrap();
        let Figure::Bar(chart) = figure else {
            panic!("expected bar chart");
        };
        assert_eq!(
            chart.bars,
            vec![
                Bar { label: "b1".into(), value: Some(3.0) },
                Bar { label: "a1".into(), value: None },
            ]
        );
    }

    #[test]
    fn participant_means_needs_saved_responses() {
        let q = questionnaire();
        let responses = vec![q.blank_response()];
        let err = ParticipantMeans.run(&PlotInput::new(&responses, &q)).unwrap_err();
        assert!(matches!(err, PlotError::NoData { .. }));
    }

    #[test]
    fn unknown_and_failing_scripts() {
        let q = questionnaire();
        let mut registry = PlotRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.register(Fixed).is_none());
        assert_eq!(registry.names(), vec!["fixed"]);

        let input = PlotInput::new(&[], &q);
        assert!(matches!(
            registry.run("missing", &input),
            Err(PlotError::UnknownScript { .. })
        ));
        assert_eq!(
            registry.run("fixed", &input).unwrap_err().to_string(),
            "plot script 'fixed' failed: no figure produced"
        );
        assert!(registry.remove("fixed").is_some());
    }
}
