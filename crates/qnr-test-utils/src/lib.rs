//! Testing utilities for the QNR workspace
//!
//! Shared fixtures: a sample questionnaire, matching responses, a response
//! builder and configuration documents.

#![allow(missing_docs)]

use qnr_model::{Questionnaire, RatingQuestion, RatingScale, RatingValue, Response};

/// Configuration with three rating questions (the second negative), one open
/// question and forced answers.
pub const SAMPLE_CONFIG_JSON: &str = r#"{
  "app_settings": {
    "window_title": "Installation Feedback",
    "window_size": "600x700",
    "participant_regex": "^[a-zA-Z]+\\d+$"
  },
  "rating_settings": {
    "default_rating_range": [1, 5],
    "force_ratings": true,
    "questions": [
      {"statement": "I quickly understood how to interact with the installation.", "is_negative": false},
      {"statement": "The installation was confusing.", "is_negative": true},
      {"statement": "I would recommend it to a friend.", "is_negative": false}
    ]
  },
  "open_questions_settings": {
    "questions": ["What did you like most?"]
  },
  "visualization_settings": {
    "plot_defaults": {"heatmap_colormap": "magma", "show_means_in_violin": true},
    "save_plot_formats": ["png", "pdf"]
  }
}"#;

/// Same questions as [`SAMPLE_CONFIG_JSON`]
pub fn sample_questionnaire() -> Questionnaire {
    Questionnaire::new(
        vec![
            RatingQuestion::new("I quickly understood how to interact with the installation."),
            RatingQuestion::negative("The installation was confusing."),
            RatingQuestion::new("I would recommend it to a friend."),
        ],
        vec!["What did you like most?".to_string()],
        RatingScale::new(1, 5),
    )
}

/// Four saved responses over groups `a` and `b`, stored out of key order
pub fn sample_responses() -> Vec<Response> {
    vec![
        ResponseBuilder::new("b2").score(4).score(2).score(5).open("colours").build(),
        ResponseBuilder::new("a10").score(2).score(4).score(1).open("sound").build(),
        ResponseBuilder::new("a2").score(5).score(1).score(5).open("everything").build(),
        ResponseBuilder::new("b1")
            .score(3)
            .rating(RatingValue::empty())
            .score(4)
            .open("")
            .build(),
    ]
}

/// Fluent builder for test responses
#[derive(Debug, Clone, Default)]
pub struct ResponseBuilder {
    participant: String,
    ratings: Vec<RatingValue>,
    open: Vec<String>,
}

impl ResponseBuilder {
    pub fn new(participant: &str) -> Self {
        Self {
            participant: participant.to_string(),
            ..Self::default()
        }
    }

    pub fn score(self, score: i64) -> Self {
        self.rating(RatingValue::Score(score))
    }

    pub fn rating(mut self, value: RatingValue) -> Self {
        self.ratings.push(value);
        self
    }

    pub fn open(mut self, answer: &str) -> Self {
        self.open.push(answer.to_string());
        self
    }

    pub fn build(self) -> Response {
        Response::new(self.participant, self.ratings, self.open)
    }
}
