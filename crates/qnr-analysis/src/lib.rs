//! QNR Analysis
//!
//! Turns stored questionnaire responses into numbers and figures.
//!
//! # Overview
//!
//! - **ScoreTransformer**: raw ratings → numbers, reversing negative questions
//! - **Aggregator**: per-group participant means and the slot × participant matrix
//! - **BoxStats**: quartiles, whiskers and outliers of a series
//! - **Figure**: serializable description of a box plot, heatmap or bar chart
//! - **PlotRegistry**: named [`PlotScript`]s run against a read-only [`PlotInput`]
//!
//! Missing values stay missing at every stage; they are never filled with zero.
//!
//! # Example
//!
//! ```rust
//! use qnr_analysis::{Aggregator, ScoreTransformer};
//! use qnr_model::{Questionnaire, RatingQuestion, RatingScale, RatingValue, Response};
//!
//! let questionnaire = Questionnaire::new(
//!     vec![RatingQuestion::new("clear"), RatingQuestion::negative("confusing")],
//!     Vec::new(),
//!     RatingScale::new(1, 5),
//! );
//! let response = Response::new(
//!     "a1",
//!     [RatingValue::Score(4), RatingValue::Score(2)],
//!     Vec::<String>::new(),
//! );
//!
//! let scores = ScoreTransformer::new(&questionnaire).normalize(&response);
//! assert_eq!(scores, vec![Some(4.0), Some(4.0)]);
//!
//! let groups = Aggregator::new(&questionnaire).group_scores(&[response]);
//! assert_eq!(groups[0].label, "a");
//! assert_eq!(groups[0].participants[0].mean, Some(4.0));
//! ```

#![warn(missing_docs)]

pub mod aggregate;
pub mod figure;
pub mod plot;
pub mod stats;
pub mod transform;

// Re-exports
pub use aggregate::{
    mean_of_present, Aggregator, GroupSeries, ParticipantMatrix, ParticipantMean, MALFORMED_GROUP,
};
pub use figure::{Bar, BarChart, BoxPlot, Figure, Heatmap, LabeledBox, DEFAULT_COLORMAP};
pub use plot::{ParticipantMeans, PlotError, PlotInput, PlotRegistry, PlotScript};
pub use stats::{quantile, BoxStats};
pub use transform::ScoreTransformer;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
