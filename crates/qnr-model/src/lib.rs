//! QNR Data Model
//!
//! Questionnaire responses, question definitions and participant ordering.
//!
//! # Overview
//!
//! - **Response**: one participant submission with rating and open-answer slots
//! - **RatingValue**: raw stored rating (integer, empty placeholder or text)
//! - **ParticipantKey**: derived `(group, number)` sort key for identifiers
//! - **Questionnaire**: the active rating/open questions and rating scale
//!
//! # Example
//!
//! ```rust
//! use qnr_model::{sort_participants, RatingValue, Response};
//!
//! let response = Response::new("a1", [RatingValue::Score(4)], ["ok".to_string()]);
//! assert_eq!(response.rating(0), Some(&RatingValue::Score(4)));
//!
//! let mut ids = vec!["b2", "a10", "a2"];
//! sort_participants(&mut ids);
//! assert_eq!(ids, ["a2", "a10", "b2"]);
//! ```

#![warn(missing_docs)]

pub mod participant;
pub mod question;
pub mod response;

// Re-exports
pub use participant::{sort_participants, ParticipantKey, ParticipantNumber};
pub use question::{Questionnaire, RatingQuestion, RatingScale};
pub use response::{open_key, rating_key, RatingValue, Response};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with responses
    pub use crate::{
        ParticipantKey, Questionnaire, RatingQuestion, RatingScale, RatingValue, Response,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
