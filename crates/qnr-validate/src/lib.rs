//! QNR Validation
//!
//! Save-time validation of questionnaire form input.
//!
//! # Overview
//!
//! - **Validator**: identifier pattern, required-field policy, scale bounds
//! - **ValidationError**: user-correctable failures naming the offending field
//!
//! # Example
//!
//! ```rust
//! use qnr_model::{Questionnaire, RatingQuestion, RatingScale};
//! use qnr_validate::{Validator, ValidationError, DEFAULT_PARTICIPANT_PATTERN};
//!
//! let questionnaire = Questionnaire::new(
//!     vec![RatingQuestion::new("The controls were clear")],
//!     vec![],
//!     RatingScale::new(1, 5),
//! );
//! let validator = Validator::new(&questionnaire, DEFAULT_PARTICIPANT_PATTERN, true).unwrap();
//!
//! assert!(validator.validate("a1", &["4"], &[] as &[&str]).is_ok());
//! assert!(matches!(
//!     validator.validate("a1", &[""], &[] as &[&str]),
//!     Err(ValidationError::MissingRating { slot: 1 })
//! ));
//! ```

#![warn(missing_docs)]

pub mod validation;

// Re-exports
pub use validation::{
    compile_participant_pattern, SlotKind, ValidationError, Validator, DEFAULT_PARTICIPANT_PATTERN,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
