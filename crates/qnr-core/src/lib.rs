//! QNR Core - questionnaire data-entry session
//!
//! Ties the pipeline together:
//! - Loads `config.json` with per-field fallback to defaults and edits it
//! - Builds the validator and question set from it
//! - Drives the response store through form actions (save, new, delete, navigate)
//! - Produces export files and figures from the stored responses
//!
//! # Example
//!
//! ```rust,no_run
//! use qnr_core::{AppConfig, FormInput, Session};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load(Path::new("config.json"))?;
//! let mut session = Session::open(config, "questionnaire_responses.json")?;
//!
//! session.save_current(&FormInput::new("a1", ["4", "2"], ["liked the sound"]))?;
//! println!("{}", session.box_plot()?);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod session;

// Re-exports for convenience
pub use config::{
    AppConfig, AppSettings, ConfigError, OpenQuestionsSettings, PlotDefaults, RatingSettings,
    VisualizationSettings, DEFAULT_CONFIG_FILE, SETTABLE_KEYS,
};
pub use error::{QnrError, Result};
pub use session::{FormInput, Session, SubmitTarget};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with QNR Core
    pub use crate::{AppConfig, FormInput, QnrError, Session, SubmitTarget};
    pub use qnr_analysis::Figure;
    pub use qnr_model::{Questionnaire, RatingQuestion, RatingScale, RatingValue, Response};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
