//! Error types for QNR Core
//!
//! [`QnrError`] gathers the failures of every stage a session drives:
//! - Configuration loading (fatal at startup)
//! - Form validation (blocks the save, operator corrects the input)
//! - Persistence and export (reported with the file path, memory kept)
//! - Figure generation

use crate::config::ConfigError;
use qnr_analysis::PlotError;
use qnr_store::{ExportError, StoreError};
use qnr_validate::ValidationError;

/// Main QNR error type
#[derive(Debug, thiserror::Error)]
pub enum QnrError {
    /// Configuration could not be loaded or written
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Form input rejected
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Response list could not be persisted
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Export failed
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// Figure generation failed
    #[error("plot error: {0}")]
    Plot(#[from] PlotError),

    /// No saved response to draw
    #[error("no saved responses to visualize")]
    NothingToVisualize,

    /// No stored response carries this identifier
    #[error("no response for participant '{id}'")]
    UnknownParticipant { id: String },
}

impl QnrError {
    /// Check if the operator can fix this by changing input
    #[inline]
    #[must_use]
    pub fn is_user_correctable(&self) -> bool {
        match self {
            Self::Validation(err) => err.is_user_correctable(),
            Self::Config(ConfigError::BadSetting { .. })
            | Self::Plot(PlotError::UnknownScript { .. })
            | Self::NothingToVisualize
            | Self::UnknownParticipant { .. } => true,
            _ => false,
        }
    }

    /// Check if the session cannot start or continue
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Config(
                ConfigError::Missing { .. }
                    | ConfigError::Read { .. }
                    | ConfigError::Parse { .. }
                    | ConfigError::Invalid { .. }
            ) | Self::Validation(ValidationError::InvalidPattern { .. })
        )
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, QnrError>;
