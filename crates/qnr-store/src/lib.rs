//! QNR Response Store
//!
//! Owns the response list, its backing JSON file and the edit cursor.
//!
//! # Overview
//!
//! - [`ResponseStore`]: load/save, create/update/delete, cursor navigation
//! - [`export`]: delimited-table and plain-text renderings
//! - Errors: [`StoreError`] (writes), [`StoreLoadError`] (reads, recoverable),
//!   [`ExportError`]
//!
//! # Example
//!
//! ```rust,no_run
//! use qnr_store::ResponseStore;
//!
//! # fn example() -> Result<(), qnr_store::StoreError> {
//! let mut store = ResponseStore::open("questionnaire_responses.json", 5, 2)?;
//! let index = store.create_blank(5, 2)?;
//! assert_eq!(store.cursor(), index);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod export;
pub mod store;

// Re-exports
pub use error::{ExportError, StoreError, StoreLoadError, StoreResult};
pub use export::{export_to_path, render_csv, render_text, ExportFormat};
pub use store::{DeleteOutcome, ResponseStore};

/// Default backing file name
pub const DEFAULT_RESPONSES_FILE: &str = "questionnaire_responses.json";

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
