//! Error taxonomy shared across the eos-plot workspace.
//!
//! Crate-specific failures (file access, style parsing, catalog loading)
//! carry their own error enums; these are the cross-cutting pipeline
//! failures that any stage can raise.

use thiserror::Error;

/// Result type alias using PlotError.
pub type PlotResult<T> = Result<T, PlotError>;

/// Cross-cutting pipeline errors.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Field contains no valid data: {0}")]
    NoValidData(String),

    #[error("Unexpected data shape for {variable}: {message}")]
    DataShape { variable: String, message: String },

    #[error("Missing geolocation: {0}")]
    MissingGeolocation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
