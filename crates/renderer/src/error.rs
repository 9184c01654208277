//! Error types for rendering.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Error types for style loading and plot rendering.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse style file: {0}")]
    StyleParse(#[from] serde_json::Error),

    #[error("Style '{0}' not found in style file")]
    StyleNotFound(String),

    #[error("Style '{style}' is unusable: {message}")]
    BadStyle { style: String, message: String },

    #[error("Invalid overlay geometry: {0}")]
    BadOverlay(String),

    #[error("Canvas allocation failed for {width}x{height}")]
    CanvasSize { width: usize, height: usize },

    #[error("PNG encoding failed: {0}")]
    PngEncode(String),

    #[error("Nothing to draw: {0}")]
    EmptyPlot(String),
}
