//! Error types for scientific file reading.

use thiserror::Error;

/// Result type for reader operations.
pub type ReadResult<T> = Result<T, ReadError>;

/// Error types for file access and decoding.
#[derive(Error, Debug)]
pub enum ReadError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file's magic bytes match no supported container
    #[error("Unrecognized file format: {0}")]
    UnknownFormat(String),

    /// The library could not open the file
    #[error("Failed to open {path}: {message}")]
    Open { path: String, message: String },

    /// Missing required variable
    #[error("Missing variable: {0}")]
    MissingVariable(String),

    /// Variable exists but could not be read
    #[error("Failed to read {variable}: {message}")]
    VariableRead { variable: String, message: String },

    /// Array shape does not match what the operation needs
    #[error("Unexpected shape for {variable}: {message}")]
    Shape { variable: String, message: String },
}
