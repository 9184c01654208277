//! Error types for catalog loading.

use thiserror::Error;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Error types for loading and validating the product table.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid product definition in {path}: {message}")]
    Invalid { path: String, message: String },

    #[error("Duplicate product id '{id}' in {path}")]
    Duplicate { id: String, path: String },

    #[error("No product definitions found under {0}")]
    NoProducts(String),
}
