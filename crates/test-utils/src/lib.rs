//! Shared test utilities for the eos-plot workspace.
//!
//! Synthetic fields and swaths for exercising resampling and rendering
//! without real product files.
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod generators;

pub use generators::*;
