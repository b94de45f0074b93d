//! Assemble Core Library
//!
//! Manifest model and error handling shared by the Assemble generator and CLI.

pub mod error;
pub mod manifest;

pub use error::{CoreError, Result};
pub use manifest::{
    DEFAULT_ASSETS_DIR, DEFAULT_MANIFEST, DEFAULT_OUTPUT_DIR, DEFAULT_TEMPLATE_DIR, Manifest,
    TargetEntry,
};
