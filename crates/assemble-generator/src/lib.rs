//! Assemble Generator Library
//!
//! Turns a manifest's targets into compiled, written output files.
//!
//! # Modules
//!
//! - [`assembly`] - Target registry, build orchestration and the route table
//! - [`target`] - Per-target compilation and output writing
//! - [`template`] - Handlebars render units
//! - [`assets`] - Static asset mirroring
//! - [`dirs`] - Directory context shared by all targets

pub mod assembly;
pub mod assets;
pub mod dirs;
pub mod error;
pub mod target;
pub mod template;

pub use assembly::{Assembly, AssemblyOptions, FailurePolicy, WriteStats};
pub use assets::AssetError;
pub use dirs::{STATIC_DIR, SiteDirs};
pub use error::{GenerateError, Result, TargetFailure};
pub use target::{Target, TargetState};
pub use template::{LAYOUT_TEMPLATE, RenderUnit};
