//! Command implementations.

pub mod build;
pub mod check;
pub mod watch;

use std::path::Path;

use assemble_core::Manifest;
use color_eyre::eyre::{Result, WrapErr};

/// Load the manifest, optionally layering `ASSEMBLE__*` environment overrides.
pub(crate) fn load_manifest(path: &Path, with_env: bool) -> Result<Manifest> {
    let manifest = if with_env {
        Manifest::load_with_env(path)
    } else {
        Manifest::load(path)
    };
    manifest.wrap_err_with(|| format!("failed to load {}", path.display()))
}
