//! Target registry and build orchestration.
//!
//! An [`Assembly`] owns every [`Target`] together with the directory context
//! they are resolved against. Targets are compiled and written strictly in
//! registration order on the calling thread.

use std::{collections::BTreeMap, path::PathBuf, time::Instant};

use assemble_core::Manifest;
use tracing::{debug, info, warn};

use crate::{
    assets,
    dirs::SiteDirs,
    error::{GenerateError, Result, TargetFailure},
    target::Target,
};

/// What [`Assembly::compile`] does when a target fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failing target and return its error.
    Abort,
    /// Attempt every target, then report all failures together.
    #[default]
    Collect,
}

/// Assembly options. Only logging reacts to `verbose` and `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssemblyOptions {
    pub verbose: bool,
    pub debug: bool,
    pub failure_policy: FailurePolicy,
}

/// Statistics from [`Assembly::write_targets`].
#[derive(Debug, Clone, Default)]
pub struct WriteStats {
    /// Number of target files written.
    pub targets: usize,

    /// Number of asset files mirrored into the static directory.
    pub assets: usize,

    /// Duration in milliseconds.
    pub duration_ms: u64,
}

/// The set of targets making up a site.
#[derive(Debug)]
pub struct Assembly {
    dirs: SiteDirs,
    options: AssemblyOptions,
    targets: Vec<Target>,
}

impl Assembly {
    /// Create an assembly rooted at the current working directory.
    pub fn new(
        assets_dir: &str,
        template_dir: &str,
        output_dir: &str,
        options: AssemblyOptions,
    ) -> Result<Self> {
        let root = std::env::current_dir().map_err(GenerateError::Environment)?;
        Ok(Self::with_root(root, assets_dir, template_dir, output_dir, options))
    }

    /// Create an assembly rooted at an explicit directory.
    pub fn with_root(
        root: impl Into<PathBuf>,
        assets_dir: &str,
        template_dir: &str,
        output_dir: &str,
        options: AssemblyOptions,
    ) -> Self {
        let dirs = SiteDirs::new(root, assets_dir, template_dir, output_dir);

        debug!(
            root = %dirs.root().display(),
            assets_dir = %dirs.assets_dir().display(),
            template_dir = %dirs.template_dir().display(),
            output_dir = %dirs.output_dir().display(),
            "created assembly"
        );

        Self {
            dirs,
            options,
            targets: Vec::new(),
        }
    }

    /// Create an assembly from a manifest, rooted at the current working
    /// directory, with one target per manifest entry.
    pub fn from_manifest(manifest: &Manifest, options: AssemblyOptions) -> Result<Self> {
        let root = std::env::current_dir().map_err(GenerateError::Environment)?;
        Ok(Self::from_manifest_at(root, manifest, options))
    }

    /// Like [`Assembly::from_manifest`] with an explicit root.
    pub fn from_manifest_at(
        root: impl Into<PathBuf>,
        manifest: &Manifest,
        options: AssemblyOptions,
    ) -> Self {
        let mut assembly = Self::with_root(
            root,
            &manifest.assets_dir,
            &manifest.template_dir,
            &manifest.output_dir,
            options,
        );
        for (name, entry) in &manifest.targets {
            assembly.new_target(name.clone(), entry.path.clone(), entry.templates.clone());
        }
        assembly
    }

    /// Register a new target. Names and paths are not checked for uniqueness.
    pub fn new_target(
        &mut self,
        name: impl Into<String>,
        path: impl Into<String>,
        templates: Vec<String>,
    ) -> &Target {
        let index = self.targets.len();
        self.targets.push(Target::new(name, path, templates));
        &self.targets[index]
    }

    #[must_use]
    pub fn dirs(&self) -> &SiteDirs {
        &self.dirs
    }

    /// Registered targets, in registration order.
    #[must_use]
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Compile every target in registration order.
    pub fn compile(&mut self) -> Result<()> {
        let mut failures = Vec::new();

        for target in &mut self.targets {
            if let Err(error) = target.compile(&self.dirs) {
                warn!(name = target.name(), error = %error, "failed to compile target");
                match self.options.failure_policy {
                    FailurePolicy::Abort => return Err(error),
                    FailurePolicy::Collect => failures.push(TargetFailure {
                        target: target.name().to_string(),
                        error,
                    }),
                }
            }
        }

        if failures.is_empty() {
            info!(count = self.targets.len(), "compiled targets");
            Ok(())
        } else {
            Err(GenerateError::Compile { failures })
        }
    }

    /// Write every target, then mirror the assets directory into
    /// `<outputDir>/static`.
    ///
    /// Stops at the first failure; files already written stay in place.
    pub fn write_targets(&mut self) -> Result<WriteStats> {
        let start = Instant::now();
        let mut stats = WriteStats::default();

        for target in &mut self.targets {
            let dest = target.write_to_file(&self.dirs)?;
            if self.options.verbose {
                info!(name = target.name(), path = %dest.display(), "target written");
            }
            stats.targets += 1;
        }

        stats.assets = assets::copy_tree(&self.dirs.assets_path(), &self.dirs.static_path())?;
        stats.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            targets = stats.targets,
            assets = stats.assets,
            duration_ms = stats.duration_ms,
            "write complete"
        );

        Ok(stats)
    }

    /// Map each public path to its output filename.
    ///
    /// Later targets win when two share a path.
    #[must_use]
    pub fn routes(&self) -> BTreeMap<String, String> {
        self.targets
            .iter()
            .map(|t| (t.path().to_string(), t.name().to_string()))
            .collect()
    }

    /// One line per target, for diagnostics.
    #[must_use]
    pub fn describe(&self) -> Vec<String> {
        self.targets
            .iter()
            .map(|t| {
                format!(
                    "name={} path={} templates={:?} state={}",
                    t.name(),
                    t.path(),
                    t.templates(),
                    t.state()
                )
            })
            .collect()
    }
}
