//! Site manifest loading.
//!
//! A manifest names the asset, template and output directories and the set of
//! targets to build. Targets are kept in a `BTreeMap` so every walk over them
//! (template listing, registration, route table) runs in target-name order.

use std::{
    collections::{BTreeMap, HashSet},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Manifest file looked up when none is given on the command line.
pub const DEFAULT_MANIFEST: &str = "assemble.json";

/// Fallback for an empty `assetsDir`.
pub const DEFAULT_ASSETS_DIR: &str = "./public";

/// Fallback for an empty `templateDir`.
pub const DEFAULT_TEMPLATE_DIR: &str = "./templates";

/// Fallback for an empty `outputDir`.
pub const DEFAULT_OUTPUT_DIR: &str = "./public";

/// Declarative description of a site.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Directory mirrored into `<outputDir>/static`.
    #[serde(rename = "assetsDir", default)]
    pub assets_dir: String,

    /// Directory template fragments are resolved against.
    #[serde(rename = "templateDir", default)]
    pub template_dir: String,

    /// Directory compiled targets are written to.
    #[serde(rename = "outputDir", default)]
    pub output_dir: String,

    /// Targets keyed by output filename.
    #[serde(default)]
    pub targets: BTreeMap<String, TargetEntry>,
}

/// A single target declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEntry {
    /// Public route the compiled file is served on.
    pub path: String,

    /// Template fragment filenames, in resolution order.
    #[serde(default)]
    pub templates: Vec<String>,
}

impl Manifest {
    /// Load a manifest file.
    ///
    /// Files ending in `.toml` are decoded as TOML, everything else as JSON.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::not_found(path));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::not_found(path)
            } else {
                CoreError::Io(e)
            }
        })?;

        let manifest = if is_toml(path) {
            toml::from_str::<Manifest>(&content).map_err(|e| {
                CoreError::parse_with_source(path, "invalid TOML manifest", e)
            })?
        } else {
            serde_json::from_str::<Manifest>(&content).map_err(|e| {
                CoreError::parse_with_source(path, "invalid JSON manifest", e)
            })?
        };

        tracing::debug!(
            path = %path.display(),
            targets = manifest.targets.len(),
            "loaded manifest"
        );

        Ok(manifest.with_defaults())
    }

    /// Load a manifest file, then apply `ASSEMBLE__*` environment overrides.
    ///
    /// Only the directory fields can be overridden, for example
    /// `ASSEMBLE__OUTPUTDIR=dist` replaces `outputDir`.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let mut manifest = Self::load(path)?;

        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("ASSEMBLE").separator("__"))
            .build()?;
        let overrides: DirOverrides = settings.try_deserialize()?;
        overrides.apply(&mut manifest);

        Ok(manifest.with_defaults())
    }

    /// Decode a JSON manifest held in memory.
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str::<Manifest>(content)
            .map(Manifest::with_defaults)
            .map_err(|e| CoreError::parse_with_source("<memory>", "invalid JSON manifest", e))
    }

    /// Decode a TOML manifest held in memory.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str::<Manifest>(content)
            .map(Manifest::with_defaults)
            .map_err(|e| CoreError::parse_with_source("<memory>", "invalid TOML manifest", e))
    }

    /// Replace empty directory fields with their fallbacks.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        if self.assets_dir.is_empty() {
            self.assets_dir = DEFAULT_ASSETS_DIR.to_string();
        }
        if self.template_dir.is_empty() {
            self.template_dir = DEFAULT_TEMPLATE_DIR.to_string();
        }
        if self.output_dir.is_empty() {
            self.output_dir = DEFAULT_OUTPUT_DIR.to_string();
        }
        self
    }

    /// Absolute paths of every template fragment referenced by any target.
    ///
    /// Fragments are deduplicated by filename and listed in order of first
    /// occurrence, walking targets by name and fragments in declared order.
    pub fn all_templates(&self, root: &Path) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        let mut templates = Vec::new();

        for entry in self.targets.values() {
            for fragment in &entry.templates {
                if seen.insert(fragment.as_str()) {
                    templates.push(root.join(&self.template_dir).join(fragment));
                }
            }
        }

        templates
    }

    /// Referenced template fragments that do not exist on disk.
    pub fn missing_templates(&self, root: &Path) -> Vec<PathBuf> {
        self.all_templates(root)
            .into_iter()
            .filter(|path| !path.is_file())
            .collect()
    }

    /// Public paths claimed by more than one target, with the claiming targets.
    pub fn route_collisions(&self) -> Vec<(String, Vec<String>)> {
        let mut by_path: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for (name, entry) in &self.targets {
            by_path.entry(entry.path.as_str()).or_default().push(name.clone());
        }

        by_path
            .into_iter()
            .filter(|(_, names)| names.len() > 1)
            .map(|(path, names)| (path.to_string(), names))
            .collect()
    }
}

/// Directory overrides taken from the environment. Keys arrive lowercased.
#[derive(Debug, Default, Deserialize)]
struct DirOverrides {
    assetsdir: Option<String>,
    templatedir: Option<String>,
    outputdir: Option<String>,
}

impl DirOverrides {
    fn apply(self, manifest: &mut Manifest) {
        if let Some(dir) = self.assetsdir {
            tracing::debug!(%dir, "assetsDir overridden from environment");
            manifest.assets_dir = dir;
        }
        if let Some(dir) = self.templatedir {
            tracing::debug!(%dir, "templateDir overridden from environment");
            manifest.template_dir = dir;
        }
        if let Some(dir) = self.outputdir {
            tracing::debug!(%dir, "outputDir overridden from environment");
            manifest.output_dir = dir;
        }
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml")
}
