//! Directory context shared by every target.

use std::path::{Path, PathBuf};

use assemble_core::{DEFAULT_ASSETS_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_TEMPLATE_DIR};

/// Name of the asset mirror directory inside the output directory.
pub const STATIC_DIR: &str = "static";

/// Resolved site directories.
///
/// `root` is captured once when the assembly is built; the configured
/// directories are kept as given and resolved against it on use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteDirs {
    root: PathBuf,
    assets_dir: PathBuf,
    template_dir: PathBuf,
    output_dir: PathBuf,
}

impl SiteDirs {
    /// Create a directory context, substituting defaults for empty values.
    pub fn new(
        root: impl Into<PathBuf>,
        assets_dir: &str,
        template_dir: &str,
        output_dir: &str,
    ) -> Self {
        Self {
            root: root.into(),
            assets_dir: PathBuf::from(or_default(assets_dir, DEFAULT_ASSETS_DIR)),
            template_dir: PathBuf::from(or_default(template_dir, DEFAULT_TEMPLATE_DIR)),
            output_dir: PathBuf::from(or_default(output_dir, DEFAULT_OUTPUT_DIR)),
        }
    }

    /// Directory every other path is resolved against.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Configured assets directory, as given.
    #[must_use]
    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    /// Configured template directory, as given.
    #[must_use]
    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    /// Configured output directory, as given.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    #[must_use]
    pub fn assets_path(&self) -> PathBuf {
        self.root.join(&self.assets_dir)
    }

    #[must_use]
    pub fn template_path(&self) -> PathBuf {
        self.root.join(&self.template_dir)
    }

    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.output_dir)
    }

    #[must_use]
    pub fn static_path(&self) -> PathBuf {
        self.output_path().join(STATIC_DIR)
    }

    /// Absolute path of a template fragment.
    #[must_use]
    pub fn resolve_template(&self, fragment: &str) -> PathBuf {
        self.template_path().join(fragment)
    }

    /// Absolute path of a target's output file.
    #[must_use]
    pub fn resolve_output(&self, name: &str) -> PathBuf {
        self.output_path().join(name)
    }
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() { default } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_empty_dirs() {
        let dirs = SiteDirs::new("/site", "", "", "");
        assert_eq!(dirs.assets_dir(), Path::new("./public"));
        assert_eq!(dirs.template_dir(), Path::new("./templates"));
        assert_eq!(dirs.output_dir(), Path::new("./public"));
    }

    #[test]
    fn test_resolution_against_root() {
        let dirs = SiteDirs::new("/site", "assets", "tpl", "out");
        assert_eq!(dirs.resolve_template("home.hbs"), PathBuf::from("/site/tpl/home.hbs"));
        assert_eq!(dirs.resolve_output("index.html"), PathBuf::from("/site/out/index.html"));
        assert_eq!(dirs.static_path(), PathBuf::from("/site/out/static"));
        assert_eq!(dirs.assets_path(), PathBuf::from("/site/assets"));
    }
}
