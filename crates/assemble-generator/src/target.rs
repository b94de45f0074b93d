//! Build targets.
//!
//! A target is one output file: a name relative to the output directory, the
//! public route it is served on, and the fragments compiled to produce it.

use std::{
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::{
    dirs::SiteDirs,
    error::{GenerateError, Result},
    template::{LAYOUT_TEMPLATE, RenderUnit},
};

/// Lifecycle of a target. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetState {
    /// Registered, not compiled yet.
    #[default]
    Uninitialized,
    /// Fragments compiled into a render unit.
    Compiled,
    /// Output file written at least once.
    Written,
}

impl std::fmt::Display for TargetState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Uninitialized => "uninitialized",
            Self::Compiled => "compiled",
            Self::Written => "written",
        };
        f.write_str(s)
    }
}

/// A named output file and the fragments it is compiled from.
#[derive(Debug)]
pub struct Target {
    name: String,
    path: String,
    templates: Vec<String>,
    state: TargetState,
    unit: Option<RenderUnit>,
}

impl Target {
    /// Create an uncompiled target.
    pub fn new(name: impl Into<String>, path: impl Into<String>, templates: Vec<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            templates,
            state: TargetState::Uninitialized,
            unit: None,
        }
    }

    /// Output filename relative to the output directory.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Public route the output is served on.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Fragment filenames, in resolution order.
    #[must_use]
    pub fn templates(&self) -> &[String] {
        &self.templates
    }

    #[must_use]
    pub fn state(&self) -> TargetState {
        self.state
    }

    /// Compiled unit, if the target has been compiled.
    #[must_use]
    pub fn unit(&self) -> Option<&RenderUnit> {
        self.unit.as_ref()
    }

    /// Absolute paths of this target's fragments.
    pub fn resolved_templates(&self, dirs: &SiteDirs) -> Vec<PathBuf> {
        self.templates
            .iter()
            .map(|fragment| dirs.resolve_template(fragment))
            .collect()
    }

    /// Compile the target's fragments, replacing any previous unit.
    ///
    /// On failure the target keeps whatever unit and state it had before.
    pub fn compile(&mut self, dirs: &SiteDirs) -> Result<()> {
        let sources = self.resolved_templates(dirs);
        let unit = RenderUnit::compile(&self.name, &sources)?;

        debug!(name = %self.name, templates = sources.len(), "compiled target");

        self.unit = Some(unit);
        if self.state == TargetState::Uninitialized {
            self.state = TargetState::Compiled;
        }
        Ok(())
    }

    /// Render the target's layout into `<outputDir>/<name>`.
    ///
    /// Compiles first if needed. Output is streamed into a temporary file
    /// beside the destination and moved into place only once rendering
    /// succeeded, so a failed render leaves no partial file behind.
    pub fn write_to_file(&mut self, dirs: &SiteDirs) -> Result<PathBuf> {
        ensure_output_dirs(dirs)?;

        if self.unit.is_none() {
            self.compile(dirs)?;
        }
        let unit = self.unit.as_ref().ok_or_else(|| GenerateError::Render {
            target: self.name.clone(),
            message: "target has no compiled unit".to_string(),
        })?;

        if !unit.has_template(LAYOUT_TEMPLATE) {
            return Err(GenerateError::TemplateNotFound {
                target: self.name.clone(),
                name: LAYOUT_TEMPLATE.to_string(),
            });
        }

        let dest = dirs.resolve_output(&self.name);
        let parent = dest
            .parent()
            .map_or_else(|| dirs.output_path(), Path::to_path_buf);
        fs::create_dir_all(&parent).map_err(|source| GenerateError::Permission {
            path: parent.clone(),
            source,
        })?;

        let output_err = |source| GenerateError::Output {
            path: dest.clone(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(&parent).map_err(output_err)?;
        {
            let mut writer = BufWriter::new(&mut tmp);
            unit.render_to_write(LAYOUT_TEMPLATE, &mut writer)?;
            writer.flush().map_err(output_err)?;
        }
        set_readable(tmp.as_file()).map_err(output_err)?;
        tmp.persist(&dest).map_err(|e| output_err(e.error))?;

        self.state = TargetState::Written;
        info!(name = %self.name, path = %dest.display(), "wrote target");
        Ok(dest)
    }
}

/// Create the output directory and its `static` subdirectory if missing.
pub fn ensure_output_dirs(dirs: &SiteDirs) -> Result<()> {
    for dir in [dirs.output_path(), dirs.static_path()] {
        if !dir.is_dir() {
            create_private_dir(&dir)
                .map_err(|source| GenerateError::Permission { path: dir, source })?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn create_private_dir(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new().recursive(true).mode(0o700).create(path)
}

#[cfg(not(unix))]
fn create_private_dir(path: &Path) -> std::io::Result<()> {
    fs::create_dir_all(path)
}

// Temporary files are created 0600; published pages should be world-readable.
#[cfg(unix)]
fn set_readable(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_readable(_file: &fs::File) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn site(files: &[(&str, &str)]) -> (TempDir, SiteDirs) {
        let root = TempDir::new().unwrap();
        fs::create_dir_all(root.path().join("tpl")).unwrap();
        for (name, content) in files {
            fs::write(root.path().join("tpl").join(name), content).unwrap();
        }
        let dirs = SiteDirs::new(root.path(), "assets", "tpl", "out");
        (root, dirs)
    }

    fn templates(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_new_target_is_uninitialized() {
        let target = Target::new("index.html", "/", templates(&["layout.hbs"]));
        assert_eq!(target.state(), TargetState::Uninitialized);
        assert!(target.unit().is_none());
        assert_eq!(target.path(), "/");
    }

    #[test]
    fn test_resolved_templates() {
        let dirs = SiteDirs::new("/site", "", "tpl", "");
        let target = Target::new("a", "/a", templates(&["layout.hbs", "a.hbs"]));
        assert_eq!(
            target.resolved_templates(&dirs),
            vec![
                PathBuf::from("/site/tpl/layout.hbs"),
                PathBuf::from("/site/tpl/a.hbs")
            ]
        );
    }

    #[test]
    fn test_compile_advances_state() {
        let (_root, dirs) = site(&[("layout.hbs", "hi")]);
        let mut target = Target::new("index.html", "/", templates(&["layout.hbs"]));

        target.compile(&dirs).unwrap();

        assert_eq!(target.state(), TargetState::Compiled);
        assert_eq!(target.unit().unwrap().name(), "index.html");
    }

    #[test]
    fn test_failed_compile_keeps_previous_unit() {
        let (root, dirs) = site(&[("layout.hbs", "v1")]);
        let mut target = Target::new("index.html", "/", templates(&["layout.hbs"]));
        target.compile(&dirs).unwrap();

        fs::write(root.path().join("tpl/layout.hbs"), "{{#each}}").unwrap();
        assert!(target.compile(&dirs).is_err());

        let unit = target.unit().unwrap();
        assert_eq!(unit.render_to_string(LAYOUT_TEMPLATE).unwrap(), "v1");
    }

    #[test]
    fn test_write_compiles_lazily() {
        let (root, dirs) = site(&[("layout.hbs", "<p>{{> body}}</p>"), ("body.hbs", "ok")]);
        let mut target = Target::new("index.html", "/", templates(&["layout.hbs", "body.hbs"]));

        let dest = target.write_to_file(&dirs).unwrap();

        assert_eq!(dest, root.path().join("out/index.html"));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "<p>ok</p>");
        assert_eq!(target.state(), TargetState::Written);
        assert!(root.path().join("out/static").is_dir());
    }

    #[test]
    fn test_write_without_layout_leaves_no_file() {
        let (root, dirs) = site(&[("home.hbs", "home")]);
        let mut target = Target::new("index.html", "/", templates(&["home.hbs"]));

        let err = target.write_to_file(&dirs).unwrap_err();

        assert!(matches!(err, GenerateError::TemplateNotFound { .. }));
        assert!(!root.path().join("out/index.html").exists());
        assert_eq!(target.state(), TargetState::Compiled);
    }

    #[test]
    fn test_failed_render_leaves_no_partial_file() {
        let (root, dirs) = site(&[("layout.hbs", "start {{> missing}} end")]);
        let mut target = Target::new("index.html", "/", templates(&["layout.hbs"]));

        assert!(target.write_to_file(&dirs).is_err());

        let leftovers: Vec<_> = fs::read_dir(root.path().join("out"))
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_file())
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_write_missing_fragment_fails_before_output() {
        let (root, dirs) = site(&[("layout.hbs", "x")]);
        let mut target = Target::new("index.html", "/", templates(&["layout.hbs", "nope.hbs"]));

        let err = target.write_to_file(&dirs).unwrap_err();

        assert!(err.is_not_found());
        assert!(!root.path().join("out/index.html").exists());
        assert_eq!(target.state(), TargetState::Uninitialized);
    }

    #[test]
    fn test_blocked_output_dir_is_permission_error() {
        let (root, dirs) = site(&[("layout.hbs", "x")]);
        fs::write(root.path().join("out"), "not a directory").unwrap();
        let mut target = Target::new("index.html", "/", templates(&["layout.hbs"]));

        let err = target.write_to_file(&dirs).unwrap_err();

        match err {
            GenerateError::Permission { path, .. } => assert!(path.ends_with("out")),
            other => panic!("expected permission error, got {other:?}"),
        }
        assert_eq!(target.state(), TargetState::Uninitialized);
    }

    #[test]
    fn test_write_nested_name() {
        let (root, dirs) = site(&[("layout.hbs", "post")]);
        let mut target = Target::new("blog/index.html", "/blog", templates(&["layout.hbs"]));

        target.write_to_file(&dirs).unwrap();
        assert!(root.path().join("out/blog/index.html").is_file());
    }

    #[test]
    fn test_rewrite_replaces_existing_file() {
        let (root, dirs) = site(&[("layout.hbs", "fresh")]);
        fs::create_dir_all(root.path().join("out")).unwrap();
        fs::write(root.path().join("out/index.html"), "stale content that is longer").unwrap();

        let mut target = Target::new("index.html", "/", templates(&["layout.hbs"]));
        target.write_to_file(&dirs).unwrap();

        assert_eq!(
            fs::read_to_string(root.path().join("out/index.html")).unwrap(),
            "fresh"
        );
    }
}
