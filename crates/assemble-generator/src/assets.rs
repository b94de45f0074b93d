//! Static asset mirroring.
//!
//! Copies the assets directory tree into the `static` directory under the
//! output directory, overwriting files that already exist.

use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Asset processing errors.
#[derive(Debug, Error)]
pub enum AssetError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory walk error.
    #[error("failed to walk {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Invalid asset path.
    #[error("invalid asset path: {0}")]
    InvalidPath(PathBuf),
}

/// Result type for asset operations.
pub type Result<T> = std::result::Result<T, AssetError>;

/// Recursively copy `source_dir` into `dest_dir`, returning the number of
/// files copied.
///
/// A missing source directory copies nothing. When `dest_dir` lies inside
/// `source_dir` (assets and output share a directory) it is skipped.
pub fn copy_tree(source_dir: &Path, dest_dir: &Path) -> Result<usize> {
    info!(
        source = %source_dir.display(),
        dest = %dest_dir.display(),
        "copying assets"
    );

    if !source_dir.exists() {
        debug!("source directory does not exist, skipping");
        return Ok(0);
    }

    fs::create_dir_all(dest_dir)?;
    let dest_canonical = fs::canonicalize(dest_dir)?;

    let mut count = 0;
    let walker = WalkDir::new(source_dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| !is_same_dir(entry, &dest_canonical));

    for entry in walker {
        let entry = entry.map_err(|source| AssetError::Walk {
            path: source_dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();

        let relative = path
            .strip_prefix(source_dir)
            .map_err(|_| AssetError::InvalidPath(path.to_path_buf()))?;
        let dest_path = dest_dir.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest_path)?;
        } else {
            if let Some(parent) = dest_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest_path)?;
            count += 1;

            debug!(
                src = %path.display(),
                dest = %dest_path.display(),
                "copied asset"
            );
        }
    }

    info!(count, "assets copied");
    Ok(count)
}

/// Whether `entry` is the directory at `canonical`, however it is spelled.
fn is_same_dir(entry: &walkdir::DirEntry, canonical: &Path) -> bool {
    entry.file_type().is_dir()
        && fs::canonicalize(entry.path()).is_ok_and(|path| path == canonical)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_copy_tree_recursive() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();

        fs::create_dir_all(source.path().join("css/vendor")).unwrap();
        fs::write(source.path().join("favicon.ico"), b"ico").unwrap();
        fs::write(source.path().join("css/site.css"), "body {}").unwrap();
        fs::write(source.path().join("css/vendor/reset.css"), "* {}").unwrap();

        let target = dest.path().join("static");
        let count = copy_tree(source.path(), &target).unwrap();

        assert_eq!(count, 3);
        assert!(target.join("favicon.ico").exists());
        assert_eq!(
            fs::read_to_string(target.join("css/vendor/reset.css")).unwrap(),
            "* {}"
        );
    }

    #[test]
    fn test_copy_tree_overwrites() {
        let source = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();

        fs::write(source.path().join("app.js"), "new").unwrap();
        fs::write(dest.path().join("app.js"), "old").unwrap();

        copy_tree(source.path(), dest.path()).unwrap();
        assert_eq!(fs::read_to_string(dest.path().join("app.js")).unwrap(), "new");
    }

    #[test]
    fn test_copy_tree_missing_source() {
        let dest = TempDir::new().unwrap();
        let count = copy_tree(Path::new("/nonexistent/assets"), dest.path()).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_copy_tree_skips_nested_destination() {
        let site = TempDir::new().unwrap();
        fs::write(site.path().join("logo.svg"), "<svg/>").unwrap();

        let static_dir = site.path().join("static");
        fs::create_dir_all(&static_dir).unwrap();
        fs::write(static_dir.join("stale.txt"), "x").unwrap();

        let count = copy_tree(site.path(), &static_dir).unwrap();

        assert_eq!(count, 1);
        assert!(static_dir.join("logo.svg").exists());
        assert!(!static_dir.join("static").exists());
    }

    #[test]
    fn test_copy_tree_skips_destination_spelled_with_parent_dir() {
        let site = TempDir::new().unwrap();
        let public = site.path().join("public");
        fs::create_dir_all(&public).unwrap();
        fs::write(public.join("robots.txt"), "User-agent: *").unwrap();

        let dest = site.path().join("public/../public/static");
        let count = copy_tree(&public, &dest).unwrap();

        assert_eq!(count, 1);
        assert!(public.join("static/robots.txt").is_file());
        assert!(!public.join("static/static").exists());
    }
}
