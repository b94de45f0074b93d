//! Error types for target compilation and output generation.

use std::{fmt, path::PathBuf};

use thiserror::Error;

use crate::assets::AssetError;

/// Result type for generator operations.
pub type Result<T> = std::result::Result<T, GenerateError>;

/// Generator errors.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The working directory could not be determined.
    #[error("failed to get current working directory: {0}")]
    Environment(#[source] std::io::Error),

    /// A directory could not be created.
    #[error("check permissions as failed to mkdir {}", path.display())]
    Permission {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A template fragment could not be read.
    #[error("failed to read template {}: {source}", path.display())]
    TemplateSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A template fragment contains a syntax error.
    #[error("template syntax error in {}: {message}", path.display())]
    TemplateSyntax { path: PathBuf, message: String },

    /// The entry template is missing from a target's fragments.
    #[error("target {target:?} has no template named {name:?}")]
    TemplateNotFound { target: String, name: String },

    /// Rendering the entry template failed.
    #[error("failed to render target {target:?}: {message}")]
    Render { target: String, message: String },

    /// The output file could not be created or replaced.
    #[error("failed to create file {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// One or more targets failed to compile.
    #[error("{} target(s) failed to compile: {}", failures.len(), TargetNames(failures))]
    Compile { failures: Vec<TargetFailure> },

    /// Static asset mirroring failed.
    #[error("asset error: {0}")]
    Asset(#[from] AssetError),
}

impl GenerateError {
    /// Whether this error was caused by a missing file.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::TemplateSource { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            Self::Compile { failures } => failures.iter().all(|f| f.error.is_not_found()),
            _ => false,
        }
    }
}

/// A compile failure attributed to one target.
#[derive(Debug)]
pub struct TargetFailure {
    /// Name of the failed target.
    pub target: String,

    /// Why it failed.
    pub error: GenerateError,
}

impl fmt::Display for TargetFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.target, self.error)
    }
}

struct TargetNames<'a>(&'a [TargetFailure]);

impl fmt::Display for TargetNames<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&failure.target)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_error_names_path() {
        let err = GenerateError::Permission {
            path: PathBuf::from("/out/static"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/out/static"));
    }

    #[test]
    fn test_compile_error_lists_targets() {
        let err = GenerateError::Compile {
            failures: vec![
                TargetFailure {
                    target: "index.html".to_string(),
                    error: GenerateError::TemplateSyntax {
                        path: PathBuf::from("layout.hbs"),
                        message: "unclosed".to_string(),
                    },
                },
                TargetFailure {
                    target: "about.html".to_string(),
                    error: GenerateError::TemplateSource {
                        path: PathBuf::from("about.hbs"),
                        source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
                    },
                },
            ],
        };

        let msg = err.to_string();
        assert!(msg.starts_with("2 target(s) failed to compile"));
        assert!(msg.contains("index.html, about.html"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_is_not_found() {
        let err = GenerateError::TemplateSource {
            path: PathBuf::from("home.hbs"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.is_not_found());
    }
}
