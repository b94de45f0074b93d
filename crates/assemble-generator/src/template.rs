//! Template compilation.
//!
//! A target's fragments are compiled into one [`RenderUnit`]: a Handlebars
//! registry holding every fragment under its file stem. Fragments pull each
//! other in as partials (`{{> home}}`), and the unit is rendered through the
//! fragment named [`LAYOUT_TEMPLATE`].

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use handlebars::Handlebars;
use tracing::trace;

use crate::error::{GenerateError, Result};

/// Name of the entry template every target must provide.
pub const LAYOUT_TEMPLATE: &str = "layout";

/// Compiled, in-memory form of a target's fragments.
#[derive(Debug)]
pub struct RenderUnit {
    name: String,
    registry: Handlebars<'static>,
}

impl RenderUnit {
    /// Compile the given fragment files into a unit called `name`.
    ///
    /// Every file is read and parsed before the unit is returned, so a missing
    /// or malformed fragment yields an error and no unit at all.
    pub fn compile(name: impl Into<String>, sources: &[PathBuf]) -> Result<Self> {
        let name = name.into();
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);

        for path in sources {
            let content =
                std::fs::read_to_string(path).map_err(|source| GenerateError::TemplateSource {
                    path: path.clone(),
                    source,
                })?;

            let template_name = template_name(path);
            registry
                .register_template_string(&template_name, content)
                .map_err(|e| GenerateError::TemplateSyntax {
                    path: path.clone(),
                    message: e.to_string(),
                })?;

            trace!(unit = %name, template = %template_name, path = %path.display(), "registered template");
        }

        Ok(Self { name, registry })
    }

    /// Unit name (the owning target's name).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a template with the given name was compiled into the unit.
    #[must_use]
    pub fn has_template(&self, name: &str) -> bool {
        self.registry.has_template(name)
    }

    /// Render `template` with an empty context, streaming into `writer`.
    pub fn render_to_write<W: Write>(&self, template: &str, writer: W) -> Result<()> {
        if !self.has_template(template) {
            return Err(GenerateError::TemplateNotFound {
                target: self.name.clone(),
                name: template.to_string(),
            });
        }

        self.registry
            .render_to_write(template, &(), writer)
            .map_err(|e| GenerateError::Render {
                target: self.name.clone(),
                message: e.to_string(),
            })
    }

    /// Render `template` with an empty context into a string.
    pub fn render_to_string(&self, template: &str) -> Result<String> {
        let mut buf = Vec::new();
        self.render_to_write(template, &mut buf)?;
        String::from_utf8(buf).map_err(|e| GenerateError::Render {
            target: self.name.clone(),
            message: e.to_string(),
        })
    }
}

/// Name a fragment is registered under: its file stem.
pub fn template_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
