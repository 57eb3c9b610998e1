//! Template engine abstraction.
//!
//! This module defines the [`TemplateEngine`] trait, the seam between the
//! render loop and the template backend. The default implementation is
//! [`MiniJinjaEngine`], which resolves template names against a directory on
//! disk.

use std::path::Path;

use minijinja::{AutoEscape, Environment, UndefinedBehavior, Value};

use crate::error::RenderError;

/// A template engine that can render named templates with data.
///
/// Template engines handle:
/// - Template lookup by name
/// - Template compilation and caching
/// - Variable substitution and template logic
pub trait TemplateEngine: Send + Sync {
    /// Adds a named template to the engine.
    ///
    /// Added templates take precedence over templates found through the
    /// engine's loader.
    fn add_template(&mut self, name: &str, source: &str) -> Result<(), RenderError>;

    /// Resolves a template by name and renders it.
    ///
    /// Fails with [`RenderError::TemplateNotFound`] if the name does not
    /// resolve to a template.
    fn render_named(&self, name: &str, data: &serde_json::Value) -> Result<String, RenderError>;
}

/// MiniJinja-based template engine.
///
/// Configured to behave like a plain Jinja2 `Environment` with a
/// `FileSystemLoader`, except that undefined variables are errors:
///
/// - Template names are paths relative to the template directory
///   (`"t.tmpl"`, `"partials/header.j2"`); names escaping the directory
///   do not resolve
/// - No auto-escaping, whatever the template's extension
/// - A single trailing newline is stripped from the rendered output
/// - Using an undefined variable fails the render
///
/// # Example
///
/// ```rust
/// use skabelon_render::{MiniJinjaEngine, TemplateEngine};
/// use serde_json::json;
///
/// let mut engine = MiniJinjaEngine::new();
/// engine.add_template("greeting", "Hello, {{ name }}!").unwrap();
/// let output = engine
///     .render_named("greeting", &json!({"name": "World"}))
///     .unwrap();
/// assert_eq!(output, "Hello, World!");
/// ```
pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    /// Creates an engine without a template directory.
    ///
    /// Only templates added with [`add_template`](TemplateEngine::add_template)
    /// resolve by name.
    pub fn new() -> Self {
        let mut env = Environment::new();
        configure(&mut env);
        Self { env }
    }

    /// Creates an engine that loads templates from `dir`.
    ///
    /// Templates are read lazily on first use and cached afterwards.
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let mut engine = Self::new();
        engine.env.set_loader(minijinja::path_loader(dir));
        tracing::debug!(template_dir = %dir.display(), "template loader configured");
        engine
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn add_template(&mut self, name: &str, source: &str) -> Result<(), RenderError> {
        self.env
            .add_template_owned(name.to_string(), source.to_string())?;
        Ok(())
    }

    fn render_named(&self, name: &str, data: &serde_json::Value) -> Result<String, RenderError> {
        let tmpl = self.env.get_template(name)?;
        let value = Value::from_serialize(data);
        Ok(tmpl.render(value)?)
    }
}

fn configure(env: &mut Environment<'static>) {
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_auto_escape_callback(|_name| AutoEscape::None);
    env.set_keep_trailing_newline(false);
}
