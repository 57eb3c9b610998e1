//! # Skabelon Render
//!
//! Template rendering for `skabelon`: resolves templates by name from a
//! template directory and renders them against a JSON context.
//!
//! ```rust,ignore
//! use skabelon_render::{MiniJinjaEngine, TemplateEngine};
//!
//! let engine = MiniJinjaEngine::from_dir("./templates");
//! let text = engine.render_named("readme.md.j2", &serde_json::json!({"name": "demo"}))?;
//! ```

pub mod engine;
pub mod error;

pub use engine::{MiniJinjaEngine, TemplateEngine};
pub use error::RenderError;
