//! # Skabelon
//!
//! Renders files from Jinja templates. A dispatch script decides which
//! templates to render, with what context, and where each result goes.
//!
//! ```text
//! skabelon --templates ./templates --dispatch gen.py --dispatch-opt name:World
//! ```
//!
//! with `gen.py`:
//!
//! ```python
//! def dispatch(name="nobody"):
//!     yield "greeting.txt.j2", {"name": name}, "greeting.txt"
//! ```
//!
//! The crate is split the same way as the workspace:
//!
//! - [`cli`] / [`config`]: argument parsing and validation
//! - [`render`]: the render loop, generic over any
//!   [`TemplateEngine`](skabelon_render::TemplateEngine) and
//!   [`Dispatch`](skabelon_dispatch::Dispatch)
//! - [`run`]: wires a directory-backed engine to a script dispatcher

pub mod cli;
pub mod config;
mod error;
pub mod logging;
pub mod render;

use anyhow::Context;
use skabelon_dispatch::ScriptDispatcher;
use skabelon_render::MiniJinjaEngine;

pub use cli::Cli;
pub use config::{Config, ConfigError, Verbosity};
pub use error::SkabelonError;
pub use render::{render_all, render_one, RenderSummary};

/// Loads the dispatch script named in `config` and renders everything it yields.
pub fn run(config: &Config) -> anyhow::Result<RenderSummary> {
    let engine = MiniJinjaEngine::from_dir(&config.templates);

    let mut dispatcher = ScriptDispatcher::load(&config.dispatch)
        .with_context(|| format!("loading dispatch script {}", config.dispatch.display()))?;
    if let Some(command) = &config.interpreter {
        dispatcher = dispatcher.with_interpreter(command.clone())?;
    }

    let summary = render_all(&engine, &mut dispatcher, &config.options)?;
    tracing::info!(files = summary.written.len(), "done");
    Ok(summary)
}
