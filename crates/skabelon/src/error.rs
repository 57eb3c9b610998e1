//! Errors raised by the render loop.

use std::io;
use std::path::PathBuf;

use skabelon_dispatch::DispatchError;
use skabelon_render::RenderError;

#[derive(Debug, thiserror::Error)]
pub enum SkabelonError {
    /// The dispatch extension could not be invoked or failed mid-sequence.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// A template could not be resolved or rendered.
    #[error("failed to render template `{template}` for {}", .output.display())]
    Render {
        template: String,
        output: PathBuf,
        #[source]
        source: RenderError,
    },

    /// Rendered text could not be written to its output file.
    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SkabelonError {
    /// The render error behind this failure, if any.
    pub fn render_error(&self) -> Option<&RenderError> {
        match self {
            SkabelonError::Render { source, .. } => Some(source),
            _ => None,
        }
    }
}
