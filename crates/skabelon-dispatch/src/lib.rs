//! Dispatch extensions for skabelon.
//!
//! A dispatch extension decides which templates get rendered, with what
//! context, and into which files. It receives the user's `--dispatch-opt`
//! pairs as [`DispatchOptions`] and lazily yields [`RenderInstruction`]s.
//!
//! Two implementations of the [`Dispatch`] capability are provided:
//!
//! - [`ScriptDispatcher`]: runs an external script (Python, shell, Ruby,
//!   Perl or Node) and reads instructions from it line by line
//! - [`FnDispatcher`]: wraps an in-process closure
//!
//! This crate knows nothing about templates. Rendering the instructions is
//! the caller's job.

mod dispatch;
mod error;
mod instruction;
mod options;
pub mod script;

pub use dispatch::{Dispatch, FnDispatcher, Instructions};
pub use error::DispatchError;
pub use instruction::RenderInstruction;
pub use options::{parse_option, DispatchOptions, SEPARATOR};
pub use script::{ScriptDispatcher, ScriptKind};
