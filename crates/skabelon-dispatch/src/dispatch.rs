//! The dispatch capability.
//!
//! A dispatcher receives the [`DispatchOptions`] once and produces a lazy,
//! finite sequence of [`RenderInstruction`]s. Consumers pull instructions one
//! at a time; a dispatcher must not need the whole sequence materialized up
//! front, and must tolerate the consumer stopping early.

use crate::error::DispatchError;
use crate::instruction::RenderInstruction;
use crate::options::DispatchOptions;

/// A lazily produced sequence of render instructions.
pub type Instructions<'a> = Box<dyn Iterator<Item = Result<RenderInstruction, DispatchError>> + 'a>;

/// Something that decides which templates to render, with what data, and where.
pub trait Dispatch {
    /// Invokes the dispatch entry point with the given options.
    ///
    /// Errors returned here mean the entry point could not be invoked at all.
    /// Errors discovered while producing instructions are yielded by the
    /// returned iterator.
    fn dispatch(&mut self, options: &DispatchOptions) -> Result<Instructions<'_>, DispatchError>;
}

/// An in-process dispatcher backed by a closure.
///
/// This is the registered-callback form of [`Dispatch`], for embedding
/// skabelon as a library.
///
/// ```rust
/// use skabelon_dispatch::{Dispatch, DispatchOptions, FnDispatcher, RenderInstruction};
///
/// let mut dispatcher = FnDispatcher::new(|options: &DispatchOptions| {
///     let name = options.get("name").unwrap_or("World").to_string();
///     Ok(vec![RenderInstruction::with_value(
///         "t.tmpl",
///         serde_json::json!({ "name": name }),
///         "out.txt",
///     )])
/// });
///
/// let instructions: Vec<_> = dispatcher
///     .dispatch(&DispatchOptions::new())
///     .unwrap()
///     .collect();
/// assert_eq!(instructions.len(), 1);
/// ```
pub struct FnDispatcher<F> {
    f: F,
}

impl<F> FnDispatcher<F> {
    pub fn new<I>(f: F) -> Self
    where
        F: FnMut(&DispatchOptions) -> Result<I, DispatchError>,
    {
        Self { f }
    }
}

impl<F, I> Dispatch for FnDispatcher<F>
where
    F: FnMut(&DispatchOptions) -> Result<I, DispatchError>,
    I: IntoIterator<Item = RenderInstruction>,
    I::IntoIter: 'static,
{
    fn dispatch(&mut self, options: &DispatchOptions) -> Result<Instructions<'_>, DispatchError> {
        let instructions = (self.f)(options)?;
        Ok(Box::new(instructions.into_iter().map(Ok)))
    }
}
