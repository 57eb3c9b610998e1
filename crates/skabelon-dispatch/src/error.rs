//! Error types for dispatch loading and execution.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

/// Errors that can occur while loading or running a dispatch extension.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// A `--dispatch-opt` token had no `:` separator.
    #[error("dispatch option `{0}` is not a colon separated KEY:VALUE pair")]
    InvalidOption(String),

    /// The dispatch script does not exist or is not a file.
    #[error("dispatch script {} does not exist", .0.display())]
    ScriptNotFound(PathBuf),

    /// The dispatch script's file name has no recognized suffix.
    #[error("dispatch script {} has no recognized suffix (expected one of: {supported})", .script.display())]
    UnsupportedScript { script: PathBuf, supported: String },

    /// The interpreter command was empty.
    #[error("interpreter command is empty")]
    EmptyInterpreter,

    /// The interpreter could not be found on `PATH`.
    #[error("interpreter `{program}` not found")]
    InterpreterNotFound {
        program: String,
        #[source]
        source: which::Error,
    },

    /// The interpreter process could not be started.
    #[error("failed to start dispatch script {}", .script.display())]
    Spawn {
        script: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The dispatch script could not be imported or executed.
    #[error("dispatch script {} could not be loaded", .0.display())]
    Load(PathBuf),

    /// The dispatch script loaded but defines no callable named `dispatch`.
    #[error("dispatch script {} has no callable named `dispatch`", .0.display())]
    MissingEntryPoint(PathBuf),

    /// The dispatch script exited unsuccessfully.
    #[error("dispatch script {} failed with {status}", .script.display())]
    ScriptFailed { script: PathBuf, status: ExitStatus },

    /// A line of dispatch output was not a render instruction.
    #[error("malformed render instruction on line {line} of dispatch output")]
    Protocol {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// I/O error on the pipes to the dispatch script.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error raised by an in-process dispatcher.
    #[error("{0}")]
    Other(String),
}

impl DispatchError {
    /// Create an error for in-process dispatchers.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
