//! Dispatch extensions loaded from script files.
//!
//! A [`ScriptDispatcher`] runs a dispatch script under its interpreter and
//! talks to it over pipes, one JSON document per line:
//!
//! ```text
//! skabelon -> script   {"name":"World"}                      options, once
//! script   -> skabelon ["t.tmpl", {"name": "World"}, "out.txt"]
//! skabelon -> script   next                                  after rendering
//! script   -> skabelon {"template": "u.tmpl", "context": {}, "output": "u.txt"}
//! skabelon -> script   next
//! script   -> skabelon <EOF>
//! ```
//!
//! The script's stderr is inherited. Python scripts are driven by a bundled
//! host that imports the module and iterates `dispatch(**options)`, so a
//! plain generator function is all a Python extension needs. Scripts of other
//! kinds speak the protocol themselves; they may ignore the `next` lines.
//!
//! Writes to the script's stdin go through a dedicated writer thread, so a
//! script that never reads stdin cannot stall the render loop once the pipe
//! buffer fills up.

use std::fmt;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Sender};
use std::thread;

use crate::dispatch::{Dispatch, Instructions};
use crate::error::DispatchError;
use crate::instruction::RenderInstruction;
use crate::options::DispatchOptions;

const PYTHON_HOST: &str = include_str!("host.py");

/// Exit code of the Python host when the module fails to import.
pub const HOST_EXIT_LOAD_FAILED: i32 = 3;

/// Exit code of the Python host when the module has no `dispatch` callable.
pub const HOST_EXIT_NO_ENTRY_POINT: i32 = 4;

/// Line written to the script after each instruction has been handled.
const ACK: &[u8] = b"next\n";

/// Languages a dispatch script can be written in, keyed by file suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    Python,
    Shell,
    Bash,
    Ruby,
    Perl,
    Node,
}

impl ScriptKind {
    pub const ALL: &'static [ScriptKind] = &[
        ScriptKind::Python,
        ScriptKind::Shell,
        ScriptKind::Bash,
        ScriptKind::Ruby,
        ScriptKind::Perl,
        ScriptKind::Node,
    ];

    pub fn suffix(&self) -> &'static str {
        match self {
            ScriptKind::Python => "py",
            ScriptKind::Shell => "sh",
            ScriptKind::Bash => "bash",
            ScriptKind::Ruby => "rb",
            ScriptKind::Perl => "pl",
            ScriptKind::Node => "js",
        }
    }

    pub fn default_interpreter(&self) -> &'static str {
        match self {
            ScriptKind::Python => "python3",
            ScriptKind::Shell => "sh",
            ScriptKind::Bash => "bash",
            ScriptKind::Ruby => "ruby",
            ScriptKind::Perl => "perl",
            ScriptKind::Node => "node",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.suffix() == suffix)
    }

    /// Detects the kind from any suffix of the file name.
    ///
    /// A `.py` suffix anywhere makes the script Python, so `gen.py`,
    /// `gen.py.in` and `gen.py.sh` all are. Otherwise the last recognized
    /// suffix wins. Leading dots belong to the stem: `.py` has no suffix.
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.trim_start_matches('.');
        let (_stem, suffixes) = name.split_once('.')?;
        if suffixes.split('.').any(|suffix| suffix == ScriptKind::Python.suffix()) {
            return Some(ScriptKind::Python);
        }
        suffixes.rsplit('.').find_map(Self::from_suffix)
    }

    /// Comma separated list of recognized suffixes, for error messages.
    pub fn supported_suffixes() -> String {
        Self::ALL
            .iter()
            .map(|kind| format!(".{}", kind.suffix()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScriptKind::Python => "python",
            ScriptKind::Shell => "sh",
            ScriptKind::Bash => "bash",
            ScriptKind::Ruby => "ruby",
            ScriptKind::Perl => "perl",
            ScriptKind::Node => "node",
        };
        f.write_str(name)
    }
}

/// A dispatch extension backed by a script file.
#[derive(Debug, Clone)]
pub struct ScriptDispatcher {
    script: PathBuf,
    kind: ScriptKind,
    program: PathBuf,
    program_args: Vec<String>,
}

impl ScriptDispatcher {
    /// Loads the script at `path` with the default interpreter for its kind.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DispatchError> {
        let script = path.as_ref().to_path_buf();
        if !script.is_file() {
            return Err(DispatchError::ScriptNotFound(script));
        }
        let kind = ScriptKind::detect(&script).ok_or_else(|| DispatchError::UnsupportedScript {
            script: script.clone(),
            supported: ScriptKind::supported_suffixes(),
        })?;
        let program = resolve_program(kind.default_interpreter())?;

        tracing::debug!(
            script = %script.display(),
            %kind,
            interpreter = %program.display(),
            "dispatch script loaded"
        );

        Ok(Self {
            script,
            kind,
            program,
            program_args: Vec::new(),
        })
    }

    /// Replaces the interpreter with a custom command line.
    ///
    /// The first element is the program, looked up on `PATH`; the rest are
    /// passed before the script arguments.
    pub fn with_interpreter(mut self, command: Vec<String>) -> Result<Self, DispatchError> {
        let mut parts = command.into_iter();
        let program = parts.next().ok_or(DispatchError::EmptyInterpreter)?;
        self.program = resolve_program(&program)?;
        self.program_args = parts.collect();
        tracing::debug!(interpreter = %self.program.display(), args = ?self.program_args, "interpreter overridden");
        Ok(self)
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    pub fn kind(&self) -> ScriptKind {
        self.kind
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.program_args);
        if self.kind == ScriptKind::Python {
            cmd.arg("-c").arg(PYTHON_HOST);
        }
        cmd.arg(&self.script);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        cmd
    }
}

impl Dispatch for ScriptDispatcher {
    fn dispatch(&mut self, options: &DispatchOptions) -> Result<Instructions<'_>, DispatchError> {
        let mut child = self.command().spawn().map_err(|source| DispatchError::Spawn {
            script: self.script.clone(),
            source,
        })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(DispatchError::Io(io::Error::other("dispatch script pipes unavailable")));
        };

        let writer = match StdinWriter::spawn(stdin) {
            Ok(writer) => writer,
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(err.into());
            }
        };

        let stream = ScriptStream {
            script: self.script.clone(),
            kind: self.kind,
            child,
            stdin: Some(writer),
            stdout: BufReader::new(stdout),
            line: 0,
            yielded: 0,
            done: false,
            reaped: false,
        };
        stream.send(format!("{}\n", options.to_json_line().map_err(io::Error::other)?).into_bytes());

        tracing::debug!(script = %self.script.display(), options = options.len(), "dispatch started");
        Ok(Box::new(stream))
    }
}

fn resolve_program(program: &str) -> Result<PathBuf, DispatchError> {
    which::which(program).map_err(|source| DispatchError::InterpreterNotFound {
        program: program.to_string(),
        source,
    })
}

/// Feeds the script's stdin from a background thread.
///
/// Lines are queued without blocking. The thread stops at the first failed
/// write, usually a closed pipe, and closes stdin once the writer is dropped
/// and the queue drained. It is never joined: a grandchild holding the pipe
/// open must not keep skabelon waiting.
struct StdinWriter {
    queue: Sender<Vec<u8>>,
}

impl StdinWriter {
    fn spawn(mut stdin: ChildStdin) -> io::Result<Self> {
        let (queue, lines) = mpsc::channel::<Vec<u8>>();
        thread::Builder::new()
            .name("skabelon-dispatch-stdin".into())
            .spawn(move || {
                for line in lines {
                    if let Err(err) = stdin.write_all(&line).and_then(|_| stdin.flush()) {
                        tracing::trace!(error = %err, "dispatch script stopped reading stdin");
                        break;
                    }
                }
            })?;
        Ok(Self { queue })
    }

    fn send(&self, line: Vec<u8>) {
        // Fails only once the thread gave up on a closed pipe.
        let _ = self.queue.send(line);
    }
}

/// Instructions read from a running dispatch script.
///
/// Dropping the stream before it is exhausted closes the script's stdin and
/// kills it.
struct ScriptStream {
    script: PathBuf,
    kind: ScriptKind,
    child: Child,
    stdin: Option<StdinWriter>,
    stdout: BufReader<ChildStdout>,
    line: usize,
    yielded: usize,
    done: bool,
    reaped: bool,
}

impl ScriptStream {
    /// Queues a line for the script's stdin. A script that stopped reading is
    /// not an error.
    fn send(&self, line: Vec<u8>) {
        if let Some(stdin) = &self.stdin {
            stdin.send(line);
        }
    }

    /// Waits for the script after EOF and maps its exit status.
    fn finish(&mut self) -> Result<(), DispatchError> {
        self.stdin = None;
        let status = self.child.wait()?;
        self.reaped = true;
        tracing::debug!(script = %self.script.display(), %status, instructions = self.yielded, "dispatch finished");
        self.check_status(status)
    }

    fn check_status(&self, status: ExitStatus) -> Result<(), DispatchError> {
        if status.success() {
            return Ok(());
        }
        if self.kind == ScriptKind::Python {
            match status.code() {
                Some(HOST_EXIT_LOAD_FAILED) => return Err(DispatchError::Load(self.script.clone())),
                Some(HOST_EXIT_NO_ENTRY_POINT) => {
                    return Err(DispatchError::MissingEntryPoint(self.script.clone()))
                }
                _ => {}
            }
        }
        Err(DispatchError::ScriptFailed {
            script: self.script.clone(),
            status,
        })
    }

    fn abort(&mut self) {
        self.done = true;
        self.stdin = None;
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
            self.reaped = true;
        }
    }
}

impl Iterator for ScriptStream {
    type Item = Result<RenderInstruction, DispatchError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.yielded > 0 {
            self.send(ACK.to_vec());
        }

        loop {
            let mut buf = String::new();
            match self.stdout.read_line(&mut buf) {
                Ok(0) => {
                    self.done = true;
                    return self.finish().err().map(Err);
                }
                Ok(_) => {
                    self.line += 1;
                    let text = buf.trim();
                    if text.is_empty() {
                        continue;
                    }
                    return match RenderInstruction::from_line(text) {
                        Ok(instruction) => {
                            self.yielded += 1;
                            tracing::trace!(line = self.line, template = %instruction.template, "instruction received");
                            Some(Ok(instruction))
                        }
                        Err(source) => {
                            self.abort();
                            Some(Err(DispatchError::Protocol {
                                line: self.line,
                                source,
                            }))
                        }
                    };
                }
                Err(err) => {
                    self.abort();
                    return Some(Err(err.into()));
                }
            }
        }
    }
}

impl Drop for ScriptStream {
    fn drop(&mut self) {
        self.abort();
    }
}
