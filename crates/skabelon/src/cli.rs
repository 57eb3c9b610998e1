//! Command-line surface.
//!
//! Clap only parses here. Path and option validation happens afterwards in
//! [`Config::try_from`], so `--help` and `--version` succeed no matter what
//! else is on the command line. Validation failures are turned back into
//! clap errors so they print with usage text like any other argument error.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use crate::config::Config;

/// Render files from Jinja templates, driven by a dispatch script.
///
/// The dispatch script decides which templates to render, with what data,
/// and into which output files. Python scripts define a `dispatch(**options)`
/// generator yielding `(template, context, output)` triples; scripts in other
/// languages print one JSON `[template, context, output]` array per line.
#[derive(Debug, Parser)]
#[command(name = "skabelon", version)]
pub struct Cli {
    /// The directory to find the templates in
    #[arg(long, value_name = "DIR")]
    pub templates: PathBuf,

    /// The dispatch script for filling in the templates
    #[arg(long, value_name = "SCRIPT")]
    pub dispatch: PathBuf,

    /// KEY:VALUE pair passed to the dispatch script; can be used more than once
    #[arg(long = "dispatch-opt", value_name = "KEY:VALUE")]
    pub dispatch_opts: Vec<String>,

    /// Command used to run the dispatch script instead of the default
    /// interpreter for its suffix (e.g. "uv run python")
    #[arg(long, value_name = "CMD")]
    pub interpreter: Option<String>,

    /// Enable debugging output
    #[arg(short, long)]
    pub debug: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parses and validates the process arguments.
    pub fn parse_config() -> Result<Config, clap::Error> {
        Self::parse_config_from(std::env::args_os())
    }

    /// Parses and validates the given arguments (first item is the program name).
    pub fn parse_config_from<I, T>(args: I) -> Result<Config, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cli = Self::try_parse_from(args)?;
        Config::try_from(cli)
            .map_err(|err| Self::command().error(ErrorKind::ValueValidation, err))
    }
}
