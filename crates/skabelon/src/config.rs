//! Validated run configuration.
//!
//! [`Config`] is what the rest of the program sees: paths that have been
//! checked, dispatch options already split into key/value pairs, and the
//! requested [`Verbosity`]. Nothing here is global; the value is passed to
//! whatever needs it.

use std::path::PathBuf;

use skabelon_dispatch::{DispatchError, DispatchOptions, ScriptKind};

use crate::cli::Cli;

/// How much diagnostic output to produce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Warnings and errors only.
    #[default]
    Quiet,
    /// One line per rendered file (`--verbose`).
    Verbose,
    /// Everything, including parsed arguments and protocol traffic (`--debug`).
    Debug,
}

impl Verbosity {
    pub fn from_flags(verbose: bool, debug: bool) -> Self {
        if debug {
            Verbosity::Debug
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Quiet
        }
    }

    /// The log filter directive for this verbosity.
    pub fn directive(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Verbose => "info",
            Verbosity::Debug => "debug",
        }
    }
}

/// Errors found while validating command-line values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("The given path is not a valid template directory: {}", .0.display())]
    InvalidTemplateDir(PathBuf),

    #[error(
        "The given path is not a valid dispatch script: {} (expected an existing file ending in one of {})",
        .0.display(),
        ScriptKind::supported_suffixes()
    )]
    InvalidDispatchScript(PathBuf),

    #[error("A given dispatch-opt was not a colon separated KEY:VALUE pair: `{0}`")]
    InvalidDispatchOpt(String),

    #[error("The given interpreter command is not valid: {0}")]
    InvalidInterpreter(String),
}

/// Everything needed for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub templates: PathBuf,
    pub dispatch: PathBuf,
    pub options: DispatchOptions,
    pub interpreter: Option<Vec<String>>,
    pub verbosity: Verbosity,
}

impl TryFrom<Cli> for Config {
    type Error = ConfigError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        if !cli.templates.is_dir() {
            return Err(ConfigError::InvalidTemplateDir(cli.templates));
        }

        if !cli.dispatch.is_file() || ScriptKind::detect(&cli.dispatch).is_none() {
            return Err(ConfigError::InvalidDispatchScript(cli.dispatch));
        }

        let options = DispatchOptions::from_tokens(&cli.dispatch_opts).map_err(|err| match err {
            DispatchError::InvalidOption(token) => ConfigError::InvalidDispatchOpt(token),
            other => ConfigError::InvalidDispatchOpt(other.to_string()),
        })?;

        let interpreter = cli
            .interpreter
            .as_deref()
            .map(parse_interpreter)
            .transpose()?;

        Ok(Config {
            templates: cli.templates,
            dispatch: cli.dispatch,
            options,
            interpreter,
            verbosity: Verbosity::from_flags(cli.verbose, cli.debug),
        })
    }
}

fn parse_interpreter(command: &str) -> Result<Vec<String>, ConfigError> {
    let words = shell_words::split(command)
        .map_err(|err| ConfigError::InvalidInterpreter(format!("{command}: {err}")))?;
    if words.is_empty() {
        return Err(ConfigError::InvalidInterpreter("empty command".to_string()));
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            fs::create_dir(dir.path().join("templates")).unwrap();
            fs::write(dir.path().join("gen.py"), "def dispatch(): return []\n").unwrap();
            fs::write(dir.path().join("notes.txt"), "").unwrap();
            Self { dir }
        }

        fn cli(&self) -> Cli {
            Cli {
                templates: self.dir.path().join("templates"),
                dispatch: self.dir.path().join("gen.py"),
                dispatch_opts: Vec::new(),
                interpreter: None,
                debug: false,
                verbose: false,
            }
        }
    }

    #[test]
    fn test_valid_config() {
        let fixture = Fixture::new();
        let mut cli = fixture.cli();
        cli.dispatch_opts = vec!["name:World".into(), "url:http://h:1".into()];

        let config = Config::try_from(cli).unwrap();
        assert_eq!(config.options.get("name"), Some("World"));
        assert_eq!(config.options.get("url"), Some("http://h:1"));
        assert_eq!(config.verbosity, Verbosity::Quiet);
        assert!(config.interpreter.is_none());
    }

    #[test]
    fn test_templates_must_be_directory() {
        let fixture = Fixture::new();
        let mut cli = fixture.cli();
        cli.templates = fixture.dir.path().join("notes.txt");

        let err = Config::try_from(cli).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTemplateDir(_)));
        assert!(err.to_string().contains("notes.txt"));
    }

    #[test]
    fn test_templates_must_exist() {
        let fixture = Fixture::new();
        let mut cli = fixture.cli();
        cli.templates = fixture.dir.path().join("missing");

        assert!(matches!(
            Config::try_from(cli),
            Err(ConfigError::InvalidTemplateDir(_))
        ));
    }

    #[test]
    fn test_dispatch_must_have_known_suffix() {
        let fixture = Fixture::new();
        let mut cli = fixture.cli();
        cli.dispatch = fixture.dir.path().join("notes.txt");

        let err = Config::try_from(cli).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDispatchScript(_)));
        assert!(err.to_string().contains(".py"));
    }

    #[test]
    fn test_dispatch_must_exist() {
        let fixture = Fixture::new();
        let mut cli = fixture.cli();
        cli.dispatch = fixture.dir.path().join("other.py");

        assert!(matches!(
            Config::try_from(cli),
            Err(ConfigError::InvalidDispatchScript(_))
        ));
    }

    #[test]
    fn test_dispatch_opt_without_separator() {
        let fixture = Fixture::new();
        let mut cli = fixture.cli();
        cli.dispatch_opts = vec!["ok:1".into(), "broken".into()];

        let err = Config::try_from(cli).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDispatchOpt(ref t) if t == "broken"));
    }

    #[test]
    fn test_interpreter_is_split_like_a_shell() {
        let fixture = Fixture::new();
        let mut cli = fixture.cli();
        cli.interpreter = Some("uv run 'python 3'".into());

        let config = Config::try_from(cli).unwrap();
        assert_eq!(
            config.interpreter,
            Some(vec!["uv".to_string(), "run".to_string(), "python 3".to_string()])
        );
    }

    #[test]
    fn test_interpreter_rejects_empty_and_unbalanced() {
        let fixture = Fixture::new();

        let mut cli = fixture.cli();
        cli.interpreter = Some("   ".into());
        assert!(matches!(
            Config::try_from(cli),
            Err(ConfigError::InvalidInterpreter(_))
        ));

        let mut cli = fixture.cli();
        cli.interpreter = Some("python3 'unterminated".into());
        assert!(matches!(
            Config::try_from(cli),
            Err(ConfigError::InvalidInterpreter(_))
        ));
    }

    #[test]
    fn test_verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(true, false), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Debug);
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Debug);
        assert_eq!(Verbosity::Verbose.directive(), "info");
    }
}
