// SPDX-License-Identifier: MIT
//
// Startup configuration.
//
//   tedit [FILE]
//
// Everything else comes from the environment:
//
//   TEDIT_LOG_FILE  where to write the log (logging is off when unset,
//                   since stdout and stderr belong to the screen)
//   TEDIT_LOG       tracing filter directive, default "info"

use std::path::PathBuf;

use thiserror::Error;

pub const USAGE: &str = "usage: tedit [FILE]\n\
\n\
keys:\n\
  C-q quit            C-w save as         C-o open file\n\
  C-s search forward  C-r search backward C-g cancel prompt\n\
  C-a line begin      C-e line end        C-d delete forward\n\
  C-v page down       M-v page up         M-g goto line\n\
  M-< buffer begin    M-> buffer end      C-l redraw\n\
\n\
environment:\n\
  TEDIT_LOG_FILE  write a log to this file\n\
  TEDIT_LOG       log filter (default: info)";

const DEFAULT_LOG_FILTER: &str = "info";

/// Settings for one editor session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// File to open on startup.
    pub file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub log_filter: String,
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Startup {
    Edit(Config),
    Help,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown option '{0}'")]
    UnknownFlag(String),

    #[error("only one file can be opened, got '{0}' as well")]
    ExtraArgument(String),
}

impl Config {
    /// Interpret the arguments (without the program name) and environment.
    ///
    /// `--` ends option parsing, so `tedit -- -notes.txt` opens a file whose
    /// name starts with a dash.
    ///
    /// # Errors
    ///
    /// Rejects unknown `-` options and more than one file.
    pub fn from_args_and_env<I, F>(args: I, env: F) -> Result<Startup, ConfigError>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut file: Option<PathBuf> = None;
        let mut options_done = false;

        for arg in args {
            if !options_done && arg.starts_with('-') && arg != "-" {
                if arg == "-h" || arg == "--help" {
                    return Ok(Startup::Help);
                }
                if arg != "--" {
                    return Err(ConfigError::UnknownFlag(arg));
                }
                options_done = true;
                continue;
            }
            if file.is_some() {
                return Err(ConfigError::ExtraArgument(arg));
            }
            file = Some(PathBuf::from(arg));
        }

        Ok(Startup::Edit(Self {
            file,
            log_file: env("TEDIT_LOG_FILE")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            log_filter: env("TEDIT_LOG")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str], env: &[(&str, &str)]) -> Result<Startup, ConfigError> {
        let args = args.iter().map(|s| (*s).to_string());
        Config::from_args_and_env(args, |key| {
            env.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_string())
        })
    }

    fn edit(args: &[&str], env: &[(&str, &str)]) -> Config {
        match parse(args, env) {
            Ok(Startup::Edit(config)) => config,
            other => panic!("expected a config, got {other:?}"),
        }
    }

    #[test]
    fn no_arguments() {
        let config = edit(&[], &[]);
        assert_eq!(
            config,
            Config {
                file: None,
                log_file: None,
                log_filter: "info".into(),
            }
        );
    }

    #[test]
    fn file_argument() {
        assert_eq!(edit(&["notes.txt"], &[]).file, Some("notes.txt".into()));
    }

    #[test]
    fn help_flags() {
        assert_eq!(parse(&["-h"], &[]), Ok(Startup::Help));
        assert_eq!(parse(&["x", "--help"], &[]), Ok(Startup::Help));
    }

    #[test]
    fn unknown_flag_rejected() {
        assert_eq!(
            parse(&["-x"], &[]),
            Err(ConfigError::UnknownFlag("-x".into()))
        );
        assert_eq!(
            parse(&["--verbose"], &[]).unwrap_err().to_string(),
            "unknown option '--verbose'"
        );
    }

    #[test]
    fn double_dash_ends_options() {
        assert_eq!(edit(&["--", "-odd"], &[]).file, Some("-odd".into()));
    }

    #[test]
    fn second_file_rejected() {
        assert_eq!(
            parse(&["a", "b"], &[]),
            Err(ConfigError::ExtraArgument("b".into()))
        );
    }

    #[test]
    fn logging_from_environment() {
        let config = edit(
            &[],
            &[("TEDIT_LOG_FILE", "/tmp/tedit.log"), ("TEDIT_LOG", "debug")],
        );
        assert_eq!(config.log_file, Some("/tmp/tedit.log".into()));
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn empty_environment_values_are_unset() {
        let config = edit(&[], &[("TEDIT_LOG_FILE", ""), ("TEDIT_LOG", "")]);
        assert_eq!(config.log_file, None);
        assert_eq!(config.log_filter, "info");
    }
}
