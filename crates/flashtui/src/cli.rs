//! Command line and start-up.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{ArgAction, Parser};
use flashtui_core::Surface;
use flashtui_core::terminal_session::{SessionOptions, TerminalSession};
use flashtui_widgets::chrome::prompt;
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::collection::JsonCollection;
use crate::config::{Config, default_config_file, expand_tilde};
use crate::error::{Error, Result};

/// Environment variable holding a log filter, e.g. `flashtui=debug`.
pub const LOG_ENV: &str = "FLASHTUI_LOG";

#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(
    name = "flashtui",
    version,
    about = "Review flashcards and edit notes in the terminal"
)]
pub struct Cli {
    /// Collection file to open (overrides `collection_path` in the config)
    #[arg(long, value_name = "FILE")]
    pub collection: Option<PathBuf>,

    /// Read configuration from FILE instead of the default location
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Append logs to FILE; nothing is logged without it
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Increase logging verbosity (repeat for more detail)
    #[arg(short = 'v', action = ArgAction::Count)]
    pub verbosity: u8,

    /// Draw in monochrome
    #[arg(long)]
    pub no_color: bool,
}

fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// `FLASHTUI_LOG` if set, else a level from the `-v` count.
#[must_use]
pub fn log_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level(verbosity)))
}

/// Send logs to `path`. The screen belongs to the views, so without a log
/// file nothing is logged.
///
/// # Errors
///
/// If the log file cannot be opened.
pub fn init_logging(path: Option<&Path>, verbosity: u8) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| Error::config(path, format!("cannot open log file: {err}")))?;
    // Fails only when a global subscriber is already set.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbosity))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

/// The config from `explicit`, or from the default location if a file is
/// there. A missing default file is not a problem.
#[must_use]
pub fn load_config(explicit: Option<&Path>) -> (Config, Vec<String>) {
    if let Some(path) = explicit {
        return Config::load(path);
    }
    match default_config_file() {
        Some(path) if path.exists() => Config::load(&path),
        _ => (Config::default(), Vec::new()),
    }
}

/// Run the program.
///
/// # Errors
///
/// Config errors (exit code 2), terminal failures and collection errors.
/// The terminal is restored before the error is returned.
pub fn run(cli: Cli) -> Result<()> {
    init_logging(cli.log_file.as_deref(), cli.verbosity)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "flashtui starting");

    let (config, problems) = load_config(cli.config.as_deref());
    let options = SessionOptions {
        force_color: cli.no_color.then_some(false),
        ..SessionOptions::default()
    };
    let mut surface: Box<dyn Surface> = Box::new(TerminalSession::new(options)?);

    let path = match cli
        .collection
        .as_deref()
        .map(expand_tilde)
        .or_else(|| config.collection_path.clone())
    {
        Some(path) => path,
        None => {
            let answer = prompt(surface.as_mut(), "Enter collection path: ")?;
            let answer = answer.trim();
            if answer.is_empty() {
                return Ok(());
            }
            expand_tilde(Path::new(answer))
        }
    };

    let collection = JsonCollection::open(&path)?;
    let mut app = App::new(surface, Box::new(collection), config);
    app.run(&problems)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_all_options() {
        let cli = Cli::try_parse_from([
            "flashtui",
            "-c",
            "my.toml",
            "--log-file",
            "ft.log",
            "-vv",
            "--no-color",
            "--collection",
            "col.json",
        ])
        .unwrap();
        assert_eq!(
            cli,
            Cli {
                collection: Some(PathBuf::from("col.json")),
                config: Some(PathBuf::from("my.toml")),
                log_file: Some(PathBuf::from("ft.log")),
                verbosity: 2,
                no_color: true,
            }
        );
    }

    #[test]
    fn no_arguments() {
        assert_eq!(Cli::try_parse_from(["flashtui"]).unwrap(), Cli::default());
    }

    #[test]
    fn verbosity_levels() {
        assert_eq!(default_level(0), "info");
        assert_eq!(default_level(1), "debug");
        assert_eq!(default_level(7), "trace");
    }

    #[test]
    fn explicit_missing_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let (config, problems) = load_config(Some(&dir.path().join("nope.toml")));
        assert_eq!(config, Config::default());
        assert_eq!(problems.len(), 1);
    }

    #[test]
    fn unopenable_log_file_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let error = init_logging(Some(&dir.path().join("missing/dir/ft.log")), 0).unwrap_err();
        assert_eq!(error.exit_code(), 2);
    }
}
