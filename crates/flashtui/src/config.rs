//! User configuration.
//!
//! Read from `$XDG_CONFIG_HOME/flashtui/config.toml` (or the platform
//! equivalent; `FLASHTUI_CONFIG_DIR` overrides the directory):
//!
//! ```toml
//! collection_path = "~/flashcards/collection.json"
//! hide_child_decks = true
//! editor = "nvim"
//! ```
//!
//! A broken config never stops the program. A missing or unparsable file,
//! unknown keys and values of the wrong type are each reported as a
//! problem, logged, and skipped; everything else keeps its default.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use etcetera::base_strategy::{BaseStrategy, choose_base_strategy};

const APP_DIR: &str = "flashtui";
const FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Collection file to open at start-up.
    pub collection_path: Option<PathBuf>,
    /// Leave `Parent::Child` decks out of the deck list.
    pub hide_child_decks: bool,
    /// Editor command for notes, before `$VISUAL` and `$EDITOR`.
    pub editor: Option<String>,
}

/// Directory holding the config file.
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("FLASHTUI_CONFIG_DIR") {
        return Some(expand_tilde(Path::new(&dir)));
    }
    let strategy = choose_base_strategy().ok()?;
    Some(strategy.config_dir().join(APP_DIR))
}

/// The config file used when none is given on the command line.
#[must_use]
pub fn default_config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(FILE_NAME))
}

/// Replace a leading `~` with the home directory.
#[must_use]
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match etcetera::home_dir() {
        Ok(home) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

impl Config {
    /// Load `path`, returning the config and every problem found.
    #[must_use]
    pub fn load(path: &Path) -> (Self, Vec<String>) {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let problem = format!("Could not open {}: no such file", path.display());
                tracing::warn!("{problem}");
                return (Self::default(), vec![problem]);
            }
            Err(err) => {
                let problem = format!("Error loading config file {}: {err}", path.display());
                tracing::warn!("{problem}");
                return (Self::default(), vec![problem]);
            }
        };
        let (config, problems) = Self::parse(&text);
        tracing::info!(path = %path.display(), problems = problems.len(), "config loaded");
        (config, problems)
    }

    /// Parse config text, returning the config and every problem found.
    #[must_use]
    pub fn parse(text: &str) -> (Self, Vec<String>) {
        let mut config = Self::default();
        let mut problems = Vec::new();

        let table: toml::Table = match toml::from_str(text) {
            Ok(table) => table,
            Err(err) => {
                let problem = format!("Error decoding config file TOML: {}", err.message());
                tracing::warn!("{problem}");
                return (config, vec![problem]);
            }
        };

        for (key, value) in &table {
            let accepted = match key.as_str() {
                "collection_path" => value
                    .as_str()
                    .map(|s| config.collection_path = Some(expand_tilde(Path::new(s))))
                    .ok_or("string"),
                "hide_child_decks" => value
                    .as_bool()
                    .map(|b| config.hide_child_decks = b)
                    .ok_or("boolean"),
                "editor" => value
                    .as_str()
                    .map(|s| config.editor = Some(s.to_string()))
                    .ok_or("string"),
                _ => {
                    problems.push(format!("Invalid key in config: '{key}'"));
                    continue;
                }
            };
            if let Err(expected) = accepted {
                problems.push(format!(
                    "Invalid value type for key '{key}' in config: expected {expected}, received {}",
                    value.type_str()
                ));
            }
        }

        for problem in &problems {
            tracing::warn!("{problem}");
        }
        (config, problems)
    }
}
