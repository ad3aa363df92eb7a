//! `.jarvisrc` configuration.
//!
//! A config file is a list of `key = value` lines:
//!
//! | Key | Type | Default | Meaning |
//! |-----|------|---------|---------|
//! | `extension` | text | `jarvis` | accepted script file extension |
//! | `max_macro_depth` | integer ≥ 1 | `64` | nesting limit for macro expansion |
//! | `prompt` | text | `"> "` | interactive prompt of the binary |
//! | `events` | `true`/`false` | `false` | log every script command event |
//!
//! Lines starting with `#` and blank lines are ignored.  Values may be wrapped
//! in double quotes to keep surrounding spaces.  Problems on individual lines
//! are collected as [`ConfigError`]s and never abort loading.

use std::path::{Path, PathBuf};

use crate::error::{JarvisError, Result};

pub const DEFAULT_EXTENSION: &str = "jarvis";
pub const DEFAULT_MAX_MACRO_DEPTH: usize = 64;

// ── Public API ────────────────────────────────────────────────────────────────

/// A non-fatal problem on one config line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct ConfigError {
    pub line: usize,
    pub message: String,
}

/// Interpreter and host settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub extension: String,
    pub max_macro_depth: usize,
    pub prompt: String,
    pub events: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_owned(),
            max_macro_depth: DEFAULT_MAX_MACRO_DEPTH,
            prompt: "> ".to_owned(),
            events: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config string on top of the defaults.
    pub fn load_str(s: &str) -> (Self, Vec<ConfigError>) {
        let mut config = Config::new();
        let errors = config.apply_str(s);
        (config, errors)
    }

    /// Apply settings from `s` over the current values.
    pub fn apply_str(&mut self, s: &str) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        for (i, raw) in s.lines().enumerate() {
            let lineno = i + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                errors.push(ConfigError {
                    line: lineno,
                    message: format!("expected `key = value`, got `{line}`"),
                });
                continue;
            };
            let key = key.trim();
            let value = unquote(value.trim());

            if let Err(message) = self.set(key, value) {
                errors.push(ConfigError { line: lineno, message });
            }
        }

        errors
    }

    /// Set one key.  Returns a message describing why the value was refused.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "extension" => {
                let ext = value.trim_start_matches('.');
                if ext.is_empty() {
                    return Err("extension must not be empty".to_owned());
                }
                self.extension = ext.to_owned();
            }
            "max_macro_depth" => {
                let depth: usize = value
                    .parse()
                    .map_err(|_| format!("invalid max_macro_depth: {value}"))?;
                if depth == 0 {
                    return Err("max_macro_depth must be at least 1".to_owned());
                }
                self.max_macro_depth = depth;
            }
            "prompt" => self.prompt = value.to_owned(),
            "events" => {
                self.events = match value {
                    "true" | "on" | "1" => true,
                    "false" | "off" | "0" => false,
                    _ => return Err(format!("invalid boolean for events: {value}")),
                }
            }
            _ => return Err(format!("unknown key `{key}`")),
        }
        Ok(())
    }

    /// Read and parse a config file from disk.
    pub fn load_file(path: &Path) -> Result<(Self, Vec<ConfigError>)> {
        let s = std::fs::read_to_string(path)
            .map_err(|source| JarvisError::Config { path: path.to_owned(), source })?;
        Ok(Self::load_str(&s))
    }
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(s)
}

// ── Path helpers ──────────────────────────────────────────────────────────────

/// Search for the user config file: `./.jarvisrc`, then `config` in the OS
/// config directory for jarvis.  Returns the first path that exists.
pub fn find_user_config() -> Option<PathBuf> {
    let mut candidates = vec![PathBuf::from("./.jarvisrc")];
    if let Some(dirs) = directories::ProjectDirs::from("", "", "jarvis") {
        candidates.push(dirs.config_dir().join("config"));
    }
    candidates.into_iter().find(|p| p.exists())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
