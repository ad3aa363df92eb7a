//! Command-line argument parsing.
//!
//! Usage:
//!   jarvis [-de] [-f[<config>]] [-c<line>]... [<script>...]

use std::path::PathBuf;

use crate::config::{find_user_config, Config, ConfigError};
use crate::error::Result;

pub const USAGE: &str = "Usage: jarvis [-de] [-f[<config>]] [-c<line>]... [<script>...]";

// ── Public types ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CliArgs {
    /// Which config file to load.
    pub config: ConfigFile,
    /// Lines to send before any script runs (`-c<line>`), in order.
    pub commands: Vec<String>,
    /// Scripts to run, in order.  Empty means interactive.
    pub scripts: Vec<PathBuf>,
    /// Debug logging (`-d`).
    pub debug: bool,
    /// Log script command events (`-e`).
    pub events: bool,
}

/// How to choose the config file.
#[derive(Debug, Default, PartialEq, Eq)]
pub enum ConfigFile {
    /// `./.jarvisrc`, then the OS config directory (default).
    #[default]
    Search,
    /// `-f` with no file argument: defaults only.
    Skip,
    /// `-f<file>`: load this specific file.
    Explicit(PathBuf),
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse `std::env::args()` and return [`CliArgs`] or an error message.
pub fn parse_args() -> Result<CliArgs, String> {
    let raw: Vec<String> = std::env::args().collect();
    parse_argv(raw.get(1..).unwrap_or_default())
}

/// Parse a slice of argument strings (exposed for testing).
pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        // `--` ends flag processing.
        if arg == "--" {
            args.scripts.extend(argv[i + 1..].iter().map(PathBuf::from));
            break;
        }

        if !arg.starts_with('-') || arg == "-" {
            args.scripts.push(PathBuf::from(arg));
            i += 1;
            continue;
        }

        let chars: Vec<char> = arg[1..].chars().collect();
        let mut j = 0;
        while j < chars.len() {
            match chars[j] {
                'd' => args.debug = true,
                'e' => args.events = true,

                // -f[<file>]
                'f' => {
                    if j + 1 < chars.len() {
                        let file: String = chars[j + 1..].iter().collect();
                        args.config = ConfigFile::Explicit(PathBuf::from(file));
                        j = chars.len();
                    } else if i + 1 < argv.len() && !argv[i + 1].starts_with('-') {
                        i += 1;
                        args.config = ConfigFile::Explicit(PathBuf::from(&argv[i]));
                    } else {
                        args.config = ConfigFile::Skip;
                    }
                }

                // -c<line>
                'c' => {
                    let line = if j + 1 < chars.len() {
                        let s: String = chars[j + 1..].iter().collect();
                        j = chars.len();
                        s
                    } else if i + 1 < argv.len() {
                        i += 1;
                        argv[i].clone()
                    } else {
                        return Err("-c requires a line argument".to_owned());
                    };
                    args.commands.push(line);
                }

                c => return Err(format!("unknown option: -{c}")),
            }
            j += 1;
        }
        i += 1;
    }

    Ok(args)
}

// ── Config resolution ─────────────────────────────────────────────────────────

/// Build the effective [`Config`]: defaults, then the selected config file,
/// then flags.  Per-line config problems are returned, not raised.
pub fn resolve_config(args: &CliArgs) -> Result<(Config, Vec<ConfigError>)> {
    let (mut config, errors) = match &args.config {
        ConfigFile::Skip => (Config::default(), Vec::new()),
        ConfigFile::Explicit(path) => Config::load_file(path)?,
        ConfigFile::Search => match find_user_config() {
            Some(path) => Config::load_file(&path)?,
            None => (Config::default(), Vec::new()),
        },
    };
    if args.events {
        config.events = true;
    }
    Ok((config, errors))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
