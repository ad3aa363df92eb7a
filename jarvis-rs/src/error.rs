//! Crate-wide error type.
//!
//! Only failures that indicate a misconfigured embedding surface here:
//! unreadable scripts, malformed JSON imports, failing handlers and runaway
//! macro recursion.  Unrecognised input and user-rule violations are ordinary
//! [`Reply`](crate::script::Reply) values, never errors.

use std::path::PathBuf;

/// Error type returned by command handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Convenience alias used throughout the crate.
pub type Result<T, E = JarvisError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum JarvisError {
    /// A script file could not be read by the loader.
    #[error("could not read script {}: {source}", path.display())]
    ScriptRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A `.json` import target is not valid JSON.
    #[error("malformed JSON in {}: {source}", path.display())]
    JsonImport {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A command handler failed; the error is passed through untouched.
    #[error("command '{command}' failed: {source}")]
    Handler {
        command: String,
        #[source]
        source: HandlerError,
    },

    /// Macro expansion nested deeper than `Config::max_macro_depth`.
    #[error("macro '{name}' exceeded the nesting limit of {limit}")]
    MacroDepth { name: String, limit: usize },

    /// The file does not carry the configured script extension.
    #[error("{} is not a .{extension} script", path.display())]
    InvalidScript { path: PathBuf, extension: String },

    /// A config file could not be read.
    #[error("could not read config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl JarvisError {
    /// Wrap a handler failure with the name of the command that raised it.
    pub fn handler(command: impl Into<String>, source: HandlerError) -> Self {
        JarvisError::Handler { command: command.into(), source }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_error_keeps_message() {
        let err = JarvisError::handler("say $string", "boom".into());
        assert_eq!(err.to_string(), "command 'say $string' failed: boom");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn script_read_mentions_path() {
        let err = JarvisError::ScriptRead {
            path: PathBuf::from("missing.jarvis"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("missing.jarvis"));
    }

    #[test]
    fn macro_depth_display() {
        let err = JarvisError::MacroDepth { name: "loop".into(), limit: 3 };
        assert_eq!(err.to_string(), "macro 'loop' exceeded the nesting limit of 3");
    }
}
