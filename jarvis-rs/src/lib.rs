//! Jarvis: an embeddable, line-oriented command language.
//!
//! Applications register [`Command`]s (templates such as `say $string` bound
//! to a handler) on an [`Interpreter`] and feed it lines of text.  Users can
//! record macros (`how to ...` / `end`), define write-once constants
//! (`in this context` / `end`), hold multi-turn dialogues with a command, and
//! run whole scripts that import one another.

pub mod cli;
pub mod command;
pub mod config;
pub mod constants;
pub mod error;
pub mod loader;
pub mod macros;
pub mod pattern;
pub mod script;
pub mod token;

pub use command::{Command, Handler, HandlerResult, Invocation};
pub use config::Config;
pub use error::{HandlerError, JarvisError, Result};
pub use loader::{FsLoader, MemoryLoader, ScriptLoader};
pub use script::{CommandEvent, Interpreter, Reply, Session, Value};
