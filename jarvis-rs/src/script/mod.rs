//! The jarvis command language.
//!
//! Lines are classified ([`line`]), routed by the session state machine
//! ([`session`], [`interp`]) and run either directly or as part of a script
//! ([`import`]).  Results come back as [`Reply`] values.
//!
//! # Quick start
//!
//! ```rust
//! use jarvis::{Command, Interpreter, Reply};
//!
//! let mut jarvis = Interpreter::new();
//! jarvis.add_command(Command::new("say $string", |inv| Ok(inv.arg_text("string").into())));
//! for line in ["how to greet $name", "say $name", "end"] {
//!     jarvis.send(line).unwrap();
//! }
//! assert_eq!(jarvis.send(r#"greet "John Doe""#).unwrap(), Reply::from(vec!["John Doe"]));
//! ```

pub mod builtins;
pub mod import;
pub mod interp;
pub mod line;
pub mod session;
pub mod value;

// Re-exports for convenience.
pub use import::{CommandEvent, EventListener, ImportStack};
pub use interp::Interpreter;
pub use line::{classify, LineKind};
pub use session::{LocalState, Session};
pub use value::{Reply, Value};
