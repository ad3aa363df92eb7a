//! Registered commands and the handler contract.
//!
//! A [`Command`] pairs a primary template and any number of alias templates
//! with one [`Handler`].  Commands are registered once during setup and are
//! never updated or removed.
//!
//! ```rust
//! use jarvis::{Command, Interpreter, Reply};
//!
//! let mut jarvis = Interpreter::new();
//! jarvis.add_command(Command::new("say $string", |inv| Ok(inv.arg_text("string").into())));
//! assert_eq!(jarvis.send(r#"say "Hello World""#).unwrap(), Reply::text("Hello World"));
//! ```

use std::fmt;
use std::sync::Arc;

use crate::error::HandlerError;
use crate::pattern::{match_patterns, Args, Pattern};
use crate::script::{Interpreter, Reply, Value};

/// What a handler returns.
pub type HandlerResult = Result<Reply, HandlerError>;

/// Application logic bound to a command.
pub type Handler = Arc<dyn Fn(&mut Invocation<'_>) -> HandlerResult + Send + Sync>;

// ── Invocation ────────────────────────────────────────────────────────────────

/// Everything a handler sees for one call.
pub struct Invocation<'a> {
    /// The interpreter that dispatched this call.
    pub interp: &'a mut Interpreter,
    /// Name (primary template) of the command being run.
    pub command: &'a str,
    /// The line as received, before tokenizing.
    pub line: &'a str,
    /// Input tokens after constant substitution.
    pub tokens: &'a [Value],
    /// Variables bound by the matching pattern.  Empty for dialogue
    /// continuation lines, which are not re-matched.
    pub args: &'a Args,
}

impl Invocation<'_> {
    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.args.get(name)
    }

    /// Display form of an argument, or `""` if it is not bound.
    pub fn arg_text(&self, name: &str) -> String {
        self.args.get(name).map(Value::to_string).unwrap_or_default()
    }

    /// `true` if this call is a continuation line of an open dialogue.
    pub fn in_dialogue(&self) -> bool {
        self.interp.active_command() == Some(self.command)
    }

    /// Turn this command into a multi-turn dialogue: following lines are
    /// routed straight back to this handler until `..` or [`end`](Self::end).
    pub fn start(&mut self) -> bool {
        self.interp.start_command(self.command)
    }

    /// Leave the dialogue and drop its local state.
    pub fn end(&mut self) {
        self.interp.end_command();
    }

    /// Store a value in the dialogue's local state.
    pub fn set_state(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.interp.set_state(key, value);
    }

    pub fn state(&self, key: &str) -> Option<&Value> {
        self.interp.state(key)
    }
}

// ── Command ───────────────────────────────────────────────────────────────────

/// A named, handler-bound set of patterns.
#[derive(Clone)]
pub struct Command {
    name: String,
    patterns: Vec<Pattern>,
    handler: Handler,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("patterns", &self.patterns)
            .finish()
    }
}

impl Command {
    /// Create a command from its primary template.
    pub fn new<F>(template: &str, handler: F) -> Self
    where
        F: Fn(&mut Invocation<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        let primary = Pattern::compile(template);
        Self {
            name: primary.src().to_owned(),
            patterns: vec![primary],
            handler: Arc::new(handler),
        }
    }

    /// Add an alias template, tried after every earlier pattern.
    pub fn alias(mut self, template: &str) -> Self {
        self.patterns.push(Pattern::compile(template));
        self
    }

    pub fn aliases<'a>(self, templates: impl IntoIterator<Item = &'a str>) -> Self {
        templates.into_iter().fold(self, Command::alias)
    }

    /// The primary template, used as the command's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Primary pattern first, then aliases in declaration order.
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn handler(&self) -> Handler {
        Arc::clone(&self.handler)
    }

    pub fn bind(&self, tokens: &[Value]) -> Option<Args> {
        match_patterns(&self.patterns, tokens)
    }
}

// ── CommandSet ────────────────────────────────────────────────────────────────

/// Commands in registration order.
#[derive(Debug, Default)]
pub struct CommandSet {
    commands: Vec<Command>,
}

impl CommandSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// First registered command with a pattern matching `tokens`.
    pub fn find(&self, tokens: &[Value]) -> Option<(&Command, Args)> {
        self.commands
            .iter()
            .find_map(|c| c.bind(tokens).map(|args| (c, args)))
    }

    pub fn by_name(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
