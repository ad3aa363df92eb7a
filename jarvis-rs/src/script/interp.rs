//! The jarvis interpreter.
//!
//! [`Interpreter`] owns the command set, macros, constants and the session
//! state.  Every line handed to [`Interpreter::send`] is classified once
//! ([`classify`]) and routed by the current [`Session`]:
//!
//! | State | Line | Effect | Next |
//! |-------|------|--------|------|
//! | ActiveCommand | `..` | reply `Done with <command>.` | Idle |
//! | ActiveCommand | other | same handler, no re-match | ActiveCommand / Idle |
//! | Idle | `how to X` | refuse if X's shape is taken, else open | RecordingMacro |
//! | RecordingMacro | `end` | commit macro | Idle |
//! | RecordingMacro | matches command/macro | append line | RecordingMacro |
//! | RecordingMacro | other | reply `Not a valid Command/Macro.` | RecordingMacro |
//! | Idle | `in this context` | open pending scope for current script | RecordingConstants |
//! | RecordingConstants | `end` | commit scope | Idle |
//! | RecordingConstants | `KEY is value` | stage, or reply naming/duplicate error | RecordingConstants |
//! | RecordingConstants | `name is from 'path'` | import | RecordingConstants |
//! | Idle | other | command, else macro, else `Null` | Idle |
//!
//! Execution is strictly sequential: one line finishes before the next is
//! looked at.  Nothing here is shared across threads; an interpreter must not
//! be driven by two callers at once.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::command::{Command, CommandSet, Handler, Invocation};
use crate::config::Config;
use crate::constants::{ConstantStore, DefineError, PendingScope};
use crate::error::{JarvisError, Result};
use crate::loader::{FsLoader, ScriptLoader};
use crate::macros::{Macro, MacroStore};
use crate::pattern::{Args, Pattern};
use crate::token::{join_tokens, tokenize};
use super::{
    import::{CommandEvent, EventListener, ImportStack},
    line::{classify, LineKind},
    session::{LocalState, Session},
    value::{Reply, Value},
};

pub const MACRO_OPEN: &str =
    "You are now entering a macro. Type the statements, one line at a time. When done, type 'end'.";
pub const MACRO_EXISTS: &str = "Macro name already exists!";
pub const MACRO_INVALID_LINE: &str = "Not a valid Command/Macro.";
pub const CONSTANTS_OPEN: &str =
    "You are now entering constants. Type the constants, one line at a time. When done, type 'end'.";
pub const NO_CONSTANTS: &str = "No constants were added.";

// ── Interpreter ───────────────────────────────────────────────────────────────

/// A long-lived command interpreter.
pub struct Interpreter {
    commands: CommandSet,
    macros: MacroStore,
    constants: ConstantStore,
    session: Session,
    config: Config,
    pub(super) loader: Arc<dyn ScriptLoader + Send + Sync>,
    /// Scripts currently executing; innermost last.
    pub(super) imports: ImportStack,
    /// Every script or JSON file imported so far → resource names that asked for it.
    pub(super) imported: HashMap<PathBuf, Vec<String>>,
    pub(super) listeners: Vec<EventListener>,
    /// Current macro nesting.
    depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Interpreter {
            commands: CommandSet::new(),
            macros: MacroStore::new(),
            constants: ConstantStore::new(),
            session: Session::Idle,
            config,
            loader: Arc::new(FsLoader),
            imports: ImportStack::new(),
            imported: HashMap::new(),
            listeners: Vec::new(),
            depth: 0,
        }
    }

    /// Replace the loader used for scripts and JSON imports.
    pub fn with_loader(mut self, loader: impl ScriptLoader + Send + Sync + 'static) -> Self {
        self.loader = Arc::new(loader);
        self
    }

    /// Register a command.  Registration order decides ties between commands.
    pub fn add_command(&mut self, command: Command) {
        debug!(command = command.name(), aliases = command.patterns().len() - 1, "command registered");
        self.commands.add(command);
    }

    // ── Introspection ─────────────────────────────────────────────────────────

    pub fn commands(&self) -> &CommandSet {
        &self.commands
    }

    pub fn macros(&self) -> &MacroStore {
        &self.macros
    }

    pub fn constants(&self) -> &ConstantStore {
        &self.constants
    }

    /// Mutable access for seeding constants before any input is processed.
    pub fn constants_mut(&mut self) -> &mut ConstantStore {
        &mut self.constants
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn import_stack(&self) -> &ImportStack {
        &self.imports
    }

    /// Imported files (normalised path) and the resource names that requested them.
    pub fn imported(&self) -> &HashMap<PathBuf, Vec<String>> {
        &self.imported
    }

    /// Register a listener for script command events.
    pub fn on_command<F>(&mut self, listener: F)
    where
        F: FnMut(&CommandEvent) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    // ── Interactive commands ──────────────────────────────────────────────────

    /// Route every following line to the command named `name` until `..`
    /// or [`end_command`](Self::end_command).  Re-entering the command that
    /// already holds the dialogue keeps its state.  Returns `false` if no
    /// command has that name.
    pub fn start_command(&mut self, name: &str) -> bool {
        if self.session.active_command() == Some(name) {
            return true;
        }
        if self.commands.by_name(name).is_none() {
            warn!(command = name, "start_command: no such command");
            return false;
        }
        if !self.session.is_idle() {
            warn!(state = self.session.label(), command = name, "start_command replaces current session");
        }
        self.session = Session::ActiveCommand { command: name.to_owned(), state: LocalState::new() };
        true
    }

    /// Leave the current dialogue, dropping its state.
    pub fn end_command(&mut self) {
        if let Session::ActiveCommand { .. } = self.session {
            self.session = Session::Idle;
        }
    }

    pub fn active_command(&self) -> Option<&str> {
        self.session.active_command()
    }

    /// Set a dialogue-local value.  Ignored outside a dialogue.
    pub fn set_state(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        match &mut self.session {
            Session::ActiveCommand { state, .. } => {
                state.insert(key.into(), value.into());
            }
            other => debug!(state = other.label(), "set_state outside a dialogue ignored"),
        }
    }

    pub fn state(&self, key: &str) -> Option<&Value> {
        match &self.session {
            Session::ActiveCommand { state, .. } => state.get(key),
            _ => None,
        }
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    /// Process one line of input.
    ///
    /// Unrecognised input yields [`Reply::Null`]; rule violations (duplicate
    /// names and the like) yield a [`Reply::Text`] message.  Errors are
    /// reserved for handler failures, unreadable imports and runaway macros.
    pub fn send(&mut self, line: &str) -> Result<Reply> {
        let kind = classify(line);
        match &self.session {
            Session::ActiveCommand { .. } => self.continue_dialogue(line, kind),
            Session::RecordingMacro { .. } => Ok(self.record_macro_line(line, kind)),
            Session::RecordingConstants(_) => self.record_constant_line(kind),
            Session::Idle => self.idle_line(line, kind),
        }
    }

    fn idle_line(&mut self, line: &str, kind: LineKind<'_>) -> Result<Reply> {
        match kind {
            LineKind::Blank => Ok(Reply::Null),
            LineKind::BeginMacro(template) => {
                let pattern = Pattern::compile(template);
                if self.macros.collides(&pattern) {
                    return Ok(Reply::text(MACRO_EXISTS));
                }
                debug!(template, "recording macro");
                self.session = Session::RecordingMacro { pattern, lines: Vec::new() };
                Ok(Reply::text(MACRO_OPEN))
            }
            LineKind::BeginConstants => {
                let script = self.imports.current().map(Path::to_path_buf);
                debug!(script = ?script, "recording constants");
                self.session = Session::RecordingConstants(PendingScope::new(script));
                Ok(Reply::text(CONSTANTS_OPEN))
            }
            _ => self.dispatch(line),
        }
    }

    fn continue_dialogue(&mut self, line: &str, kind: LineKind<'_>) -> Result<Reply> {
        let name = self.session.active_command().unwrap_or_default().to_owned();
        if kind == LineKind::ExitDialogue {
            self.end_command();
            return Ok(Reply::Text(format!("Done with {name}.")));
        }
        let Some(handler) = self.commands.by_name(&name).map(Command::handler) else {
            warn!(command = %name, "dialogue command vanished; leaving dialogue");
            self.end_command();
            return Ok(Reply::Null);
        };
        let tokens = self.constants.resolve_tokens(&tokenize(line));
        self.invoke(&handler, &name, line, &tokens, &Args::new())
    }

    fn record_macro_line(&mut self, line: &str, kind: LineKind<'_>) -> Reply {
        match kind {
            LineKind::Blank => Reply::Null,
            LineKind::End => {
                let Session::RecordingMacro { pattern, lines } = std::mem::take(&mut self.session)
                else {
                    return Reply::Null;
                };
                let mac = Macro::new(pattern.src(), lines);
                let name = mac.name().to_owned();
                if !self.macros.add(mac) {
                    return Reply::text(MACRO_EXISTS);
                }
                info!(name = %name, "macro added");
                Reply::Text(format!("Macro \"{name}\" has been added."))
            }
            _ => {
                let tokens: Vec<Value> = tokenize(line).into_iter().map(Value::Text).collect();
                let valid = !tokens.is_empty()
                    && (self.commands.find(&tokens).is_some() || self.macros.find(&tokens).is_some());
                if !valid {
                    return Reply::text(MACRO_INVALID_LINE);
                }
                if let Session::RecordingMacro { lines, .. } = &mut self.session {
                    lines.push(line.trim().to_owned());
                }
                Reply::Null
            }
        }
    }

    fn record_constant_line(&mut self, kind: LineKind<'_>) -> Result<Reply> {
        match kind {
            LineKind::End => Ok(self.commit_constants()),
            LineKind::Define { key, value } => {
                let value = self.constant_value(value);
                Ok(define_reply(self.stage_constant(key, value)))
            }
            LineKind::Import { name, path } => self.import(name, path),
            other => {
                debug!(line = ?other, "not a constant definition; ignored");
                Ok(Reply::Null)
            }
        }
    }

    /// Parse the right-hand side of `KEY is value`.  A single (possibly
    /// quoted) token may reference another constant and keeps its type.
    fn constant_value(&self, raw: &str) -> Value {
        let tokens = tokenize(raw);
        match tokens.as_slice() {
            [single] => self.constants.resolve(single),
            _ => self.constants.resolve(raw),
        }
    }

    /// Stage `key` in the open constants scope.  Outside a constants block
    /// there is nothing to stage into and the call does nothing.
    pub(super) fn stage_constant(&mut self, key: &str, value: Value) -> Result<(), DefineError> {
        let Session::RecordingConstants(scope) = &mut self.session else {
            debug!(key, "no constants block open; not staged");
            return Ok(());
        };
        scope.stage(key, value, &self.constants)
    }

    fn commit_constants(&mut self) -> Reply {
        let Session::RecordingConstants(scope) = std::mem::take(&mut self.session) else {
            return Reply::Null;
        };
        let script = scope.script.clone();
        let commit = scope.commit(&mut self.constants);
        info!(script = ?script, added = ?commit.added, "constants committed");

        let mut message = if commit.added.is_empty() {
            NO_CONSTANTS.to_owned()
        } else {
            format!("Constants \"{}\" have been added.", commit.added.join(","))
        };
        for key in &commit.rejected {
            message.push_str(&format!(" '{key}' constant already exists!"));
        }
        Reply::Text(message)
    }

    /// Set the current session aside, leaving the interpreter idle.
    pub(super) fn suspend_session(&mut self) -> Session {
        std::mem::take(&mut self.session)
    }

    /// Reinstate a session set aside by [`suspend_session`](Self::suspend_session).
    /// A block left open in between is discarded.
    pub(super) fn resume_session(&mut self, outer: Session) {
        let inner = std::mem::replace(&mut self.session, outer);
        if !inner.is_idle() {
            warn!(state = inner.label(), "discarding block left open by imported script");
        }
    }

    // ── Dispatch ──────────────────────────────────────────────────────────────

    /// Match `line` against commands, then macros.
    pub fn dispatch(&mut self, line: &str) -> Result<Reply> {
        let tokens = self.constants.resolve_tokens(&tokenize(line));
        self.dispatch_tokens(line, &tokens)
    }

    fn dispatch_tokens(&mut self, line: &str, tokens: &[Value]) -> Result<Reply> {
        if tokens.is_empty() {
            return Ok(Reply::Null);
        }
        let command = self
            .commands
            .find(tokens)
            .map(|(c, args)| (c.handler(), c.name().to_owned(), args));
        if let Some((handler, name, args)) = command {
            return self.invoke(&handler, &name, line, tokens, &args);
        }
        let mac = self.macros.find(tokens).map(|(m, args)| (m.clone(), args));
        if let Some((mac, args)) = mac {
            return self.run_macro(&mac, &args);
        }
        debug!(line, "no command or macro matched");
        Ok(Reply::Null)
    }

    fn invoke(
        &mut self,
        handler: &Handler,
        command: &str,
        line: &str,
        tokens: &[Value],
        args: &Args,
    ) -> Result<Reply> {
        let mut inv = Invocation { interp: self, command, line, tokens, args };
        handler(&mut inv).map_err(|e| JarvisError::handler(command, e))
    }

    // ── Macro expansion ───────────────────────────────────────────────────────

    fn run_macro(&mut self, mac: &Macro, args: &Args) -> Result<Reply> {
        if self.depth >= self.config.max_macro_depth {
            return Err(JarvisError::MacroDepth {
                name: mac.name().to_owned(),
                limit: self.config.max_macro_depth,
            });
        }
        self.depth += 1;
        let result = self.run_macro_lines(mac, args);
        self.depth -= 1;
        result
    }

    /// Run every recorded line in order.  Unmatched lines contribute `Null`
    /// and do not stop the macro.
    fn run_macro_lines(&mut self, mac: &Macro, args: &Args) -> Result<Reply> {
        let mut results = Vec::with_capacity(mac.lines().len());
        for index in 0..mac.lines().len() {
            let tokens = mac.expand_line(index, args, &self.constants);
            let rendered: Vec<String> = tokens.iter().map(Value::to_string).collect();
            results.push(self.dispatch_tokens(&join_tokens(&rendered), &tokens)?);
        }
        Ok(Reply::Batch(results))
    }
}

/// A refused definition is answered with its message; success is silent.
pub(super) fn define_reply(staged: Result<(), DefineError>) -> Reply {
    match staged {
        Ok(()) => Reply::Null,
        Err(e) => Reply::Text(e.to_string()),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::HandlerResult;
    use serde_json::json;

    fn say(inv: &mut Invocation<'_>) -> HandlerResult {
        Ok(inv.arg_text("string").into())
    }

    fn jarvis() -> Interpreter {
        let mut j = Interpreter::new();
        j.add_command(Command::new("run hello", |_| Ok("Hello".into())));
        j.add_command(Command::new("run world", |_| Ok("world".into())));
        j.add_command(Command::new("load $language", |inv| {
            Ok(format!("Running, {}", inv.arg_text("language")).into())
        }));
        j.add_command(Command::new("say $string", say));
        j
    }

    fn send_all(j: &mut Interpreter, lines: &[&str]) -> Vec<Reply> {
        lines.iter().map(|l| j.send(l).unwrap()).collect()
    }

    // -- dispatch --------------------------------------------------------------

    #[test]
    fn simple_command() {
        let mut j = Interpreter::new();
        j.add_command(Command::new("simple", |inv| Ok(format!("tested: {}", inv.line).into())));
        assert_eq!(j.send("simple").unwrap(), Reply::text("tested: simple"));
        assert_eq!(j.send("foo").unwrap(), Reply::Null);
        assert_eq!(j.send("").unwrap(), Reply::Null);
    }

    #[test]
    fn static_phrases_match_exactly() {
        let mut j = Interpreter::new();
        j.add_command(Command::new("how are you", |_| Ok("I'm fine".into())));
        j.add_command(Command::new("how are you doing", |_| Ok("I'm doing well".into())));
        assert_eq!(j.send("how are you").unwrap(), Reply::text("I'm fine"));
        assert_eq!(j.send("how are").unwrap(), Reply::Null);
        assert_eq!(j.send("how are you doing").unwrap(), Reply::text("I'm doing well"));
    }

    #[test]
    fn handler_sees_tokens_and_args() {
        let mut j = Interpreter::new();
        j.add_command(Command::new("say hello to $name now", |inv| {
            let tokens: Vec<String> = inv.tokens.iter().map(Value::to_string).collect();
            assert_eq!(tokens, vec!["say", "hello", "to", "John Doe", "now"]);
            assert_eq!(inv.args.len(), 1);
            Ok(format!("Hello {}", inv.arg_text("name")).into())
        }));
        assert_eq!(
            j.send(r#"say hello to "John Doe" now"#).unwrap(),
            Reply::text("Hello John Doe")
        );
    }

    #[test]
    fn aliases() {
        let mut j = Interpreter::new();
        j.add_command(
            Command::new("greet $name", |inv| Ok(format!("Hello {}", inv.arg_text("name")).into()))
                .alias("hello $name how are you"),
        );
        assert_eq!(j.send(r#"greet "John Doe""#).unwrap(), Reply::text("Hello John Doe"));
        assert_eq!(
            j.send(r#"hello "John Doe" how are you"#).unwrap(),
            Reply::text("Hello John Doe")
        );
    }

    #[test]
    fn handler_error_propagates() {
        let mut j = Interpreter::new();
        j.add_command(Command::new("fail", |_| Err("broken".into())));
        let err = j.send("fail").unwrap_err();
        assert!(matches!(err, JarvisError::Handler { ref command, .. } if command == "fail"));
    }

    // -- interactive commands --------------------------------------------------

    fn repl(inv: &mut Invocation<'_>) -> HandlerResult {
        if !inv.in_dialogue() {
            inv.start();
            inv.set_state("status", "awaitInput");
            return Ok("Enter input: ".into());
        }
        match inv.state("status").and_then(Value::as_text) {
            Some("awaitInput") => Ok(format!("Handled: {}", inv.line).into()),
            _ => Ok(Reply::Null),
        }
    }

    #[test]
    fn interactive_dialogue() {
        let mut j = Interpreter::new();
        j.add_command(Command::new("repl", repl));
        assert_eq!(j.send("repl").unwrap(), Reply::text("Enter input: "));
        assert_eq!(j.active_command(), Some("repl"));
        assert_eq!(j.send("bar").unwrap(), Reply::text("Handled: bar"));
        // Continuation lines are not re-matched, even if they look like commands.
        assert_eq!(j.send("repl").unwrap(), Reply::text("Handled: repl"));
        assert_eq!(j.send("..").unwrap(), Reply::text("Done with repl."));
        assert!(j.session().is_idle());
        assert!(j.state("status").is_none());
    }

    #[test]
    fn handler_can_end_dialogue() {
        let mut j = Interpreter::new();
        j.add_command(Command::new("ask", |inv| {
            if inv.in_dialogue() {
                let answer = inv.line.to_owned();
                inv.end();
                return Ok(format!("Thanks for {answer}").into());
            }
            inv.start();
            Ok("Question?".into())
        }));
        j.send("ask").unwrap();
        assert_eq!(j.send("cake").unwrap(), Reply::text("Thanks for cake"));
        assert!(j.session().is_idle());
        assert_eq!(j.send("cake").unwrap(), Reply::Null);
    }

    #[test]
    fn start_unknown_command_is_refused() {
        let mut j = Interpreter::new();
        assert!(!j.start_command("nope"));
        assert!(j.session().is_idle());
        j.set_state("ignored", "x");
        assert!(j.state("ignored").is_none());
    }

    // -- macros ----------------------------------------------------------------

    #[test]
    fn initialise_macro() {
        let mut j = jarvis();
        assert_eq!(j.send("how to programme").unwrap(), Reply::text(MACRO_OPEN));
        assert!(matches!(j.session(), Session::RecordingMacro { .. }));
    }

    #[test]
    fn macro_without_variables() {
        let mut j = jarvis();
        let replies = send_all(&mut j, &["how to write", "run hello", "run world", "end"]);
        assert_eq!(replies[3], Reply::text("Macro \"write\" has been added."));
        assert_eq!(j.send("write").unwrap(), Reply::from(vec!["Hello", "world"]));
    }

    #[test]
    fn macro_with_multiple_variables() {
        let mut j = jarvis();
        send_all(&mut j, &["how to code $language $message", "load $language", "say $message", "end"]);
        assert_eq!(
            j.send(r#"code JavaScript "Hello World""#).unwrap(),
            Reply::from(vec!["Running, JavaScript", "Hello World"])
        );
    }

    #[test]
    fn invalid_line_while_recording() {
        let mut j = jarvis();
        j.send("how to existing macro").unwrap();
        assert_eq!(j.send("invalid command").unwrap(), Reply::text(MACRO_INVALID_LINE));
        assert!(matches!(j.session(), Session::RecordingMacro { .. }));
        j.send("run hello").unwrap();
        j.send("end").unwrap();
        assert_eq!(j.macros().get("existing macro").unwrap().lines(), &["run hello"]);
    }

    #[test]
    fn duplicate_macro_name() {
        let mut j = jarvis();
        send_all(&mut j, &["how to test $language", "run hello", "end"]);
        assert_eq!(j.send("how to test $language").unwrap(), Reply::text(MACRO_EXISTS));
        assert_eq!(j.send("how to test $other").unwrap(), Reply::text(MACRO_EXISTS));
        assert!(j.session().is_idle());
    }

    #[test]
    fn nested_macros_nest_results() {
        let mut j = jarvis();
        send_all(&mut j, &["how to inner_macro $str1 $str2", "say $str1", "say $str2", "end"]);
        send_all(
            &mut j,
            &["how to outer_macro $string1 $string2 $string3", "say $string1", "inner_macro $string2 $string3", "end"],
        );
        let reply = j
            .send(r#"outer_macro "Normal Command" "Inner Command 1" "Inner Command 2""#)
            .unwrap();
        assert_eq!(
            reply.to_json(),
            json!(["Normal Command", ["Inner Command 1", "Inner Command 2"]])
        );
    }

    #[test]
    fn unmatched_sub_command_yields_null_and_continues() {
        let mut j = jarvis();
        let mac = Macro::new("try $what", vec!["say $what".into(), "nothing here".into(), "load $what".into()]);
        let args = Args::from([("what".to_owned(), Value::text("x"))]);
        let reply = j.run_macro(&mac, &args).unwrap();
        assert_eq!(reply.to_json(), json!(["x", null, "Running, x"]));
    }

    #[test]
    fn macro_depth_limit() {
        let mut cfg = Config::default();
        cfg.max_macro_depth = 1;
        let mut j = Interpreter::with_config(cfg);
        j.add_command(Command::new("say $string", say));
        send_all(&mut j, &["how to inner $x", "say $x", "end"]);
        send_all(&mut j, &["how to outer $x", "inner $x", "end"]);
        assert_eq!(j.send("inner a").unwrap(), Reply::from(vec!["a"]));
        let err = j.send("outer a").unwrap_err();
        assert!(matches!(err, JarvisError::MacroDepth { limit: 1, .. }));
        // Depth is restored after the failure.
        assert_eq!(j.send("inner b").unwrap(), Reply::from(vec!["b"]));
    }

    // -- constants -------------------------------------------------------------

    #[test]
    fn define_and_use_constants() {
        let mut j = jarvis();
        assert_eq!(j.send("in this context").unwrap(), Reply::text(CONSTANTS_OPEN));
        send_all(&mut j, &[r#"NAME is "JARVIS""#, r#"VERSION is "1""#, r#"JOB_ID is "255""#, r#"_IS_LOADED is "TRUE""#]);
        assert_eq!(
            j.send(r#"Author is "John""#).unwrap(),
            Reply::text("A constant name should be in block letters.")
        );
        assert_eq!(
            j.send("end").unwrap(),
            Reply::text(r#"Constants "NAME,VERSION,JOB_ID,_IS_LOADED" have been added."#)
        );
        assert_eq!(j.send("say $NAME").unwrap(), Reply::text("JARVIS"));
        assert_eq!(j.send("say $TYPE").unwrap(), Reply::text("$TYPE"));
    }

    #[test]
    fn redefine_constant_is_refused() {
        let mut j = jarvis();
        send_all(&mut j, &["in this context", r#"NAME is "JARVIS""#, "end"]);
        j.send("in this context").unwrap();
        assert_eq!(
            j.send(r#"NAME is "X""#).unwrap(),
            Reply::text("'NAME' constant already exists!")
        );
        assert_eq!(j.send("NAME s JARVIS").unwrap(), Reply::Null);
        assert_eq!(j.send("end").unwrap(), Reply::text(NO_CONSTANTS));
        assert_eq!(j.send("say $NAME").unwrap(), Reply::text("JARVIS"));
    }

    #[test]
    fn staged_constants_invisible_until_end() {
        let mut j = jarvis();
        send_all(&mut j, &["in this context", r#"NAME is "JARVIS""#]);
        assert!(j.constants().get("NAME").is_none());
        j.send("end").unwrap();
        assert_eq!(j.constants().get("NAME"), Some(&Value::text("JARVIS")));
    }

    #[test]
    fn constants_inside_macros() {
        let mut j = jarvis();
        send_all(&mut j, &["in this context", r#"NAME is "JARVIS""#, r#"VERSION is "1""#, r#"JOB_ID is "255""#, "end"]);
        send_all(&mut j, &["how to describe $string", "say $string", "say $VERSION", "say $JOB_ID", "end"]);
        assert_eq!(
            j.send("describe $NAME").unwrap(),
            Reply::from(vec!["JARVIS", "1", "255"])
        );
    }

    #[test]
    fn structured_constant_reaches_handler_intact() {
        let mut j = Interpreter::new();
        j.add_command(Command::new("port of $cfg", |inv| {
            let port = inv.arg("cfg").and_then(Value::as_structured).map(|v| v["port"].clone());
            Ok(port.map(Reply::from).unwrap_or_default())
        }));
        j.constants_mut()
            .define("CONFIG", Value::Structured(json!({"port": 8080})))
            .unwrap();
        send_all(&mut j, &["in this context", "ALIAS is $CONFIG", "end"]);
        assert_eq!(j.send("port of $ALIAS").unwrap(), Reply::Structured(json!(8080)));
    }

    #[test]
    fn multi_word_unquoted_value() {
        let mut j = jarvis();
        send_all(&mut j, &["in this context", "OWNER is John Doe", "end"]);
        assert_eq!(j.send("say $OWNER").unwrap(), Reply::text("John Doe"));
    }
}
