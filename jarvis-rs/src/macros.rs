//! User-recorded macros.
//!
//! A macro is recorded between `how to <template>` and `end`.  The template
//! compiles exactly like a command template, so `how to greet $name` is
//! callable as `greet "John Doe"`.  The recorded lines are stored raw and are
//! only substituted when the macro runs:
//!
//! 1. constant references are resolved per token,
//! 2. `$var` references to the macro's own variables are replaced by the
//!    call-site tokens.  A token that is exactly `$var` receives the bound
//!    value untouched (structured values survive); partial occurrences are
//!    spliced in as text.  Each substituted value stays a single token, so
//!    multi-word arguments are never re-split.
//!
//! Unbound `$var` references stay verbatim.

use std::sync::OnceLock;

use regex::Regex;

use crate::constants::ConstantStore;
use crate::pattern::{Args, Pattern};
use crate::script::Value;
use crate::token::tokenize;

fn variable_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)").expect("static regex"))
}

// ── Macro ─────────────────────────────────────────────────────────────────────

/// A recorded macro.  Immutable once committed.
#[derive(Debug, Clone, PartialEq)]
pub struct Macro {
    pattern: Pattern,
    lines: Vec<String>,
}

impl Macro {
    pub fn new(template: &str, lines: Vec<String>) -> Self {
        Self { pattern: Pattern::compile(template), lines }
    }

    /// The template after `how to`, e.g. `code $language $message`.
    pub fn name(&self) -> &str {
        self.pattern.src()
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Recorded sub-command lines, unsubstituted.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Bind a call line's tokens to this macro's variables.
    pub fn bind(&self, tokens: &[Value]) -> Option<Args> {
        self.pattern.bind(tokens)
    }

    /// Tokens of recorded line `index` with constants and `args` substituted.
    pub fn expand_line(&self, index: usize, args: &Args, constants: &ConstantStore) -> Vec<Value> {
        self.lines
            .get(index)
            .map(|line| expand_line(line, args, constants))
            .unwrap_or_default()
    }
}

/// Tokenize `line` and substitute constants, then macro variables.
pub fn expand_line(line: &str, args: &Args, constants: &ConstantStore) -> Vec<Value> {
    tokenize(line)
        .iter()
        .map(|token| match constants.resolve(token) {
            Value::Text(text) => substitute_args(&text, args),
            structured => structured,
        })
        .collect()
}

/// Replace `$var` references to bound arguments inside one token.
pub fn substitute_args(token: &str, args: &Args) -> Value {
    if let Some(caps) = variable_re().captures(token) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        if whole == (0..token.len()) {
            if let Some(v) = args.get(&caps[1]) {
                return v.clone();
            }
        }
    } else {
        return Value::text(token);
    }
    let replaced = variable_re().replace_all(token, |caps: &regex::Captures<'_>| {
        match args.get(&caps[1]) {
            Some(v) => v.to_string(),
            None => caps[0].to_owned(),
        }
    });
    Value::Text(replaced.into_owned())
}

// ── MacroStore ────────────────────────────────────────────────────────────────

/// Committed macros in definition order.  Append-only.
#[derive(Debug, Default)]
pub struct MacroStore {
    macros: Vec<Macro>,
}

impl MacroStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if a macro with the same call shape as `pattern` exists.
    pub fn collides(&self, pattern: &Pattern) -> bool {
        self.macros.iter().any(|m| m.pattern.same_shape(pattern))
    }

    /// Add a macro.  Returns `false`, leaving the store unchanged, if the
    /// shape is already taken.
    pub fn add(&mut self, mac: Macro) -> bool {
        if self.collides(&mac.pattern) {
            return false;
        }
        self.macros.push(mac);
        true
    }

    /// First macro whose pattern matches `tokens`.
    pub fn find(&self, tokens: &[Value]) -> Option<(&Macro, Args)> {
        self.macros
            .iter()
            .find_map(|m| m.bind(tokens).map(|args| (m, args)))
    }

    pub fn get(&self, name: &str) -> Option<&Macro> {
        self.macros.iter().find(|m| m.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Macro> {
        self.macros.iter()
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(pairs: &[(&str, Value)]) -> Args {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn texts(tokens: &[&str]) -> Vec<Value> {
        tokens.iter().map(|t| Value::text(*t)).collect()
    }

    #[test]
    fn sub_command_without_variables() {
        let out = expand_line("run hello", &Args::new(), &ConstantStore::new());
        assert_eq!(out, texts(&["run", "hello"]));
    }

    #[test]
    fn multi_word_argument_stays_one_token() {
        let a = args(&[("code", Value::text("Hello World"))]);
        let out = expand_line("run $code", &a, &ConstantStore::new());
        assert_eq!(out, texts(&["run", "Hello World"]));
    }

    #[test]
    fn missing_argument_left_verbatim() {
        let out = expand_line("run $code", &Args::new(), &ConstantStore::new());
        assert_eq!(out, texts(&["run", "$code"]));
    }

    #[test]
    fn partial_substitution_inside_token() {
        let a = args(&[("name", Value::text("Ann"))]);
        assert_eq!(substitute_args("hi-$name!", &a), Value::text("hi-Ann!"));
    }

    #[test]
    fn similar_names_do_not_clobber() {
        let a = args(&[("str1", Value::text("one")), ("str10", Value::text("ten"))]);
        assert_eq!(substitute_args("$str10", &a), Value::text("ten"));
        assert_eq!(substitute_args("$str1/$str10", &a), Value::text("one/ten"));
    }

    #[test]
    fn structured_argument_passes_through() {
        let a = args(&[("cfg", Value::Structured(json!({"a": 1})))]);
        let out = expand_line("show $cfg", &a, &ConstantStore::new());
        assert_eq!(out[1], Value::Structured(json!({"a": 1})));
    }

    #[test]
    fn constants_resolve_before_arguments() {
        let mut c = ConstantStore::new();
        c.define("VERSION", Value::text("1")).unwrap();
        let out = expand_line("say $VERSION", &Args::new(), &c);
        assert_eq!(out, texts(&["say", "1"]));
    }

    #[test]
    fn store_rejects_same_shape() {
        let mut store = MacroStore::new();
        assert!(store.add(Macro::new("test $language", vec!["run hello".into()])));
        assert!(!store.add(Macro::new("test $lang", vec![])));
        assert!(store.add(Macro::new("test $a $b", vec![])));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn find_binds_call_tokens() {
        let mut store = MacroStore::new();
        store.add(Macro::new("greet $name", vec!["say $name".into()]));
        let (m, a) = store.find(&texts(&["greet", "John Doe"])).unwrap();
        assert_eq!(m.name(), "greet $name");
        assert_eq!(a.get("name"), Some(&Value::text("John Doe")));
        assert!(store.find(&texts(&["greet"])).is_none());
    }

    #[test]
    fn expand_line_by_index() {
        let m = Macro::new("greet $name", vec!["say $name".into()]);
        let a = args(&[("name", Value::text("Bo"))]);
        assert_eq!(m.expand_line(0, &a, &ConstantStore::new()), texts(&["say", "Bo"]));
        assert!(m.expand_line(5, &a, &ConstantStore::new()).is_empty());
    }
}
