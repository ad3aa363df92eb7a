//! Constants: write-once global values and `$NAME` substitution.
//!
//! Constants are declared inside `in this context` … `end` blocks.  While a
//! block is open its definitions sit in a [`PendingScope`] owned by the
//! script that opened it; nothing is visible to lookups until `end` commits
//! the scope into the global [`ConstantStore`].
//!
//! A reference is `$` followed by an uppercase letter or `_`, then any of
//! `A-Z`, `0-9`, `_`.  Lowercase `$name` is left alone: those belong to
//! command and macro templates.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

use regex::Regex;

use crate::script::Value;

fn reference_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$[A-Z_][0-9A-Z_]*").expect("static regex"))
}

fn name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z_][0-9A-Z_]*$").expect("static regex"))
}

/// `true` if `key` is a legal constant name (block letters, digits, `_`).
pub fn is_valid_name(key: &str) -> bool {
    name_re().is_match(key)
}

/// Why a definition was refused.  The display text is the user-facing reply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefineError {
    #[error("A constant name should be in block letters.")]
    InvalidName(String),
    #[error("'{0}' constant already exists!")]
    Duplicate(String),
}

// ── ConstantStore ─────────────────────────────────────────────────────────────

/// Committed, globally visible constants.
#[derive(Debug, Default)]
pub struct ConstantStore {
    values: HashMap<String, Value>,
}

impl ConstantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Constants sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        let mut entries: Vec<_> = self.values.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }

    /// Define a constant directly, bypassing the pending-scope protocol.
    ///
    /// Embedders use this to seed values before any script runs.
    pub fn define(&mut self, key: impl Into<String>, value: Value) -> Result<(), DefineError> {
        let key = key.into();
        if !is_valid_name(&key) {
            return Err(DefineError::InvalidName(key));
        }
        if self.values.contains_key(&key) {
            return Err(DefineError::Duplicate(key));
        }
        self.values.insert(key, value);
        Ok(())
    }

    // ── Resolution ────────────────────────────────────────────────────────────

    /// Substitute constant references in `text`.
    ///
    /// If the whole of `text` is one reference to a defined constant, its
    /// stored value is returned as-is, structured or not.  Otherwise every
    /// defined reference is replaced by its display form and the result is
    /// text.  Undefined references are left verbatim.
    pub fn resolve(&self, text: &str) -> Value {
        if let Some(m) = reference_re().find(text) {
            if m.start() == 0 && m.end() == text.len() {
                if let Some(v) = self.values.get(&text[1..]) {
                    return v.clone();
                }
            }
        } else {
            return Value::text(text);
        }
        let replaced = reference_re().replace_all(text, |caps: &regex::Captures<'_>| {
            let whole = &caps[0];
            match self.values.get(&whole[1..]) {
                Some(v) => v.to_string(),
                None => whole.to_owned(),
            }
        });
        Value::Text(replaced.into_owned())
    }

    /// Resolve each token independently.
    pub fn resolve_tokens<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<Value> {
        tokens.iter().map(|t| self.resolve(t.as_ref())).collect()
    }
}

// ── PendingScope ──────────────────────────────────────────────────────────────

/// Constants staged inside one `in this context` block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingScope {
    /// Script that opened the block; `None` for interactive input.
    pub script: Option<PathBuf>,
    staged: Vec<(String, Value)>,
}

impl PendingScope {
    pub fn new(script: Option<PathBuf>) -> Self {
        Self { script, staged: Vec::new() }
    }

    /// Stage `key`, checking the naming rule and duplicates against both the
    /// committed store and this scope.
    pub fn stage(
        &mut self,
        key: &str,
        value: Value,
        store: &ConstantStore,
    ) -> Result<(), DefineError> {
        if !is_valid_name(key) {
            return Err(DefineError::InvalidName(key.to_owned()));
        }
        if store.contains(key) || self.staged.iter().any(|(k, _)| k == key) {
            return Err(DefineError::Duplicate(key.to_owned()));
        }
        self.staged.push((key.to_owned(), value));
        Ok(())
    }

    pub fn staged(&self) -> &[(String, Value)] {
        &self.staged
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Move every staged pair into `store`, in staging order.
    ///
    /// A key committed elsewhere since it was staged (an import that ran
    /// inside this block) is skipped and reported in `Commit::rejected`.
    pub fn commit(self, store: &mut ConstantStore) -> Commit {
        let mut commit = Commit::default();
        for (key, value) in self.staged {
            match store.define(key.clone(), value) {
                Ok(()) => commit.added.push(key),
                Err(_) => commit.rejected.push(key),
            }
        }
        commit
    }
}

/// Outcome of [`PendingScope::commit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commit {
    pub added: Vec<String>,
    pub rejected: Vec<String>,
}

// ── Tests ─────────────────────────────────────────────────────────────────────
