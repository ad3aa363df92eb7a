//! Command templates: compilation and matching.
//!
//! A template such as `say hello to $name now` compiles to an ordered list of
//! [`Slot`]s.  Literal slots must equal the input token exactly; variable
//! slots bind whatever token sits in their position.
//!
//! ## Matching rules
//!
//! | Rule | Behaviour |
//! |------|-----------|
//! | Arity | a pattern only matches input with exactly as many tokens as slots |
//! | Literals | compared verbatim (case-sensitive) against text tokens |
//! | Variables | bind the token as-is; structured tokens bind only to variables |
//! | Order | [`match_patterns`] returns the first pattern that matches |

use std::collections::HashMap;

use crate::script::Value;

/// Variable sigil used in templates and constant references.
pub const SIGIL: char = '$';

/// Arguments bound by a successful match: variable name → token.
pub type Args = HashMap<String, Value>;

// ── Slot ──────────────────────────────────────────────────────────────────────

/// One position in a compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// Literal text, or the variable name without its sigil.
    pub value: String,
    pub is_variable: bool,
}

impl Slot {
    pub fn literal(value: impl Into<String>) -> Self {
        Self { value: value.into(), is_variable: false }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self { value: name.into(), is_variable: true }
    }
}

// ── Pattern ───────────────────────────────────────────────────────────────────

/// A compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    src: String,
    slots: Vec<Slot>,
}

impl Pattern {
    /// Compile `template`.
    ///
    /// Tokens are separated by spaces; empty segments from repeated spaces are
    /// skipped.  A token starting with `$` followed by at least one character
    /// is a variable; a lone `$` is a literal.
    pub fn compile(template: &str) -> Self {
        let slots = template
            .split(' ')
            .filter(|t| !t.is_empty())
            .map(|t| match t.strip_prefix(SIGIL) {
                Some(name) if !name.is_empty() => Slot::variable(name),
                _ => Slot::literal(t),
            })
            .collect();
        Self { src: template.trim().to_owned(), slots }
    }

    /// The template this pattern was compiled from.
    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Names of the variable slots, in template order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().filter(|s| s.is_variable).map(|s| s.value.as_str())
    }

    /// `true` if both patterns accept exactly the same inputs: same arity and
    /// the same literals in the same positions.  Variable names are ignored.
    pub fn same_shape(&self, other: &Pattern) -> bool {
        self.slots.len() == other.slots.len()
            && self.slots.iter().zip(&other.slots).all(|(a, b)| {
                a.is_variable == b.is_variable && (a.is_variable || a.value == b.value)
            })
    }

    /// Match `tokens` slot by slot, stopping at the first literal mismatch.
    ///
    /// Returns the bound variables on success.  A variable that appears twice
    /// keeps the later binding.
    pub fn bind(&self, tokens: &[Value]) -> Option<Args> {
        if self.slots.len() != tokens.len() {
            return None;
        }
        let mut args = Args::new();
        for (slot, token) in self.slots.iter().zip(tokens) {
            if slot.is_variable {
                args.insert(slot.value.clone(), token.clone());
            } else if token.as_text() != Some(slot.value.as_str()) {
                return None;
            }
        }
        Some(args)
    }

    /// Like [`bind`](Self::bind) for plain string tokens.
    pub fn bind_text<S: AsRef<str>>(&self, tokens: &[S]) -> Option<Args> {
        let values: Vec<Value> = tokens.iter().map(|t| Value::text(t.as_ref())).collect();
        self.bind(&values)
    }
}

/// Try each pattern in order and return the bindings of the first match.
///
/// Order matters: a command's primary template is tried before its aliases,
/// and aliases in the order they were declared.
pub fn match_patterns(patterns: &[Pattern], tokens: &[Value]) -> Option<Args> {
    patterns.iter().find_map(|p| p.bind(tokens))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
