//! Runtime values and command replies.
//!
//! Every bound argument and every constant is a [`Value`]: usually a plain
//! string, but constants imported from JSON (or aliased from one) carry a
//! structured payload that handlers receive intact.
//!
//! A [`Reply`] is what a single `send` produces.  Macros and `start` blocks
//! produce a [`Reply::Batch`] holding one entry per executed line, so callers
//! can tell "ran a command" from "ran a macro" by shape alone.

use std::fmt;

/// A constant value or a bound command argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Structured(serde_json::Value),
}

impl Default for Value {
    fn default() -> Self {
        Value::Text(String::new())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            // A JSON string is shown without its quotes; everything else compact.
            Value::Structured(serde_json::Value::String(s)) => write!(f, "{s}"),
            Value::Structured(v) => write!(f, "{v}"),
        }
    }
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Borrow the string if this is a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Structured(_) => None,
        }
    }

    /// Borrow the JSON payload if this is a `Structured` value.
    pub fn as_structured(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Structured(v) => Some(v),
            Value::Text(_) => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Structured(v)
    }
}

// ── Reply ─────────────────────────────────────────────────────────────────────

/// The result of processing one line.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Reply {
    /// No command or macro matched, or the handler returned nothing.
    #[default]
    Null,
    Text(String),
    Structured(serde_json::Value),
    /// Ordered results of a macro expansion or a script `start` block.
    Batch(Vec<Reply>),
}

impl Reply {
    pub fn text(s: impl Into<String>) -> Self {
        Reply::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Reply::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reply::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_batch(&self) -> Option<&[Reply]> {
        match self {
            Reply::Batch(items) => Some(items),
            _ => None,
        }
    }

    /// Render as JSON; `Null` becomes `null` and batches become arrays.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Reply::Null => serde_json::Value::Null,
            Reply::Text(s) => serde_json::Value::String(s.clone()),
            Reply::Structured(v) => v.clone(),
            Reply::Batch(items) => {
                serde_json::Value::Array(items.iter().map(Reply::to_json).collect())
            }
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Text(s) => write!(f, "{s}"),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl From<&str> for Reply {
    fn from(s: &str) -> Self {
        Reply::Text(s.to_owned())
    }
}

impl From<String> for Reply {
    fn from(s: String) -> Self {
        Reply::Text(s)
    }
}

impl From<serde_json::Value> for Reply {
    fn from(v: serde_json::Value) -> Self {
        Reply::Structured(v)
    }
}

impl From<Value> for Reply {
    fn from(v: Value) -> Self {
        match v {
            Value::Text(s) => Reply::Text(s),
            Value::Structured(v) => Reply::Structured(v),
        }
    }
}

impl From<&Value> for Reply {
    fn from(v: &Value) -> Self {
        Reply::from(v.clone())
    }
}

impl From<()> for Reply {
    fn from(_: ()) -> Self {
        Reply::Null
    }
}

impl<T: Into<Reply>> From<Option<T>> for Reply {
    fn from(v: Option<T>) -> Self {
        v.map_or(Reply::Null, Into::into)
    }
}

impl<T: Into<Reply>> From<Vec<T>> for Reply {
    fn from(items: Vec<T>) -> Self {
        Reply::Batch(items.into_iter().map(Into::into).collect())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
