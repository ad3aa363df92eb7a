//! Line tokenizer.
//!
//! Splits on whitespace except inside double quotes.  Quote characters are
//! dropped from the resulting token, so `say "Hello, World"` yields
//! `["say", "Hello, World"]`.  Embedded quotes cannot be escaped.

/// Split `line` into tokens.
///
/// A quoted span and any unquoted text touching it form one token
/// (`a"b c"` → `ab c`).  An unterminated quote runs to the end of the line
/// and stays one token (`say "open ended` → `["say", "open ended"]`); the
/// words after a stray quote are not split apart again.
/// `""` produces an empty token.  Blank input yields no tokens.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    let mut cur = String::new();
    // Distinguishes an empty quoted token from "no token yet".
    let mut started = false;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                started = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if started {
                    tokens.push(std::mem::take(&mut cur));
                    started = false;
                }
            }
            c => {
                cur.push(c);
                started = true;
            }
        }
    }
    if started {
        tokens.push(cur);
    }
    tokens
}

/// Render tokens back into a line that [`tokenize`] splits the same way,
/// quoting tokens that are empty or contain whitespace.
pub fn join_tokens<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|t| {
            let t = t.as_ref();
            if t.is_empty() || t.contains(char::is_whitespace) {
                format!("\"{t}\"")
            } else {
                t.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
