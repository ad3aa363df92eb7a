//! Line classification.
//!
//! Every input line is classified once, up front, into a [`LineKind`].  The
//! session state machine then decides what each kind means in the current
//! state; for instance `KEY is value` defines a constant only while
//! constants are being recorded and is an ordinary command line otherwise.
//!
//! | Line | Kind |
//! |------|------|
//! | (blank) | [`LineKind::Blank`] |
//! | `..` | [`LineKind::ExitDialogue`] |
//! | `start` | [`LineKind::Start`] |
//! | `end` | [`LineKind::End`] |
//! | `how to <template>` | [`LineKind::BeginMacro`] |
//! | `in this context` | [`LineKind::BeginConstants`] |
//! | `<name> is from '<path>'` | [`LineKind::Import`] |
//! | `<KEY> is <value>` | [`LineKind::Define`] |
//! | anything else | [`LineKind::Plain`] |

use std::sync::OnceLock;

use regex::Regex;

fn import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^(\S+)\s+is\s+from\s+(?:'([^']*)'|"([^"]*)")$"#).expect("static regex")
    })
}

fn define_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\S+)\s+is\s+(.+)$").expect("static regex"))
}

pub const MACRO_PREFIX: &str = "how to ";
pub const CONSTANTS_KEYWORD: &str = "in this context";

/// The syntactic shape of one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    ExitDialogue,
    Start,
    End,
    /// Template following `how to`.
    BeginMacro(&'a str),
    BeginConstants,
    Import { name: &'a str, path: &'a str },
    Define { key: &'a str, value: &'a str },
    Plain(&'a str),
}

impl LineKind<'_> {
    /// `true` for lines that open a recording block.  Scripts forward these
    /// even outside a `start` block.
    pub fn opens_context(&self) -> bool {
        matches!(self, LineKind::BeginMacro(_) | LineKind::BeginConstants)
    }
}

/// Classify `line`.  Leading and trailing whitespace is ignored.
pub fn classify(line: &str) -> LineKind<'_> {
    let line = line.trim();
    match line {
        "" => return LineKind::Blank,
        ".." => return LineKind::ExitDialogue,
        "start" => return LineKind::Start,
        "end" => return LineKind::End,
        CONSTANTS_KEYWORD => return LineKind::BeginConstants,
        _ => {}
    }
    if let Some(template) = line.strip_prefix(MACRO_PREFIX) {
        let template = template.trim();
        if !template.is_empty() {
            return LineKind::BeginMacro(template);
        }
    }
    if let Some(caps) = import_re().captures(line) {
        if let (Some(name), Some(path)) = (caps.get(1), caps.get(2).or_else(|| caps.get(3))) {
            return LineKind::Import { name: name.as_str(), path: path.as_str() };
        }
    }
    if let Some(caps) = define_re().captures(line) {
        if let (Some(key), Some(value)) = (caps.get(1), caps.get(2)) {
            return LineKind::Define { key: key.as_str(), value: value.as_str().trim() };
        }
    }
    LineKind::Plain(line)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords() {
        assert_eq!(classify(""), LineKind::Blank);
        assert_eq!(classify("  .. "), LineKind::ExitDialogue);
        assert_eq!(classify("start"), LineKind::Start);
        assert_eq!(classify("    end"), LineKind::End);
        assert_eq!(classify("in this context"), LineKind::BeginConstants);
    }

    #[test]
    fn macro_header() {
        assert_eq!(classify("how to greet $name"), LineKind::BeginMacro("greet $name"));
        assert!(classify("how to write").opens_context());
    }

    #[test]
    fn bare_how_to_is_plain() {
        assert_eq!(classify("how to"), LineKind::Plain("how to"));
        assert_eq!(classify("how are you"), LineKind::Plain("how are you"));
    }

    #[test]
    fn keyword_prefixes_are_not_keywords() {
        assert_eq!(classify("end BOT"), LineKind::Plain("end BOT"));
        assert_eq!(classify("start jarvis"), LineKind::Plain("start jarvis"));
    }

    #[test]
    fn define_line() {
        assert_eq!(
            classify(r#"NAME is "JARVIS""#),
            LineKind::Define { key: "NAME", value: r#""JARVIS""# }
        );
    }

    #[test]
    fn import_single_and_double_quotes() {
        assert_eq!(
            classify("greetings is from './lib/greet.jarvis'"),
            LineKind::Import { name: "greetings", path: "./lib/greet.jarvis" }
        );
        assert_eq!(
            classify(r#"CONFIG is from "config.json""#),
            LineKind::Import { name: "CONFIG", path: "config.json" }
        );
    }

    #[test]
    fn malformed_define_is_plain() {
        assert_eq!(classify("NAME s JARVIS"), LineKind::Plain("NAME s JARVIS"));
    }
}
