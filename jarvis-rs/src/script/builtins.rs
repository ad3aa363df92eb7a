//! Demo commands registered by the `jarvis` binary.
//!
//! | Template | Reply |
//! |----------|-------|
//! | `say $string` | the bound argument, text or structured |
//! | `list macros` | one line per macro template |
//! | `list constants` | JSON object of every committed constant |
//! | `repeat after me` | dialogue that echoes each line until `..` |
//! | `help`, `what can you do` | usage summary |
//!
//! Embedders are free to skip these and register their own.

use serde_json::{Map, Value as Json};

use crate::command::{Command, HandlerResult, Invocation};
use super::{interp::Interpreter, value::{Reply, Value}};

/// Register every demo command on `interp`.
pub fn register_builtins(interp: &mut Interpreter) {
    interp.add_command(Command::new("say $string", say));
    interp.add_command(Command::new("list macros", list_macros));
    interp.add_command(Command::new("list constants", list_constants));
    interp.add_command(Command::new("repeat after me", repeat));
    interp.add_command(Command::new("help", help).alias("what can you do"));
}

fn say(inv: &mut Invocation<'_>) -> HandlerResult {
    Ok(inv.arg("string").map(Reply::from).unwrap_or_default())
}

fn list_macros(inv: &mut Invocation<'_>) -> HandlerResult {
    let macros = inv.interp.macros();
    if macros.is_empty() {
        return Ok("No macros defined.".into());
    }
    let names: Vec<&str> = macros.iter().map(|m| m.name()).collect();
    Ok(names.join("\n").into())
}

fn list_constants(inv: &mut Invocation<'_>) -> HandlerResult {
    let map: Map<String, Json> = inv
        .interp
        .constants()
        .iter()
        .map(|(k, v)| (k.clone(), Reply::from(v).to_json()))
        .collect();
    Ok(Json::Object(map).into())
}

fn repeat(inv: &mut Invocation<'_>) -> HandlerResult {
    if !inv.in_dialogue() {
        inv.start();
        inv.set_state("count", "0");
        return Ok("Go ahead. Type '..' when you are done.".into());
    }
    let count = inv
        .state("count")
        .and_then(Value::as_text)
        .and_then(|c| c.parse::<u32>().ok())
        .unwrap_or(0)
        + 1;
    inv.set_state("count", count.to_string());
    let echoed: Vec<String> = inv.tokens.iter().map(Value::to_string).collect();
    Ok(format!("{count}: {}", echoed.join(" ")).into())
}

fn help(inv: &mut Invocation<'_>) -> HandlerResult {
    let mut out = String::from("Commands:\n");
    for command in inv.interp.commands().iter() {
        for pattern in command.patterns() {
            out.push_str("  ");
            out.push_str(pattern.src());
            out.push('\n');
        }
    }
    out.push_str(
        "Blocks:\n  how to <template> ... end\n  in this context ... end\n  .. leaves a dialogue",
    );
    Ok(out.into())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn jarvis() -> Interpreter {
        let mut j = Interpreter::new();
        register_builtins(&mut j);
        j
    }

    #[test]
    fn say_passes_structured_values_through() {
        let mut j = jarvis();
        j.constants_mut().define("CFG", Value::Structured(json!({"a": 1}))).unwrap();
        assert_eq!(j.send("say $CFG").unwrap(), Reply::Structured(json!({"a": 1})));
        assert_eq!(j.send("say hi").unwrap(), Reply::text("hi"));
    }

    #[test]
    fn list_macros_and_constants() {
        let mut j = jarvis();
        assert_eq!(j.send("list macros").unwrap(), Reply::text("No macros defined."));
        for line in ["how to greet $name", "say $name", "end", "in this context", "NAME is \"JARVIS\"", "end"] {
            j.send(line).unwrap();
        }
        assert_eq!(j.send("list macros").unwrap(), Reply::text("greet $name"));
        assert_eq!(j.send("list constants").unwrap(), Reply::Structured(json!({"NAME": "JARVIS"})));
    }

    #[test]
    fn repeat_counts_lines() {
        let mut j = jarvis();
        j.send("repeat after me").unwrap();
        assert_eq!(j.send("hello there").unwrap(), Reply::text("1: hello there"));
        assert_eq!(j.send("help").unwrap(), Reply::text("2: help"));
        assert_eq!(j.send("..").unwrap(), Reply::text("Done with repeat after me."));
    }

    #[test]
    fn help_alias() {
        let mut j = jarvis();
        let help = j.send("what can you do").unwrap();
        assert!(help.to_string().contains("say $string"));
        assert_eq!(help, j.send("help").unwrap());
    }
}
