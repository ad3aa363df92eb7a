use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::filter::{Directive, EnvFilter};

use jarvis::cli;
use jarvis::script::builtins::register_builtins;
use jarvis::{Interpreter, Reply};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = match cli::parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("jarvis: {e}");
            eprintln!("{}", cli::USAGE);
            std::process::exit(1);
        }
    };

    // ── Config (defaults → file → flags) ──────────────────────────────────────
    let (config, warnings) = match cli::resolve_config(&args) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("jarvis: {e}");
            std::process::exit(1);
        }
    };
    init_tracing(args.debug, config.events);
    for w in &warnings {
        eprintln!("jarvis: warning: config {w}");
    }

    let mut jarvis = Interpreter::with_config(config);
    register_builtins(&mut jarvis);

    // ── Startup lines (-c<line>) ──────────────────────────────────────────────
    for line in &args.commands {
        match jarvis.send(line) {
            Ok(reply) => println!("{}", reply.to_json()),
            Err(e) => eprintln!("jarvis: {e}"),
        }
    }

    // ── Scripts ───────────────────────────────────────────────────────────────
    if !args.scripts.is_empty() {
        for script in &args.scripts {
            match jarvis.run_script(script) {
                Ok(replies) => {
                    for reply in &replies {
                        println!("{}", reply.to_json());
                    }
                }
                Err(e) => {
                    eprintln!("jarvis: {e}");
                    std::process::exit(1);
                }
            }
        }
        return;
    }

    // ── Interactive ───────────────────────────────────────────────────────────
    if let Err(e) = interactive(&mut jarvis).await {
        eprintln!("jarvis: {e}");
        std::process::exit(1);
    }
}

/// `JARVIS_LOG` wins unless `-d` was given; the default is `warn`.  Script
/// events are logged at `info`, so turning them on lifts their module.
fn init_tracing(debug: bool, events: bool) {
    let mut filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("JARVIS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    if events && !debug {
        if let Ok(directive) = "jarvis::script::import=info".parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Read lines from stdin until EOF or Ctrl-C, printing every non-null reply.
async fn interactive(jarvis: &mut Interpreter) -> std::io::Result<()> {
    let is_tty = unsafe { libc::isatty(libc::STDIN_FILENO) != 0 };
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        if is_tty {
            let prompt = if jarvis.session().is_idle() { jarvis.config().prompt.as_str() } else { "... " };
            print!("{prompt}");
            std::io::stdout().flush()?;
        }
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        match jarvis.send(&line) {
            Ok(Reply::Null) => {}
            Ok(reply) => println!("{reply}"),
            Err(e) => eprintln!("jarvis: {e}"),
        }
    }
    Ok(())
}
