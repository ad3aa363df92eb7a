use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jarvis::token::tokenize;
use jarvis::{Command, Interpreter};

fn make_interp(commands: usize) -> Interpreter {
    let mut j = Interpreter::new();
    for i in 0..commands {
        j.add_command(Command::new(&format!("task{i} $arg done"), |inv| {
            Ok(inv.arg_text("arg").into())
        }));
    }
    j.add_command(Command::new("say $string", |inv| Ok(inv.arg_text("string").into())));
    for line in ["in this context", r#"NAME is "JARVIS""#, "end"] {
        let _ = j.send(line);
    }
    for line in ["how to greet $name", "say $name", "say $NAME", "end"] {
        let _ = j.send(line);
    }
    j
}

fn bench_dispatch(c: &mut Criterion) {
    let line = r#"say hello to "John Doe" with "a long quoted message" now"#;
    let mut g = c.benchmark_group("dispatch");

    g.bench_function("tokenize", |b| b.iter(|| tokenize(black_box(line))));

    for commands in [10, 100, 1000] {
        let mut j = make_interp(commands);
        g.bench_function(format!("last_command_{commands}"), |b| {
            b.iter(|| j.send(black_box("say hello")))
        });
        g.bench_function(format!("macro_{commands}"), |b| {
            b.iter(|| j.send(black_box(r#"greet "John Doe""#)))
        });
        g.bench_function(format!("no_match_{commands}"), |b| {
            b.iter(|| j.send(black_box("nothing matches this line")))
        });
    }

    g.finish();
}

criterion_group!(benches, bench_dispatch);
criterion_main!(benches);
