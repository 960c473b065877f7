//! shunt - evaluate expressions from the command line
//!
//! Usage:
//!   shunt "2 + 2 * 2"   Evaluate the arguments as one expression
//!   shunt               Read expressions from stdin, one per line
//!
//! Ctrl-C cancels the expression being evaluated. RUST_LOG controls
//! log verbosity.

use std::env;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use shunt::{CancelToken, Engine, EvalError, Token, TokenStack};
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_help() {
    println!(
        r#"shunt-{} Streaming expression evaluator

USAGE:
    shunt <expression>      Evaluate and print the results
    shunt                   Read expressions from stdin, one per line
    shunt --help            Show this help message
    shunt --version         Show version

SYNTAX:
    2 + 2 * 2               Arithmetic with usual precedence
    min(3 + 1, 2)           Function calls
    10 >= 5 || ivar == 0    Comparisons and boolean logic
    j.one.four.1            JSON navigation through variables
    "text" == svar          String literals and variables

Sample variables preloaded in this demo: svar, ivar, fvar, j."#,
        VERSION
    );
}

/// Engine preloaded with sample bindings for interactive use.
fn demo_engine() -> Engine {
    let mut engine = Engine::with_defaults();
    engine
        .set_variable("svar", "test")
        .set_variable("ivar", 123)
        .set_variable("fvar", 321.0)
        .set_variable("j", r#"{"one": {"two": 3, "four": [5, "six", 7]}}"#);
    engine.register_function("add", |stack: &mut TokenStack| {
        let rhs = stack.pop();
        let lhs = stack.pop();
        match (lhs.as_int(), rhs.as_int()) {
            (Some(a), Some(b)) => {
                stack.push(Token::int(a.wrapping_add(b)));
                Ok(())
            }
            _ => Err(EvalError::Handler("'add' expects number operands".into())),
        }
    });
    engine
}

/// Install a fresh token as the cancellation target for Ctrl-C.
fn fresh_token(current: &Arc<Mutex<CancelToken>>) -> CancelToken {
    let token = CancelToken::new();
    if let Ok(mut slot) = current.lock() {
        *slot = token.clone();
    }
    token
}

fn run(engine: &Engine, current: &Arc<Mutex<CancelToken>>, input: &str) -> ExitCode {
    let cancel = fresh_token(current);
    let mut failed = false;
    for result in engine.eval(&cancel, input) {
        match result {
            Ok(value) => println!("{}", value),
            Err(err) => {
                eprintln!("error: {}", err);
                failed = true;
            }
        }
    }
    if cancel.is_cancelled() {
        eprintln!("cancelled");
        return ExitCode::FAILURE;
    }
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn repl(engine: &Engine, current: &Arc<Mutex<CancelToken>>) -> ExitCode {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        let _ = stdout.flush();
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                eprintln!("error: {}", err);
                break;
            }
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let cancel = fresh_token(current);
        for result in engine.eval(&cancel, line) {
            match result {
                Ok(value) => println!("{}", value),
                Err(err) => eprintln!("error: {}", err),
            }
        }
        if cancel.is_cancelled() {
            eprintln!("cancelled");
        }
    }
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Ctrl-C cancels whichever evaluation currently owns the slot.
    let current = Arc::new(Mutex::new(CancelToken::new()));
    {
        let current = Arc::clone(&current);
        let _ = ctrlc::set_handler(move || {
            if let Ok(token) = current.lock() {
                token.cancel();
            }
        });
    }

    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("--help") | Some("-h") => {
            print_help();
            ExitCode::SUCCESS
        }
        Some("--version") => {
            println!("shunt {}", VERSION);
            ExitCode::SUCCESS
        }
        Some(_) => run(&demo_engine(), &current, &args.join(" ")),
        None => repl(&demo_engine(), &current),
    }
}
