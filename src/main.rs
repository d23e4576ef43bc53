//! Command-line entry point for the DAP toolchain: compiles, assembles,
//! and runs `.dap`/`.s4041`/`.i4041` programs in batch mode, or drives the
//! cooperative trace/command protocol from a plain-text console.

use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgGroup, Parser};

use dap_toolchain::assembler::assemble;
use dap_toolchain::compiler::compile_source;
use dap_toolchain::ir::SymLine;
use dap_toolchain::persistence;
use dap_toolchain::symbols::{AssignmentRecord, Symbol};
use dap_toolchain::vm::animator::{self, AnimatorHandle};
use dap_toolchain::vm::trace::{Command as TraceCommand, LogEvent, Value};
use dap_toolchain::vm::{run_batch, InputKind, Machine};

#[derive(Parser)]
#[command(name = "dap")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compiler, assembler, and virtual machine for the DAP teaching language")]
#[command(group(ArgGroup::new("mode").args(["animate", "console", "run"])))]
struct Cli {
    /// Source file: `.dap` (compiled fresh), `.s4041` (assembled), or
    /// `.i4041` (run directly).
    source: PathBuf,

    /// Serve the trace/command protocol over HTTP (out of scope: refuses
    /// with a clear message rather than pretending to serve requests).
    #[arg(long)]
    animate: bool,

    /// Drive the program interactively from this terminal.
    #[arg(long)]
    console: bool,

    /// Run to completion in batch mode (the default when no mode is given).
    #[arg(long)]
    run: bool,

    /// Bind address for `--animate`'s HTTP listener.
    #[arg(short = 'l', long, value_name = "PORT")]
    listen: Option<String>,

    /// Emit symbolic assembly instead of running.
    #[arg(long, conflicts_with = "assembly")]
    compile: bool,

    /// Emit numeric bytecode instead of running.
    #[arg(long, conflicts_with = "compile")]
    assembly: bool,

    /// Destination for `--compile`/`--assembly` output.
    #[arg(short = 'o', long)]
    out: Option<PathBuf>,

    /// Per-window instruction budget before the VM reports budget exhaustion.
    #[arg(long, default_value_t = 100_000)]
    steps: usize,

    /// Static asset directory for `--animate`'s HTTP listener.
    #[arg(long, value_name = "DIR")]
    asset: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match run(&Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("dap: {e}");
            ExitCode::FAILURE
        }
    }
}

struct Built {
    bytecode: Vec<i64>,
    program_text: String,
    symbols: Vec<Symbol>,
    assignments: Vec<AssignmentRecord>,
}

fn run(cli: &Cli) -> Result<(), String> {
    if cli.animate {
        let _ = (&cli.listen, &cli.asset);
        return Err("the HTTP observer front end is not part of this crate; use --console".into());
    }

    let built = build(cli)?;
    if cli.compile || cli.assembly {
        return Ok(());
    }

    if cli.console {
        run_console(built, cli.steps)
    } else {
        let mut machine = Machine::new(built.bytecode);
        let stdin = std::io::stdin();
        let mut input = BufReader::new(stdin.lock());
        let mut output = std::io::stdout();
        run_batch(&mut machine, &mut input, &mut output).map_err(|e| e.to_string())?;
        output.flush().map_err(|e| e.to_string())
    }
}

/// Runs the lexer→compiler→assembler stages (or loads a precompiled file),
/// handling `--compile`/`--assembly` output along the way. Returns the
/// fields a batch or console run needs regardless of which path produced
/// the bytecode.
fn build(cli: &Cli) -> Result<Built, String> {
    match cli.source.extension().and_then(|e| e.to_str()) {
        Some("i4041") => {
            let bytecode = persistence::load_bytecode(&cli.source).map_err(|e| e.to_string())?;
            Ok(Built { bytecode, program_text: String::new(), symbols: Vec::new(), assignments: Vec::new() })
        }
        Some("s4041") => {
            let lines = persistence::load_symbolic(&cli.source).map_err(|e| e.to_string())?;
            let assembled = assemble(&lines);
            warn_unresolved(&assembled.unresolved);
            if cli.assembly {
                write_bytecode(cli, &assembled.bytecode)?;
            }
            Ok(Built { bytecode: assembled.bytecode, program_text: String::new(), symbols: Vec::new(), assignments: Vec::new() })
        }
        _ => {
            let source = persistence::load_source(&cli.source).map_err(|e| e.to_string())?;
            let unit = compile_source(&source).map_err(|e| e.to_string())?;
            if cli.compile {
                write_symbolic(cli, &unit.lines)?;
                return Ok(Built { bytecode: Vec::new(), program_text: source, symbols: Vec::new(), assignments: Vec::new() });
            }
            let assembled = assemble(&unit.lines);
            warn_unresolved(&assembled.unresolved);
            if cli.assembly {
                write_bytecode(cli, &assembled.bytecode)?;
            }
            Ok(Built {
                bytecode: assembled.bytecode,
                program_text: source,
                symbols: unit.symbols.into_vec(),
                assignments: unit.assignments,
            })
        }
    }
}

fn warn_unresolved(unresolved: &[String]) {
    for label in unresolved {
        tracing::warn!("unresolved label '{label}' assembled to 0");
    }
}

fn write_symbolic(cli: &Cli, lines: &[SymLine]) -> Result<(), String> {
    let dest = destination(cli, "s4041");
    persistence::save_symbolic(&dest, lines).map_err(|e| e.to_string())
}

fn write_bytecode(cli: &Cli, code: &[i64]) -> Result<(), String> {
    let dest = destination(cli, "i4041");
    persistence::save_bytecode(&dest, code).map_err(|e| e.to_string())
}

fn destination(cli: &Cli, ext: &str) -> PathBuf {
    cli.out.clone().unwrap_or_else(|| cli.source.with_extension(ext))
}

/// A plain-text stand-in for the `animator` workspace member's `ratatui`
/// front end: drives the same handshake/restart/input/continue protocol
/// but over stdin/stdout prompts rather than a TUI.
fn run_console(built: Built, steps: usize) -> Result<(), String> {
    let handle: AnimatorHandle =
        animator::spawn(built.bytecode, built.program_text, built.symbols, built.assignments, steps);

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    handle.commands.send(TraceCommand::Handshake).map_err(|e| e.to_string())?;
    // The handshake reply only ever carries Program/Symbols/Assignments;
    // Ready accepts nothing but Restart, so the console kicks execution off
    // itself instead of prompting for a command that has only one legal value.
    let handshake_batch = handle.log.recv().map_err(|_| "VM task ended unexpectedly".to_string())?;
    handle.commands.send(TraceCommand::Restart).map_err(|e| e.to_string())?;
    let _ = handshake_batch;

    loop {
        let batch = handle.log.recv().map_err(|_| "VM task ended unexpectedly".to_string())?;
        let mut awaiting = None;
        for event in batch {
            match event {
                LogEvent::Program(_) | LogEvent::Symbols(_) | LogEvent::Assignments(_) => {}
                LogEvent::Line(n) => println!("-- line {n}"),
                LogEvent::Stored(v) => println!("   := {}", display_value(&v)),
                LogEvent::Output(v) => print!("{}", display_value(&v)),
                LogEvent::AwaitingInput => awaiting = Some(InputKind::Int),
                LogEvent::BudgetExhausted => println!("\n[budget exhausted; send Continue or Restart]"),
                LogEvent::RuntimeError(msg) => println!("\n[error: {msg}]"),
                LogEvent::Done => println!("\n[done]"),
            }
        }
        std::io::stdout().flush().map_err(|e| e.to_string())?;

        let next_cmd = if let Some(_kind) = awaiting {
            print!("> ");
            std::io::stdout().flush().map_err(|e| e.to_string())?;
            match lines.next() {
                Some(Ok(text)) => TraceCommand::Input(text),
                _ => TraceCommand::Terminate,
            }
        } else {
            print!("[c]ontinue / [r]estart / [q]uit > ");
            std::io::stdout().flush().map_err(|e| e.to_string())?;
            match lines.next() {
                Some(Ok(text)) if text.trim() == "r" => TraceCommand::Restart,
                Some(Ok(text)) if text.trim() == "q" => TraceCommand::Terminate,
                Some(Ok(_)) => TraceCommand::Continue,
                _ => TraceCommand::Terminate,
            }
        };

        let terminating = matches!(next_cmd, TraceCommand::Terminate);
        handle.commands.send(next_cmd).map_err(|e| e.to_string())?;
        if terminating {
            break;
        }
    }

    handle.join.join().map_err(|_| "VM task panicked".to_string())
}

fn display_value(v: &Value) -> String {
    match v {
        Value::Int(n) => n.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Str(s) => s.clone(),
    }
}
