// vecta - A small expression language for numeric and vector computation
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Command-line runner and REPL.
//!
//! Usage: `vecta [FILE] [--seed N] [--max-steps N] [--trace] [--disasm] [--json]`

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

use vecta_core::InterpreterConfig;
use vecta_embed::{Engine, RunReport};
use vecta_parser::{Diagnostic, ParseResult, parse};
use vecta_vm::{Interpreter, compile, interpret, start_interpreting, step_program};

#[derive(Parser, Debug)]
#[command(name = "vecta", version)]
#[command(about = "Run a Vecta program, or start a REPL when no file is given")]
struct Args {
    /// Program to run
    file: Option<PathBuf>,

    /// Seed for random()
    #[arg(long)]
    seed: Option<u64>,

    /// Stop a run after this many instructions
    #[arg(long = "max-steps")]
    max_steps: Option<u64>,

    /// Print every instruction as it executes
    #[arg(long)]
    trace: bool,

    /// Print the compiled instructions before running
    #[arg(long)]
    disasm: bool,

    /// Print the run report as JSON instead of text
    #[arg(long)]
    json: bool,
}

impl Args {
    fn config(&self) -> InterpreterConfig {
        let mut config = InterpreterConfig::default();
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(max_steps) = self.max_steps {
            config.max_steps = max_steps;
        }
        config
    }
}

/// Logging goes to stderr, filtered by `VECTA_LOG` (default `warn`).
fn init_logging() {
    let filter = EnvFilter::try_from_env("VECTA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_logging();
    let args = Args::parse();

    let ok = match &args.file {
        Some(path) => match run_file(path, &args) {
            Ok(ok) => ok,
            Err(e) => {
                eprintln!("error reading '{}': {}", path.display(), e);
                false
            }
        },
        None => match run_repl(args.config()) {
            Ok(()) => true,
            Err(e) => {
                eprintln!("error: {}", e);
                false
            }
        },
    };
    if !ok {
        process::exit(1);
    }
}

// ============================================================================
// File runner
// ============================================================================

/// Run a program file. Returns whether it completed without errors.
fn run_file(path: &Path, args: &Args) -> io::Result<bool> {
    let source = fs::read_to_string(path)?;
    let parsed = parse(&source);
    debug!(
        path = %path.display(),
        statements = parsed.statements.len(),
        errors = parsed.errors.len(),
        "parsed"
    );

    if args.disasm {
        disassemble(&parsed);
    }

    let interp = if args.trace {
        trace_run(parsed, args.config())
    } else {
        interpret(parsed, None, args.config())
    };
    let report = RunReport::from(&interp);

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("error: cannot serialize report: {}", e),
        }
    } else {
        for entry in &report.outputs.prints {
            println!("{}", entry.value);
        }
        let name = path.display().to_string();
        print_diagnostics(&name, &report);
    }
    Ok(report.is_ok())
}

fn disassemble(parsed: &ParseResult) {
    if !parsed.errors.is_empty() {
        return;
    }
    match compile(parsed) {
        Ok(program) => print!("{}", program.disassemble(parsed)),
        Err(e) => eprintln!("error: {}", e),
    }
}

/// Step the program one instruction at a time, printing each instruction
/// before it runs.
fn trace_run(parsed: ParseResult, config: InterpreterConfig) -> Interpreter {
    let mut interp = start_interpreting(parsed, true, None, config);
    loop {
        if let (Some(step), Some(position)) = (interp.current_step(), interp.current_position()) {
            let depth = interp.call_stack().len().saturating_sub(1);
            eprintln!(
                "{:<8} {:indent$}{}  [sp={}]",
                position.to_string(),
                "",
                step.op,
                interp.stack_pointer(),
                indent = depth * 2
            );
        }
        if !step_program(&mut interp) {
            break;
        }
    }
    interp
}

fn format_diagnostic(file: &str, severity: &str, diagnostic: &Diagnostic) -> String {
    format!(
        "{}:{}: {}: {}",
        file, diagnostic.position, severity, diagnostic.message
    )
}

fn print_diagnostics(file: &str, report: &RunReport) {
    for warning in &report.warnings {
        eprintln!("{}", format_diagnostic(file, "warning", warning));
    }
    for error in &report.errors {
        eprintln!("{}", format_diagnostic(file, "error", error));
    }
}

// ============================================================================
// REPL
// ============================================================================

/// Each entry is appended to the program and the whole program is re-run.
/// An entry that fails is reported and dropped.
fn run_repl(config: InterpreterConfig) -> io::Result<()> {
    println!("Vecta v{}", env!("CARGO_PKG_VERSION"));
    println!("Enter statements; :reset clears the program, :quit exits.");

    let mut engine = Engine::with_config(config);
    let mut program = String::new();
    let mut printed = 0;
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("vecta> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            return Ok(());
        }
        let entry = line.trim_end();
        match entry.trim() {
            "" => continue,
            ":quit" | ":q" => return Ok(()),
            ":reset" => {
                program.clear();
                printed = 0;
                engine.reset();
                continue;
            }
            _ => {}
        }

        let candidate = if program.is_empty() {
            entry.to_string()
        } else {
            format!("{}\n{}", program, entry)
        };
        let report = engine.run(&candidate);
        debug!(steps = report.steps, "repl run");
        print_diagnostics("<repl>", &report);
        if !report.is_ok() {
            continue;
        }

        for print_entry in report.outputs.prints.iter().skip(printed) {
            println!("{}", print_entry.value);
        }
        printed = report.outputs.prints.len();
        if let Some(value) = &report.value {
            println!("{}", value);
        }
        program = candidate;
    }
}
