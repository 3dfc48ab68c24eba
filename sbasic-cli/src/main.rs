//! `sbasic` — a thin command-line host for the interpreter core.
//!
//! This binary is NOT part of the core (spec.md §1 scopes the terminal
//! IDE, screen driver, and CLI front-end out): it only reads a source
//! file, drives the lex → parse → evaluate pipeline in `sbasic-lex`,
//! `sbasic-par`, and `sbasic-eval`, and reports diagnostics to stderr.

mod error;
mod host;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use error::{CliError, Result};
use host::StdioHost;
use sbasic_util::{Handler, SourceFile};

/// Run a structured BASIC program.
#[derive(Parser, Debug)]
#[command(name = "sbasic")]
#[command(author = "sbasic contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Interpreter for a dialect of classic structured BASIC", long_about = None)]
struct Cli {
    /// Path to the .bas source file to run.
    file: PathBuf,

    /// Raise log verbosity to `debug` (statement dispatch, jump
    /// resolution). Equivalent to `RUST_LOG=debug`.
    #[arg(short, long)]
    trace: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.trace);

    match run(&cli.file) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(trace: bool) {
    let filter = if trace {
        EnvFilter::try_new("debug")
    } else {
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))
    }
    .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_thread_ids(false))
        .try_init();
}

fn run(path: &PathBuf) -> Result<()> {
    let source = std::fs::read_to_string(path).map_err(|source| CliError::ReadSource {
        path: path.display().to_string(),
        source,
    })?;

    let mut handler = Handler::new();
    let program = sbasic_par::parse(&source, &mut handler);

    if handler.has_errors() {
        let file = SourceFile::new(path.display().to_string(), source);
        let diagnostics = handler.diagnostics();
        for diagnostic in &diagnostics {
            eprintln!("{}: {} | {}", path.display(), diagnostic, file.line_text(diagnostic.line()));
        }
        return Err(CliError::Syntax {
            path: path.display().to_string(),
            count: diagnostics.len(),
        });
    }

    let mut host = StdioHost::new();
    tracing::debug!(statements = program.statements.len(), "parsed program");
    sbasic_eval::run(&program, &mut host)?;
    Ok(())
}
