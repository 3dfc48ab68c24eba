//! Error handling for the `sbasic` CLI.
//!
//! The core crates raise [`sbasic_util::BasicError`] (runtime) and
//! [`sbasic_util::Diagnostic`] (parse-time) as typed values; this module
//! collapses both into a single `anyhow`-friendly path for `main` to print
//! and turn into a process exit code. Library crates never use `anyhow`
//! themselves (SPEC_FULL.md §1) — only this boundary does.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("could not read '{path}': {source}")]
    ReadSource {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{count} syntax error(s) in '{path}'")]
    Syntax { path: String, count: usize },

    #[error("runtime error: {0}")]
    Runtime(#[from] sbasic_util::BasicError),
}

pub type Result<T> = std::result::Result<T, CliError>;
