//! CLI entry point for the AIP compiler.

use std::process::ExitCode;

mod app;
mod app_config;
mod cli;
mod output;

/// Process outcome, mapped to the exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Compiled output written (exit 0).
    Success,
    /// Output written but incomplete under `--strict` (exit 2).
    Partial,
    /// Nothing compiled or a fatal error (exit 1).
    Failure,
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        match exit {
            ProcessExit::Success => ExitCode::SUCCESS,
            ProcessExit::Failure => ExitCode::from(1),
            ProcessExit::Partial => ExitCode::from(2),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match app::runtime::run_compiler().await {
        Ok(exit) => exit.into(),
        Err(error) => {
            tracing::error!("run aborted: {error:#}");
            eprintln!("Error: {error:#}");
            ProcessExit::Failure.into()
        }
    }
}
