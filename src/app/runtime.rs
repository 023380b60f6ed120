use std::io::{self, IsTerminal};
use std::sync::atomic::Ordering;

use aip_core::Compiler;
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use crate::app::{config_manager, exit_handler, progress_manager, terminal};
use crate::cli::Args;
use crate::{ProcessExit, app_config, output};

pub(crate) async fn run_compiler() -> Result<ProcessExit> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    let loaded = app_config::load_config(args.config.as_deref())?;
    let resolved = config_manager::resolve_config(&args, loaded.config.as_ref());

    let log_file = terminal::open_log_file(&resolved.log_file)?;
    terminal::init_tracing(
        config_manager::stderr_log_level(&args),
        config_manager::file_log_level(&args),
        Some(log_file),
    );

    debug!(?args, "CLI arguments parsed");
    info!(
        config = ?loaded.path,
        loaded_from_file = loaded.config.is_some(),
        log_file = %resolved.log_file.display(),
        "AIP compiler starting"
    );

    let compiler = Compiler::new(resolved.settings).context("Failed to initialise compiler")?;
    let settings = compiler.settings();
    info!(
        base_url = %settings.base_url,
        as_of = %settings.as_of,
        lookback = settings.lookback_months,
        workers = settings.workers,
        output_dir = %settings.output_dir.display(),
        "compile settings"
    );

    let use_spinner = terminal::should_use_spinner(
        io::stderr().is_terminal(),
        args.quiet,
        terminal::is_dumb_terminal(),
    );
    let (progress_handle, progress_stop) =
        progress_manager::spawn_progress_ui(use_spinner, compiler.stats());

    let result = compiler.run().await;

    progress_stop.store(true, Ordering::SeqCst);
    if let Some(handle) = progress_handle {
        let _ = handle.await;
    }

    let report = result.context("Compilation failed")?;

    if args.json {
        output::print_json_report(&report)?;
    } else if !args.quiet {
        output::print_completion_summary(&report);
    }

    Ok(exit_handler::determine_exit_outcome(&report, args.strict))
}
