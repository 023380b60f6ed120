//! Merges CLI flags, the config file and built-in defaults.
//!
//! Precedence: CLI flag, then config file, then default.

use std::path::PathBuf;

use aip_core::CompileSettings;
use aip_core::period::Period;

use crate::app_config::FileConfig;
use crate::cli::Args;

/// Run log written next to the working directory unless configured.
pub(crate) const DEFAULT_LOG_FILE: &str = "aip_download.log";

#[derive(Debug, Clone)]
pub(crate) struct ResolvedConfig {
    pub(crate) settings: CompileSettings,
    pub(crate) log_file: PathBuf,
}

pub(crate) fn resolve_config(args: &Args, file: Option<&FileConfig>) -> ResolvedConfig {
    let file = file.cloned().unwrap_or_default();
    let defaults = CompileSettings::default();

    let settings = CompileSettings {
        base_url: args
            .base_url
            .clone()
            .or(file.base_url)
            .unwrap_or(defaults.base_url),
        as_of: args.as_of.unwrap_or_else(Period::current),
        lookback_months: args
            .lookback
            .or(file.lookback_months)
            .unwrap_or(defaults.lookback_months),
        iteration_bound: defaults.iteration_bound,
        workers: args
            .workers
            .or(file.workers)
            .map_or(defaults.workers, usize::from),
        probe_attempts: file.probe_attempts.unwrap_or(defaults.probe_attempts),
        fetch_attempts: file.fetch_attempts.unwrap_or(defaults.fetch_attempts),
        connect_timeout_secs: file
            .connect_timeout_secs
            .unwrap_or(defaults.connect_timeout_secs),
        read_timeout_secs: file.read_timeout_secs.unwrap_or(defaults.read_timeout_secs),
        user_agent: file.user_agent,
        min_file_size: args
            .min_file_size
            .or(file.min_file_size)
            .unwrap_or(defaults.min_file_size),
        output_dir: args
            .output_dir
            .clone()
            .or(file.output_dir)
            .unwrap_or(defaults.output_dir),
        parts_dir: args.parts_dir.clone().or(file.parts_dir),
    };

    let log_file = args
        .log_file
        .clone()
        .or(file.log_file)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    ResolvedConfig { settings, log_file }
}

/// Stderr level from `-q`/`-v`; `RUST_LOG` still takes priority.
pub(crate) fn stderr_log_level(args: &Args) -> &'static str {
    if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// The log file keeps at least `info` so probes and downloads are recorded.
pub(crate) fn file_log_level(args: &Args) -> &'static str {
    match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn args(argv: &[&str]) -> Args {
        let mut full = vec!["aip-compiler"];
        full.extend_from_slice(argv);
        Args::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_defaults_without_cli_or_file() {
        let resolved = resolve_config(&args(&[]), None);
        assert_eq!(resolved.settings.workers, 10);
        assert_eq!(resolved.settings.lookback_months, 24);
        assert_eq!(resolved.settings.min_file_size, 1024);
        assert_eq!(resolved.settings.output_dir, PathBuf::from("."));
        assert!(resolved.settings.parts_dir.is_none());
        assert_eq!(resolved.log_file, PathBuf::from("aip_download.log"));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = FileConfig {
            workers: Some(3),
            base_url: Some("http://mirror.test/aip/".into()),
            log_file: Some(PathBuf::from("/var/log/aip.log")),
            fetch_attempts: Some(5),
            ..FileConfig::default()
        };
        let resolved = resolve_config(&args(&[]), Some(&file));
        assert_eq!(resolved.settings.workers, 3);
        assert_eq!(resolved.settings.base_url, "http://mirror.test/aip/");
        assert_eq!(resolved.settings.fetch_attempts, 5);
        assert_eq!(resolved.log_file, PathBuf::from("/var/log/aip.log"));
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = FileConfig {
            workers: Some(3),
            min_file_size: Some(4096),
            output_dir: Some(PathBuf::from("/from/file")),
            ..FileConfig::default()
        };
        let resolved = resolve_config(
            &args(&["-w", "7", "--min-file-size", "0", "-o", "/from/cli"]),
            Some(&file),
        );
        assert_eq!(resolved.settings.workers, 7);
        assert_eq!(resolved.settings.min_file_size, 0);
        assert_eq!(resolved.settings.output_dir, PathBuf::from("/from/cli"));
    }

    #[test]
    fn test_as_of_flag_sets_start_period() {
        let resolved = resolve_config(&args(&["--as-of", "2025-02"]), None);
        assert_eq!(resolved.settings.as_of.to_string(), "2025-02");
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(stderr_log_level(&args(&[])), "info");
        assert_eq!(stderr_log_level(&args(&["-q"])), "error");
        assert_eq!(stderr_log_level(&args(&["-vv"])), "trace");
        assert_eq!(file_log_level(&args(&["-q"])), "info");
        assert_eq!(file_log_level(&args(&["-v"])), "debug");
    }
}
