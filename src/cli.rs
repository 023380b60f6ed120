//! CLI argument definitions using clap derive macros.
//!
//! Value flags are optional so the config file can supply them; built-in
//! defaults apply last (see `app::config_manager`).

use std::path::PathBuf;

use aip_core::Period;
use clap::Parser;

/// Compile the current Uruguayan AIP into a single PDF.
///
/// Finds the newest published revision of every AIP part on the DINACIA
/// site, downloads the parts in parallel and merges them in publication
/// order into `aip_uruguay_compiled_YYYY-MM.pdf`.
#[derive(Parser, Debug)]
#[command(name = "aip-compiler")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Maximum concurrent downloads (1-100) [default: 10]
    #[arg(short = 'w', long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub workers: Option<u8>,

    /// Months searched backward before a part is given up on (1-120) [default: 24]
    #[arg(long, value_name = "MONTHS", value_parser = clap::value_parser!(u32).range(1..=120))]
    pub lookback: Option<u32>,

    /// Start the search at this month instead of the current one
    #[arg(long, value_name = "YYYY-MM")]
    pub as_of: Option<Period>,

    /// Folder containing the monthly AIP subfolders
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Directory for the compiled PDF [default: .]
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Also save every downloaded part into this directory
    #[arg(long, value_name = "DIR")]
    pub parts_dir: Option<PathBuf>,

    /// Append-only run log [default: aip_download.log]
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Reject downloads smaller than this many bytes [default: 1024]
    #[arg(long, value_name = "BYTES")]
    pub min_file_size: Option<u64>,

    /// Exit with code 2 when any part is missing from the compilation
    #[arg(long)]
    pub strict: bool,

    /// Print the run report as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["aip-compiler"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert!(args.workers.is_none());
        assert!(args.lookback.is_none());
        assert!(args.as_of.is_none());
        assert!(!args.strict);
        assert!(!args.json);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["aip-compiler", "-v"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["aip-compiler", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_conflicts_with_verbose() {
        let err = Args::try_parse_from(["aip-compiler", "-q", "-v"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Args::try_parse_from(["aip-compiler", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Args::try_parse_from(["aip-compiler", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_workers_flag() {
        let args = Args::try_parse_from(["aip-compiler", "-w", "5"]).unwrap();
        assert_eq!(args.workers, Some(5));

        let args = Args::try_parse_from(["aip-compiler", "--workers", "100"]).unwrap();
        assert_eq!(args.workers, Some(100));
    }

    #[test]
    fn test_cli_workers_out_of_range_rejected() {
        for value in ["0", "101"] {
            let err = Args::try_parse_from(["aip-compiler", "-w", value]).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        }
    }

    #[test]
    fn test_cli_lookback_range() {
        let args = Args::try_parse_from(["aip-compiler", "--lookback", "120"]).unwrap();
        assert_eq!(args.lookback, Some(120));

        let err = Args::try_parse_from(["aip-compiler", "--lookback", "0"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_as_of_parses_period() {
        let args = Args::try_parse_from(["aip-compiler", "--as-of", "2025-02"]).unwrap();
        assert_eq!(args.as_of, Some(Period::new(2025, 2).unwrap()));
    }

    #[test]
    fn test_cli_as_of_rejects_bad_period() {
        let err = Args::try_parse_from(["aip-compiler", "--as-of", "2025-13"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_combined_flags() {
        let args = Args::try_parse_from([
            "aip-compiler",
            "--base-url",
            "http://127.0.0.1:9/aip",
            "-o",
            "/tmp/out",
            "--parts-dir",
            "/tmp/parts",
            "--min-file-size",
            "0",
            "--strict",
            "--json",
        ])
        .unwrap();
        assert_eq!(args.base_url.as_deref(), Some("http://127.0.0.1:9/aip"));
        assert_eq!(args.output_dir, Some(PathBuf::from("/tmp/out")));
        assert_eq!(args.parts_dir, Some(PathBuf::from("/tmp/parts")));
        assert_eq!(args.min_file_size, Some(0));
        assert!(args.strict);
        assert!(args.json);
    }
}
