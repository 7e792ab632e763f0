//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use fixturefetch_core::config::{
    DEFAULT_API_KEY, DEFAULT_CACHE_DIR, DEFAULT_ENDPOINT, DEFAULT_SCHOOL_ID, DEFAULT_WORKERS,
};
use fixturefetch_core::DEFAULT_RETRY_ATTEMPTS;

/// Fetch school sports fixtures for a date range.
///
/// Retrieves one feed document per calendar day, serving repeat runs from a
/// local cache, and consolidates the results into a single chronologically
/// ordered XML file.
#[derive(Parser, Debug)]
#[command(name = "fixturefetch")]
#[command(author, version, about)]
pub struct Args {
    /// First day of the range (YYYY-MM-DD)
    pub start: NaiveDate,

    /// Last day of the range, inclusive (YYYY-MM-DD)
    pub end: NaiveDate,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Maximum concurrent fetch workers (1-64)
    #[arg(short = 'c', long, default_value_t = DEFAULT_WORKERS as u8, value_parser = clap::value_parser!(u8).range(1..=64))]
    pub concurrency: u8,

    /// Attempts per date, including the first (1-10)
    #[arg(short = 'r', long, default_value_t = DEFAULT_RETRY_ATTEMPTS as u8, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub max_retries: u8,

    /// Minimum delay between feed requests in milliseconds (0 to disable, max 60000)
    #[arg(short = 'l', long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub request_delay: u64,

    /// Per-request timeout in seconds (1-300)
    #[arg(short = 't', long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..=300))]
    pub timeout: u64,

    /// Fetch dates one at a time instead of in parallel
    #[arg(long)]
    pub sequential: bool,

    /// Directory for cached responses and the run log
    #[arg(long, default_value = DEFAULT_CACHE_DIR)]
    pub cache_dir: PathBuf,

    /// Path for the consolidated XML (defaults into the cache directory)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// School identifier for the feed
    #[arg(long, default_value = DEFAULT_SCHOOL_ID)]
    pub school_id: String,

    /// Access key for the feed
    #[arg(long, default_value = DEFAULT_API_KEY, hide_default_value = true)]
    pub api_key: String,

    /// Feed endpoint base URL
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Remove all cached responses before fetching
    #[arg(long)]
    pub clear_cache: bool,

    /// Print the run statistics as JSON on stdout
    #[arg(long)]
    pub stats_json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(
            std::iter::once("fixturefetch").chain(args.iter().copied()),
        )
    }

    #[test]
    fn test_cli_default_args() {
        let args = parse(&["2024-09-26", "2024-09-30"]).unwrap();
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2024, 9, 26).unwrap());
        assert_eq!(args.end, NaiveDate::from_ymd_opt(2024, 9, 30).unwrap());
        assert_eq!(args.concurrency, 5);
        assert_eq!(args.max_retries, 3);
        assert_eq!(args.request_delay, 100);
        assert_eq!(args.timeout, 10);
        assert!(!args.sequential);
        assert!(!args.clear_cache);
        assert_eq!(args.cache_dir, PathBuf::from("fixtures_cache"));
        assert!(args.output.is_none());
    }

    #[test]
    fn test_cli_requires_both_dates() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["2024-09-26"]).is_err());
    }

    #[test]
    fn test_cli_rejects_malformed_date() {
        let result = parse(&["26 Sep 2024", "2024-09-30"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_concurrency_bounds() {
        assert!(parse(&["2024-09-26", "2024-09-30", "-c", "0"]).is_err());
        assert!(parse(&["2024-09-26", "2024-09-30", "-c", "65"]).is_err());
        let args = parse(&["2024-09-26", "2024-09-30", "-c", "64"]).unwrap();
        assert_eq!(args.concurrency, 64);
    }

    #[test]
    fn test_cli_retries_must_be_at_least_one() {
        assert!(parse(&["2024-09-26", "2024-09-30", "-r", "0"]).is_err());
        let args = parse(&["2024-09-26", "2024-09-30", "-r", "10"]).unwrap();
        assert_eq!(args.max_retries, 10);
    }

    #[test]
    fn test_cli_request_delay_zero_allowed() {
        let args = parse(&["2024-09-26", "2024-09-30", "-l", "0"]).unwrap();
        assert_eq!(args.request_delay, 0);
    }

    #[test]
    fn test_cli_flags_combined() {
        let args = parse(&[
            "2024-09-26",
            "2024-09-30",
            "--sequential",
            "--clear-cache",
            "--stats-json",
            "--cache-dir",
            "/tmp/fc",
            "-o",
            "/tmp/out.xml",
        ])
        .unwrap();
        assert!(args.sequential);
        assert!(args.clear_cache);
        assert!(args.stats_json);
        assert_eq!(args.cache_dir, PathBuf::from("/tmp/fc"));
        assert_eq!(args.output, Some(PathBuf::from("/tmp/out.xml")));
    }

    #[test]
    fn test_cli_help_flag() {
        let err = parse(&["--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
