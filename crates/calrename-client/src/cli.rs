//! Command-line interface definition.

use std::path::PathBuf;

use calrename_core::{TracingOutputFormat, parse_date};
use chrono::NaiveDate;
use clap::Parser;

/// calrename - Bulk-rename Google Calendar events with a regular expression
#[derive(Debug, Parser)]
#[command(name = "calrename")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CALRENAME_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v')]
    pub debug: bool,

    /// Log format on stderr: compact, pretty or json
    #[arg(long)]
    pub log_format: Option<TracingOutputFormat>,

    // --- Authentication ---
    /// Path to the Google OAuth client-secret JSON file
    #[arg(long, env = "CALRENAME_CREDENTIALS")]
    pub credentials: Option<PathBuf>,

    /// Path to the cached OAuth tokens
    #[arg(long = "cache-file", alias = "cache_file", env = "CALRENAME_CACHE_FILE")]
    pub cache_file: Option<PathBuf>,

    // --- Selection ---
    /// Display name of the calendar to rename events in
    #[arg(long, env = "CALRENAME_CALENDAR")]
    pub calendar: Option<String>,

    /// First day to consider (YYYY-MM-DD, default 2021-01-01)
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Day the listing stops at (YYYY-MM-DD, default today)
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    // --- Rename rule ---
    /// Regular expression matched case-insensitively against event titles
    #[arg(long)]
    pub regex: String,

    /// Replacement text; `$1` or `${name}` insert capture groups
    #[arg(long)]
    pub replacement: String,

    // --- Behavior ---
    /// Print the renames that would happen without changing anything
    #[arg(long = "dryrun", alias = "dry-run")]
    pub dry_run: bool,

    /// Keep going when a single event fails to update
    #[arg(long)]
    pub continue_on_error: bool,

    /// HTTP timeout in seconds (default 30)
    #[arg(long)]
    pub timeout: Option<u64>,
}
