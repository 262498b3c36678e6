//! CLI argument definitions for spikewire.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `run` | Scan the universe, send alerts, write the daily report |
//! | `config` | Validate a configuration file and print the effective settings |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--config` | `config/config.yaml` | YAML configuration file |
//! | `--log-json` | `false` | Emit structured JSON logs |
//!
//! # Examples
//!
//! ```bash
//! # Daily scan with Slack delivery (SLACK_WEBHOOK_URL set)
//! spikewire run
//!
//! # Replay a past session without sending anything
//! spikewire run --dry-run --as-of 2026-03-10T21:00:00Z --out-dir reports/
//!
//! # Check a config before deploying it
//! spikewire config --config config/staging.yaml
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use spikewire_core::config::DEFAULT_CONFIG_PATH;

/// Daily scanner for unusual trading volume backed by a press release.
#[derive(Debug, Parser)]
#[command(
    name = "spikewire",
    author,
    version,
    about = "Daily PR volume-spike scanner",
    long_about = "spikewire flags tickers whose latest session traded far above their \
trailing volume, looks for a matching press release, drops excluded sectors and \
tickers, and alerts on what remains.\n\
\n\
Use 'spikewire <command> --help' for command-specific help."
)]
pub struct Cli {
    /// YAML configuration file. Missing sections use defaults.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Emit structured JSON logs.
    ///
    /// Also enabled by SPIKEWIRE_ENV=production.
    #[arg(long, global = true, default_value_t = false)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan the universe once.
    ///
    /// Writes daily_report.json and daily_report.md and posts candidates
    /// to Slack when a webhook is configured.
    ///
    /// # Examples
    ///
    ///   spikewire run
    ///   spikewire run --dry-run
    ///   spikewire run --as-of 2026-03-10T21:00:00Z --concurrency 4
    Run(RunArgs),

    /// Validate the configuration and print it as JSON.
    Config,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Log alerts instead of posting them to Slack.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Reference time (RFC 3339, UTC). Defaults to now.
    ///
    /// The session tested is the last one on or before this time's UTC date, and
    /// releases are matched in the window ending at it.
    #[arg(long, value_name = "RFC3339")]
    pub as_of: Option<String>,

    /// Directory for the report files. Overrides `report.out_dir`.
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Tickers evaluated at once. Overrides `pipeline.concurrency`.
    #[arg(long)]
    pub concurrency: Option<usize>,
}
