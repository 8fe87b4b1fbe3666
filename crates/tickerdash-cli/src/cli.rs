//! Command-line arguments for `tickerdash`.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `snapshot` | Render the dashboard once |
//! | `watch` | Re-render on the refresh interval until Ctrl-C |
//! | `periods` | List accepted period tokens |
//!
//! Logging goes to stderr and is controlled with `RUST_LOG` (default `warn`).

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "tickerdash",
    author,
    version,
    about = "Stock dashboard: price history, indicators, correlation and a trend forecast"
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Use the deterministic built-in price generator instead of Yahoo Finance.
    #[arg(long, global = true, default_value_t = false)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary.
    Table,
    /// One JSON envelope per render.
    Json,
    /// One compact JSON envelope per line.
    Ndjson,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch, analyse and print the dashboard once.
    ///
    ///   tickerdash snapshot TSLA --period 6mo --sma-window 50
    Snapshot(DashboardArgs),

    /// Keep re-rendering the dashboard every refresh interval.
    ///
    ///   tickerdash watch MSFT --refresh 30 --format ndjson
    Watch(WatchArgs),

    /// List the supported lookback periods.
    Periods,
}

/// Settings shared by every dashboard render.
#[derive(Debug, Clone, Args)]
pub struct DashboardArgs {
    /// Ticker symbol, e.g. AAPL, TSLA, MSFT or ^GSPC.
    #[arg(default_value = "AAPL")]
    pub symbol: String,

    /// Lookback period: 1mo, 3mo, 6mo, 1y or 2y.
    #[arg(long, default_value = "1mo")]
    pub period: String,

    /// Simple moving average window in trading days (5-50).
    #[arg(long, default_value_t = 20)]
    pub sma_window: usize,

    /// Exponential moving average span in trading days (5-50).
    #[arg(long, default_value_t = 20)]
    pub ema_window: usize,

    /// Number of calendar days to forecast (5-30).
    #[arg(long, default_value_t = 10)]
    pub forecast_days: usize,

    /// Alert when the last close reaches this price. 0 disables.
    #[arg(long, default_value_t = 0.0)]
    pub alert_price: f64,

    /// Refresh interval and cache lifetime in seconds (5-60).
    #[arg(long, default_value_t = 10)]
    pub refresh: u64,
}

#[derive(Debug, Clone, Args)]
pub struct WatchArgs {
    #[command(flatten)]
    pub dashboard: DashboardArgs,

    /// Stop after this many renders. 0 runs until interrupted.
    #[arg(long, default_value_t = 0)]
    pub max_cycles: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_defaults() {
        let cli = Cli::try_parse_from(["tickerdash", "snapshot"]).expect("parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert!(!cli.offline);
        let Command::Snapshot(args) = cli.command else {
            panic!("expected snapshot");
        };
        assert_eq!(args.symbol, "AAPL");
        assert_eq!(args.period, "1mo");
        assert_eq!(args.sma_window, 20);
        assert_eq!(args.refresh, 10);
    }

    #[test]
    fn watch_accepts_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tickerdash",
            "watch",
            "^GSPC",
            "--max-cycles",
            "3",
            "--format",
            "ndjson",
            "--offline",
        ])
        .expect("parse");

        assert_eq!(cli.format, OutputFormat::Ndjson);
        assert!(cli.offline);
        let Command::Watch(args) = cli.command else {
            panic!("expected watch");
        };
        assert_eq!(args.dashboard.symbol, "^GSPC");
        assert_eq!(args.max_cycles, 3);
    }
}
