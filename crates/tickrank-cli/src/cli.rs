//! CLI argument definitions for tickrank.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rank` | Run a full refresh: regime, ranking, allocation, backtest |
//! | `quote` | Fetch latest close and day-over-day change |
//! | `history` | Fetch raw daily closes for one symbol |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `table` | Output format (table, json) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--mock` | `false` | Use deterministic offline data |
//! | `--timeout-ms` | `10000` | Per-symbol budget in ms |
//!
//! # Examples
//!
//! ```bash
//! # Rank a universe and size a portfolio
//! tickrank rank INFY.NS TCS.NS RELIANCE.NS HDFCBANK.NS --capital 1000000
//!
//! # Include the one-year backtest summary
//! tickrank rank INFY.NS,TCS.NS,RELIANCE.NS --backtest
//!
//! # Re-run every 60 seconds like the live dashboard
//! tickrank rank INFY.NS TCS.NS RELIANCE.NS --watch-secs 60
//!
//! # Machine-readable output
//! tickrank quote INFY.NS TCS.NS --format json --pretty
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Regime-aware equity ranking and portfolio allocation CLI.
///
/// Fetches daily prices and fundamentals for a universe of equities,
/// scores them with regime-dependent weights, and sizes a top-N portfolio
/// with inverse-volatility weighting.
#[derive(Debug, Parser)]
#[command(
    name = "tickrank",
    author,
    version,
    about = "Regime-aware equity ranking and allocation",
    long_about = "Tickrank fetches daily prices and fundamentals for a list of equities, \
classifies the market regime from a benchmark moving-average crossover, scores each stock \
with regime-dependent weights, and sizes a top-N portfolio using inverse-volatility \
weighting. Failed symbols are reported, never fatal.\n\
\n\
Use 'tickrank <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Use deterministic offline data instead of the live provider.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    /// Per-symbol fetch/compute budget in milliseconds.
    #[arg(long, global = true, default_value_t = 10_000)]
    pub timeout_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text tables for terminal display.
    Table,
    /// Single JSON object output.
    Json,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a full dashboard refresh over a symbol universe.
    ///
    /// Classifies the regime, scores every symbol, ranks them, and sizes
    /// the top-N into a portfolio against the capital budget.
    ///
    /// # Examples
    ///
    ///   tickrank rank INFY.NS TCS.NS RELIANCE.NS --capital 1000000
    ///   tickrank rank INFY.NS,TCS.NS,HDFCBANK.NS --top 3 --backtest
    Rank(RankArgs),

    /// Fetch latest close(s) and day-over-day change.
    ///
    /// # Examples
    ///
    ///   tickrank quote INFY.NS
    ///   tickrank quote INFY.NS TCS.NS --format json
    Quote(QuoteArgs),

    /// Fetch raw daily closes for one symbol.
    ///
    /// # Examples
    ///
    ///   tickrank history INFY.NS
    ///   tickrank history ^NSEI --lookback 1y
    History(HistoryArgs),
}

/// Arguments for the `rank` command.
#[derive(Debug, Args)]
pub struct RankArgs {
    /// Universe symbols; space- or comma-separated (e.g., INFY.NS TCS.NS).
    #[arg(required = true, num_args = 1..)]
    pub symbols: Vec<String>,

    /// Total capital to allocate across the selected stocks.
    #[arg(long, default_value_t = 1_000_000.0)]
    pub capital: f64,

    /// Number of top-ranked stocks to size into the portfolio.
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    /// Benchmark index used for regime classification.
    #[arg(long, default_value = "^NSEI")]
    pub benchmark: String,

    /// Number of symbols fetched concurrently.
    #[arg(long, default_value_t = 4)]
    pub concurrency: usize,

    /// Include the one-year equal-weight backtest summary.
    #[arg(long, default_value_t = false)]
    pub backtest: bool,

    /// Re-run the refresh on this interval until interrupted.
    #[arg(long)]
    pub watch_secs: Option<u64>,
}

/// Arguments for the `quote` command.
#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// One or more market symbols.
    #[arg(required = true, num_args = 1..)]
    pub symbols: Vec<String>,
}

/// Arguments for the `history` command.
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Market symbol to fetch closes for.
    pub symbol: String,

    /// History window.
    ///
    /// Supported lookbacks:
    /// - 1mo: one month
    /// - 1y: one year (default)
    #[arg(long, default_value = "1y")]
    pub lookback: String,
}
