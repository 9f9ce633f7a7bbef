//! Terminal rendering for command results.
//!
//! Table mode prints aligned text for humans; JSON mode serializes the
//! same structures for machines. The core stays rendering-agnostic; only
//! this module knows about column widths.

use tickrank_core::{DashboardSnapshot, PriceHistory, SymbolFailure};

use crate::cli::OutputFormat;
use crate::commands::QuoteReport;
use crate::error::CliError;

pub fn render_snapshot(
    snapshot: &DashboardSnapshot,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => print_json(snapshot, pretty),
        OutputFormat::Table => {
            render_snapshot_table(snapshot);
            Ok(())
        }
    }
}

pub fn render_quotes(
    report: &QuoteReport,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => print_json(report, pretty),
        OutputFormat::Table => {
            render_quotes_table(report);
            Ok(())
        }
    }
}

pub fn render_history(
    history: &PriceHistory,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => print_json(history, pretty),
        OutputFormat::Table => {
            render_history_table(history);
            Ok(())
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<(), CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{payload}");
    Ok(())
}

fn render_snapshot_table(snapshot: &DashboardSnapshot) {
    println!("request_id  : {}", snapshot.meta.request_id);
    println!("generated_at: {}", snapshot.meta.generated_at);
    println!("provider    : {}", snapshot.meta.provider);
    println!("regime      : {}", snapshot.regime);
    println!("latency_ms  : {}", snapshot.meta.latency_ms);

    if !snapshot.meta.warnings.is_empty() {
        println!("warnings:");
        for warning in &snapshot.meta.warnings {
            println!("  - {warning}");
        }
    }

    println!();
    println!(
        "{:>2}  {:<12} {:>10} {:>8} {:>9} {:>8} {:>8} {:>8} {:>7} {:>8}  {}",
        "#", "SYMBOL", "PRICE", "DAY%", "GROWTH%", "ROE%", "P/E", "P/B", "VOL%", "SCORE", "FLAGS"
    );
    for (position, row) in snapshot.ranked.iter().enumerate() {
        let mut flags = Vec::new();
        if row.strong_roe {
            flags.push("roe+");
        }
        if row.rich_pe {
            flags.push("pe!");
        }

        println!(
            "{:>2}  {:<12} {:>10.2} {:>8.2} {:>9.2} {:>8.2} {:>8} {:>8} {:>7.2} {:>8.2}  {}",
            position + 1,
            row.symbol.as_str(),
            row.price,
            row.daily_change_pct,
            row.revenue_growth_pct,
            row.roe_pct,
            fmt_opt(row.trailing_pe),
            fmt_opt(row.price_to_book),
            row.volatility_pct,
            row.score,
            flags.join(" "),
        );
    }

    if !snapshot.portfolio.positions.is_empty() {
        println!();
        println!(
            "{:<12} {:>8} {:>14} {:>8} {:>14}",
            "POSITION", "WEIGHT%", "ALLOCATED", "QTY", "INVESTED"
        );
        for position in &snapshot.portfolio.positions {
            println!(
                "{:<12} {:>8.2} {:>14.2} {:>8} {:>14.2}",
                position.symbol.as_str(),
                position.weight_pct,
                position.allocated,
                position.quantity,
                position.invested,
            );
        }
    }

    for skipped in &snapshot.portfolio.skipped {
        println!(
            "position '{}' not sized: {}",
            skipped.symbol,
            skipped.reason.as_str()
        );
    }

    if let Some(backtest) = &snapshot.backtest {
        println!();
        println!("backtest ({} month-ends):", backtest.months);
        println!("  total return   : {:>8.2}%", backtest.total_return_pct);
        println!("  benchmark      : {:>8.2}%", backtest.benchmark_return_pct);
        println!("  volatility     : {:>8.2}%", backtest.volatility_pct);
        match backtest.sharpe {
            Some(sharpe) => println!("  sharpe         : {sharpe:>8.2}"),
            None => println!("  sharpe         : {:>8}", "-"),
        }
        println!("  max drawdown   : {:>8.2}%", backtest.max_drawdown_pct);
    }

    render_failures(&snapshot.failures);
}

fn render_quotes_table(report: &QuoteReport) {
    println!(
        "{:<12} {:>10} {:>10} {:>8}",
        "SYMBOL", "CLOSE", "PREV", "DAY%"
    );
    for quote in &report.quotes {
        println!(
            "{:<12} {:>10.2} {:>10} {:>8}",
            quote.symbol.as_str(),
            quote.last_close,
            fmt_opt(quote.previous_close),
            fmt_opt(quote.change_pct),
        );
    }

    render_failures(&report.failures);
}

fn render_history_table(history: &PriceHistory) {
    println!(
        "{} daily closes for {} ({})",
        history.points.len(),
        history.symbol,
        history.lookback
    );
    for point in &history.points {
        println!("{}  {:>12.2}", point.ts, point.close);
    }
}

fn render_failures(failures: &[SymbolFailure]) {
    if failures.is_empty() {
        return;
    }

    println!();
    println!("excluded symbols:");
    for failure in failures {
        println!("  - {}: {}", failure.symbol, failure.reason);
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value:.2}"),
        None => String::from("-"),
    }
}
