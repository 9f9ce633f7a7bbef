//! Equal-weight monthly-rebalance backtest summarizer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::PriceHistory;

use super::stats;
use super::AnalyticsError;

/// Months in a calendar year, used for annualization.
pub const MONTHS_PER_YEAR: f64 = 12.0;
/// Minimum aligned month-end observations: two monthly returns are needed
/// for a defined volatility.
const MIN_MONTH_ENDS: usize = 3;

/// Scalar summary of the one-year equal-weight backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub total_return_pct: f64,
    pub benchmark_return_pct: f64,
    pub volatility_pct: f64,
    /// Total return per unit of annualized volatility; `None` when the
    /// monthly series is flat.
    pub sharpe: Option<f64>,
    pub max_drawdown_pct: f64,
    pub months: usize,
}

/// Summarize an equal-weight, monthly-rebalanced portfolio of the given
/// histories against the benchmark.
///
/// Daily closes are inner-joined on dates present for every symbol, then
/// resampled to month-end last prices. The benchmark runs the same monthly
/// pipeline on its own dates.
///
/// # Errors
///
/// Returns [`AnalyticsError::EmptyUniverse`] for an empty history set and
/// [`AnalyticsError::InsufficientHistory`] when fewer than three common
/// month-ends exist.
pub fn summarize(
    histories: &[PriceHistory],
    benchmark: &PriceHistory,
) -> Result<BacktestSummary, AnalyticsError> {
    if histories.is_empty() {
        return Err(AnalyticsError::EmptyUniverse);
    }

    let by_symbol: Vec<BTreeMap<Date, f64>> = histories.iter().map(closes_by_date).collect();

    // Inner join: keep only dates every symbol traded.
    let aligned: Vec<Date> = by_symbol[0]
        .keys()
        .filter(|date| by_symbol.iter().all(|map| map.contains_key(*date)))
        .copied()
        .collect();

    let ends = month_ends(&aligned);
    if ends.len() < MIN_MONTH_ENDS {
        return Err(AnalyticsError::InsufficientHistory {
            required: MIN_MONTH_ENDS,
            available: ends.len(),
        });
    }

    // Equal-weight portfolio return per month: mean of per-symbol returns.
    let monthly: Vec<f64> = ends
        .windows(2)
        .map(|pair| {
            let per_symbol: Vec<f64> = by_symbol
                .iter()
                .filter_map(|map| {
                    let prev = *map.get(&pair[0])?;
                    let curr = *map.get(&pair[1])?;
                    if prev == 0.0 {
                        None
                    } else {
                        Some((curr - prev) / prev)
                    }
                })
                .collect();
            stats::mean(&per_symbol).unwrap_or(0.0)
        })
        .collect();

    let cumulative: Vec<f64> = monthly
        .iter()
        .scan(1.0_f64, |acc, ret| {
            *acc *= 1.0 + ret;
            Some(*acc)
        })
        .collect();

    let total_return = cumulative.last().copied().unwrap_or(1.0) - 1.0;
    let volatility =
        stats::sample_std_dev(&monthly).unwrap_or(0.0) * MONTHS_PER_YEAR.sqrt();
    let sharpe = if volatility > 0.0 {
        Some(total_return / volatility)
    } else {
        None
    };

    let mut running_max = f64::MIN;
    let mut max_drawdown = 0.0_f64;
    for &value in &cumulative {
        running_max = running_max.max(value);
        let drawdown = value / running_max - 1.0;
        max_drawdown = max_drawdown.min(drawdown);
    }

    let benchmark_return = monthly_total_return(benchmark)?;

    Ok(BacktestSummary {
        total_return_pct: total_return * 100.0,
        benchmark_return_pct: benchmark_return * 100.0,
        volatility_pct: volatility * 100.0,
        sharpe,
        max_drawdown_pct: max_drawdown * 100.0,
        months: ends.len(),
    })
}

/// Total return of the month-end resampled close series.
fn monthly_total_return(history: &PriceHistory) -> Result<f64, AnalyticsError> {
    let by_date = closes_by_date(history);
    let dates: Vec<Date> = by_date.keys().copied().collect();
    let ends = month_ends(&dates);

    if ends.len() < 2 {
        return Err(AnalyticsError::InsufficientHistory {
            required: 2,
            available: ends.len(),
        });
    }

    let monthly_closes: Vec<f64> = ends.iter().filter_map(|end| by_date.get(end).copied()).collect();
    let total: f64 = stats::returns(&monthly_closes)
        .iter()
        .fold(1.0, |acc, ret| acc * (1.0 + ret));
    Ok(total - 1.0)
}

fn closes_by_date(history: &PriceHistory) -> BTreeMap<Date, f64> {
    history
        .points
        .iter()
        .map(|point| (point.ts.date(), point.close))
        .collect()
}

/// Last trading date of each calendar month in an ascending date sequence.
fn month_ends(dates: &[Date]) -> Vec<Date> {
    let mut ends = Vec::new();
    for pair in dates.windows(2) {
        if month_key(pair[0]) != month_key(pair[1]) {
            ends.push(pair[0]);
        }
    }
    if let Some(last) = dates.last() {
        ends.push(*last);
    }
    ends
}

fn month_key(date: Date) -> (i32, u8) {
    (date.year(), date.month() as u8)
}
