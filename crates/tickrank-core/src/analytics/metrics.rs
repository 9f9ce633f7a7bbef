//! Per-symbol realized-volatility metric.

use super::stats;
use super::AnalyticsError;

/// Trading days in a calendar year, used for annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
/// Trailing window of closes used for the realized-volatility estimate.
pub const VOLATILITY_WINDOW: usize = 22;
/// Minimum closes needed for a defined sample standard deviation.
const MIN_CLOSES: usize = 3;

/// Annualized sample standard deviation of daily returns, in percent.
///
/// Uses the trailing [`VOLATILITY_WINDOW`] closes when more are supplied.
///
/// # Errors
///
/// Returns [`AnalyticsError::InsufficientHistory`] for fewer than three
/// closes; two returns are the minimum for a sample deviation.
pub fn annualized_volatility_pct(closes: &[f64]) -> Result<f64, AnalyticsError> {
    if closes.len() < MIN_CLOSES {
        return Err(AnalyticsError::InsufficientHistory {
            required: MIN_CLOSES,
            available: closes.len(),
        });
    }

    let window_start = closes.len().saturating_sub(VOLATILITY_WINDOW);
    let daily_returns = stats::returns(&closes[window_start..]);

    let std = stats::sample_std_dev(&daily_returns).ok_or(AnalyticsError::InsufficientHistory {
        required: MIN_CLOSES,
        available: closes.len(),
    })?;

    Ok(std * TRADING_DAYS_PER_YEAR.sqrt() * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_series_has_zero_volatility() {
        let closes = vec![100.0; 10];
        let vol = annualized_volatility_pct(&closes).expect("volatility");
        assert!(vol.abs() < 1e-12);
    }

    #[test]
    fn alternating_series_has_positive_volatility() {
        let closes: Vec<f64> = (0..10)
            .map(|i| if i % 2 == 0 { 100.0 } else { 102.0 })
            .collect();
        let vol = annualized_volatility_pct(&closes).expect("volatility");
        assert!(vol > 0.0);
    }

    #[test]
    fn two_closes_are_not_enough() {
        let err = annualized_volatility_pct(&[100.0, 101.0]).expect_err("must fail");
        assert!(matches!(err, AnalyticsError::InsufficientHistory { .. }));
    }

    #[test]
    fn only_the_trailing_window_matters() {
        // A year of wild swings followed by a calm month.
        let mut closes: Vec<f64> = (0..230)
            .map(|i| if i % 2 == 0 { 100.0 } else { 150.0 })
            .collect();
        closes.extend(std::iter::repeat(120.0).take(VOLATILITY_WINDOW));

        let vol = annualized_volatility_pct(&closes).expect("volatility");
        assert!(vol.abs() < 1e-12);
    }
}
