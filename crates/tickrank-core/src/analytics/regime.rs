//! Market regime classification from a benchmark moving-average crossover.

use serde::{Deserialize, Serialize};

use super::stats;
use super::AnalyticsError;

/// Trailing window for the fast moving average, in trading days.
pub const SHORT_WINDOW: usize = 50;
/// Trailing window for the slow moving average, in trading days.
pub const LONG_WINDOW: usize = 200;

/// Coarse market-trend classification driving the scoring weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    Bull,
    Defensive,
}

impl Regime {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bull => "bull",
            Self::Defensive => "defensive",
        }
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify the current regime from ordered benchmark daily closes.
///
/// Bull when the 50-day average sits strictly above the 200-day average on
/// the final day; everything else, including an exact tie, is Defensive.
///
/// # Errors
///
/// Returns [`AnalyticsError::InsufficientHistory`] when fewer than
/// [`LONG_WINDOW`] closes are available; partial windows are never used.
pub fn detect(closes: &[f64]) -> Result<Regime, AnalyticsError> {
    if closes.len() < LONG_WINDOW {
        return Err(AnalyticsError::InsufficientHistory {
            required: LONG_WINDOW,
            available: closes.len(),
        });
    }

    let short = stats::trailing_mean(closes, SHORT_WINDOW)
        .ok_or(AnalyticsError::InsufficientHistory {
            required: SHORT_WINDOW,
            available: closes.len(),
        })?;
    let long = stats::trailing_mean(closes, LONG_WINDOW)
        .ok_or(AnalyticsError::InsufficientHistory {
            required: LONG_WINDOW,
            available: closes.len(),
        })?;

    if short > long {
        Ok(Regime::Bull)
    } else {
        Ok(Regime::Defensive)
    }
}
