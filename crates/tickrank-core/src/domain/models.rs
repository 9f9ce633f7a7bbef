use serde::{Deserialize, Serialize};

use crate::{Lookback, Symbol, UtcDateTime, ValidationError};

/// Single daily closing-price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClosePoint {
    pub ts: UtcDateTime,
    pub close: f64,
}

impl ClosePoint {
    pub fn new(ts: UtcDateTime, close: f64) -> Result<Self, ValidationError> {
        validate_non_negative("close", close)?;
        Ok(Self { ts, close })
    }
}

/// Ordered daily close series for one symbol, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub symbol: Symbol,
    pub lookback: Lookback,
    pub points: Vec<ClosePoint>,
}

impl PriceHistory {
    pub fn new(symbol: Symbol, lookback: Lookback, points: Vec<ClosePoint>) -> Self {
        Self {
            symbol,
            lookback,
            points,
        }
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.close).collect()
    }

    pub fn latest(&self) -> Option<&ClosePoint> {
        self.points.last()
    }

    pub fn previous(&self) -> Option<&ClosePoint> {
        let len = self.points.len();
        if len < 2 {
            return None;
        }
        self.points.get(len - 2)
    }
}

/// Latest close, previous close, and the derived day-over-day move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: Symbol,
    pub last_close: f64,
    pub previous_close: Option<f64>,
    /// Day-over-day change in percent; `None` when the previous close is
    /// absent or zero.
    pub change_pct: Option<f64>,
    pub as_of: UtcDateTime,
}

impl Quote {
    pub fn from_history(history: &PriceHistory) -> Option<Self> {
        let latest = history.latest()?;
        let previous_close = history.previous().map(|point| point.close);
        let change_pct = previous_close.and_then(|prev| {
            if prev == 0.0 {
                None
            } else {
                Some((latest.close - prev) / prev * 100.0)
            }
        });

        Some(Self {
            symbol: history.symbol.clone(),
            last_close: latest.close,
            previous_close,
            change_pct,
            as_of: latest.ts,
        })
    }
}

/// Raw statement figures for the two most recent reporting periods.
///
/// Any figure may be absent when the provider's statements are incomplete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatements {
    pub symbol: Symbol,
    pub revenue_latest: Option<f64>,
    pub revenue_prior: Option<f64>,
    pub net_income_latest: Option<f64>,
    pub net_income_prior: Option<f64>,
    pub equity_latest: Option<f64>,
}

/// Summary ratios reported alongside statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryInfo {
    pub symbol: Symbol,
    pub trailing_pe: Option<f64>,
    pub price_to_book: Option<f64>,
}

/// Combined fundamental view of one symbol for a single refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalSnapshot {
    pub symbol: Symbol,
    pub as_of: UtcDateTime,
    pub revenue_latest: Option<f64>,
    pub revenue_prior: Option<f64>,
    pub net_income_latest: Option<f64>,
    pub equity_latest: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub price_to_book: Option<f64>,
}

impl FundamentalSnapshot {
    pub fn from_parts(
        statements: FinancialStatements,
        summary: &SummaryInfo,
        as_of: UtcDateTime,
    ) -> Self {
        Self {
            symbol: statements.symbol,
            as_of,
            revenue_latest: statements.revenue_latest,
            revenue_prior: statements.revenue_prior,
            net_income_latest: statements.net_income_latest,
            equity_latest: statements.equity_latest,
            trailing_pe: summary.trailing_pe,
            price_to_book: summary.price_to_book,
        }
    }

    /// Year-over-year revenue growth in percent.
    ///
    /// `None` when either figure is absent or the prior revenue is zero;
    /// a missing denominator never degrades to 0.
    pub fn revenue_growth_pct(&self) -> Option<f64> {
        let latest = self.revenue_latest?;
        let prior = self.revenue_prior?;
        if prior == 0.0 {
            return None;
        }
        Some((latest - prior) / prior * 100.0)
    }

    /// Return on equity in percent.
    ///
    /// `None` when net income or equity is absent, or equity is zero.
    pub fn roe_pct(&self) -> Option<f64> {
        let net_income = self.net_income_latest?;
        let equity = self.equity_latest?;
        if equity == 0.0 {
            return None;
        }
        Some(net_income / equity * 100.0)
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
