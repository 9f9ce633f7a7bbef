//! Inverse-volatility capital allocation over the top-ranked stocks.

use serde::{Deserialize, Serialize};

use crate::Symbol;

use super::score::RankedStock;

/// One sized position in the suggested portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioPosition {
    pub symbol: Symbol,
    pub weight_pct: f64,
    pub allocated: f64,
    pub quantity: u64,
    pub invested: f64,
}

/// Why a top-ranked stock was left out of the sized portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ZeroVolatility,
    NonPositivePrice,
}

impl SkipReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ZeroVolatility => "zero_volatility",
            Self::NonPositivePrice => "non_positive_price",
        }
    }
}

/// A top-ranked stock excluded from sizing, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedPosition {
    pub symbol: Symbol,
    pub reason: SkipReason,
}

/// Sized portfolio plus the stocks that could not be sized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub positions: Vec<PortfolioPosition>,
    pub skipped: Vec<SkippedPosition>,
}

/// Allocate `capital` across the top `selection_count` ranked stocks using
/// inverse-volatility weights.
///
/// Stocks with zero volatility or a non-positive price are skipped rather
/// than dividing by zero; weights are normalized over the survivors so they
/// sum to 100%. Quantities are whole shares (floor), so the invested amount
/// never exceeds the allocated amount.
pub fn allocate(ranked: &[RankedStock], capital: f64, selection_count: usize) -> Allocation {
    let selected = &ranked[..selection_count.min(ranked.len())];

    let mut skipped = Vec::new();
    let mut sizable = Vec::new();
    for stock in selected {
        if stock.volatility_pct <= 0.0 {
            skipped.push(SkippedPosition {
                symbol: stock.symbol.clone(),
                reason: SkipReason::ZeroVolatility,
            });
        } else if stock.price <= 0.0 {
            skipped.push(SkippedPosition {
                symbol: stock.symbol.clone(),
                reason: SkipReason::NonPositivePrice,
            });
        } else {
            sizable.push(stock);
        }
    }

    let inverse_vol_total: f64 = sizable.iter().map(|s| 1.0 / s.volatility_pct).sum();
    if inverse_vol_total <= 0.0 {
        return Allocation {
            positions: Vec::new(),
            skipped,
        };
    }

    let positions = sizable
        .into_iter()
        .map(|stock| {
            let weight_pct = (1.0 / stock.volatility_pct) / inverse_vol_total * 100.0;
            let allocated = weight_pct / 100.0 * capital;
            let quantity = (allocated / stock.price).floor() as u64;
            let invested = quantity as f64 * stock.price;

            PortfolioPosition {
                symbol: stock.symbol.clone(),
                weight_pct,
                allocated,
                quantity,
                invested,
            }
        })
        .collect();

    Allocation { positions, skipped }
}
