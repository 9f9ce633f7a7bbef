//! Ranking analytics: regime detection, scoring, allocation, and the
//! backtest summarizer.
//!
//! Every function in this tree is pure: explicit inputs, explicit outputs,
//! no hidden state. The refresh engine wires them together.

pub mod allocate;
pub mod backtest;
pub mod metrics;
pub mod regime;
pub mod score;
pub mod stats;

use thiserror::Error;

/// Computation errors surfaced by the analytics stages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("insufficient history: need {required} observations, have {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("universe is empty after filtering failed symbols")]
    EmptyUniverse,
}

pub use allocate::{Allocation, PortfolioPosition, SkipReason, SkippedPosition};
pub use backtest::BacktestSummary;
pub use metrics::annualized_volatility_pct;
pub use regime::Regime;
pub use score::{RankedStock, ScoreInputs, ScoreWeights};
