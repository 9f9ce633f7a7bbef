//! Canonical domain types shared across the crate.

mod lookback;
mod models;
mod symbol;
mod timestamp;

pub use lookback::Lookback;
pub use models::{
    ClosePoint, FinancialStatements, FundamentalSnapshot, PriceHistory, Quote, SummaryInfo,
};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
