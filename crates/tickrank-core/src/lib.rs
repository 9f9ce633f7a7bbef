//! # Tickrank Core
//!
//! Domain contracts, market-data access, and ranking analytics for the
//! tickrank equity dashboard.
//!
//! ## Overview
//!
//! This crate provides everything the presentation shell needs to run one
//! stateless dashboard refresh:
//!
//! - **Canonical domain models** for price history, quotes, and fundamentals
//! - **Data source trait** with a Yahoo Finance adapter (real and mock modes)
//! - **Analytics** for regime detection, scoring, allocation, and backtesting
//! - **Refresh engine** that isolates per-symbol failures and merges results
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (Yahoo) |
//! | [`analytics`] | Regime, scoring, allocation, and backtest stages |
//! | [`data_source`] | Data source trait and request types |
//! | [`domain`] | Domain models (Symbol, PriceHistory, FundamentalSnapshot) |
//! | [`engine`] | Stateless refresh orchestration |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`source`] | Provider identifiers |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tickrank_core::{Engine, RefreshConfig, Symbol, YahooAdapter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = Engine::new(Arc::new(YahooAdapter::default()));
//!
//!     let symbols = RefreshConfig::parse_symbols("INFY.NS,TCS.NS,RELIANCE.NS")?;
//!     let config = RefreshConfig::new(symbols, 1_000_000.0)?.with_backtest(true);
//!
//!     let snapshot = engine.refresh(&config).await?;
//!     for row in &snapshot.ranked {
//!         println!("{} score {:.2}", row.symbol, row.score);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Per-symbol problems never abort a refresh: they land in the snapshot's
//! failure report as typed [`SymbolFailure`] records. Only an unusable
//! benchmark or a fully-empty universe fails the cycle, via [`EngineError`].

pub mod adapters;
pub mod analytics;
pub mod data_source;
pub mod domain;
pub mod engine;
pub mod error;
pub mod http_client;
pub mod source;

// Re-export commonly used types at crate root for convenience

// Adapter implementations
pub use adapters::{YahooAdapter, YahooAuthManager};

// Analytics types
pub use analytics::{
    Allocation, AnalyticsError, BacktestSummary, PortfolioPosition, RankedStock, Regime,
    ScoreInputs, ScoreWeights, SkipReason, SkippedPosition,
};

// Data source trait and types
pub use data_source::{
    DataSource, FinancialsRequest, HistoryRequest, SourceError, SourceErrorKind, SummaryRequest,
};

// Domain models
pub use domain::{
    ClosePoint, FinancialStatements, FundamentalSnapshot, Lookback, PriceHistory, Quote,
    SummaryInfo, Symbol, UtcDateTime,
};

// Engine types
pub use engine::{
    DashboardSnapshot, Engine, EngineError, FailureReason, RefreshConfig, SnapshotMeta,
    SymbolFailure,
};

// Error types
pub use error::{CoreError, ValidationError};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};

// Source identifiers
pub use source::ProviderId;
