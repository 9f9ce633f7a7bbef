//! Data source trait and request types.
//!
//! This module defines the provider contract the refresh engine consumes.
//! Every endpoint is per-symbol: a failure for one symbol never implies
//! anything about another, which is what lets the engine isolate failures
//! at the symbol boundary.
//!
//! # Endpoints
//!
//! | Request | Response | Description |
//! |---------|----------|-------------|
//! | [`HistoryRequest`] | [`PriceHistory`] | Ordered daily closes |
//! | [`FinancialsRequest`] | [`FinancialStatements`] | Two-period statement figures |
//! | [`SummaryRequest`] | [`SummaryInfo`] | Trailing P/E and P/B ratios |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{FinancialStatements, Lookback, PriceHistory, ProviderId, SummaryInfo, Symbol};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    InvalidRequest,
    NoData,
    Internal,
}

/// Structured source error carried into per-symbol failure reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn no_data(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NoData,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::NoData => "source.no_data",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Request payload for the daily-history endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub symbol: Symbol,
    pub lookback: Lookback,
}

impl HistoryRequest {
    pub fn new(symbol: Symbol, lookback: Lookback) -> Self {
        Self { symbol, lookback }
    }
}

/// Request payload for the statements endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinancialsRequest {
    pub symbol: Symbol,
}

impl FinancialsRequest {
    pub fn new(symbol: Symbol) -> Self {
        Self { symbol }
    }
}

/// Request payload for the summary endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub symbol: Symbol,
}

impl SummaryRequest {
    pub fn new(symbol: Symbol) -> Self {
        Self { symbol }
    }
}

/// Market-data provider contract.
///
/// The trait uses boxed-future async methods so adapters stay object-safe
/// behind `Arc<dyn DataSource>`.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the engine fans symbol fetches
/// out across tasks that share one adapter.
pub trait DataSource: Send + Sync {
    /// Returns the provider identifier stamped into snapshot metadata.
    fn id(&self) -> ProviderId;

    /// Fetches the ordered daily close series for one symbol.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the provider is unavailable, rate
    /// limited, or has no data for the symbol.
    fn daily_history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceHistory, SourceError>> + Send + 'a>>;

    /// Fetches two-period revenue/net-income figures and latest equity.
    ///
    /// Individual figures may be absent in a successful response; a
    /// [`SourceError`] means the statements could not be fetched at all.
    fn financials<'a>(
        &'a self,
        req: FinancialsRequest,
    ) -> Pin<Box<dyn Future<Output = Result<FinancialStatements, SourceError>> + Send + 'a>>;

    /// Fetches trailing P/E and price-to-book.
    fn summary<'a>(
        &'a self,
        req: SummaryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<SummaryInfo, SourceError>> + Send + 'a>>;
}
