//! Stateless refresh engine.
//!
//! One [`Engine::refresh`] call is one complete dashboard cycle: classify
//! the regime from the benchmark, evaluate every symbol in isolation,
//! rank the survivors, size the portfolio, and (optionally) run the
//! backtest summarizer. Nothing persists between calls.

use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::analytics::{allocate, backtest, metrics, regime, score, AnalyticsError};
use crate::analytics::{Allocation, BacktestSummary, RankedStock, Regime, ScoreInputs, ScoreWeights};
use crate::data_source::{DataSource, FinancialsRequest, HistoryRequest, SourceError, SummaryRequest};
use crate::{
    FundamentalSnapshot, Lookback, PriceHistory, ProviderId, Quote, Symbol, UtcDateTime,
    ValidationError,
};

/// Minimum number of symbols a universe must contain.
pub const MIN_UNIVERSE: usize = 2;
/// Default number of top-ranked stocks sized into the portfolio.
pub const DEFAULT_SELECTION: usize = 5;
/// Default number of symbols fetched concurrently.
pub const DEFAULT_CONCURRENCY: usize = 4;
/// Default per-symbol fetch/compute budget in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// The backtest matrix caps out at this many symbols.
pub const MAX_BACKTEST_SYMBOLS: usize = 15;
/// Benchmark index used when none is configured.
pub const DEFAULT_BENCHMARK: &str = "^NSEI";

/// Validated inputs for one refresh cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshConfig {
    pub symbols: Vec<Symbol>,
    pub benchmark: Symbol,
    pub capital: f64,
    pub selection_count: usize,
    pub concurrency: usize,
    pub timeout_ms: u64,
    pub include_backtest: bool,
}

impl RefreshConfig {
    pub fn new(symbols: Vec<Symbol>, capital: f64) -> Result<Self, ValidationError> {
        if symbols.len() < MIN_UNIVERSE {
            return Err(ValidationError::TooFewSymbols {
                count: symbols.len(),
                min: MIN_UNIVERSE,
            });
        }
        if !capital.is_finite() || capital <= 0.0 {
            return Err(ValidationError::NonPositiveCapital { value: capital });
        }

        Ok(Self {
            symbols,
            benchmark: Symbol::parse(DEFAULT_BENCHMARK)?,
            capital,
            selection_count: DEFAULT_SELECTION,
            concurrency: DEFAULT_CONCURRENCY,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            include_backtest: false,
        })
    }

    /// Parse a comma-separated symbol list, ignoring blank entries.
    pub fn parse_symbols(raw: &str) -> Result<Vec<Symbol>, ValidationError> {
        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(Symbol::parse)
            .collect()
    }

    pub fn with_benchmark(mut self, benchmark: Symbol) -> Self {
        self.benchmark = benchmark;
        self
    }

    pub fn with_selection_count(mut self, selection_count: usize) -> Result<Self, ValidationError> {
        if selection_count == 0 {
            return Err(ValidationError::ZeroSelectionCount);
        }
        self.selection_count = selection_count;
        Ok(self)
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Result<Self, ValidationError> {
        if concurrency == 0 {
            return Err(ValidationError::ZeroConcurrency);
        }
        self.concurrency = concurrency;
        Ok(self)
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_backtest(mut self, include_backtest: bool) -> Self {
        self.include_backtest = include_backtest;
        self
    }
}

/// Why one symbol dropped out of the refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureReason {
    /// The provider failed for this symbol.
    Source { code: String, message: String },
    /// The symbol's fetch/compute pipeline exceeded its budget.
    Timeout { limit_ms: u64 },
    /// A required metric had a zero or absent denominator.
    MetricUndefined { metric: String },
    /// Too few observations for a required computation.
    InsufficientHistory { required: usize, available: usize },
}

impl FailureReason {
    fn from_source(error: SourceError) -> Self {
        Self::Source {
            code: error.code().to_owned(),
            message: error.message().to_owned(),
        }
    }

    fn metric(name: &str) -> Self {
        Self::MetricUndefined {
            metric: name.to_owned(),
        }
    }
}

impl From<AnalyticsError> for FailureReason {
    fn from(error: AnalyticsError) -> Self {
        match error {
            AnalyticsError::InsufficientHistory {
                required,
                available,
            } => Self::InsufficientHistory {
                required,
                available,
            },
            AnalyticsError::EmptyUniverse => Self::metric("universe"),
        }
    }
}

impl Display for FailureReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Source { code, message } => write!(f, "{message} ({code})"),
            Self::Timeout { limit_ms } => write!(f, "timed out after {limit_ms} ms"),
            Self::MetricUndefined { metric } => {
                write!(f, "metric '{metric}' is undefined for this symbol")
            }
            Self::InsufficientHistory {
                required,
                available,
            } => write!(f, "insufficient history: need {required}, have {available}"),
        }
    }
}

/// Typed per-symbol failure record surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolFailure {
    pub symbol: Symbol,
    pub reason: FailureReason,
}

/// Metadata stamped onto every snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub request_id: String,
    pub generated_at: UtcDateTime,
    pub provider: ProviderId,
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Complete output of one refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub meta: SnapshotMeta,
    pub regime: Regime,
    pub ranked: Vec<RankedStock>,
    pub portfolio: Allocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backtest: Option<BacktestSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<SymbolFailure>,
}

/// Refresh-level errors; per-symbol problems never surface here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("benchmark '{symbol}' history unavailable: {source}")]
    Benchmark {
        symbol: Symbol,
        #[source]
        source: SourceError,
    },

    #[error("benchmark '{symbol}' cannot be classified: {source}")]
    Regime {
        symbol: Symbol,
        #[source]
        source: AnalyticsError,
    },

    #[error("no usable data: {} symbol(s) excluded", .failures.len())]
    NoData { failures: Vec<SymbolFailure> },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

struct EvaluatedSymbol {
    row: RankedStock,
    history: PriceHistory,
}

/// Refresh orchestrator bound to one market-data provider.
pub struct Engine {
    source: Arc<dyn DataSource>,
}

impl Engine {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self { source }
    }

    pub fn provider(&self) -> ProviderId {
        self.source.id()
    }

    /// Run one complete refresh cycle.
    ///
    /// Per-symbol failures are isolated into the snapshot's failure report;
    /// only benchmark problems or a fully-empty universe abort the refresh.
    pub async fn refresh(&self, config: &RefreshConfig) -> Result<DashboardSnapshot, EngineError> {
        let started = Instant::now();

        let benchmark_history = self
            .source
            .daily_history(HistoryRequest::new(
                config.benchmark.clone(),
                Lookback::OneYear,
            ))
            .await
            .map_err(|source| EngineError::Benchmark {
                symbol: config.benchmark.clone(),
                source,
            })?;

        let regime = regime::detect(&benchmark_history.closes()).map_err(|source| {
            EngineError::Regime {
                symbol: config.benchmark.clone(),
                source,
            }
        })?;
        let weights = ScoreWeights::for_regime(regime);
        debug!(%regime, benchmark = %config.benchmark, "classified market regime");

        let mut evaluations = stream::iter(config.symbols.iter().cloned().enumerate().map(
            |(index, symbol)| {
                let source = Arc::clone(&self.source);
                let timeout = std::time::Duration::from_millis(config.timeout_ms);
                let limit_ms = config.timeout_ms;
                async move {
                    let outcome =
                        match tokio::time::timeout(timeout, evaluate_symbol(source, &symbol, weights))
                            .await
                        {
                            Ok(result) => result,
                            Err(_) => Err(FailureReason::Timeout { limit_ms }),
                        };
                    (index, symbol, outcome)
                }
            },
        ))
        .buffer_unordered(config.concurrency)
        .collect::<Vec<_>>()
        .await;

        // Restore input order; the ranking tie-break depends on it.
        evaluations.sort_by_key(|(index, _, _)| *index);

        let mut rows = Vec::new();
        let mut histories = Vec::new();
        let mut failures = Vec::new();
        for (_, symbol, outcome) in evaluations {
            match outcome {
                Ok(evaluated) => {
                    rows.push(evaluated.row);
                    histories.push(evaluated.history);
                }
                Err(reason) => {
                    warn!(symbol = %symbol, %reason, "symbol excluded from refresh");
                    failures.push(SymbolFailure { symbol, reason });
                }
            }
        }

        if rows.is_empty() {
            return Err(EngineError::NoData { failures });
        }

        let ranked = score::rank(rows);
        let portfolio = allocate::allocate(&ranked, config.capital, config.selection_count);

        let mut warnings = Vec::new();
        for skipped in &portfolio.skipped {
            warnings.push(format!(
                "position '{}' skipped: {}",
                skipped.symbol,
                skipped.reason.as_str()
            ));
        }

        let backtest = if config.include_backtest {
            let universe = if histories.len() > MAX_BACKTEST_SYMBOLS {
                warnings.push(format!(
                    "backtest limited to the first {MAX_BACKTEST_SYMBOLS} of {} symbols",
                    histories.len()
                ));
                &histories[..MAX_BACKTEST_SYMBOLS]
            } else {
                &histories[..]
            };

            match backtest::summarize(universe, &benchmark_history) {
                Ok(summary) => Some(summary),
                Err(error) => {
                    warnings.push(format!("backtest skipped: {error}"));
                    None
                }
            }
        } else {
            None
        };

        let latency_ms = started.elapsed().as_millis() as u64;
        let meta = SnapshotMeta {
            request_id: Uuid::new_v4().to_string(),
            generated_at: UtcDateTime::now(),
            provider: self.source.id(),
            latency_ms,
            warnings,
        };

        Ok(DashboardSnapshot {
            meta,
            regime,
            ranked,
            portfolio,
            backtest,
            failures,
        })
    }
}

/// Fetch and score one symbol in isolation.
async fn evaluate_symbol(
    source: Arc<dyn DataSource>,
    symbol: &Symbol,
    weights: ScoreWeights,
) -> Result<EvaluatedSymbol, FailureReason> {
    let history = source
        .daily_history(HistoryRequest::new(symbol.clone(), Lookback::OneYear))
        .await
        .map_err(FailureReason::from_source)?;
    let statements = source
        .financials(FinancialsRequest::new(symbol.clone()))
        .await
        .map_err(FailureReason::from_source)?;
    let summary = source
        .summary(SummaryRequest::new(symbol.clone()))
        .await
        .map_err(FailureReason::from_source)?;

    let quote = Quote::from_history(&history).ok_or_else(|| FailureReason::metric("last_close"))?;
    let daily_change_pct = quote
        .change_pct
        .ok_or_else(|| FailureReason::metric("daily_change"))?;

    let snapshot = FundamentalSnapshot::from_parts(statements, &summary, quote.as_of);
    let growth_pct = snapshot
        .revenue_growth_pct()
        .ok_or_else(|| FailureReason::metric("revenue_growth"))?;
    let roe_pct = snapshot
        .roe_pct()
        .ok_or_else(|| FailureReason::metric("roe"))?;

    let volatility_pct = metrics::annualized_volatility_pct(&history.closes())?;

    let inputs = ScoreInputs {
        growth_pct,
        daily_change_pct,
        roe_pct,
        trailing_pe: snapshot.trailing_pe,
        volatility_pct,
    };
    let row = RankedStock::new(
        symbol.clone(),
        quote.last_close,
        inputs,
        snapshot.price_to_book,
        &weights,
    );

    Ok(EvaluatedSymbol { row, history })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(raw: &[&str]) -> Vec<Symbol> {
        raw.iter()
            .map(|s| Symbol::parse(s).expect("symbol"))
            .collect()
    }

    #[test]
    fn config_rejects_undersized_universe() {
        let err = RefreshConfig::new(symbols(&["AAA"]), 100_000.0).expect_err("must fail");
        assert!(matches!(err, ValidationError::TooFewSymbols { .. }));
    }

    #[test]
    fn config_rejects_non_positive_capital() {
        let err = RefreshConfig::new(symbols(&["AAA", "BBB"]), 0.0).expect_err("must fail");
        assert!(matches!(err, ValidationError::NonPositiveCapital { .. }));
    }

    #[test]
    fn config_parses_comma_separated_symbols() {
        let parsed =
            RefreshConfig::parse_symbols(" infy.ns, tcs.ns ,, hdfcbank.ns ").expect("must parse");
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].as_str(), "INFY.NS");
        assert_eq!(parsed[2].as_str(), "HDFCBANK.NS");
    }

    #[test]
    fn config_defaults_are_applied() {
        let config = RefreshConfig::new(symbols(&["AAA", "BBB"]), 100_000.0).expect("config");
        assert_eq!(config.selection_count, DEFAULT_SELECTION);
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(config.benchmark.as_str(), DEFAULT_BENCHMARK);
        assert!(!config.include_backtest);
    }

    #[test]
    fn config_builder_guards_zero_values() {
        let config = RefreshConfig::new(symbols(&["AAA", "BBB"]), 100_000.0).expect("config");
        let err = config
            .clone()
            .with_selection_count(0)
            .expect_err("must fail");
        assert!(matches!(err, ValidationError::ZeroSelectionCount));
        let err = config.with_concurrency(0).expect_err("must fail");
        assert!(matches!(err, ValidationError::ZeroConcurrency));
    }
}
