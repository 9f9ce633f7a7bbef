use thiserror::Error;

/// Validation and contract errors exposed by `tickrank-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter or '^': '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid lookback '{value}', expected one of 1mo, 1y")]
    InvalidLookback { value: String },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("universe needs at least {min} symbols, got {count}")]
    TooFewSymbols { count: usize, min: usize },
    #[error("capital must be a positive amount, got {value}")]
    NonPositiveCapital { value: f64 },
    #[error("selection count must be greater than zero")]
    ZeroSelectionCount,
    #[error("fetch concurrency must be greater than zero")]
    ZeroConcurrency,
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
