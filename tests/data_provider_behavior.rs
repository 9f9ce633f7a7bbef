//! Behavior-driven tests for the Yahoo provider in mock mode.
//!
//! These tests verify HOW the adapter behaves offline: deterministic data,
//! well-formed histories, and complete per-symbol coverage of the three
//! endpoints the engine consumes.

use std::sync::Arc;

use tickrank_core::{
    DataSource, Engine, FinancialsRequest, HistoryRequest, Lookback, Quote, RefreshConfig,
    SummaryRequest, Symbol, YahooAdapter,
};

fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("valid symbol")
}

#[tokio::test]
async fn when_history_is_requested_the_series_is_ordered_and_full_length() {
    // Given: the adapter in mock mode
    let adapter = YahooAdapter::default();

    // When: a one-year daily history is requested
    let history = adapter
        .daily_history(HistoryRequest::new(symbol("RELIANCE.NS"), Lookback::OneYear))
        .await
        .expect("history");

    // Then: one close per trading day, oldest first, all positive
    assert_eq!(history.points.len(), 252);
    for pair in history.points.windows(2) {
        assert!(pair[0].ts < pair[1].ts);
    }
    for point in &history.points {
        assert!(point.close > 0.0);
    }
}

#[tokio::test]
async fn when_the_same_symbol_is_fetched_twice_the_data_matches() {
    let adapter = YahooAdapter::default();
    let request = HistoryRequest::new(symbol("INFY.NS"), Lookback::OneMonth);

    let first = adapter.daily_history(request.clone()).await.expect("history");
    let second = adapter.daily_history(request).await.expect("history");

    assert_eq!(first.closes(), second.closes());
}

#[tokio::test]
async fn when_quotes_are_derived_from_mock_history_the_change_is_defined() {
    let adapter = YahooAdapter::default();
    let history = adapter
        .daily_history(HistoryRequest::new(symbol("TCS.NS"), Lookback::OneMonth))
        .await
        .expect("history");

    let quote = Quote::from_history(&history).expect("quote");
    assert!(quote.last_close > 0.0);
    assert!(quote.change_pct.is_some(), "two closes imply a defined move");
}

#[tokio::test]
async fn when_fundamentals_are_requested_both_periods_are_present() {
    let adapter = YahooAdapter::default();

    let statements = adapter
        .financials(FinancialsRequest::new(symbol("HDFCBANK.NS")))
        .await
        .expect("financials");

    assert!(statements.revenue_latest.is_some());
    assert!(statements.revenue_prior.is_some());
    assert!(statements.net_income_latest.is_some());
    assert!(statements.equity_latest.is_some());

    let summary = adapter
        .summary(SummaryRequest::new(symbol("HDFCBANK.NS")))
        .await
        .expect("summary");
    assert!(summary.price_to_book.is_some());
}

#[tokio::test]
async fn when_the_engine_runs_on_the_mock_provider_a_full_snapshot_emerges() {
    // Given: the default mock provider behind an engine
    let engine = Engine::new(Arc::new(YahooAdapter::default()));

    let symbols = RefreshConfig::parse_symbols("HDFCBANK.NS,ICICIBANK.NS,RELIANCE.NS,INFY.NS")
        .expect("symbols parse");
    let config = RefreshConfig::new(symbols, 1_000_000.0)
        .expect("config")
        .with_backtest(true);

    // When: a refresh runs end to end
    let snapshot = engine.refresh(&config).await.expect("refresh succeeds");

    // Then: every universe symbol ranks, scores descend, and the portfolio
    // is fully weighted
    assert_eq!(snapshot.ranked.len(), 4);
    assert!(snapshot.failures.is_empty());
    for pair in snapshot.ranked.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }

    let weight_total: f64 = snapshot
        .portfolio
        .positions
        .iter()
        .map(|p| p.weight_pct)
        .sum();
    assert!((weight_total - 100.0).abs() < 0.01);

    let backtest = snapshot.backtest.expect("backtest present");
    assert!(backtest.months >= 3);
}
