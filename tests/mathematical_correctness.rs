//! Worked-example tests pinning the arithmetic of every analytics stage.

use tickrank_core::analytics::{allocate, backtest, regime};
use tickrank_core::{RankedStock, Regime, ScoreInputs, ScoreWeights, Symbol};
use tickrank_tests::{daily_history, rising_closes};

// =============================================================================
// Scoring
// =============================================================================

#[test]
fn bull_score_worked_example() {
    // revenue 120 vs 100 -> growth 20%; income 30 / equity 150 -> ROE 20%
    // 0.35*20 + 0.30*1.5 + 0.15*20 - 0.10*25 - 0.10*18 = 6.15
    let inputs = ScoreInputs {
        growth_pct: 20.0,
        daily_change_pct: 1.5,
        roe_pct: 20.0,
        trailing_pe: Some(25.0),
        volatility_pct: 18.0,
    };

    let score = inputs.score(&ScoreWeights::BULL);
    assert!((score - 6.15).abs() < 1e-9);
}

#[test]
fn defensive_score_worked_example() {
    // 0.25*20 + 0.10*1.5 + 0.30*20 - 0.15*25 - 0.20*18 = 3.80
    let inputs = ScoreInputs {
        growth_pct: 20.0,
        daily_change_pct: 1.5,
        roe_pct: 20.0,
        trailing_pe: Some(25.0),
        volatility_pct: 18.0,
    };

    let score = inputs.score(&ScoreWeights::DEFENSIVE);
    assert!((score - 3.80).abs() < 1e-9);
}

#[test]
fn same_inputs_always_produce_the_same_score() {
    let inputs = ScoreInputs {
        growth_pct: 7.25,
        daily_change_pct: -0.4,
        roe_pct: 11.0,
        trailing_pe: None,
        volatility_pct: 22.0,
    };

    for _ in 0..100 {
        assert_eq!(
            inputs.score(&ScoreWeights::BULL),
            inputs.score(&ScoreWeights::BULL)
        );
    }
}

// =============================================================================
// Regime boundaries
// =============================================================================

#[test]
fn fast_average_above_slow_is_bull() {
    let closes = rising_closes(200, 100.0, 1.0);
    assert_eq!(regime::detect(&closes).expect("regime"), Regime::Bull);
}

#[test]
fn fast_average_below_slow_is_defensive() {
    let closes: Vec<f64> = (0..200).map(|i| 400.0 - i as f64).collect();
    assert_eq!(regime::detect(&closes).expect("regime"), Regime::Defensive);
}

#[test]
fn exact_crossover_tie_is_defensive() {
    let closes = vec![250.0; 200];
    assert_eq!(regime::detect(&closes).expect("regime"), Regime::Defensive);
}

// =============================================================================
// Allocation
// =============================================================================

fn ranked(raw: &str, price: f64, volatility_pct: f64) -> RankedStock {
    RankedStock::new(
        Symbol::parse(raw).expect("symbol"),
        price,
        ScoreInputs {
            growth_pct: 10.0,
            daily_change_pct: 1.0,
            roe_pct: 15.0,
            trailing_pe: Some(20.0),
            volatility_pct,
        },
        None,
        &ScoreWeights::BULL,
    )
}

#[test]
fn allocation_worked_example_one_million_sixty_forty() {
    // capital 1,000,000; inverse-vol weights 60%/40%; prices 1,000/500
    // -> allocations 600,000/400,000 -> quantities 600/800
    let rows = vec![ranked("AAA", 1_000.0, 10.0), ranked("BBB", 500.0, 15.0)];

    let allocation = allocate::allocate(&rows, 1_000_000.0, 2);
    assert_eq!(allocation.positions[0].quantity, 600);
    assert_eq!(allocation.positions[1].quantity, 800);
    assert!((allocation.positions[0].invested - 600_000.0).abs() < 1e-6);
    assert!((allocation.positions[1].invested - 400_000.0).abs() < 1e-6);
}

#[test]
fn allocation_weights_sum_to_one_hundred_for_any_positive_volatilities() {
    let rows = vec![
        ranked("AAA", 820.0, 7.3),
        ranked("BBB", 55.0, 41.8),
        ranked("CCC", 1_432.0, 19.9),
        ranked("DDD", 240.0, 28.1),
        ranked("EEE", 3_105.0, 12.6),
    ];

    let allocation = allocate::allocate(&rows, 750_000.0, 5);
    let total: f64 = allocation.positions.iter().map(|p| p.weight_pct).sum();
    assert!((total - 100.0).abs() < 0.01);
}

#[test]
fn zero_volatility_never_divides() {
    let rows = vec![ranked("AAA", 100.0, 0.0), ranked("BBB", 100.0, 10.0)];

    let allocation = allocate::allocate(&rows, 100_000.0, 2);
    assert_eq!(allocation.positions.len(), 1);
    assert_eq!(allocation.skipped.len(), 1);
}

// =============================================================================
// Backtest
// =============================================================================

#[test]
fn backtest_compounds_monthly_returns() {
    let universe = [daily_history(
        "AAA",
        // 2024-07-01 plus 184 consecutive days: July through December.
        &rising_closes(184, 100.0, 0.5),
    )];
    let benchmark = daily_history("^NSEI", &rising_closes(184, 1_000.0, 1.0));

    let summary = backtest::summarize(&universe, &benchmark).expect("summary");

    // Final close 191.5 against the July month-end close; the exact value
    // matters less than the direction and internal consistency.
    assert!(summary.total_return_pct > 0.0);
    assert!(summary.benchmark_return_pct > 0.0);
    assert!(summary.volatility_pct >= 0.0);
    assert_eq!(summary.months, 6);
    assert!((summary.max_drawdown_pct - 0.0).abs() < 1e-9);

    let sharpe = summary.sharpe.expect("rising series has volatility");
    assert!(sharpe > 0.0);
}

#[test]
fn flat_prices_produce_undefined_sharpe_not_infinity() {
    let universe = [daily_history("AAA", &vec![100.0; 184])];
    let benchmark = daily_history("^NSEI", &vec![1_000.0; 184]);

    let summary = backtest::summarize(&universe, &benchmark).expect("summary");
    assert_eq!(summary.sharpe, None);
    assert!((summary.total_return_pct - 0.0).abs() < 1e-12);
}

#[test]
fn symbols_are_dropped_from_dates_they_did_not_all_trade() {
    // AAA trades every day; BBB misses all of September. The inner join
    // must not fabricate September returns.
    let aaa = daily_history("AAA", &rising_closes(184, 100.0, 0.5));
    let mut bbb = daily_history("BBB", &rising_closes(184, 100.0, 0.5));
    bbb.points.retain(|point| point.ts.date().month() as u8 != 9);

    let benchmark = daily_history("^NSEI", &rising_closes(184, 1_000.0, 1.0));
    let summary = backtest::summarize(&[aaa, bbb], &benchmark).expect("summary");

    assert_eq!(summary.months, 5);
}

#[test]
fn drawdown_captures_the_peak_to_trough_move() {
    // Up, crash, partial recovery across four month-ends.
    let mut closes = Vec::new();
    closes.extend(std::iter::repeat(100.0).take(31)); // July
    closes.extend(std::iter::repeat(120.0).take(31)); // August
    closes.extend(std::iter::repeat(90.0).take(30)); // September
    closes.extend(std::iter::repeat(105.0).take(31)); // October
    let universe = [daily_history("AAA", &closes)];
    let benchmark = daily_history("^NSEI", &vec![1_000.0; 123]);

    let summary = backtest::summarize(&universe, &benchmark).expect("summary");

    // Cumulative: 1.2, 0.9, 1.05 -> trough 0.9 against peak 1.2 = -25%.
    assert!((summary.max_drawdown_pct - (-25.0)).abs() < 1e-6);
}

#[test]
fn sharpe_is_total_return_over_annualized_volatility() {
    let mut closes = Vec::new();
    closes.extend(std::iter::repeat(100.0).take(31)); // July
    closes.extend(std::iter::repeat(110.0).take(31)); // August
    closes.extend(std::iter::repeat(99.0).take(30)); // September
    closes.extend(std::iter::repeat(121.0).take(31)); // October
    let universe = [daily_history("AAA", &closes)];
    let benchmark = daily_history("^NSEI", &vec![1_000.0; 123]);

    let summary = backtest::summarize(&universe, &benchmark).expect("summary");

    let sharpe = summary.sharpe.expect("sharpe defined");
    let expected = summary.total_return_pct / summary.volatility_pct;
    assert!((sharpe - expected).abs() < 1e-9);
}
