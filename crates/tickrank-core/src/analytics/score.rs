//! Regime-dependent weighted scoring and ranking.

use serde::{Deserialize, Serialize};

use crate::Symbol;

use super::Regime;

/// ROE above this level gets the `strong_roe` display flag.
pub const STRONG_ROE_PCT: f64 = 20.0;
/// Trailing P/E above this level gets the `rich_pe` display flag.
pub const RICH_PE: f64 = 30.0;

/// Linear term weights applied to the five raw score inputs.
///
/// Positive weights reward a term, negative weights penalize it. The raw
/// terms are never normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub growth: f64,
    pub daily_change: f64,
    pub roe: f64,
    pub pe: f64,
    pub volatility: f64,
}

impl ScoreWeights {
    pub const BULL: Self = Self {
        growth: 0.35,
        daily_change: 0.30,
        roe: 0.15,
        pe: -0.10,
        volatility: -0.10,
    };

    pub const DEFENSIVE: Self = Self {
        growth: 0.25,
        daily_change: 0.10,
        roe: 0.30,
        pe: -0.15,
        volatility: -0.20,
    };

    pub const fn for_regime(regime: Regime) -> Self {
        match regime {
            Regime::Bull => Self::BULL,
            Regime::Defensive => Self::DEFENSIVE,
        }
    }
}

/// Raw inputs to the score, all in percent except the P/E ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreInputs {
    pub growth_pct: f64,
    pub daily_change_pct: f64,
    pub roe_pct: f64,
    /// A missing trailing P/E zeroes the penalty term instead of excluding
    /// the stock; every other missing metric excludes the symbol upstream.
    pub trailing_pe: Option<f64>,
    pub volatility_pct: f64,
}

impl ScoreInputs {
    /// Weighted sum of the five terms under the given weights.
    ///
    /// Deterministic: identical inputs always produce the identical score.
    pub fn score(&self, weights: &ScoreWeights) -> f64 {
        weights.growth * self.growth_pct
            + weights.daily_change * self.daily_change_pct
            + weights.roe * self.roe_pct
            + weights.pe * self.trailing_pe.unwrap_or(0.0)
            + weights.volatility * self.volatility_pct
    }
}

/// One fully-scored row of the ranked table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedStock {
    pub symbol: Symbol,
    pub price: f64,
    pub daily_change_pct: f64,
    pub revenue_growth_pct: f64,
    pub roe_pct: f64,
    pub trailing_pe: Option<f64>,
    pub price_to_book: Option<f64>,
    pub volatility_pct: f64,
    pub score: f64,
    pub strong_roe: bool,
    pub rich_pe: bool,
}

impl RankedStock {
    pub fn new(
        symbol: Symbol,
        price: f64,
        inputs: ScoreInputs,
        price_to_book: Option<f64>,
        weights: &ScoreWeights,
    ) -> Self {
        Self {
            symbol,
            price,
            daily_change_pct: inputs.daily_change_pct,
            revenue_growth_pct: inputs.growth_pct,
            roe_pct: inputs.roe_pct,
            trailing_pe: inputs.trailing_pe,
            price_to_book,
            volatility_pct: inputs.volatility_pct,
            score: inputs.score(weights),
            strong_roe: inputs.roe_pct > STRONG_ROE_PCT,
            rich_pe: inputs.trailing_pe.is_some_and(|pe| pe > RICH_PE),
        }
    }
}

/// Sort rows strictly descending by score.
///
/// The sort is stable: rows with equal scores keep their input order.
pub fn rank(mut rows: Vec<RankedStock>) -> Vec<RankedStock> {
    rows.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).expect("symbol")
    }

    fn inputs(growth: f64) -> ScoreInputs {
        ScoreInputs {
            growth_pct: growth,
            daily_change_pct: 1.5,
            roe_pct: 20.0,
            trailing_pe: Some(25.0),
            volatility_pct: 18.0,
        }
    }

    #[test]
    fn bull_score_matches_worked_example() {
        // 0.35*20 + 0.30*1.5 + 0.15*20 - 0.10*25 - 0.10*18 = 6.15
        let score = inputs(20.0).score(&ScoreWeights::BULL);
        assert!((score - 6.15).abs() < 1e-9);
    }

    #[test]
    fn defensive_weights_penalize_volatility_harder() {
        let calm = ScoreInputs {
            volatility_pct: 5.0,
            ..inputs(20.0)
        };
        let wild = ScoreInputs {
            volatility_pct: 45.0,
            ..inputs(20.0)
        };

        let bull_gap = calm.score(&ScoreWeights::BULL) - wild.score(&ScoreWeights::BULL);
        let defensive_gap =
            calm.score(&ScoreWeights::DEFENSIVE) - wild.score(&ScoreWeights::DEFENSIVE);
        assert!(defensive_gap > bull_gap);
    }

    #[test]
    fn missing_pe_zeroes_the_penalty_term() {
        let with_pe = inputs(20.0);
        let without_pe = ScoreInputs {
            trailing_pe: None,
            ..with_pe
        };

        let gap = without_pe.score(&ScoreWeights::BULL) - with_pe.score(&ScoreWeights::BULL);
        assert!((gap - 2.5).abs() < 1e-9);
    }

    #[test]
    fn score_is_deterministic() {
        let a = inputs(12.5).score(&ScoreWeights::DEFENSIVE);
        let b = inputs(12.5).score(&ScoreWeights::DEFENSIVE);
        assert_eq!(a, b);
    }

    #[test]
    fn ranking_is_descending_and_stable_on_ties() {
        let weights = ScoreWeights::BULL;
        let rows = vec![
            RankedStock::new(symbol("AAA"), 100.0, inputs(10.0), None, &weights),
            RankedStock::new(symbol("BBB"), 100.0, inputs(30.0), None, &weights),
            RankedStock::new(symbol("CCC"), 100.0, inputs(10.0), None, &weights),
        ];

        let ranked = rank(rows);
        assert_eq!(ranked[0].symbol.as_str(), "BBB");
        // AAA and CCC tie; input order preserved.
        assert_eq!(ranked[1].symbol.as_str(), "AAA");
        assert_eq!(ranked[2].symbol.as_str(), "CCC");
    }

    #[test]
    fn price_to_book_is_display_only() {
        let weights = ScoreWeights::BULL;
        let with_pb = RankedStock::new(symbol("AAA"), 100.0, inputs(10.0), Some(9.9), &weights);
        let without_pb = RankedStock::new(symbol("AAA"), 100.0, inputs(10.0), None, &weights);
        assert_eq!(with_pb.score, without_pb.score);
    }

    #[test]
    fn display_flags_follow_thresholds() {
        let weights = ScoreWeights::BULL;
        let flagged = RankedStock::new(
            symbol("AAA"),
            100.0,
            ScoreInputs {
                roe_pct: 25.0,
                trailing_pe: Some(35.0),
                ..inputs(10.0)
            },
            None,
            &weights,
        );
        assert!(flagged.strong_roe);
        assert!(flagged.rich_pe);

        let plain = RankedStock::new(symbol("BBB"), 100.0, inputs(10.0), None, &weights);
        assert!(!plain.strong_roe);
        assert!(!plain.rich_pe);
    }
}
