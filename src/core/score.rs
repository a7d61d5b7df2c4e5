//! Simplified composite score derived from a single price quote.
use crate::core::market::{CompanyProfile, Quote};
use serde::{Deserialize, Serialize};

pub const ALGORITHM_VERSION: &str = "1.0";

const NEUTRAL_SCORE: f64 = 5.0;
const NEUTRAL_RISK: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Composite score in [0, 10], one decimal.
    #[serde(rename = "score_simplifie")]
    pub score: f64,
    /// Absolute percent change, two decimals.
    #[serde(rename = "rendement")]
    pub return_pct: f64,
    /// Intraday volatility mapped to [0, 1], two decimals.
    #[serde(rename = "risque")]
    pub risk: f64,
    #[serde(rename = "version_algo")]
    pub version: String,
}

impl ScoreResult {
    fn neutral() -> Self {
        Self {
            score: NEUTRAL_SCORE,
            return_pct: 0.0,
            risk: NEUTRAL_RISK,
            version: ALGORITHM_VERSION.to_string(),
        }
    }
}

fn numeric(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Computes the score, return and risk for a quote.
///
/// A missing quote, or one whose current price is not a finite number, yields
/// the neutral result (score 5, return 0, risk 0.5). The profile does not
/// take part in the formula yet.
pub fn compute_score(quote: Option<&Quote>, _profile: Option<&CompanyProfile>) -> ScoreResult {
    let Some(quote) = quote else {
        return ScoreResult::neutral();
    };
    let Some(price) = numeric(quote.current) else {
        return ScoreResult::neutral();
    };

    let change_pct = numeric(quote.percent_change).unwrap_or(0.0);
    let return_pct = round_to(change_pct.abs(), 2);

    let risk = match (numeric(quote.high), numeric(quote.low)) {
        (Some(high), Some(low)) if price > 0.0 && high > low => {
            let volatility = (high - low) / price;
            (0.3 + volatility * 2.0).clamp(0.0, 1.0)
        }
        _ => NEUTRAL_RISK,
    };

    let score = (NEUTRAL_SCORE + change_pct / 10.0 - risk * 0.5).clamp(0.0, 10.0);

    ScoreResult {
        score: round_to(score, 1),
        return_pct,
        risk: round_to(risk, 2),
        version: ALGORITHM_VERSION.to_string(),
    }
}
