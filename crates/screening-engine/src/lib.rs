use chrono::Utc;
use screener_core::{
    EntryRange, FundamentalSnapshot, Recommendation, ScreeningCriteria, ScreeningResult,
    TechnicalSnapshot,
};

/// Maximum reasons kept on a result for display
const MAX_REASONS: usize = 6;

/// Reasons carried into a recommendation's reasoning line
const REASONING_REASONS: usize = 3;

/// Multi-factor scoring engine.
///
/// Applies the configured rubric over a technical and a fundamental
/// snapshot, accumulates a score capped at 100, and decides pass/fail
/// against the criteria threshold. Stateless; safe to share across
/// concurrent screening tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self
    }

    /// Score one symbol. Factors are evaluated in a fixed order and each
    /// appends a reason, satisfied or not, so two runs over identical
    /// inputs produce identical results.
    pub fn score(
        &self,
        symbol: &str,
        price: f64,
        technical: &TechnicalSnapshot,
        fundamental: &FundamentalSnapshot,
        criteria: &ScreeningCriteria,
    ) -> ScreeningResult {
        let mut score: u32 = 0;
        let mut reasons: Vec<String> = Vec::new();

        let t = &criteria.technical;

        // RSI momentum band
        if technical.rsi >= t.rsi_min && technical.rsi <= t.rsi_max {
            score += 20;
            reasons.push(format!("RSI in momentum zone ({:.1})", technical.rsi));
        } else if technical.rsi > t.rsi_max {
            reasons.push(format!("RSI overbought ({:.1})", technical.rsi));
        } else {
            reasons.push(format!("RSI below momentum zone ({:.1})", technical.rsi));
        }

        // MACD bullish alignment
        if t.require_macd_bullish {
            if technical.macd.macd > technical.macd.signal && technical.macd.histogram > 0.0 {
                score += 15;
                reasons.push("MACD bullish crossover".to_string());
            } else {
                reasons.push("MACD not bullish".to_string());
            }
        }

        // Price vs moving averages
        if t.require_price_above_sma {
            let mut sma_points = 0;
            if price > technical.sma20 {
                sma_points += 5;
                reasons.push("Price above 20-SMA".to_string());
            }
            if price > technical.sma50 {
                sma_points += 5;
                reasons.push("Price above 50-SMA".to_string());
            }
            if price > technical.sma200 {
                sma_points += 5;
                reasons.push("Price above 200-SMA".to_string());
            }
            if sma_points == 0 {
                reasons.push("Price below key moving averages".to_string());
            }
            score += sma_points;
        }

        // Volume participation
        if technical.volume_ratio >= t.min_volume_ratio {
            score += 10;
            reasons.push(format!("Volume spike ({:.1}x)", technical.volume_ratio));
        } else {
            reasons.push(format!("Low volume ({:.1}x)", technical.volume_ratio));
        }

        let f = &criteria.fundamental;

        if fundamental.roe >= f.min_roe {
            score += 15;
            reasons.push(format!("Strong ROE ({:.1}%)", fundamental.roe));
        } else {
            reasons.push(format!("Low ROE ({:.1}%)", fundamental.roe));
        }

        if fundamental.debt_to_equity <= f.max_debt_to_equity {
            score += 10;
            reasons.push(format!("Low debt (D/E: {:.2})", fundamental.debt_to_equity));
        } else {
            reasons.push(format!("High debt (D/E: {:.2})", fundamental.debt_to_equity));
        }

        if fundamental.earnings_growth >= f.min_earnings_growth {
            score += 15;
            reasons.push(format!(
                "Strong earnings growth ({:.1}%)",
                fundamental.earnings_growth
            ));
        } else {
            reasons.push(format!(
                "Weak earnings growth ({:.1}%)",
                fundamental.earnings_growth
            ));
        }

        if fundamental.promoter_holding >= f.min_promoter_holding {
            score += 5;
            reasons.push(format!(
                "High promoter holding ({:.1}%)",
                fundamental.promoter_holding
            ));
        }

        if fundamental.market_cap >= f.min_market_cap {
            score += 5;
            reasons.push("Adequate market cap".to_string());
        }

        let score = score.min(100);
        reasons.truncate(MAX_REASONS);

        ScreeningResult {
            symbol: symbol.to_string(),
            passed: score >= criteria.pass_threshold,
            score,
            reasons,
            price,
            technical: Some(technical.clone()),
            fundamental: Some(fundamental.clone()),
        }
    }

    /// Non-passing result for a symbol whose history is too short to score
    pub fn insufficient_history(&self, symbol: &str, got: usize) -> ScreeningResult {
        ScreeningResult {
            symbol: symbol.to_string(),
            passed: false,
            score: 0,
            reasons: vec![format!("Insufficient history ({got} bars)")],
            price: 0.0,
            technical: None,
            fundamental: None,
        }
    }

    /// Turn a passing result into a trade recommendation, or `None` when
    /// the result failed or its risk-reward falls short of the criteria
    /// minimum.
    pub fn recommend(
        &self,
        result: &ScreeningResult,
        criteria: &ScreeningCriteria,
    ) -> Option<Recommendation> {
        if !result.passed || result.price <= 0.0 {
            return None;
        }

        let price = result.price;
        let target = price * criteria.target_multiplier(result.score);
        let stop_loss = price * (1.0 - criteria.stop_loss_pct);
        let risk_reward_ratio = (target - price) / (price - stop_loss);

        if risk_reward_ratio < criteria.min_risk_reward {
            tracing::debug!(
                symbol = %result.symbol,
                score = result.score,
                rr = risk_reward_ratio,
                "passed screening but failed risk-reward filter"
            );
            return None;
        }

        let sector = result
            .fundamental
            .as_ref()
            .map(|f| f.sector.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        let reasoning = result
            .reasons
            .iter()
            .take(REASONING_REASONS)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");

        Some(Recommendation {
            symbol: result.symbol.clone(),
            sector,
            current_price: price,
            entry_range: EntryRange {
                min: price * 0.98,
                max: price * 1.02,
            },
            target,
            stop_loss,
            risk_reward_ratio,
            confidence_score: result.score,
            reasoning,
            timestamp: Utc::now(),
        })
    }
}
