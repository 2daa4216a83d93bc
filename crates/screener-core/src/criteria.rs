use crate::ScreenError;
use serde::{Deserialize, Serialize};

/// Technical thresholds for the scoring rubric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalCriteria {
    pub rsi_min: f64,
    pub rsi_max: f64,
    pub require_macd_bullish: bool,
    pub require_price_above_sma: bool,
    pub min_volume_ratio: f64,
}

/// Fundamental thresholds for the scoring rubric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalCriteria {
    pub min_roe: f64,
    pub max_debt_to_equity: f64,
    pub min_earnings_growth: f64,
    pub min_promoter_holding: f64,
    pub min_market_cap: f64,
}

/// One row of the target-multiplier table: scores at or above `min_score`
/// earn `multiplier` on the current price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetTier {
    pub min_score: u32,
    pub multiplier: f64,
}

/// Full configuration for one screening run. Immutable once a run starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningCriteria {
    pub technical: TechnicalCriteria,
    pub fundamental: FundamentalCriteria,
    /// Minimum score for a symbol to pass
    pub pass_threshold: u32,
    /// Target multiplier tiers; the matching tier with the highest
    /// `min_score` wins. Empty table means `base_target_multiplier` always.
    pub target_tiers: Vec<TargetTier>,
    pub base_target_multiplier: f64,
    pub stop_loss_pct: f64,
    pub min_risk_reward: f64,
}

impl Default for ScreeningCriteria {
    /// Canonical swing-trading criteria: institutional-grade 60-point pass
    /// threshold with the 85/75/65 target tier table.
    fn default() -> Self {
        Self {
            technical: TechnicalCriteria {
                rsi_min: 55.0,
                rsi_max: 70.0,
                require_macd_bullish: true,
                require_price_above_sma: true,
                min_volume_ratio: 1.5,
            },
            fundamental: FundamentalCriteria {
                min_roe: 15.0,
                max_debt_to_equity: 1.0,
                min_earnings_growth: 15.0,
                min_promoter_holding: 50.0,
                min_market_cap: 10_000.0,
            },
            pass_threshold: 60,
            target_tiers: vec![
                TargetTier { min_score: 85, multiplier: 1.12 },
                TargetTier { min_score: 75, multiplier: 1.09 },
                TargetTier { min_score: 65, multiplier: 1.07 },
            ],
            base_target_multiplier: 1.06,
            stop_loss_pct: 0.05,
            min_risk_reward: 1.5,
        }
    }
}

impl ScreeningCriteria {
    /// Stricter preset: only 65+ scores pass
    pub fn conservative() -> Self {
        Self {
            pass_threshold: 65,
            ..Self::default()
        }
    }

    /// Permissive preset: 50-point threshold with a flat 8% target
    pub fn broad() -> Self {
        Self {
            pass_threshold: 50,
            target_tiers: Vec::new(),
            base_target_multiplier: 1.08,
            ..Self::default()
        }
    }

    /// Target multiplier for a given score: the matching tier with the
    /// highest `min_score`, or the base multiplier when none matches.
    pub fn target_multiplier(&self, score: u32) -> f64 {
        self.target_tiers
            .iter()
            .filter(|t| score >= t.min_score)
            .max_by_key(|t| t.min_score)
            .map(|t| t.multiplier)
            .unwrap_or(self.base_target_multiplier)
    }

    /// Apply caller overrides field-by-field over these criteria
    pub fn merged(&self, overrides: &CriteriaOverrides) -> Self {
        let mut merged = self.clone();
        let t = &mut merged.technical;
        if let Some(v) = overrides.rsi_min {
            t.rsi_min = v;
        }
        if let Some(v) = overrides.rsi_max {
            t.rsi_max = v;
        }
        if let Some(v) = overrides.require_macd_bullish {
            t.require_macd_bullish = v;
        }
        if let Some(v) = overrides.require_price_above_sma {
            t.require_price_above_sma = v;
        }
        if let Some(v) = overrides.min_volume_ratio {
            t.min_volume_ratio = v;
        }
        let f = &mut merged.fundamental;
        if let Some(v) = overrides.min_roe {
            f.min_roe = v;
        }
        if let Some(v) = overrides.max_debt_to_equity {
            f.max_debt_to_equity = v;
        }
        if let Some(v) = overrides.min_earnings_growth {
            f.min_earnings_growth = v;
        }
        if let Some(v) = overrides.min_promoter_holding {
            f.min_promoter_holding = v;
        }
        if let Some(v) = overrides.min_market_cap {
            f.min_market_cap = v;
        }
        if let Some(v) = overrides.pass_threshold {
            merged.pass_threshold = v;
        }
        if let Some(v) = &overrides.target_tiers {
            merged.target_tiers = v.clone();
        }
        if let Some(v) = overrides.base_target_multiplier {
            merged.base_target_multiplier = v;
        }
        if let Some(v) = overrides.stop_loss_pct {
            merged.stop_loss_pct = v;
        }
        if let Some(v) = overrides.min_risk_reward {
            merged.min_risk_reward = v;
        }
        merged
    }

    /// Structural validation. The only condition under which the top-level
    /// screening entry points fail hard.
    pub fn validate(&self) -> Result<(), ScreenError> {
        if self.technical.rsi_min > self.technical.rsi_max {
            return Err(ScreenError::InvalidCriteria(format!(
                "rsi_min {} exceeds rsi_max {}",
                self.technical.rsi_min, self.technical.rsi_max
            )));
        }
        if self.technical.rsi_min < 0.0 || self.technical.rsi_max > 100.0 {
            return Err(ScreenError::InvalidCriteria(
                "RSI band must lie within [0, 100]".to_string(),
            ));
        }
        if self.pass_threshold == 0 || self.pass_threshold > 100 {
            return Err(ScreenError::InvalidCriteria(format!(
                "pass_threshold {} outside 1..=100",
                self.pass_threshold
            )));
        }
        if self.base_target_multiplier <= 1.0 {
            return Err(ScreenError::InvalidCriteria(
                "base_target_multiplier must exceed 1.0".to_string(),
            ));
        }
        if self.target_tiers.iter().any(|t| t.multiplier <= 1.0) {
            return Err(ScreenError::InvalidCriteria(
                "target tier multipliers must exceed 1.0".to_string(),
            ));
        }
        if self.stop_loss_pct <= 0.0 || self.stop_loss_pct >= 1.0 {
            return Err(ScreenError::InvalidCriteria(format!(
                "stop_loss_pct {} outside (0, 1)",
                self.stop_loss_pct
            )));
        }
        if self.min_risk_reward <= 0.0 {
            return Err(ScreenError::InvalidCriteria(
                "min_risk_reward must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial criteria supplied by a caller; `None` fields keep the defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CriteriaOverrides {
    pub rsi_min: Option<f64>,
    pub rsi_max: Option<f64>,
    pub require_macd_bullish: Option<bool>,
    pub require_price_above_sma: Option<bool>,
    pub min_volume_ratio: Option<f64>,
    pub min_roe: Option<f64>,
    pub max_debt_to_equity: Option<f64>,
    pub min_earnings_growth: Option<f64>,
    pub min_promoter_holding: Option<f64>,
    pub min_market_cap: Option<f64>,
    pub pass_threshold: Option<u32>,
    pub target_tiers: Option<Vec<TargetTier>>,
    pub base_target_multiplier: Option<f64>,
    pub stop_loss_pct: Option<f64>,
    pub min_risk_reward: Option<f64>,
}
