use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Latest MACD line, signal line and histogram values
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MacdSnapshot {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Latest Bollinger band values
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BollingerSnapshot {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// The last computed value of each indicator series for one symbol.
///
/// Built once per screening pass from the full bar history. Fields fall back
/// to 0.0 when the lookback window exceeds the available history (e.g. a
/// 200-bar SMA over a 120-bar history).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalSnapshot {
    pub rsi: f64,
    pub macd: MacdSnapshot,
    pub sma20: f64,
    pub sma50: f64,
    pub sma200: f64,
    pub volume_avg20: f64,
    pub bollinger: BollingerSnapshot,
    pub volume_ratio: f64,
}

/// Fundamental ratios for one symbol. Read-only input to scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalSnapshot {
    /// Return on equity, percent
    pub roe: f64,
    pub debt_to_equity: f64,
    /// Year-over-year earnings growth, percent
    pub earnings_growth: f64,
    /// Promoter/insider holding, percent
    pub promoter_holding: f64,
    pub market_cap: f64,
    pub pe: f64,
    pub sector: String,
}

/// Outcome of screening one symbol against one set of criteria
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub symbol: String,
    pub passed: bool,
    /// Bounded 0..=100
    pub score: u32,
    /// One entry per rubric factor, in evaluation order
    pub reasons: Vec<String>,
    pub price: f64,
    pub technical: Option<TechnicalSnapshot>,
    pub fundamental: Option<FundamentalSnapshot>,
}

/// Suggested entry window around the current price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntryRange {
    pub min: f64,
    pub max: f64,
}

/// Actionable trade idea derived from a passing screening result.
/// Re-derived on every screening cycle, never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub symbol: String,
    pub sector: String,
    pub current_price: f64,
    pub entry_range: EntryRange,
    pub target: f64,
    pub stop_loss: f64,
    pub risk_reward_ratio: f64,
    pub confidence_score: u32,
    pub reasoning: String,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate outcome of a universe screen. An empty recommendation list with
/// non-zero `total_screened` means "the screen ran and nothing passed",
/// which callers must not confuse with "the screen never ran".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenReport {
    pub recommendations: Vec<Recommendation>,
    pub total_screened: usize,
    pub total_passed: usize,
    /// Symbols excluded because their data fetch or computation failed
    pub total_failed_fetch: usize,
    /// True when the run's deadline expired and symbols were left unscreened
    pub deadline_hit: bool,
    pub timestamp: DateTime<Utc>,
}
