use crate::{Bar, FundamentalSnapshot, ScreenError};
use async_trait::async_trait;

/// Source of historical OHLCV bars.
///
/// Implementations must return bars in ascending timestamp order. How the
/// bars are sourced (HTTP API, cache, deterministic generator) is up to the
/// implementation.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    async fn fetch_history(&self, symbol: &str) -> Result<Vec<Bar>, ScreenError>;
}

/// Source of fundamental ratios for a symbol
#[async_trait]
pub trait FundamentalsProvider: Send + Sync {
    async fn fetch_fundamentals(&self, symbol: &str) -> Result<FundamentalSnapshot, ScreenError>;
}
