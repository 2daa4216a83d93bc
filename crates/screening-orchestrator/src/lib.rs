use chrono::{DateTime, Utc};
use dashmap::DashMap;
use screener_core::{
    Bar, CriteriaOverrides, FundamentalSnapshot, FundamentalsProvider, HistoryProvider,
    ScreenError, ScreeningCriteria, ScreeningResult,
};
use screening_engine::ScoringEngine;
use std::sync::Arc;
use technical_indicators::build_snapshot;

pub mod screener;
pub mod synthetic;

#[cfg(test)]
mod tests;

pub use screener::{ScreenerConfig, Universe, UniverseScreener};
pub use synthetic::SyntheticHistory;

const CACHE_TTL_SECS: i64 = 300; // 5 minutes

/// Internal cache entry with timestamp
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
}

/// Per-symbol screening pipeline.
///
/// Owns the data providers, the scoring engine and the read-through caches.
/// Constructed once at process start and shared by handle; per-symbol
/// screening holds no mutable state beyond the caches, so concurrent calls
/// for different symbols are safe.
pub struct SymbolScreener {
    history: Arc<dyn HistoryProvider>,
    fundamentals: Arc<dyn FundamentalsProvider>,
    engine: ScoringEngine,
    criteria: ScreeningCriteria,
    cache_ttl_secs: i64,
    bars_cache: DashMap<String, CacheEntry<Vec<Bar>>>,
    fundamentals_cache: DashMap<String, CacheEntry<FundamentalSnapshot>>,
}

impl SymbolScreener {
    pub fn new(
        history: Arc<dyn HistoryProvider>,
        fundamentals: Arc<dyn FundamentalsProvider>,
    ) -> Self {
        Self {
            history,
            fundamentals,
            engine: ScoringEngine::new(),
            criteria: ScreeningCriteria::default(),
            cache_ttl_secs: CACHE_TTL_SECS,
            bars_cache: DashMap::new(),
            fundamentals_cache: DashMap::new(),
        }
    }

    /// Replace the default criteria for every subsequent screen
    pub fn with_criteria(mut self, criteria: ScreeningCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    pub fn with_cache_ttl_secs(mut self, secs: i64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    pub fn criteria(&self) -> &ScreeningCriteria {
        &self.criteria
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Screen a single symbol.
    ///
    /// Only structurally invalid criteria fail hard. A history shorter than
    /// the minimum yields a non-passing result; provider failures surface as
    /// `DataUnavailable` and are expected to be contained by the caller
    /// (the universe screener does so per task).
    pub async fn screen_symbol(
        &self,
        symbol: &str,
        overrides: Option<&CriteriaOverrides>,
    ) -> Result<ScreeningResult, ScreenError> {
        let criteria = match overrides {
            Some(o) => self.criteria.merged(o),
            None => self.criteria.clone(),
        };
        criteria.validate()?;
        self.screen_with(symbol, &criteria).await
    }

    pub(crate) async fn screen_with(
        &self,
        symbol: &str,
        criteria: &ScreeningCriteria,
    ) -> Result<ScreeningResult, ScreenError> {
        let bars = self.get_bars(symbol).await?;

        let snapshot = match build_snapshot(symbol, &bars) {
            Ok(snapshot) => snapshot,
            Err(ScreenError::InsufficientHistory { got, .. }) => {
                tracing::debug!(%symbol, bars = got, "history below minimum, declining");
                return Ok(self.engine.insufficient_history(symbol, got));
            }
            Err(e) => {
                // Numeric failures degrade to a missing symbol, not a crash
                tracing::warn!(%symbol, error = %e, "snapshot computation failed");
                return Err(ScreenError::DataUnavailable(e.to_string()));
            }
        };

        let fundamentals = self.get_fundamentals(symbol).await?;

        let price = bars
            .iter()
            .rev()
            .find(|b| b.close > 0.0)
            .map(|b| b.close)
            .unwrap_or(0.0);

        Ok(self
            .engine
            .score(symbol, price, &snapshot, &fundamentals, criteria))
    }

    /// Historical bars for a symbol (cached)
    pub async fn get_bars(&self, symbol: &str) -> Result<Vec<Bar>, ScreenError> {
        let cache_key = symbol.to_uppercase();
        if let Some(entry) = self.bars_cache.get(&cache_key) {
            let age = (Utc::now() - entry.cached_at).num_seconds();
            if age < self.cache_ttl_secs {
                return Ok(entry.data.clone());
            }
        }

        let bars = self.history.fetch_history(symbol).await?;

        self.bars_cache.insert(
            cache_key,
            CacheEntry {
                data: bars.clone(),
                cached_at: Utc::now(),
            },
        );

        Ok(bars)
    }

    /// Fundamental snapshot for a symbol (cached)
    pub async fn get_fundamentals(&self, symbol: &str) -> Result<FundamentalSnapshot, ScreenError> {
        let cache_key = symbol.to_uppercase();
        if let Some(entry) = self.fundamentals_cache.get(&cache_key) {
            let age = (Utc::now() - entry.cached_at).num_seconds();
            if age < self.cache_ttl_secs {
                return Ok(entry.data.clone());
            }
        }

        let snapshot = self.fundamentals.fetch_fundamentals(symbol).await?;

        self.fundamentals_cache.insert(
            cache_key,
            CacheEntry {
                data: snapshot.clone(),
                cached_at: Utc::now(),
            },
        );

        Ok(snapshot)
    }
}
