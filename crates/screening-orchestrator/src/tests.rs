use super::*;
use crate::screener::{ScreenerConfig, Universe, UniverseScreener};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone};
use screener_core::FundamentalsProvider;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn uptrend_bars(n: usize) -> Vec<Bar> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + i as f64;
            Bar {
                timestamp: start + ChronoDuration::days(i as i64),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000_000.0,
            }
        })
        .collect()
}

/// History provider scripted by symbol prefix: `BAD*` fails, `NEW*` has a
/// short history, everything else gets the same long uptrend.
struct ScriptedHistory {
    full: Vec<Bar>,
    short: Vec<Bar>,
}

impl ScriptedHistory {
    fn new() -> Self {
        Self {
            full: uptrend_bars(250),
            short: uptrend_bars(30),
        }
    }
}

#[async_trait]
impl HistoryProvider for ScriptedHistory {
    async fn fetch_history(&self, symbol: &str) -> Result<Vec<Bar>, ScreenError> {
        if symbol.starts_with("BAD") {
            return Err(ScreenError::ApiError(format!("no data for {symbol}")));
        }
        if symbol.starts_with("NEW") {
            return Ok(self.short.clone());
        }
        Ok(self.full.clone())
    }
}

/// History provider that records how often it is actually asked
struct CountingHistory {
    bars: Vec<Bar>,
    calls: AtomicUsize,
}

impl CountingHistory {
    fn new() -> Self {
        Self {
            bars: uptrend_bars(250),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl HistoryProvider for CountingHistory {
    async fn fetch_history(&self, _symbol: &str) -> Result<Vec<Bar>, ScreenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.bars.clone())
    }
}

/// History provider that never answers within any reasonable deadline
struct StalledHistory;

#[async_trait]
impl HistoryProvider for StalledHistory {
    async fn fetch_history(&self, _symbol: &str) -> Result<Vec<Bar>, ScreenError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Err(ScreenError::DataUnavailable("stalled".to_string()))
    }
}

struct StaticFundamentals;

#[async_trait]
impl FundamentalsProvider for StaticFundamentals {
    async fn fetch_fundamentals(&self, _symbol: &str) -> Result<FundamentalSnapshot, ScreenError> {
        Ok(FundamentalSnapshot {
            roe: 20.0,
            debt_to_equity: 0.4,
            earnings_growth: 18.0,
            promoter_holding: 55.0,
            market_cap: 50_000.0,
            pe: 24.0,
            sector: "IT Services".to_string(),
        })
    }
}

/// Widen the RSI band and drop the volume floor so a clean uptrend scores
/// the full technical rubric.
fn lenient_overrides() -> CriteriaOverrides {
    CriteriaOverrides {
        rsi_min: Some(0.0),
        rsi_max: Some(100.0),
        min_volume_ratio: Some(0.0),
        ..Default::default()
    }
}

fn test_screener() -> Arc<SymbolScreener> {
    Arc::new(SymbolScreener::new(
        Arc::new(ScriptedHistory::new()),
        Arc::new(StaticFundamentals),
    ))
}

fn fast_config() -> ScreenerConfig {
    ScreenerConfig {
        batch_delay: Duration::from_millis(0),
        ..ScreenerConfig::default()
    }
}

#[tokio::test]
async fn uptrend_symbol_passes_and_is_recommended() {
    let screener = test_screener();
    let result = screener
        .screen_symbol("TCS", Some(&lenient_overrides()))
        .await
        .unwrap();

    assert!(result.passed);
    assert_eq!(result.score, 100);
    assert_eq!(result.price, 349.0);

    let criteria = screener.criteria().merged(&lenient_overrides());
    let rec = screener.engine().recommend(&result, &criteria).unwrap();
    assert_eq!(rec.confidence_score, 100);
    assert!(rec.risk_reward_ratio >= 1.5);
}

#[tokio::test]
async fn screening_is_idempotent_across_calls() {
    let screener = test_screener();
    let a = screener
        .screen_symbol("INFY", Some(&lenient_overrides()))
        .await
        .unwrap();
    let b = screener
        .screen_symbol("INFY", Some(&lenient_overrides()))
        .await
        .unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn invalid_overrides_fail_hard() {
    let screener = test_screener();
    let overrides = CriteriaOverrides {
        rsi_min: Some(80.0),
        rsi_max: Some(60.0),
        ..Default::default()
    };
    let err = screener.screen_symbol("TCS", Some(&overrides)).await;
    assert!(matches!(err, Err(ScreenError::InvalidCriteria(_))));
}

#[tokio::test]
async fn short_history_declines_without_error() {
    let screener = test_screener();
    let result = screener.screen_symbol("NEWIPO", None).await.unwrap();
    assert!(!result.passed);
    assert_eq!(result.score, 0);
    assert!(result.reasons[0].contains("Insufficient history"));
}

#[tokio::test]
async fn one_failing_symbol_does_not_sink_the_batch() {
    let universe = Universe::Custom(vec![
        "TCS".to_string(),
        "BADTICKER".to_string(),
        "INFY".to_string(),
        "WIPRO".to_string(),
        "HCLTECH".to_string(),
        "LTIM".to_string(),
    ]);
    let screener = UniverseScreener::new(test_screener()).with_config(fast_config());

    let report = screener
        .screen_universe(&universe, Some(&lenient_overrides()))
        .await
        .unwrap();

    assert_eq!(report.total_screened, 5);
    assert_eq!(report.total_failed_fetch, 1);
    assert_eq!(report.total_passed, 5);
    assert!(report
        .recommendations
        .iter()
        .all(|r| r.symbol != "BADTICKER"));
}

#[tokio::test]
async fn report_keeps_top_n_in_submission_order_on_ties() {
    // Eight symbols with identical data score identically; the report
    // must keep the first five in universe order.
    let symbols: Vec<String> = (1..=8).map(|i| format!("S{i}")).collect();
    let universe = Universe::Custom(symbols.clone());
    let screener = UniverseScreener::new(test_screener()).with_config(fast_config());

    let report = screener
        .screen_universe(&universe, Some(&lenient_overrides()))
        .await
        .unwrap();

    assert_eq!(report.total_screened, 8);
    assert_eq!(report.recommendations.len(), 5);
    let picked: Vec<&str> = report
        .recommendations
        .iter()
        .map(|r| r.symbol.as_str())
        .collect();
    assert_eq!(picked, ["S1", "S2", "S3", "S4", "S5"]);
}

#[tokio::test]
async fn short_history_symbols_are_screened_but_never_recommended() {
    let universe = Universe::Custom(vec!["TCS".to_string(), "NEWIPO".to_string()]);
    let screener = UniverseScreener::new(test_screener()).with_config(fast_config());

    let report = screener
        .screen_universe(&universe, Some(&lenient_overrides()))
        .await
        .unwrap();

    assert_eq!(report.total_screened, 2);
    assert_eq!(report.total_failed_fetch, 0);
    assert_eq!(report.total_passed, 1);
    assert_eq!(report.recommendations.len(), 1);
    assert_eq!(report.recommendations[0].symbol, "TCS");
}

#[tokio::test]
async fn all_failures_yield_an_empty_report_not_an_error() {
    let universe = Universe::Custom(vec!["BAD1".to_string(), "BAD2".to_string()]);
    let screener = UniverseScreener::new(test_screener()).with_config(fast_config());

    let report = screener.screen_universe(&universe, None).await.unwrap();

    assert_eq!(report.total_screened, 0);
    assert_eq!(report.total_failed_fetch, 2);
    assert!(report.recommendations.is_empty());
}

#[tokio::test]
async fn spent_deadline_returns_a_degraded_report() {
    let universe = Universe::Custom(vec!["TCS".to_string(), "INFY".to_string()]);
    let config = ScreenerConfig {
        deadline: Some(Duration::ZERO),
        ..fast_config()
    };
    let screener = UniverseScreener::new(test_screener()).with_config(config);

    let report = screener.screen_universe(&universe, None).await.unwrap();

    assert_eq!(report.total_screened, 0);
    assert!(report.recommendations.is_empty());
    assert!(report.deadline_hit);
}

#[tokio::test]
async fn slow_providers_cannot_overrun_the_deadline() {
    let universe = Universe::Custom(vec!["TCS".to_string(), "INFY".to_string()]);
    let config = ScreenerConfig {
        deadline: Some(Duration::from_millis(50)),
        ..fast_config()
    };
    let symbol_screener = Arc::new(SymbolScreener::new(
        Arc::new(StalledHistory),
        Arc::new(StaticFundamentals),
    ));
    let screener = UniverseScreener::new(symbol_screener).with_config(config);

    let started = std::time::Instant::now();
    let report = screener.screen_universe(&universe, None).await.unwrap();

    // The stalled fetch takes 30s; an in-flight batch must be cut off at
    // the budget, not awaited to completion
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(report.deadline_hit);
    assert_eq!(report.total_screened, 0);
    assert!(report.recommendations.is_empty());
}

#[tokio::test]
async fn repeat_screens_within_ttl_hit_the_bars_cache() {
    let history = Arc::new(CountingHistory::new());
    let screener = SymbolScreener::new(history.clone(), Arc::new(StaticFundamentals));

    let a = screener.screen_symbol("TCS", None).await.unwrap();
    // Case-insensitive key: this must not trigger a second fetch
    let b = screener.screen_symbol("tcs", None).await.unwrap();

    assert_eq!(history.calls.load(Ordering::SeqCst), 1);
    assert_eq!(a.score, b.score);
}

#[tokio::test]
async fn expired_cache_entries_are_refetched() {
    let history = Arc::new(CountingHistory::new());
    let screener = SymbolScreener::new(history.clone(), Arc::new(StaticFundamentals))
        .with_cache_ttl_secs(0);

    screener.screen_symbol("TCS", None).await.unwrap();
    screener.screen_symbol("TCS", None).await.unwrap();

    assert_eq!(history.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn nifty50_universe_lists_fifty_symbols() {
    let symbols = Universe::Nifty50.symbols();
    assert_eq!(symbols.len(), 50);
    assert!(symbols.contains(&"RELIANCE".to_string()));
    assert!(symbols.contains(&"SHRIRAMFIN".to_string()));
}
