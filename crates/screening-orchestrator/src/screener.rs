use crate::SymbolScreener;
use chrono::Utc;
use screener_core::{
    CriteriaOverrides, Recommendation, ScreenError, ScreenReport, ScreeningResult,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Nifty 50 constituents, the default screening universe
pub const NIFTY50: [&str; 50] = [
    "RELIANCE",
    "TCS",
    "HDFCBANK",
    "INFY",
    "HINDUNILVR",
    "ICICIBANK",
    "KOTAKBANK",
    "BHARTIARTL",
    "ITC",
    "SBIN",
    "LT",
    "ASIANPAINT",
    "AXISBANK",
    "MARUTI",
    "NESTLEIND",
    "HCLTECH",
    "BAJFINANCE",
    "TITAN",
    "ULTRACEMCO",
    "WIPRO",
    "SUNPHARMA",
    "ONGC",
    "NTPC",
    "TECHM",
    "POWERGRID",
    "TATAMOTORS",
    "BAJAJFINSV",
    "DRREDDY",
    "JSWSTEEL",
    "GRASIM",
    "INDUSINDBK",
    "ADANIENT",
    "TATASTEEL",
    "CIPLA",
    "COALINDIA",
    "HINDALCO",
    "BRITANNIA",
    "EICHERMOT",
    "HEROMOTOCO",
    "UPL",
    "APOLLOHOSP",
    "DIVISLAB",
    "TATACONSUM",
    "BAJAJ-AUTO",
    "BPCL",
    "ADANIPORTS",
    "LTIM",
    "HDFCLIFE",
    "SBILIFE",
    "SHRIRAMFIN",
];

/// Symbol set to run a screen over
#[derive(Debug, Clone)]
pub enum Universe {
    Nifty50,
    Custom(Vec<String>),
}

impl Universe {
    pub fn symbols(&self) -> Vec<String> {
        match self {
            Universe::Nifty50 => NIFTY50.iter().map(|s| s.to_string()).collect(),
            Universe::Custom(symbols) => symbols.clone(),
        }
    }
}

/// Pacing and output knobs for a universe screen
#[derive(Debug, Clone)]
pub struct ScreenerConfig {
    /// Symbols screened concurrently per batch
    pub batch_size: usize,
    /// Pause between batches, to stay under provider rate limits
    pub batch_delay: Duration,
    /// Recommendations kept in the report
    pub top_n: usize,
    /// Overall wall-clock budget; remaining batches are skipped once spent
    pub deadline: Option<Duration>,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            batch_delay: Duration::from_millis(1500),
            top_n: 5,
            deadline: None,
        }
    }
}

/// Screens a whole universe in rate-limited batches and distills the
/// passing symbols into a ranked, top-N recommendation report.
pub struct UniverseScreener {
    screener: Arc<SymbolScreener>,
    config: ScreenerConfig,
}

impl UniverseScreener {
    pub fn new(screener: Arc<SymbolScreener>) -> Self {
        Self {
            screener,
            config: ScreenerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ScreenerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn symbol_screener(&self) -> &Arc<SymbolScreener> {
        &self.screener
    }

    /// Screen every symbol in the universe.
    ///
    /// One symbol's failure never sinks the run: fetch and computation
    /// errors are logged, counted in `total_failed_fetch` and excluded.
    /// Results keep submission order regardless of task completion order,
    /// so equal-confidence recommendations rank in universe order.
    pub async fn screen_universe(
        &self,
        universe: &Universe,
        overrides: Option<&CriteriaOverrides>,
    ) -> Result<ScreenReport, ScreenError> {
        let criteria = match overrides {
            Some(o) => self.screener.criteria().merged(o),
            None => self.screener.criteria().clone(),
        };
        criteria.validate()?;

        let symbols = universe.symbols();
        let started = Instant::now();
        info!(
            symbols = symbols.len(),
            batch_size = self.config.batch_size,
            "starting universe screen"
        );

        let mut slots: Vec<Option<ScreeningResult>> = vec![None; symbols.len()];
        let mut failed_fetch = 0usize;
        let mut deadline_hit = false;
        let criteria = Arc::new(criteria);

        for (batch_no, batch) in symbols.chunks(self.config.batch_size).enumerate() {
            if let Some(budget) = self.config.deadline {
                if started.elapsed() >= budget {
                    warn!(
                        batch = batch_no,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "screen deadline reached, skipping remaining batches"
                    );
                    deadline_hit = true;
                    break;
                }
            }

            if batch_no > 0 {
                tokio::time::sleep(self.config.batch_delay).await;
            }

            let base = batch_no * self.config.batch_size;
            let mut tasks = JoinSet::new();
            for (offset, symbol) in batch.iter().enumerate() {
                let screener = Arc::clone(&self.screener);
                let criteria = Arc::clone(&criteria);
                let symbol = symbol.clone();
                tasks.spawn(async move {
                    let outcome = screener.screen_with(&symbol, &criteria).await;
                    (base + offset, symbol, outcome)
                });
            }

            let drain = async {
                while let Some(joined) = tasks.join_next().await {
                    match joined {
                        Ok((slot, _, Ok(result))) => {
                            debug!(
                                symbol = %result.symbol,
                                score = result.score,
                                passed = result.passed,
                                "symbol screened"
                            );
                            slots[slot] = Some(result);
                        }
                        Ok((_, symbol, Err(e))) => {
                            warn!(%symbol, error = %e, "symbol excluded from screen");
                            failed_fetch += 1;
                        }
                        Err(e) => {
                            warn!(error = %e, "screening task panicked");
                            failed_fetch += 1;
                        }
                    }
                }
            };

            // Bound the in-flight batch by the remaining budget, not just
            // the gap between batches
            let timed_out = match self.config.deadline {
                Some(budget) => {
                    let remaining = budget.saturating_sub(started.elapsed());
                    tokio::time::timeout(remaining, drain).await.is_err()
                }
                None => {
                    drain.await;
                    false
                }
            };

            if timed_out {
                tasks.abort_all();
                warn!(
                    batch = batch_no,
                    "screen deadline reached mid-batch, aborting in-flight tasks"
                );
                deadline_hit = true;
                break;
            }
        }

        let results: Vec<ScreeningResult> = slots.into_iter().flatten().collect();
        let total_screened = results.len();
        let total_passed = results.iter().filter(|r| r.passed).count();

        let mut recommendations: Vec<Recommendation> = results
            .iter()
            .filter(|r| r.passed)
            .filter_map(|r| self.screener.engine().recommend(r, &criteria))
            .collect();
        // Stable sort: ties keep universe submission order
        recommendations.sort_by(|a, b| b.confidence_score.cmp(&a.confidence_score));
        recommendations.truncate(self.config.top_n);

        info!(
            total_screened,
            total_passed,
            failed_fetch,
            recommendations = recommendations.len(),
            deadline_hit,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "universe screen complete"
        );

        Ok(ScreenReport {
            recommendations,
            total_screened,
            total_passed,
            total_failed_fetch: failed_fetch,
            deadline_hit,
            timestamp: Utc::now(),
        })
    }
}
