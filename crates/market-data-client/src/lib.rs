use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use reqwest::Client;
use screener_core::{Bar, FundamentalSnapshot, FundamentalsProvider, HistoryProvider, ScreenError};
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

const BASE_URL: &str = "https://api.polygon.io";

/// Sliding-window rate limiter: at most `max_requests` per `window`.
#[derive(Clone)]
struct RateLimiter {
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: Arc::new(Mutex::new(VecDeque::new())),
            // A zero budget would never admit a request
            max_requests: max_requests.max(1),
            window,
        }
    }

    /// Admit one request, sleeping until the window has a free slot
    async fn acquire(&self) {
        loop {
            let wait = {
                let mut ts = self.timestamps.lock().await;
                let now = Instant::now();
                Self::prune(&mut ts, now, self.window);

                if ts.len() < self.max_requests {
                    ts.push_back(now);
                    return;
                }

                // Until the oldest in-window request ages out, plus slack
                match ts.front() {
                    Some(&oldest) => {
                        self.window.saturating_sub(now.duration_since(oldest))
                            + Duration::from_millis(50)
                    }
                    None => Duration::from_millis(50),
                }
            };

            tracing::debug!(
                "rate limiter: waiting {:.1}s for an API slot",
                wait.as_secs_f64()
            );
            tokio::time::sleep(wait).await;
        }
    }

    fn prune(ts: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while ts
            .front()
            .is_some_and(|&t| now.duration_since(t) >= window)
        {
            ts.pop_front();
        }
    }
}

/// HTTP-backed market data provider.
///
/// Serves daily bars and derives a [`FundamentalSnapshot`] from quarterly
/// financial statements. Requests are rate-limited client-side and retried
/// once per 429 response, up to three attempts.
#[derive(Clone)]
pub struct MarketDataClient {
    api_key: String,
    client: Client,
    rate_limiter: RateLimiter,
    history_days: i64,
}

impl MarketDataClient {
    pub fn new(api_key: String) -> Self {
        // Free-tier keys should set SCREENER_RATE_LIMIT=5
        let rate_limit: usize = std::env::var("SCREENER_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100);

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_key,
            client,
            rate_limiter: RateLimiter::new(rate_limit, Duration::from_secs(60)),
            history_days: 365,
        }
    }

    /// Override how far back bar history is requested (default 365 days)
    pub fn with_history_days(mut self, days: i64) -> Self {
        self.history_days = days;
        self
    }

    async fn send_request(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ScreenError> {
        let request = builder
            .build()
            .map_err(|e| ScreenError::ApiError(e.to_string()))?;

        for attempt in 0..3u32 {
            self.rate_limiter.acquire().await;
            let req = request
                .try_clone()
                .ok_or_else(|| ScreenError::ApiError("cannot clone request".to_string()))?;
            let response = self
                .client
                .execute(req)
                .await
                .map_err(|e| ScreenError::ApiError(e.to_string()))?;

            if response.status().as_u16() != 429 {
                return Ok(response);
            }

            tracing::warn!("429 rate limited upstream, retry {}/3 in 15s", attempt + 1);
            tokio::time::sleep(Duration::from_secs(15)).await;
        }

        Err(ScreenError::ApiError(
            "rate limited upstream after 3 retries".to_string(),
        ))
    }

    /// Daily bars for the configured history window, ascending by timestamp
    pub async fn get_daily_bars(&self, symbol: &str) -> Result<Vec<Bar>, ScreenError> {
        let to = Utc::now();
        let from = to - ChronoDuration::days(self.history_days);
        let url = format!(
            "{}/v2/aggs/ticker/{}/range/1/day/{}/{}",
            BASE_URL,
            symbol,
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d")
        );

        let response = self
            .send_request(self.client.get(&url).query(&[
                ("apiKey", self.api_key.as_str()),
                ("adjusted", "true"),
                ("sort", "asc"),
                ("limit", "5000"),
            ]))
            .await?;

        if !response.status().is_success() {
            return Err(ScreenError::ApiError(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let aggs: AggregateResponse = response
            .json()
            .await
            .map_err(|e| ScreenError::ApiError(e.to_string()))?;

        let mut bars: Vec<Bar> = aggs
            .results
            .unwrap_or_default()
            .into_iter()
            .filter_map(|r| {
                let timestamp = DateTime::from_timestamp_millis(r.t)?;
                Some(Bar {
                    timestamp,
                    open: r.o,
                    high: r.h,
                    low: r.l,
                    close: r.c,
                    volume: r.v,
                })
            })
            .collect();

        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }

    /// Derive fundamental ratios from the most recent quarterly statements
    pub async fn get_fundamentals(&self, symbol: &str) -> Result<FundamentalSnapshot, ScreenError> {
        let url = format!("{}/vX/reference/financials", BASE_URL);

        let response = self
            .send_request(self.client.get(&url).query(&[
                ("ticker", symbol),
                ("timeframe", "quarterly"),
                ("limit", "8"),
                ("apiKey", self.api_key.as_str()),
            ]))
            .await?;

        if !response.status().is_success() {
            return Err(ScreenError::DataUnavailable(format!(
                "financials fetch for {} failed: HTTP {}",
                symbol,
                response.status()
            )));
        }

        let fin: FinancialsResponse = response
            .json()
            .await
            .map_err(|e| ScreenError::ApiError(e.to_string()))?;

        let quarters = fin.results.unwrap_or_default();
        if quarters.is_empty() {
            return Err(ScreenError::DataUnavailable(format!(
                "no financial statements for {symbol}"
            )));
        }

        Ok(derive_snapshot(symbol, &quarters))
    }
}

fn statement_value(statement: &serde_json::Value, field: &str) -> Option<f64> {
    statement.get(field)?.get("value")?.as_f64()
}

/// Collapse up to 8 quarters of statements into the screening ratios.
/// Promoter holding is not reported by this source and stays at 0.0, which
/// never earns rubric points.
fn derive_snapshot(symbol: &str, quarters: &[FinancialsResult]) -> FundamentalSnapshot {
    let latest = &quarters[0];
    let income = &latest.financials.income_statement;
    let balance = &latest.financials.balance_sheet;

    let net_income = statement_value(income, "net_income_loss").unwrap_or(0.0);
    let equity = statement_value(balance, "equity").unwrap_or(0.0);
    let liabilities = statement_value(balance, "liabilities").unwrap_or(0.0);

    let roe = if equity > 0.0 {
        net_income / equity * 100.0
    } else {
        0.0
    };
    let debt_to_equity = if equity > 0.0 { liabilities / equity } else { 0.0 };

    // YoY earnings growth: latest quarter vs the same quarter a year prior
    let earnings_growth = if quarters.len() >= 5 {
        let prior = statement_value(&quarters[4].financials.income_statement, "net_income_loss");
        match prior {
            Some(p) if p > 0.0 => (net_income - p) / p * 100.0,
            _ => 0.0,
        }
    } else {
        0.0
    };

    FundamentalSnapshot {
        roe,
        debt_to_equity,
        earnings_growth,
        promoter_holding: 0.0,
        market_cap: latest.market_cap.unwrap_or(0.0),
        pe: 0.0,
        sector: latest
            .sic_description
            .clone()
            .unwrap_or_else(|| format!("{symbol} (unclassified)")),
    }
}

#[async_trait]
impl HistoryProvider for MarketDataClient {
    async fn fetch_history(&self, symbol: &str) -> Result<Vec<Bar>, ScreenError> {
        self.get_daily_bars(symbol).await
    }
}

#[async_trait]
impl FundamentalsProvider for MarketDataClient {
    async fn fetch_fundamentals(&self, symbol: &str) -> Result<FundamentalSnapshot, ScreenError> {
        self.get_fundamentals(symbol).await
    }
}

#[derive(Deserialize)]
struct AggregateResponse {
    results: Option<Vec<AggregateBar>>,
}

#[derive(Deserialize)]
struct AggregateBar {
    t: i64,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    v: f64,
}

#[derive(Deserialize)]
struct FinancialsResponse {
    results: Option<Vec<FinancialsResult>>,
}

#[derive(Deserialize)]
struct FinancialsResult {
    #[serde(default)]
    market_cap: Option<f64>,
    #[serde(default)]
    sic_description: Option<String>,
    financials: FinancialStatements,
}

#[derive(Deserialize)]
struct FinancialStatements {
    #[serde(default)]
    income_statement: serde_json::Value,
    #[serde(default)]
    balance_sheet: serde_json::Value,
}
