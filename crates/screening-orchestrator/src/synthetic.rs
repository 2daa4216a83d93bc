use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use screener_core::{Bar, HistoryProvider, ScreenError};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Trading days of history generated per symbol
const DEFAULT_BARS: usize = 260;

/// Deterministic synthetic daily-bar source.
///
/// Each symbol gets a price walk seeded from its name, so repeated fetches
/// (and repeated runs) return identical histories. Used for demos and as
/// the offline fallback when no market data key is configured.
pub struct SyntheticHistory {
    bars: usize,
}

impl Default for SyntheticHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntheticHistory {
    pub fn new() -> Self {
        Self {
            bars: DEFAULT_BARS,
        }
    }

    pub fn with_bars(mut self, bars: usize) -> Self {
        self.bars = bars;
        self
    }

    fn symbol_seed(symbol: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        symbol.to_uppercase().hash(&mut hasher);
        hasher.finish()
    }

    /// Generate the full daily history for one symbol, oldest bar first
    pub fn generate(&self, symbol: &str) -> Vec<Bar> {
        let mut rng = StdRng::seed_from_u64(Self::symbol_seed(symbol));

        let start_price = 200.0 + rng.gen::<f64>() * 2800.0;
        let drift = -0.0005 + rng.gen::<f64>() * 0.0020;
        let volatility = 0.008 + rng.gen::<f64>() * 0.012;
        let base_volume = 500_000.0 + rng.gen::<f64>() * 4_500_000.0;

        // Anchor at UTC midnight so reruns within a day line up
        let today = Utc::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now);

        let mut close = start_price;
        let mut bars = Vec::with_capacity(self.bars);
        for day in 0..self.bars {
            let shock = (rng.gen::<f64>() - 0.5) * 2.0 * volatility;
            let open = close;
            close = (open * (1.0 + drift + shock)).max(1.0);

            let spread = open.max(close) * volatility * rng.gen::<f64>();
            let high = open.max(close) + spread;
            let low = (open.min(close) - spread).max(0.5);

            // Occasional participation spike, roughly one day in ten
            let volume_factor = if rng.gen::<f64>() < 0.1 {
                1.5 + rng.gen::<f64>() * 2.0
            } else {
                0.6 + rng.gen::<f64>() * 0.8
            };

            bars.push(Bar {
                timestamp: today - Duration::days((self.bars - day) as i64),
                open,
                high,
                low,
                close,
                volume: base_volume * volume_factor,
            });
        }

        bars
    }
}

#[async_trait]
impl HistoryProvider for SyntheticHistory {
    async fn fetch_history(&self, symbol: &str) -> Result<Vec<Bar>, ScreenError> {
        Ok(self.generate(symbol))
    }
}
