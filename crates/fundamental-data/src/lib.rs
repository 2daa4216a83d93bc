pub mod sectors;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use screener_core::{FundamentalSnapshot, FundamentalsProvider, ScreenError};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub use sectors::sector_for;

/// Deterministic fundamentals generator.
///
/// Stands in for a real financial-data feed: every snapshot is drawn from
/// sector-conditioned ranges using an RNG seeded from the symbol, so the
/// same symbol always yields the same snapshot. Swap in a network-backed
/// [`FundamentalsProvider`] for live data.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticFundamentals;

impl SyntheticFundamentals {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, symbol: &str) -> FundamentalSnapshot {
        let mut rng = StdRng::seed_from_u64(symbol_seed(symbol));

        let base_roe = 12.0 + rng.gen::<f64>() * 20.0;
        let base_de = 0.3 + rng.gen::<f64>() * 1.2;
        let base_growth = -10.0 + rng.gen::<f64>() * 40.0;
        let base_holding = 45.0 + rng.gen::<f64>() * 30.0;
        let market_cap = 10_000.0 + rng.gen::<f64>() * 190_000.0;
        let pe = 10.0 + rng.gen::<f64>() * 30.0;

        let sector = sector_for(symbol);
        let (roe_mult, de_mult, growth_mult) = match sector {
            "IT Services" => (1.3, 0.5, 1.2),
            // Banks run on leverage
            "Banking" => (1.1, 3.0, 0.8),
            "FMCG" => (1.2, 0.7, 1.0),
            "Pharma" => (1.4, 0.6, 1.3),
            _ => (1.0, 1.0, 1.0),
        };

        FundamentalSnapshot {
            roe: round2(base_roe * roe_mult),
            debt_to_equity: round2(base_de * de_mult),
            earnings_growth: round2(base_growth * growth_mult),
            promoter_holding: round2(base_holding),
            market_cap: round2(market_cap),
            pe: round2(pe),
            sector: sector.to_string(),
        }
    }
}

#[async_trait]
impl FundamentalsProvider for SyntheticFundamentals {
    async fn fetch_fundamentals(&self, symbol: &str) -> Result<FundamentalSnapshot, ScreenError> {
        Ok(self.generate(symbol))
    }
}

fn symbol_seed(symbol: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    symbol.hash(&mut hasher);
    hasher.finish()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
