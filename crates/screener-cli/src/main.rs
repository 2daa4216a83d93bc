//! screener: run a swing-trade screen over a symbol universe.
//!
//! Usage:
//!   cargo run -p screener-cli                      # Nifty 50, synthetic data
//!   cargo run -p screener-cli -- --symbols TCS INFY WIPRO
//!   cargo run -p screener-cli -- --preset broad --top 10
//!   cargo run -p screener-cli -- --live --json     # Polygon data, JSON report
//!
//! Live mode needs POLYGON_API_KEY in the environment (or a .env file).

use anyhow::Context;
use fundamental_data::SyntheticFundamentals;
use market_data_client::MarketDataClient;
use screener_core::{FundamentalsProvider, HistoryProvider, ScreenReport, ScreeningCriteria};
use screening_orchestrator::{
    ScreenerConfig, SymbolScreener, SyntheticHistory, Universe, UniverseScreener,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "screener=info,screening_orchestrator=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let live = args.iter().any(|a| a == "--live");
    let json = args.iter().any(|a| a == "--json");

    let preset = args
        .iter()
        .position(|a| a == "--preset")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
        .unwrap_or("default");
    let criteria = match preset {
        "default" => ScreeningCriteria::default(),
        "conservative" => ScreeningCriteria::conservative(),
        "broad" => ScreeningCriteria::broad(),
        other => anyhow::bail!("unknown preset '{other}' (default, conservative, broad)"),
    };

    let top_n: usize = args
        .iter()
        .position(|a| a == "--top")
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
        .unwrap_or(5);

    let deadline = args
        .iter()
        .position(|a| a == "--deadline-secs")
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs);

    let universe = if let Some(idx) = args.iter().position(|a| a == "--symbols") {
        let symbols: Vec<String> = args[idx + 1..]
            .iter()
            .take_while(|a| !a.starts_with("--"))
            .map(|s| s.to_uppercase())
            .collect();
        anyhow::ensure!(!symbols.is_empty(), "--symbols needs at least one symbol");
        Universe::Custom(symbols)
    } else {
        Universe::Nifty50
    };

    let (history, fundamentals): (Arc<dyn HistoryProvider>, Arc<dyn FundamentalsProvider>) =
        if live {
            let api_key = std::env::var("POLYGON_API_KEY")
                .context("POLYGON_API_KEY must be set for --live")?;
            let client = Arc::new(MarketDataClient::new(api_key));
            (client.clone(), client)
        } else {
            tracing::info!("no --live flag, using deterministic synthetic data");
            (
                Arc::new(SyntheticHistory::new()),
                Arc::new(SyntheticFundamentals::new()),
            )
        };

    let symbol_screener = Arc::new(SymbolScreener::new(history, fundamentals).with_criteria(criteria));
    let config = ScreenerConfig {
        top_n,
        deadline,
        ..ScreenerConfig::default()
    };
    let screener = UniverseScreener::new(symbol_screener).with_config(config);

    let report = screener.screen_universe(&universe, None).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &ScreenReport) {
    println!();
    println!(
        "Screened {} symbols: {} passed, {} excluded (fetch/data failures)",
        report.total_screened, report.total_passed, report.total_failed_fetch
    );
    if report.deadline_hit {
        println!("Deadline reached before the full universe was screened.");
    }

    if report.recommendations.is_empty() {
        println!("No recommendations met the criteria.");
        return;
    }

    println!();
    for (rank, rec) in report.recommendations.iter().enumerate() {
        println!(
            "{}. {} ({})  confidence {}",
            rank + 1,
            rec.symbol,
            rec.sector,
            rec.confidence_score
        );
        println!(
            "   price {:.2}  entry {:.2}-{:.2}  target {:.2}  stop {:.2}  R:R {:.2}",
            rec.current_price,
            rec.entry_range.min,
            rec.entry_range.max,
            rec.target,
            rec.stop_loss,
            rec.risk_reward_ratio
        );
        println!("   {}", rec.reasoning);
    }
}
