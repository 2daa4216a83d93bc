use screener_core::{Bar, BollingerSnapshot, MacdSnapshot, ScreenError, TechnicalSnapshot};

use crate::indicators::{analyze_volume, bollinger_bands, macd, rsi, sma};

/// Minimum bar count before a snapshot can be built. Symbols with shorter
/// histories are declined, not scored.
pub const MIN_BARS: usize = 50;

/// Default spike threshold recorded alongside the volume ratio
pub const VOLUME_SPIKE_RATIO: f64 = 1.5;

fn last(series: &[f64]) -> f64 {
    series.last().copied().unwrap_or(0.0)
}

/// Reduce a bar history to the latest value of every indicator the
/// screener looks at.
///
/// Bars with non-positive closes are dropped before any computation.
/// Indicators whose lookback exceeds the (remaining) history fall back to
/// 0.0 rather than failing the whole snapshot; only a history shorter than
/// [`MIN_BARS`] is an error.
pub fn build_snapshot(symbol: &str, bars: &[Bar]) -> Result<TechnicalSnapshot, ScreenError> {
    let bars: Vec<Bar> = bars.iter().filter(|b| b.close > 0.0).cloned().collect();

    if bars.len() < MIN_BARS {
        return Err(ScreenError::InsufficientHistory {
            symbol: symbol.to_string(),
            got: bars.len(),
            need: MIN_BARS,
        });
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();

    let rsi_series = rsi(&closes, 14);
    let macd_series = macd(&closes, 12, 26, 9);
    let bb = bollinger_bands(&closes, 20, 2.0);
    let volume = analyze_volume(&bars, 20, VOLUME_SPIKE_RATIO);

    Ok(TechnicalSnapshot {
        rsi: last(&rsi_series),
        macd: MacdSnapshot {
            macd: last(&macd_series.macd),
            signal: last(&macd_series.signal),
            histogram: last(&macd_series.histogram),
        },
        sma20: last(&sma(&closes, 20)),
        sma50: last(&sma(&closes, 50)),
        sma200: last(&sma(&closes, 200)),
        volume_avg20: last(&sma(&volumes, 20)),
        bollinger: BollingerSnapshot {
            upper: last(&bb.upper),
            middle: last(&bb.middle),
            lower: last(&bb.lower),
        },
        volume_ratio: volume.volume_ratio,
    })
}
