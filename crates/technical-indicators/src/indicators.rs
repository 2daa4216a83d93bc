use screener_core::Bar;

/// Simple Moving Average.
/// Returns one value per full trailing window: `data.len() - period + 1`
/// values, or empty when the series is shorter than the window.
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - period + 1);
    for i in period - 1..data.len() {
        let sum: f64 = data[i + 1 - period..=i].iter().sum();
        result.push(sum / period as f64);
    }
    result
}

/// Exponential Moving Average.
///
/// Seeded with the SMA of the first `period` values, not the raw first
/// value; the seeding convention materially affects the first several
/// outputs. Same length contract as [`sma`].
pub fn ema(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let seed: f64 = data[..period].iter().sum::<f64>() / period as f64;

    let mut result = Vec::with_capacity(data.len() - period + 1);
    result.push(seed);

    for &value in &data[period..] {
        let prev = *result.last().unwrap();
        result.push((value - prev) * multiplier + prev);
    }

    result
}

/// Relative Strength Index using Wilder smoothing.
///
/// The first value is computed from the simple mean of the first `period`
/// signed deltas; subsequent averages are smoothed recursively. Output
/// starts at input index `period`, so the length is `data.len() - period`.
/// A zero average loss clamps RSI to 100 instead of dividing by zero.
pub fn rsi(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period + 1 {
        return vec![];
    }

    let mut gains = Vec::with_capacity(data.len() - 1);
    let mut losses = Vec::with_capacity(data.len() - 1);

    for w in data.windows(2) {
        let change = w[1] - w[0];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(change.abs());
        }
    }

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;

    let mut result = Vec::with_capacity(data.len() - period);
    result.push(rsi_value(avg_gain, avg_loss));

    for i in period..gains.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
        result.push(rsi_value(avg_gain, avg_loss));
    }

    result
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        // Pure uptrend over the lookback: saturate instead of dividing by zero
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// MACD line, signal line and histogram, aligned to the same final index.
/// All three sequences have equal length.
#[derive(Debug, Clone, Default)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Moving Average Convergence Divergence.
///
/// The fast EMA's leading `slow - fast` values are dropped so both EMAs
/// align by calendar position; the MACD line's leading `signal_period - 1`
/// values are dropped to align with the signal line.
pub fn macd(data: &[f64], fast: usize, slow: usize, signal_period: usize) -> MacdSeries {
    if fast == 0 || signal_period == 0 || slow <= fast {
        return MacdSeries::default();
    }

    let fast_ema = ema(data, fast);
    let slow_ema = ema(data, slow);
    if slow_ema.is_empty() {
        return MacdSeries::default();
    }

    let offset = slow - fast;
    let macd_line: Vec<f64> = slow_ema
        .iter()
        .enumerate()
        .map(|(i, s)| fast_ema[i + offset] - s)
        .collect();

    let signal = ema(&macd_line, signal_period);
    if signal.is_empty() {
        return MacdSeries::default();
    }

    let skip = signal_period - 1;
    let histogram: Vec<f64> = signal
        .iter()
        .enumerate()
        .map(|(i, s)| macd_line[i + skip] - s)
        .collect();

    MacdSeries {
        macd: macd_line[skip..].to_vec(),
        signal,
        histogram,
    }
}

/// Bollinger Bands
#[derive(Debug, Clone, Default)]
pub struct BollingerSeries {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

/// Middle band is the SMA; upper/lower bands sit `k` population standard
/// deviations of the trailing window away from it.
pub fn bollinger_bands(data: &[f64], period: usize, k: f64) -> BollingerSeries {
    if period == 0 || data.len() < period {
        return BollingerSeries::default();
    }

    let middle = sma(data, period);
    let mut upper = Vec::with_capacity(middle.len());
    let mut lower = Vec::with_capacity(middle.len());

    for i in period - 1..data.len() {
        let window = &data[i + 1 - period..=i];
        let mean = middle[i + 1 - period];
        let variance: f64 =
            window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / period as f64;
        let std = variance.sqrt();

        upper.push(mean + k * std);
        lower.push(mean - k * std);
    }

    BollingerSeries { upper, middle, lower }
}

/// Current volume relative to its trailing average
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VolumeAnalysis {
    pub avg_volume: f64,
    pub volume_ratio: f64,
    pub is_spike: bool,
}

/// Compares the latest bar's volume against the mean of the last `period`
/// volumes. Zeroed result when the history is shorter than the window.
pub fn analyze_volume(bars: &[Bar], period: usize, spike_ratio: f64) -> VolumeAnalysis {
    if period == 0 || bars.len() < period {
        return VolumeAnalysis::default();
    }

    let recent = &bars[bars.len() - period..];
    let avg_volume = recent.iter().map(|b| b.volume).sum::<f64>() / period as f64;
    if avg_volume <= 0.0 {
        return VolumeAnalysis::default();
    }

    let volume_ratio = bars.last().map(|b| b.volume).unwrap_or(0.0) / avg_volume;

    VolumeAnalysis {
        avg_volume,
        volume_ratio,
        is_spike: volume_ratio >= spike_ratio,
    }
}

/// Local price extremes usable as support/resistance levels
#[derive(Debug, Clone, Default)]
pub struct SupportResistance {
    pub support: Vec<f64>,
    pub resistance: Vec<f64>,
}

/// A bar's high is a resistance level when it is the maximum of the
/// symmetric window of `2 * lookback + 1` bars centered on it; lows work
/// the same way for support.
pub fn support_resistance(bars: &[Bar], lookback: usize) -> SupportResistance {
    if lookback == 0 || bars.len() < 2 * lookback + 1 {
        return SupportResistance::default();
    }

    let mut support = Vec::new();
    let mut resistance = Vec::new();

    for i in lookback..bars.len() - lookback {
        let window = &bars[i - lookback..=i + lookback];
        if window.iter().all(|b| b.high <= bars[i].high) {
            resistance.push(bars[i].high);
        }
        if window.iter().all(|b| b.low >= bars[i].low) {
            support.push(bars[i].low);
        }
    }

    SupportResistance { support, resistance }
}
