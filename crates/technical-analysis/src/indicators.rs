//! Indicator series aligned index-for-index with their input.
//!
//! Positions still inside an indicator's warm-up window are `None`.

use analysis_core::stats;

/// Simple Moving Average
pub fn sma(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; data.len()];
    if period == 0 || data.len() < period {
        return result;
    }

    for i in period - 1..data.len() {
        result[i] = Some(stats::mean(&data[i + 1 - period..=i]));
    }
    result
}

/// Exponential Moving Average with `alpha = 2 / (span + 1)`, seeded with the first value.
pub fn ema(data: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || data.is_empty() {
        return vec![];
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut result = Vec::with_capacity(data.len());
    result.push(data[0]);

    for i in 1..data.len() {
        let ema_val = alpha * data[i] + (1.0 - alpha) * result[i - 1];
        result.push(ema_val);
    }

    result
}

/// Relative Strength Index using a simple rolling mean of gains and losses.
///
/// The first value is defined at index `period` since the price diff drops one
/// observation. A window with no losses and some gains reads 100; a flat window
/// is undefined.
pub fn rsi(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; data.len()];
    if period == 0 || data.len() < period + 1 {
        return result;
    }

    let mut gains = Vec::with_capacity(data.len() - 1);
    let mut losses = Vec::with_capacity(data.len() - 1);

    for i in 1..data.len() {
        let change = data[i] - data[i - 1];
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    for i in period..data.len() {
        // diff index i-1 corresponds to price index i
        let window = i - period..i;
        let avg_gain = stats::mean(&gains[window.clone()]);
        let avg_loss = stats::mean(&losses[window]);

        result[i] = if avg_loss == 0.0 {
            if avg_gain > 0.0 {
                Some(100.0)
            } else {
                None
            }
        } else {
            let rs = avg_gain / avg_loss;
            Some(100.0 - (100.0 / (1.0 + rs)))
        };
    }

    result
}

/// MACD (Moving Average Convergence Divergence)
pub struct MacdResult {
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd(data: &[f64], fast_span: usize, slow_span: usize, signal_span: usize) -> MacdResult {
    if fast_span == 0 || slow_span == 0 || signal_span == 0 || data.is_empty() {
        return MacdResult { macd_line: vec![], signal_line: vec![], histogram: vec![] };
    }

    let ema_fast = ema(data, fast_span);
    let ema_slow = ema(data, slow_span);

    let macd_line: Vec<f64> = ema_fast.iter().zip(&ema_slow).map(|(f, s)| f - s).collect();
    let signal_line = ema(&macd_line, signal_span);
    let histogram = macd_line.iter().zip(&signal_line).map(|(m, s)| m - s).collect();

    MacdResult {
        macd_line,
        signal_line,
        histogram,
    }
}

/// Bollinger Bands
pub struct BollingerBands {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Bands at `num_std` sample standard deviations around the rolling mean.
pub fn bollinger_bands(data: &[f64], period: usize, num_std: f64) -> BollingerBands {
    let middle = sma(data, period);
    let mut upper = vec![None; data.len()];
    let mut lower = vec![None; data.len()];

    // a single-value window has no sample deviation
    if period < 2 {
        return BollingerBands { upper, middle, lower };
    }

    for (i, mean) in middle.iter().enumerate() {
        if let Some(mean) = mean {
            let std = stats::std_dev(&data[i + 1 - period..=i]);
            upper[i] = Some(mean + num_std * std);
            lower[i] = Some(mean - num_std * std);
        }
    }

    BollingerBands { upper, middle, lower }
}
