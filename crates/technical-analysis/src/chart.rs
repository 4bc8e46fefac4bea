use analysis_core::{stats, Bar};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::indicators::{bollinger_bands, ema, macd, rsi, sma};

pub const SMA_PERIODS: [usize; 3] = [20, 50, 200];
pub const EMA_SPANS: [usize; 2] = [12, 26];
pub const RSI_PERIOD: usize = 14;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_STD: f64 = 2.0;

/// Indicator overlays offered by the technical chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorKind {
    Sma,
    Ema,
    Rsi,
    Macd,
    Bollinger,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 5] = [
        IndicatorKind::Sma,
        IndicatorKind::Ema,
        IndicatorKind::Rsi,
        IndicatorKind::Macd,
        IndicatorKind::Bollinger,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndicatorKind::Sma => "sma",
            IndicatorKind::Ema => "ema",
            IndicatorKind::Rsi => "rsi",
            IndicatorKind::Macd => "macd",
            IndicatorKind::Bollinger => "bollinger",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IndicatorKind::Sma => "Simple Moving Average (SMA)",
            IndicatorKind::Ema => "Exponential Moving Average (EMA)",
            IndicatorKind::Rsi => "Relative Strength Index (RSI)",
            IndicatorKind::Macd => "Moving Average Convergence Divergence (MACD)",
            IndicatorKind::Bollinger => "Bollinger Bands",
        }
    }
}

impl FromStr for IndicatorKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IndicatorKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or(())
    }
}

/// One point of an indicator overlay, serialized flat with a `type` tag
/// such as `SMA20`, `RSI` or `Bollinger`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IndicatorPoint {
    Line {
        #[serde(rename = "type")]
        kind: String,
        date: String,
        value: f64,
    },
    Macd {
        #[serde(rename = "type")]
        kind: String,
        date: String,
        value: f64,
        signal: f64,
    },
    Band {
        #[serde(rename = "type")]
        kind: String,
        date: String,
        middle: f64,
        upper: f64,
        lower: f64,
    },
}

/// `{date, value}` point used by the comparison and metric charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuePoint {
    pub date: String,
    pub value: f64,
}

fn day(bar: &Bar) -> String {
    bar.timestamp.format("%Y-%m-%d").to_string()
}

fn line_points(bars: &[Bar], kind: &str, series: &[Option<f64>]) -> Vec<IndicatorPoint> {
    bars.iter()
        .zip(series)
        .filter_map(|(bar, v)| {
            v.filter(|v| v.is_finite()).map(|value| IndicatorPoint::Line {
                kind: kind.to_string(),
                date: day(bar),
                value,
            })
        })
        .collect()
}

/// Overlay points for `kind`. Each series is emitted only when there are
/// enough bars to fill its window at least once.
pub fn indicator_points(bars: &[Bar], kind: IndicatorKind) -> Vec<IndicatorPoint> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let mut points = Vec::new();

    match kind {
        IndicatorKind::Sma => {
            for period in SMA_PERIODS {
                if closes.len() >= period {
                    points.extend(line_points(bars, &format!("SMA{}", period), &sma(&closes, period)));
                }
            }
        }
        IndicatorKind::Ema => {
            for span in EMA_SPANS {
                if closes.len() >= span {
                    let series: Vec<Option<f64>> = ema(&closes, span).into_iter().map(Some).collect();
                    points.extend(line_points(bars, &format!("EMA{}", span), &series));
                }
            }
        }
        IndicatorKind::Rsi => {
            if closes.len() > RSI_PERIOD {
                points.extend(line_points(bars, "RSI", &rsi(&closes, RSI_PERIOD)));
            }
        }
        IndicatorKind::Macd => {
            if closes.len() >= 26 {
                let result = macd(&closes, 12, 26, 9);
                for ((bar, value), signal) in bars.iter().zip(&result.macd_line).zip(&result.signal_line) {
                    points.push(IndicatorPoint::Macd {
                        kind: "MACD".to_string(),
                        date: day(bar),
                        value: *value,
                        signal: *signal,
                    });
                }
            }
        }
        IndicatorKind::Bollinger => {
            if closes.len() >= BOLLINGER_PERIOD {
                let bands = bollinger_bands(&closes, BOLLINGER_PERIOD, BOLLINGER_STD);
                for (i, bar) in bars.iter().enumerate() {
                    if let (Some(middle), Some(upper), Some(lower)) =
                        (bands.middle[i], bands.upper[i], bands.lower[i])
                    {
                        points.push(IndicatorPoint::Band {
                            kind: "Bollinger".to_string(),
                            date: day(bar),
                            middle,
                            upper,
                            lower,
                        });
                    }
                }
            }
        }
    }

    points
}

/// Percent change of every close against the first close in `bars`.
pub fn ytd_change_series(bars: &[Bar]) -> Vec<ValuePoint> {
    let Some(first) = bars.first() else {
        return Vec::new();
    };
    bars.iter()
        .filter_map(|bar| {
            stats::percent_change(first.close, bar.close).map(|value| ValuePoint { date: day(bar), value })
        })
        .collect()
}
