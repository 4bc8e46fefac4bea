use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::MarketDataError;

/// OHLCV bar data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Cash dividend paid on `date`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dividend {
    pub date: DateTime<Utc>,
    pub amount: f64,
}

/// Price bars plus the dividend events that fell inside the same range.
/// Both lists are sorted oldest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceHistory {
    pub bars: Vec<Bar>,
    pub dividends: Vec<Dividend>,
}

impl PriceHistory {
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// History range accepted by the chart endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    Day1,
    Day5,
    Month1,
    Month3,
    Month6,
    Year1,
    Year2,
    Year5,
    Year10,
    Ytd,
    Max,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day1 => "1d",
            Period::Day5 => "5d",
            Period::Month1 => "1mo",
            Period::Month3 => "3mo",
            Period::Month6 => "6mo",
            Period::Year1 => "1y",
            Period::Year2 => "2y",
            Period::Year5 => "5y",
            Period::Year10 => "10y",
            Period::Ytd => "ytd",
            Period::Max => "max",
        }
    }
}

impl FromStr for Period {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1d" => Ok(Period::Day1),
            "5d" => Ok(Period::Day5),
            "1mo" => Ok(Period::Month1),
            "3mo" => Ok(Period::Month3),
            "6mo" => Ok(Period::Month6),
            "1y" => Ok(Period::Year1),
            "2y" => Ok(Period::Year2),
            "5y" => Ok(Period::Year5),
            "10y" => Ok(Period::Year10),
            "ytd" => Ok(Period::Ytd),
            "max" => Ok(Period::Max),
            other => Err(MarketDataError::InvalidParameter(format!("unknown period '{}'", other))),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bar size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    Minute1,
    Minute2,
    Minute5,
    Minute15,
    Minute30,
    Minute60,
    Minute90,
    Hour1,
    Day1,
    Day5,
    Week1,
    Month1,
    Month3,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Minute1 => "1m",
            Interval::Minute2 => "2m",
            Interval::Minute5 => "5m",
            Interval::Minute15 => "15m",
            Interval::Minute30 => "30m",
            Interval::Minute60 => "60m",
            Interval::Minute90 => "90m",
            Interval::Hour1 => "1h",
            Interval::Day1 => "1d",
            Interval::Day5 => "5d",
            Interval::Week1 => "1wk",
            Interval::Month1 => "1mo",
            Interval::Month3 => "3mo",
        }
    }
}

impl FromStr for Interval {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" => Ok(Interval::Minute1),
            "2m" => Ok(Interval::Minute2),
            "5m" => Ok(Interval::Minute5),
            "15m" => Ok(Interval::Minute15),
            "30m" => Ok(Interval::Minute30),
            "60m" => Ok(Interval::Minute60),
            "90m" => Ok(Interval::Minute90),
            "1h" => Ok(Interval::Hour1),
            "1d" => Ok(Interval::Day1),
            "5d" => Ok(Interval::Day5),
            "1wk" => Ok(Interval::Week1),
            "1mo" => Ok(Interval::Month1),
            "3mo" => Ok(Interval::Month3),
            other => Err(MarketDataError::InvalidParameter(format!("unknown interval '{}'", other))),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Company profile and key statistics as reported by the provider.
/// Margins, yields and payout ratios are fractions (0.25 == 25%).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickerInfo {
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub country: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub exchange: Option<String>,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub price_to_sales: Option<f64>,
    pub price_to_book: Option<f64>,
    pub profit_margins: Option<f64>,
    pub operating_margins: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub payout_ratio: Option<f64>,
    /// Unix seconds
    pub ex_dividend_date: Option<i64>,
}

/// Reporting frequency for financial statements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementFrequency {
    Annual,
    Quarterly,
}

impl StatementFrequency {
    /// Anything other than "annual" selects quarterly statements.
    pub fn from_param(s: &str) -> Self {
        if s == "annual" {
            StatementFrequency::Annual
        } else {
            StatementFrequency::Quarterly
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatementFrequency::Annual => "annual",
            StatementFrequency::Quarterly => "quarterly",
        }
    }
}

/// Single hit from a company search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolMatch {
    pub ticker: String,
    pub name: String,
    pub exchange: String,
}

/// News headline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub source: String,
    pub date: String,
    pub url: String,
    pub summary: Option<String>,
}
