use analysis_core::SymbolMatch;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use fundamental_analysis::FinancialMetrics;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// Cached company profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Company {
    pub ticker: String,
    pub name: String,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub country: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub last_updated: DateTime<Utc>,
}

impl Company {
    pub fn is_stale(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.last_updated > ttl
    }
}

/// Stored financial metrics, rounded to column precision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FinancialData {
    #[serde(skip_serializing)]
    pub ticker: String,
    pub market_cap: Option<i64>,
    pub current_price: Option<f64>,
    pub price_change_ytd: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub ps_ratio: Option<f64>,
    pub pb_ratio: Option<f64>,
    pub ev_ebitda: Option<f64>,
    pub fcf_yield: Option<f64>,
    pub quality_score: Option<i64>,
    pub profit_margin: Option<f64>,
    pub operating_margin: Option<f64>,
    pub cash: Option<i64>,
    pub total_debt: Option<i64>,
    pub net_cash: Option<i64>,
    pub shares_outstanding: Option<i64>,
    pub dividend_yield: Option<f64>,
    pub payout_ratio: Option<f64>,
    pub ex_dividend_date: Option<NaiveDate>,
    pub last_updated: DateTime<Utc>,
}

/// Round half to even at `dp` decimal places.
pub fn round_dp(value: Option<f64>, dp: u32) -> Option<f64> {
    Decimal::from_f64(value?)?.round_dp(dp).to_f64()
}

/// Round half to even to a whole number.
pub fn round_int(value: Option<f64>) -> Option<i64> {
    Decimal::from_f64(value?)?.round_dp(0).to_i64()
}

impl FinancialData {
    pub fn from_metrics(ticker: &str, m: &FinancialMetrics, now: DateTime<Utc>) -> Self {
        Self {
            ticker: ticker.to_string(),
            market_cap: round_int(m.market_cap),
            current_price: round_dp(m.current_price, 2),
            price_change_ytd: round_dp(m.price_change_ytd, 2),
            pe_ratio: round_dp(m.pe_ratio, 2),
            ps_ratio: round_dp(m.ps_ratio, 2),
            pb_ratio: round_dp(m.pb_ratio, 2),
            ev_ebitda: round_dp(m.ev_ebitda, 2),
            fcf_yield: round_dp(m.fcf_yield, 4),
            quality_score: m.quality_score.map(i64::from),
            profit_margin: round_dp(m.profit_margin, 4),
            operating_margin: round_dp(m.operating_margin, 4),
            cash: round_int(m.cash),
            total_debt: round_int(m.total_debt),
            net_cash: round_int(m.net_cash),
            shares_outstanding: round_int(m.shares_outstanding),
            dividend_yield: round_dp(m.dividend_yield, 4),
            payout_ratio: round_dp(m.payout_ratio, 4),
            ex_dividend_date: m.ex_dividend_date,
            last_updated: now,
        }
    }

    /// Stale once more than `max_age_days` whole days old.
    pub fn is_stale(&self, max_age_days: i64, now: DateTime<Utc>) -> bool {
        (now - self.last_updated).num_days() > max_age_days
    }
}

/// Cached search hits for one query
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SearchResult {
    pub query: String,
    pub results_json: String,
    pub last_updated: DateTime<Utc>,
}

impl SearchResult {
    pub fn is_stale(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.last_updated > ttl
    }

    pub fn results(&self) -> Result<Vec<SymbolMatch>, serde_json::Error> {
        serde_json::from_str(&self.results_json)
    }
}

/// A company together with its financials, as served to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    #[serde(flatten)]
    pub company: Company,
    pub financials: Option<FinancialData>,
}
