use anyhow::Result;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::env;

use crate::universe::POPULAR_COMPANIES;

pub const DEFAULT_PEER_TICKERS: &str = "AAPL,MSFT,GOOGL,META,AMZN";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockDataConfig {
    // Database
    pub database_url: String,

    // Cache freshness
    pub company_ttl_hours: i64,         // 24
    pub financials_max_age_days: i64,   // 1, compared against whole days
    pub search_ttl_days: i64,           // 7

    // Ticker lists
    pub popular_tickers: Vec<String>,
    pub peer_tickers: Vec<String>,
    pub comparison_tickers: Vec<String>,

    // Batch updates
    pub update_pause_ms: u64,           // 1000
}

fn ticker_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl StockDataConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:stock_market.db".to_string()),

            company_ttl_hours: env::var("COMPANY_TTL_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()?,
            financials_max_age_days: env::var("FINANCIALS_MAX_AGE_DAYS")
                .unwrap_or_else(|_| "1".to_string())
                .parse()?,
            search_ttl_days: env::var("SEARCH_TTL_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()?,

            popular_tickers: env::var("POPULAR_TICKERS")
                .map(|v| ticker_list(&v))
                .unwrap_or(defaults.popular_tickers),
            peer_tickers: ticker_list(
                &env::var("PEER_TICKERS").unwrap_or_else(|_| DEFAULT_PEER_TICKERS.to_string()),
            ),
            comparison_tickers: ticker_list(
                &env::var("COMPARISON_TICKERS").unwrap_or_else(|_| DEFAULT_PEER_TICKERS.to_string()),
            ),

            update_pause_ms: env::var("UPDATE_PAUSE_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()?,
        };

        Ok(config)
    }

    pub fn company_ttl(&self) -> Duration {
        Duration::hours(self.company_ttl_hours)
    }

    pub fn search_ttl(&self) -> Duration {
        Duration::days(self.search_ttl_days)
    }
}

impl Default for StockDataConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:stock_market.db".to_string(),
            company_ttl_hours: 24,
            financials_max_age_days: 1,
            search_ttl_days: 7,
            popular_tickers: POPULAR_COMPANIES.iter().map(|(t, _)| t.to_string()).collect(),
            peer_tickers: ticker_list(DEFAULT_PEER_TICKERS),
            comparison_tickers: ticker_list(DEFAULT_PEER_TICKERS),
            update_pause_ms: 1000,
        }
    }
}
