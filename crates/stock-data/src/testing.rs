//! In-process provider returning canned data.

use analysis_core::{
    Bar, Dividend, FinancialStatements, Interval, MarketDataError, MarketDataProvider, NewsItem,
    Period, PriceHistory, StatementFrequency, StatementTable, SymbolMatch, TickerInfo,
};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Provider fake keyed by ticker. Unknown tickers are `NotFound`.
#[derive(Default)]
pub struct StaticProvider {
    infos: HashMap<String, TickerInfo>,
    statements: HashMap<String, FinancialStatements>,
    histories: HashMap<String, PriceHistory>,
    search_results: Vec<SymbolMatch>,
    news: Vec<NewsItem>,
    fail_search: bool,
    info_calls: AtomicUsize,
    statement_calls: AtomicUsize,
    search_calls: AtomicUsize,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_info(mut self, ticker: &str, info: TickerInfo) -> Self {
        self.infos.insert(ticker.to_string(), info);
        self
    }

    pub fn with_statements(mut self, ticker: &str, statements: FinancialStatements) -> Self {
        self.statements.insert(ticker.to_string(), statements);
        self
    }

    pub fn with_history(mut self, ticker: &str, history: PriceHistory) -> Self {
        self.histories.insert(ticker.to_string(), history);
        self
    }

    pub fn with_search_results(mut self, results: Vec<SymbolMatch>) -> Self {
        self.search_results = results;
        self
    }

    pub fn with_news(mut self, news: Vec<NewsItem>) -> Self {
        self.news = news;
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    /// Fully populated company: info, two years of statements and a
    /// dividend-paying daily history.
    pub fn with_company(self, ticker: &str, name: &str) -> Self {
        self.with_info(ticker, sample_info(name))
            .with_statements(ticker, sample_statements())
            .with_history(ticker, sample_history(30))
    }

    pub fn info_calls(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }

    pub fn statement_calls(&self) -> usize {
        self.statement_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataProvider for StaticProvider {
    async fn ticker_info(&self, symbol: &str) -> Result<TickerInfo, MarketDataError> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        self.infos
            .get(symbol)
            .cloned()
            .ok_or_else(|| MarketDataError::NotFound(symbol.to_string()))
    }

    async fn history(
        &self,
        symbol: &str,
        _period: Period,
        _interval: Interval,
    ) -> Result<PriceHistory, MarketDataError> {
        self.histories
            .get(symbol)
            .cloned()
            .ok_or_else(|| MarketDataError::NotFound(symbol.to_string()))
    }

    async fn statements(
        &self,
        symbol: &str,
        _frequency: StatementFrequency,
    ) -> Result<FinancialStatements, MarketDataError> {
        self.statement_calls.fetch_add(1, Ordering::SeqCst);
        self.statements
            .get(symbol)
            .cloned()
            .ok_or_else(|| MarketDataError::NotFound(symbol.to_string()))
    }

    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<SymbolMatch>, MarketDataError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_search {
            return Err(MarketDataError::ApiError("search unavailable".to_string()));
        }
        Ok(self.search_results.iter().take(limit).cloned().collect())
    }

    async fn news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>, MarketDataError> {
        if !self.infos.contains_key(symbol) {
            return Err(MarketDataError::NotFound(symbol.to_string()));
        }
        Ok(self.news.iter().take(limit).cloned().collect())
    }
}

pub fn sample_info(name: &str) -> TickerInfo {
    TickerInfo {
        long_name: Some(name.to_string()),
        short_name: Some(name.to_string()),
        sector: Some("Technology".to_string()),
        industry: Some("Consumer Electronics".to_string()),
        country: Some("United States".to_string()),
        website: Some("https://example.com".to_string()),
        exchange: Some("NMS".to_string()),
        current_price: Some(110.0),
        market_cap: Some(1_000_000_000.0),
        trailing_pe: Some(25.5),
        price_to_sales: Some(6.25),
        price_to_book: Some(40.0),
        profit_margins: Some(0.25),
        operating_margins: Some(0.3),
        shares_outstanding: Some(9_000_000.0),
        dividend_yield: Some(0.005),
        payout_ratio: Some(0.15),
        ex_dividend_date: Some(1_707_436_800),
        ..Default::default()
    }
}

pub fn sample_statements() -> FinancialStatements {
    let periods = vec![
        NaiveDate::from_ymd_opt(2024, 9, 30).unwrap_or_default(),
        NaiveDate::from_ymd_opt(2023, 9, 30).unwrap_or_default(),
    ];

    let mut income = StatementTable::new(periods.clone());
    income.push_row("Total Revenue", vec![Some(400.0), Some(380.0)]);
    income.push_row("Gross Profit", vec![Some(180.0), Some(165.0)]);
    income.push_row("Operating Income", vec![Some(120.0), Some(110.0)]);
    income.push_row("Net Income", vec![Some(100.0), Some(95.0)]);
    income.push_row("EBITDA", vec![Some(130.0), Some(125.0)]);
    income.push_row("Basic EPS", vec![Some(6.1), Some(5.9)]);

    let mut balance_sheet = StatementTable::new(periods.clone());
    balance_sheet.push_row("Total Assets", vec![Some(350.0), Some(340.0)]);
    balance_sheet.push_row("Stockholders Equity", vec![Some(60.0), Some(62.0)]);
    balance_sheet.push_row("Total Debt", vec![Some(100.0), Some(110.0)]);
    balance_sheet.push_row("Cash And Cash Equivalents", vec![Some(30.0), Some(29.0)]);
    balance_sheet.push_row("Long Term Debt", vec![Some(85.0), Some(95.0)]);
    balance_sheet.push_row("Current Assets", vec![Some(150.0), Some(140.0)]);
    balance_sheet.push_row("Current Liabilities", vec![Some(170.0), Some(160.0)]);
    balance_sheet.push_row("Common Stock", vec![Some(80.0), Some(75.0)]);

    let mut cash_flow = StatementTable::new(periods);
    cash_flow.push_row("Operating Cash Flow", vec![Some(118.0), Some(110.0)]);
    cash_flow.push_row("Free Cash Flow", vec![Some(108.0), Some(100.0)]);

    FinancialStatements { income, balance_sheet, cash_flow }
}

/// `days` daily bars closing at 100, 101, ... with one dividend.
pub fn sample_history(days: usize) -> PriceHistory {
    let start = Utc.with_ymd_and_hms(2025, 1, 2, 14, 30, 0).single().unwrap_or_default();
    let bars = (0..days)
        .map(|i| {
            let close = 100.0 + i as f64;
            Bar {
                timestamp: start + Duration::days(i as i64),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000_000.0,
            }
        })
        .collect();

    PriceHistory {
        bars,
        dividends: vec![Dividend { date: start + Duration::days(7), amount: 0.25 }],
    }
}
