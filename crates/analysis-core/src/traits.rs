use async_trait::async_trait;
use crate::{
    FinancialStatements, Interval, MarketDataError, NewsItem, Period, PriceHistory,
    StatementFrequency, SymbolMatch, TickerInfo,
};

/// Source of company, price and statement data.
///
/// Implemented by the Yahoo Finance client in production and by in-process
/// fakes in tests.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn ticker_info(&self, symbol: &str) -> Result<TickerInfo, MarketDataError>;

    async fn history(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<PriceHistory, MarketDataError>;

    async fn statements(
        &self,
        symbol: &str,
        frequency: StatementFrequency,
    ) -> Result<FinancialStatements, MarketDataError>;

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SymbolMatch>, MarketDataError>;

    async fn news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>, MarketDataError>;
}
