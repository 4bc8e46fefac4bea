use analysis_core::{Interval, MarketDataProvider, Period, StatementFrequency, SymbolMatch};
use chrono::Utc;
use fundamental_analysis::compute_financial_metrics;
use std::sync::Arc;

use crate::config::StockDataConfig;
use crate::error::{StoreError, StoreResult};
use crate::models::{Company, CompanyProfile, FinancialData};
use crate::store::CacheStore;
use crate::universe::matching_tickers;

const SEARCH_LIMIT: usize = 10;

/// Read-through cache over the market data provider.
///
/// Freshness is a timestamp check only. Two requests racing on the same stale
/// ticker both re-fetch and the later upsert wins.
#[derive(Clone)]
pub struct StockDataService {
    provider: Arc<dyn MarketDataProvider>,
    store: CacheStore,
    config: StockDataConfig,
}

impl StockDataService {
    pub fn new(provider: Arc<dyn MarketDataProvider>, store: CacheStore, config: StockDataConfig) -> Self {
        Self { provider, store, config }
    }

    pub fn provider(&self) -> &Arc<dyn MarketDataProvider> {
        &self.provider
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn config(&self) -> &StockDataConfig {
        &self.config
    }

    /// Provider profile for `ticker`, or `None` if the provider fails.
    pub async fn fetch_company_info(&self, ticker: &str) -> Option<Company> {
        match self.provider.ticker_info(ticker).await {
            Ok(info) => Some(Company {
                ticker: ticker.to_string(),
                name: info.long_name.unwrap_or_else(|| ticker.to_string()),
                sector: info.sector,
                industry: info.industry,
                country: info.country,
                website: info.website,
                logo_url: info.logo_url,
                last_updated: Utc::now(),
            }),
            Err(e) => {
                tracing::error!("Error fetching company info for {}: {}", ticker, e);
                None
            }
        }
    }

    /// Fresh metric row for `ticker`, or `None` if any provider call fails.
    pub async fn fetch_financial_data(&self, ticker: &str) -> Option<FinancialData> {
        match self.compute_financials(ticker).await {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::error!("Error fetching financial data for {}: {}", ticker, e);
                None
            }
        }
    }

    async fn compute_financials(&self, ticker: &str) -> StoreResult<FinancialData> {
        let info = self.provider.ticker_info(ticker).await?;
        let annual = self.provider.statements(ticker, StatementFrequency::Annual).await?;
        let ytd = self.provider.history(ticker, Period::Ytd, Interval::Day1).await?;
        let dividends_paid = self.has_paid_dividends(ticker).await;

        let metrics = compute_financial_metrics(&info, &annual, &ytd, dividends_paid);
        Ok(FinancialData::from_metrics(ticker, &metrics, Utc::now()))
    }

    async fn has_paid_dividends(&self, ticker: &str) -> bool {
        match self.provider.history(ticker, Period::Max, Interval::Month3).await {
            Ok(history) => !history.dividends.is_empty(),
            Err(e) => {
                tracing::warn!("Dividend history unavailable for {}: {}", ticker, e);
                false
            }
        }
    }

    /// Cached company and financials, refreshing whatever is missing or stale.
    /// `None` when the company is neither cached nor known to the provider.
    pub async fn get_company_data(&self, ticker: &str) -> StoreResult<Option<CompanyProfile>> {
        let now = Utc::now();

        let company = match self.store.get_company(ticker).await? {
            None => {
                let Some(company) = self.fetch_company_info(ticker).await else {
                    return Ok(None);
                };
                self.store.save_company(&company).await?;
                company
            }
            Some(cached) if cached.is_stale(self.config.company_ttl(), now) => {
                match self.fetch_company_info(ticker).await {
                    Some(fresh) => {
                        self.store.save_company(&fresh).await?;
                        fresh
                    }
                    None => cached,
                }
            }
            Some(cached) => cached,
        };

        let financials = match self.store.get_financials(ticker).await? {
            Some(cached) if !cached.is_stale(self.config.financials_max_age_days, now) => Some(cached),
            cached => match self.fetch_financial_data(ticker).await {
                Some(fresh) => {
                    self.store.save_financials(&fresh).await?;
                    Some(fresh)
                }
                None => cached,
            },
        };

        Ok(Some(CompanyProfile { company, financials }))
    }

    /// Re-fetch info and financials for a company that is already cached.
    pub async fn refresh_company_data(&self, ticker: &str) -> StoreResult<CompanyProfile> {
        let mut company = self
            .store
            .get_company(ticker)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("company {}", ticker)))?;

        if let Some(fresh) = self.fetch_company_info(ticker).await {
            self.store.save_company(&fresh).await?;
            company = fresh;
        }

        let financials = match self.fetch_financial_data(ticker).await {
            Some(fresh) => {
                self.store.save_financials(&fresh).await?;
                Some(fresh)
            }
            None => self.store.get_financials(ticker).await?,
        };

        tracing::info!("Refreshed company data for {}", ticker);
        Ok(CompanyProfile { company, financials })
    }

    /// Provider search with a fallback scan of the built-in universe.
    /// A failed provider search yields an empty list; universe tickers whose
    /// info lookup fails are skipped.
    pub async fn search_companies(&self, query: &str) -> Vec<SymbolMatch> {
        match self.provider.search(query, SEARCH_LIMIT).await {
            Ok(results) if !results.is_empty() => return results,
            Ok(_) => {}
            Err(e) => {
                tracing::error!("Error searching for {}: {}", query, e);
                return Vec::new();
            }
        }

        let mut results = Vec::new();
        for ticker in matching_tickers(query, SEARCH_LIMIT) {
            match self.provider.ticker_info(ticker).await {
                Ok(info) => results.push(SymbolMatch {
                    ticker: ticker.to_string(),
                    name: info.long_name.unwrap_or_else(|| ticker.to_string()),
                    exchange: info.exchange.unwrap_or_default(),
                }),
                Err(e) => tracing::warn!("Skipping {} in search for {}: {}", ticker, query, e),
            }
        }
        results
    }

    /// Search through the `search_results` cache. Empty results are not cached.
    pub async fn cached_search(&self, query: &str) -> StoreResult<Vec<SymbolMatch>> {
        let now = Utc::now();

        if let Some(cached) = self.store.get_search(query).await? {
            if !cached.is_stale(self.config.search_ttl(), now) {
                tracing::debug!("Search cache hit for '{}'", query);
                return Ok(cached.results()?);
            }
        }

        let results = self.search_companies(query).await;
        if !results.is_empty() {
            let json = serde_json::to_string(&results)?;
            self.store.save_search(query, &json, now).await?;
        }
        Ok(results)
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod service_tests;
