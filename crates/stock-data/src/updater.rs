use chrono::{Duration, Utc};
use serde::Serialize;
use std::time::Duration as StdDuration;

use crate::error::StoreResult;
use crate::service::StockDataService;

/// Outcome of a batch refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpdateSummary {
    pub updated: usize,
    pub errors: usize,
}

impl StockDataService {
    /// Re-fetch cached companies older than a day (or all of them), pausing
    /// between companies to stay under the provider's rate limit. A company
    /// counts as an error only when storing its fresh data fails.
    pub async fn update_stock_data(&self, all: bool, limit: Option<i64>) -> StoreResult<UpdateSummary> {
        let cutoff = Utc::now() - Duration::hours(24);
        let companies = self.store().companies_for_update(all, cutoff, limit).await?;
        let pause = StdDuration::from_millis(self.config().update_pause_ms);

        tracing::info!("Updating {} companies", companies.len());
        let mut summary = UpdateSummary::default();

        for (i, company) in companies.iter().enumerate() {
            if i > 0 && !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }

            let info = self.fetch_company_info(&company.ticker).await;
            let financials = self.fetch_financial_data(&company.ticker).await;

            if info.is_none() && financials.is_none() {
                tracing::warn!("No fresh data for {}", company.ticker);
            }

            let saved = async {
                if let Some(info) = &info {
                    self.store().save_company(info).await?;
                }
                if let Some(financials) = &financials {
                    self.store().save_financials(financials).await?;
                }
                StoreResult::Ok(())
            }
            .await;

            match saved {
                Ok(()) => {
                    tracing::info!("Updated {}", company.ticker);
                    summary.updated += 1;
                }
                Err(e) => {
                    tracing::error!("Error updating {}: {}", company.ticker, e);
                    summary.errors += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Warm the cache for the given tickers.
    pub async fn update_popular_stocks(&self, tickers: &[String]) -> UpdateSummary {
        let pause = StdDuration::from_millis(self.config().update_pause_ms);
        let mut summary = UpdateSummary::default();

        for (i, ticker) in tickers.iter().enumerate() {
            if i > 0 && !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }

            match self.get_company_data(ticker).await {
                Ok(Some(_)) => {
                    tracing::info!("Updated {}", ticker);
                    summary.updated += 1;
                }
                Ok(None) => {
                    tracing::warn!("Company not found: {}", ticker);
                    summary.errors += 1;
                }
                Err(e) => {
                    tracing::error!("Error updating {}: {}", ticker, e);
                    summary.errors += 1;
                }
            }
        }

        summary
    }
}
