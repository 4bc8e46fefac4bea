use chrono::{DateTime, Utc};

use crate::db::StockDb;
use crate::error::StoreResult;
use crate::models::{Company, FinancialData, SearchResult};

/// Queries against the company, financials and search caches.
/// All writes are upserts, so concurrent refreshes of the same ticker are harmless.
#[derive(Clone)]
pub struct CacheStore {
    db: StockDb,
}

impl CacheStore {
    pub fn new(db: StockDb) -> Self {
        Self { db }
    }

    pub async fn get_company(&self, ticker: &str) -> StoreResult<Option<Company>> {
        let company = sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE ticker = ?")
            .bind(ticker)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(company)
    }

    /// Insert or overwrite every column except the ticker.
    pub async fn save_company(&self, company: &Company) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO companies (ticker, name, sector, industry, country, website, logo_url, last_updated)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(ticker) DO UPDATE SET
                name = excluded.name,
                sector = excluded.sector,
                industry = excluded.industry,
                country = excluded.country,
                website = excluded.website,
                logo_url = excluded.logo_url,
                last_updated = excluded.last_updated
            "#,
        )
        .bind(&company.ticker)
        .bind(&company.name)
        .bind(&company.sector)
        .bind(&company.industry)
        .bind(&company.country)
        .bind(&company.website)
        .bind(&company.logo_url)
        .bind(company.last_updated)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    /// Companies last refreshed before `cutoff` (or all of them), oldest first.
    pub async fn companies_for_update(
        &self,
        all: bool,
        cutoff: DateTime<Utc>,
        limit: Option<i64>,
    ) -> StoreResult<Vec<Company>> {
        // SQLite treats a negative LIMIT as unbounded; 0 also means no limit
        let limit = limit.filter(|&n| n > 0).unwrap_or(-1);
        let companies = if all {
            sqlx::query_as::<_, Company>("SELECT * FROM companies ORDER BY last_updated LIMIT ?")
                .bind(limit)
                .fetch_all(self.db.pool())
                .await?
        } else {
            sqlx::query_as::<_, Company>(
                "SELECT * FROM companies WHERE last_updated < ? ORDER BY last_updated LIMIT ?",
            )
            .bind(cutoff)
            .bind(limit)
            .fetch_all(self.db.pool())
            .await?
        };

        Ok(companies)
    }

    pub async fn get_financials(&self, ticker: &str) -> StoreResult<Option<FinancialData>> {
        let financials = sqlx::query_as::<_, FinancialData>("SELECT * FROM financial_data WHERE ticker = ?")
            .bind(ticker)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(financials)
    }

    pub async fn save_financials(&self, data: &FinancialData) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO financial_data (
                ticker, market_cap, current_price, price_change_ytd, pe_ratio, ps_ratio, pb_ratio,
                ev_ebitda, fcf_yield, quality_score, profit_margin, operating_margin, cash,
                total_debt, net_cash, shares_outstanding, dividend_yield, payout_ratio,
                ex_dividend_date, last_updated
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(ticker) DO UPDATE SET
                market_cap = excluded.market_cap,
                current_price = excluded.current_price,
                price_change_ytd = excluded.price_change_ytd,
                pe_ratio = excluded.pe_ratio,
                ps_ratio = excluded.ps_ratio,
                pb_ratio = excluded.pb_ratio,
                ev_ebitda = excluded.ev_ebitda,
                fcf_yield = excluded.fcf_yield,
                quality_score = excluded.quality_score,
                profit_margin = excluded.profit_margin,
                operating_margin = excluded.operating_margin,
                cash = excluded.cash,
                total_debt = excluded.total_debt,
                net_cash = excluded.net_cash,
                shares_outstanding = excluded.shares_outstanding,
                dividend_yield = excluded.dividend_yield,
                payout_ratio = excluded.payout_ratio,
                ex_dividend_date = excluded.ex_dividend_date,
                last_updated = excluded.last_updated
            "#,
        )
        .bind(&data.ticker)
        .bind(data.market_cap)
        .bind(data.current_price)
        .bind(data.price_change_ytd)
        .bind(data.pe_ratio)
        .bind(data.ps_ratio)
        .bind(data.pb_ratio)
        .bind(data.ev_ebitda)
        .bind(data.fcf_yield)
        .bind(data.quality_score)
        .bind(data.profit_margin)
        .bind(data.operating_margin)
        .bind(data.cash)
        .bind(data.total_debt)
        .bind(data.net_cash)
        .bind(data.shares_outstanding)
        .bind(data.dividend_yield)
        .bind(data.payout_ratio)
        .bind(data.ex_dividend_date)
        .bind(data.last_updated)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    /// Case-insensitive lookup of a cached search
    pub async fn get_search(&self, query: &str) -> StoreResult<Option<SearchResult>> {
        let result = sqlx::query_as::<_, SearchResult>("SELECT * FROM search_results WHERE query = ?")
            .bind(query)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(result)
    }

    pub async fn save_search(&self, query: &str, results_json: &str, now: DateTime<Utc>) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO search_results (query, results_json, last_updated)
            VALUES (?, ?, ?)
            ON CONFLICT(query) DO UPDATE SET
                results_json = excluded.results_json,
                last_updated = excluded.last_updated
            "#,
        )
        .bind(query)
        .bind(results_json)
        .bind(now)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }
}
