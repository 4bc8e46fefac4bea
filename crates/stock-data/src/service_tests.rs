#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::db::StockDb;
    use crate::models::FinancialData;
    use crate::testing::{sample_info, StaticProvider};
    use crate::updater::UpdateSummary;
    use analysis_core::SymbolMatch;
    use chrono::Duration;
    use fundamental_analysis::FinancialMetrics;

    async fn setup(provider: StaticProvider) -> (StockDataService, Arc<StaticProvider>) {
        let provider = Arc::new(provider);
        let store = CacheStore::new(StockDb::new("sqlite::memory:").await.unwrap());
        let config = StockDataConfig { update_pause_ms: 0, ..Default::default() };
        let service = StockDataService::new(provider.clone(), store, config);
        (service, provider)
    }

    fn stale_company(ticker: &str, name: &str) -> Company {
        Company {
            ticker: ticker.to_string(),
            name: name.to_string(),
            sector: None,
            industry: None,
            country: None,
            website: None,
            logo_url: None,
            last_updated: Utc::now() - Duration::hours(30),
        }
    }

    #[tokio::test]
    async fn test_get_company_data_fetches_and_caches() {
        let (service, provider) = setup(StaticProvider::new().with_company("AAPL", "Apple Inc.")).await;

        let profile = service.get_company_data("AAPL").await.unwrap().unwrap();
        assert_eq!(profile.company.name, "Apple Inc.");
        assert_eq!(profile.company.sector.as_deref(), Some("Technology"));

        let financials = profile.financials.unwrap();
        assert_eq!(financials.market_cap, Some(1_000_000_000));
        assert_eq!(financials.pe_ratio, Some(25.5));
        assert_eq!(financials.price_change_ytd, Some(10.0));
        assert_eq!(financials.profit_margin, Some(25.0));
        assert_eq!(financials.dividend_yield, Some(0.5));
        assert_eq!(financials.net_cash, Some(-70));

        let info_calls = provider.info_calls();
        let statement_calls = provider.statement_calls();
        let again = service.get_company_data("AAPL").await.unwrap().unwrap();
        assert_eq!(again.company.name, "Apple Inc.");
        assert_eq!(provider.info_calls(), info_calls);
        assert_eq!(provider.statement_calls(), statement_calls);
        assert!(service.store().get_financials("AAPL").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unknown_company_is_none() {
        let (service, _) = setup(StaticProvider::new()).await;
        assert!(service.get_company_data("NOPE").await.unwrap().is_none());
        assert!(service.store().get_company("NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stale_company_is_refreshed() {
        let (service, _) = setup(StaticProvider::new().with_company("MSFT", "Microsoft Corporation")).await;
        service.store().save_company(&stale_company("MSFT", "Old Name")).await.unwrap();

        let profile = service.get_company_data("MSFT").await.unwrap().unwrap();
        assert_eq!(profile.company.name, "Microsoft Corporation");

        let stored = service.store().get_company("MSFT").await.unwrap().unwrap();
        assert_eq!(stored.name, "Microsoft Corporation");
        assert!(!stored.is_stale(Duration::hours(24), Utc::now()));
    }

    #[tokio::test]
    async fn test_failed_financials_fetch_keeps_old_row() {
        // Info only, so statements fail
        let (service, _) = setup(StaticProvider::new().with_info("IBM", sample_info("IBM"))).await;
        service.store().save_company(&stale_company("IBM", "IBM")).await.unwrap();

        let old = FinancialData::from_metrics(
            "IBM",
            &FinancialMetrics { pe_ratio: Some(12.0), ..Default::default() },
            Utc::now() - Duration::days(5),
        );
        service.store().save_financials(&old).await.unwrap();

        let profile = service.get_company_data("IBM").await.unwrap().unwrap();
        assert_eq!(profile.financials.unwrap().pe_ratio, Some(12.0));
    }

    #[tokio::test]
    async fn test_missing_name_falls_back_to_ticker() {
        let info = analysis_core::TickerInfo { long_name: None, ..sample_info("x") };
        let (service, _) = setup(StaticProvider::new().with_info("XYZ", info)).await;

        let company = service.fetch_company_info("XYZ").await.unwrap();
        assert_eq!(company.name, "XYZ");
        assert!(service.fetch_financial_data("XYZ").await.is_none());
    }

    #[tokio::test]
    async fn test_refresh_requires_existing_company() {
        let (service, _) = setup(StaticProvider::new().with_company("AAPL", "Apple Inc.")).await;

        let err = service.refresh_company_data("AAPL").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        service.store().save_company(&stale_company("AAPL", "Old")).await.unwrap();
        let profile = service.refresh_company_data("AAPL").await.unwrap();
        assert_eq!(profile.company.name, "Apple Inc.");
        assert!(profile.financials.is_some());
    }

    #[tokio::test]
    async fn test_search_prefers_provider_results() {
        let hit = SymbolMatch {
            ticker: "AAPL".to_string(),
            name: "Apple Inc.".to_string(),
            exchange: "NASDAQ".to_string(),
        };
        let (service, _) = setup(StaticProvider::new().with_search_results(vec![hit.clone()])).await;
        assert_eq!(service.search_companies("apple").await, vec![hit]);
    }

    #[tokio::test]
    async fn test_search_falls_back_to_universe() {
        let (service, _) = setup(
            StaticProvider::new()
                .with_info("GOOGL", sample_info("Alphabet Inc."))
                .with_info("GOOG", analysis_core::TickerInfo::default()),
        )
        .await;

        let results = service.search_companies("goog").await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].ticker, "GOOGL");
        assert_eq!(results[0].name, "Alphabet Inc.");
        assert_eq!(results[0].exchange, "NMS");
        assert_eq!(results[1].name, "GOOG");
        assert_eq!(results[1].exchange, "");
    }

    #[tokio::test]
    async fn test_search_errors_yield_empty_list() {
        let (service, _) = setup(StaticProvider::new().failing_search()).await;
        assert!(service.search_companies("apple").await.is_empty());

        // Every fallback info lookup fails
        let (service, _) = setup(StaticProvider::new()).await;
        assert!(service.search_companies("goog").await.is_empty());
    }

    #[tokio::test]
    async fn test_search_fallback_skips_failed_lookups() {
        // GOOG is unknown to the provider, GOOGL is not
        let (service, _) = setup(StaticProvider::new().with_info("GOOGL", sample_info("Alphabet Inc."))).await;

        let results = service.search_companies("goog").await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].ticker, "GOOGL");
        assert_eq!(results[0].name, "Alphabet Inc.");
    }

    #[tokio::test]
    async fn test_cached_search_only_caches_hits() {
        let hit = SymbolMatch {
            ticker: "AAPL".to_string(),
            name: "Apple Inc.".to_string(),
            exchange: "NASDAQ".to_string(),
        };
        let (service, provider) = setup(StaticProvider::new().with_search_results(vec![hit])).await;

        assert_eq!(service.cached_search("Apple").await.unwrap().len(), 1);
        assert_eq!(service.cached_search("apple").await.unwrap().len(), 1);
        assert_eq!(provider.search_calls(), 1);

        let (service, provider) = setup(StaticProvider::new()).await;
        assert!(service.cached_search("zzzz").await.unwrap().is_empty());
        assert!(service.cached_search("zzzz").await.unwrap().is_empty());
        assert_eq!(provider.search_calls(), 2);
        assert!(service.store().get_search("zzzz").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_stock_data_selects_stale_companies() {
        let (service, _) = setup(StaticProvider::new().with_company("AAPL", "Apple Inc.")).await;
        service.store().save_company(&stale_company("AAPL", "Old")).await.unwrap();
        service.store().save_company(&stale_company("GONE", "Delisted")).await.unwrap();

        let summary = service.update_stock_data(false, None).await.unwrap();
        assert_eq!(summary, UpdateSummary { updated: 2, errors: 0 });
        let aapl = service.store().get_company("AAPL").await.unwrap().unwrap();
        assert_eq!(aapl.name, "Apple Inc.");
        assert!(service.store().get_financials("AAPL").await.unwrap().is_some());

        // AAPL is fresh now, GONE had nothing to store
        let summary = service.update_stock_data(false, None).await.unwrap();
        assert_eq!(summary.updated, 1);
        assert_eq!(service.store().get_company("GONE").await.unwrap().unwrap().name, "Delisted");

        let summary = service.update_stock_data(true, Some(1)).await.unwrap();
        assert_eq!(summary.updated + summary.errors, 1);
    }

    #[tokio::test]
    async fn test_update_popular_stocks() {
        let (service, _) = setup(StaticProvider::new().with_company("AAPL", "Apple Inc.")).await;
        let tickers = vec!["AAPL".to_string(), "NOPE".to_string()];

        let summary = service.update_popular_stocks(&tickers).await;
        assert_eq!(summary, UpdateSummary { updated: 1, errors: 1 });
        assert!(service.store().get_company("AAPL").await.unwrap().is_some());
    }
}
