#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::auth::parse_staff_keys;
    use analysis_core::{NewsItem, TickerInfo};
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::Value;
    use stock_data::testing::{sample_info, StaticProvider};
    use tower::ServiceExt;

    async fn test_app() -> Router {
        app_with(StaticProvider::new().with_company("AAPL", "Apple Inc.")).await
    }

    async fn app_with(provider: StaticProvider) -> Router {
        let store = CacheStore::new(StockDb::new("sqlite::memory:").await.unwrap());
        let service = StockDataService::new(Arc::new(provider), store, StockDataConfig::default());
        let state = AppState { service, staff_keys: Arc::new(parse_staff_keys("staffkey")) };
        app(state, &[])
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, body)
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
        send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    async fn redirect_target(app: &Router, uri: &str) -> String {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert!(response.status().is_redirection());
        response.headers()[header::LOCATION].to_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_and_request_id() {
        let app = test_app().await;
        let response = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let (_, body) = get(&app, "/health").await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_home_lists_popular_companies() {
        let app = test_app().await;
        let (status, body) = get(&app, "/").await;
        assert_eq!(status, StatusCode::OK);

        let popular = body["popular_companies"].as_array().unwrap();
        assert_eq!(popular.len(), 10);
        assert_eq!(popular[0]["ticker"], "AAPL");
        assert_eq!(popular[0]["name"], "Apple Inc.");
    }

    #[tokio::test]
    async fn test_search_dispatch() {
        let app = test_app().await;
        assert_eq!(redirect_target(&app, "/search?query=").await, "/");
        assert_eq!(redirect_target(&app, "/search?query=AAPL").await, "/company/AAPL");
        assert_eq!(redirect_target(&app, "/search?query=apple%20inc").await, "/stock/search?query=apple%20inc");
        assert_eq!(redirect_target(&app, "/stock/search?query=%20").await, "/");
    }

    #[tokio::test]
    async fn test_search_suggestions_need_two_chars() {
        let app = test_app().await;
        let (status, body) = get(&app, "/stock/api/search-suggestions?query=a").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["suggestions"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_company_detail() {
        let app = test_app().await;
        let (status, body) = get(&app, "/company/aapl").await;
        assert_eq!(status, StatusCode::OK);

        assert_eq!(body["company"]["ticker"], "AAPL");
        assert_eq!(body["company"]["name"], "Apple Inc.");
        assert_eq!(body["company"]["financials"]["pe_ratio"], 25.5);
        assert_eq!(body["financial_history"]["years"], serde_json::json!(["2024", "2023"]));
        assert_eq!(body["price_data"].as_array().unwrap().len(), 30);
        assert_eq!(body["price_data"][0]["date"], "2025-01-02");
        assert_eq!(body["dividend_data"][0]["dividend"], 0.25);
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn test_unknown_company_is_404() {
        let app = test_app().await;
        let (status, body) = get(&app, "/company/NOPE").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Company not found");

        let (status, _) = get(&app, "/charts/technical/NOPE").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_company_financials_and_news() {
        let app = test_app().await;
        let (status, body) = get(&app, "/company/AAPL/financials").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["income_data"][0]["item"], "Total Revenue");
        assert_eq!(body["income_data"][0]["values"][0]["year"], "2024");
        assert_eq!(body["income_data"][0]["values"][0]["value"], "400");

        let (status, body) = get(&app, "/company/AAPL/news").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["news_items"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_company_peers() {
        let app = test_app().await;
        let (status, body) = get(&app, "/company/AAPL/peers").await;
        assert_eq!(status, StatusCode::OK);

        // Other default peers are unknown to the provider
        assert_eq!(body["peers"], serde_json::json!([]));
        let rows = body["comparison_data"].as_array().unwrap();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0]["metric"], "Market Cap");
        assert_eq!(rows[0]["main"], "$1,000,000,000");
        assert_eq!(rows[1]["main"], "25.50");
        assert_eq!(rows[4]["main"], "25.00%");
    }

    #[tokio::test]
    async fn test_company_detail_keeps_company_when_charts_fail() {
        // Info only: no statements or price history
        let app = app_with(StaticProvider::new().with_info("TSLA", sample_info("Tesla, Inc."))).await;
        let (status, body) = get(&app, "/company/TSLA").await;
        assert_eq!(status, StatusCode::OK);

        assert_eq!(body["company"]["name"], "Tesla, Inc.");
        assert!(body["error"].as_str().unwrap().contains("TSLA"));
        assert!(body.get("price_data").is_none());
        assert!(body.get("financial_history").is_none());
    }

    #[tokio::test]
    async fn test_peers_need_a_sector() {
        let info = TickerInfo { long_name: Some("Holding Co".to_string()), ..Default::default() };
        let app = app_with(StaticProvider::new().with_info("HOLD", info)).await;
        let (status, body) = get(&app, "/company/HOLD/peers").await;
        assert_eq!(status, StatusCode::OK);

        assert_eq!(body["error"], "Sector information not available for peer comparison.");
        assert!(body.get("comparison_data").is_none());
        assert!(body.get("peers").is_none());
    }

    #[tokio::test]
    async fn test_peer_columns() {
        let app = app_with(
            StaticProvider::new()
                .with_company("AAPL", "Apple Inc.")
                .with_company("MSFT", "Microsoft Corporation"),
        )
        .await;
        let (status, body) = get(&app, "/company/AAPL/peers").await;
        assert_eq!(status, StatusCode::OK);

        let peers = body["peers"].as_array().unwrap();
        assert_eq!(peers.len(), 1);
        assert_eq!(peers[0]["ticker"], "MSFT");

        let rows = body["comparison_data"].as_array().unwrap();
        assert_eq!(rows[0]["MSFT"], "$1,000,000,000");
        assert_eq!(rows[1]["MSFT"], "25.50");
        assert_eq!(rows[5]["metric"], "Dividend Yield");
        assert_eq!(rows[5]["MSFT"], "0.50%");
        // The company itself is only in the "main" column
        assert!(rows[0].get("AAPL").is_none());
    }

    #[tokio::test]
    async fn test_company_news_items() {
        let item = NewsItem {
            title: "Apple unveils new iPhone".to_string(),
            source: "Reuters".to_string(),
            date: "2025-01-15".to_string(),
            url: "https://example.com/apple-iphone".to_string(),
            summary: Some("Apple announced its latest handset.".to_string()),
        };
        let app = app_with(StaticProvider::new().with_company("AAPL", "Apple Inc.").with_news(vec![item])).await;
        let (status, body) = get(&app, "/company/AAPL/news").await;
        assert_eq!(status, StatusCode::OK);

        let news = body["news_items"].as_array().unwrap();
        assert_eq!(news.len(), 1);
        assert_eq!(news[0]["title"], "Apple unveils new iPhone");
        assert_eq!(news[0]["source"], "Reuters");
        assert_eq!(news[0]["date"], "2025-01-15");
        assert_eq!(news[0]["url"], "https://example.com/apple-iphone");
        assert_eq!(news[0]["summary"], "Apple announced its latest handset.");
    }

    #[tokio::test]
    async fn test_refresh_requires_staff() {
        let app = test_app().await;
        let refresh = |key: Option<&str>| {
            let mut builder = Request::builder().method("POST").uri("/stock/refresh/aapl");
            if let Some(key) = key {
                builder = builder.header("X-API-Key", key);
            }
            builder.body(Body::empty()).unwrap()
        };

        let (status, body) = send(&app, refresh(None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Permission denied");

        let (status, _) = send(&app, refresh(Some("wrong"))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // Not cached yet
        let (status, _) = send(&app, refresh(Some("staffkey"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        get(&app, "/company/AAPL").await;
        let (status, body) = send(&app, refresh(Some("staffkey"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["message"], "Data for AAPL refreshed successfully");
    }

    #[tokio::test]
    async fn test_price_chart_data() {
        let app = test_app().await;
        let (status, body) = get(&app, "/charts/api/price/aapl?period=1mo&interval=1d").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ticker"], "AAPL");
        assert_eq!(body["period"], "1mo");
        assert_eq!(body["data"].as_array().unwrap().len(), 30);
        assert_eq!(body["data"][0]["date"], 1_735_828_200_000i64);
        assert_eq!(body["data"][0]["volume"], 1_000_000);

        let (status, _) = get(&app, "/charts/api/price/AAPL?period=bogus").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = get(&app, "/charts/api/price/ZZZZ").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("ZZZZ"));
    }

    #[tokio::test]
    async fn test_financial_chart_data() {
        let app = test_app().await;
        let (status, body) = get(&app, "/charts/api/financials/AAPL").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metric"], "revenue");
        assert_eq!(body["period"], "annual");
        assert_eq!(body["data"][0]["date"], "2023-09-30");
        assert_eq!(body["data"][1]["value"], 400.0);

        let (status, _) = get(&app, "/charts/api/financials/AAPL?metric=bogus").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = get(&app, "/charts/financials/AAPL").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["metrics"].as_array().unwrap().len(), 9);
        assert_eq!(body["default_metric"], "revenue");
    }

    #[tokio::test]
    async fn test_comparison_data() {
        let app = test_app().await;
        let (status, body) = get(&app, "/charts/api/comparison").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No tickers provided");

        let (status, body) = get(&app, "/charts/api/comparison?tickers=aapl&metric=market_cap").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["AAPL"][0]["label"], "AAPL");
        assert_eq!(body["data"]["AAPL"][0]["value"], 1_000_000_000.0);

        let (_, body) = get(&app, "/charts/api/comparison?tickers=AAPL&metric=profit_margin").await;
        assert_eq!(body["data"]["AAPL"][0]["value"], 25.0);

        let (_, body) = get(&app, "/charts/api/comparison?tickers=AAPL").await;
        assert_eq!(body["metric"], "price_ytd");
        assert_eq!(body["data"]["AAPL"][0]["value"], 0.0);
        assert_eq!(body["data"]["AAPL"].as_array().unwrap().len(), 30);

        let (_, body) = get(&app, "/charts/api/comparison?tickers=AAPL&metric=revenue_growth").await;
        assert_eq!(body["data"]["AAPL"].as_array().unwrap().len(), 1);

        let (status, body) = get(&app, "/charts/api/comparison?tickers=AAPL&metric=bogus").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_comparison_page_defaults() {
        let app = test_app().await;
        let (status, body) = get(&app, "/charts/comparison").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["tickers"], "AAPL,MSFT,GOOGL,META,AMZN");
        // Only AAPL is known
        assert_eq!(body["companies"].as_array().unwrap().len(), 1);
        assert_eq!(body["default_metric"], "price_ytd");
    }

    #[tokio::test]
    async fn test_technical_data() {
        let app = test_app().await;
        let (status, body) = get(&app, "/charts/api/technical/AAPL").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["indicator"], "sma");
        assert_eq!(body["period"], "6mo");
        assert_eq!(body["price_data"].as_array().unwrap().len(), 30);

        // 30 bars fill only the 20-day window
        let points = body["indicator_data"].as_array().unwrap();
        assert_eq!(points.len(), 11);
        assert!(points.iter().all(|p| p["type"] == "SMA20"));

        let (status, body) = get(&app, "/charts/api/technical/AAPL?indicator=bogus").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["indicator_data"], serde_json::json!([]));

        let (_, body) = get(&app, "/charts/api/technical/AAPL?indicator=macd").await;
        assert_eq!(body["indicator_data"].as_array().unwrap().len(), 30);
    }

    #[tokio::test]
    async fn test_openapi_document() {
        let app = test_app().await;
        let (status, body) = get(&app, "/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/company/{ticker}"].is_object());
        assert!(body["paths"]["/charts/api/comparison"].is_object());
    }
}
