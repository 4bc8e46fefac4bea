//! HTTP surface for the stock market site.
//!
//! Every page is a JSON document carrying the data its view needs. Chart
//! endpoints under `/charts/api` return the payloads chart widgets consume.

pub mod auth;
pub mod chart_routes;
pub mod company_routes;
pub mod config;
pub mod core_routes;
pub mod stock_routes;

#[cfg(test)]
#[path = "routes_tests.rs"]
mod routes_tests;

use analysis_core::MarketDataError;
use axum::{
    http::{HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use stock_data::{CacheStore, StockDataConfig, StockDataService, StockDb, StoreError};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use yahoo_client::YahooClient;

use crate::auth::Role;
use crate::config::ServerConfig;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub service: StockDataService,
    /// SHA-256 of each accepted staff key, with its role
    pub staff_keys: Arc<HashMap<String, Role>>,
}

/// Handler error rendered as `{"error": message}`
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

fn provider_status(err: &MarketDataError) -> StatusCode {
    match err {
        MarketDataError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
        MarketDataError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err: anyhow::Error = err.into();
        let status = if let Some(e) = err.downcast_ref::<MarketDataError>() {
            provider_status(e)
        } else if let Some(e) = err.downcast_ref::<StoreError>() {
            match e {
                StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                StoreError::Provider(inner) => provider_status(inner),
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {:#}", err);
        }
        Self { status, message: err.to_string() }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Label/value option shown in a chart dropdown
#[derive(Debug, Clone, Serialize)]
pub struct SelectOption {
    pub label: &'static str,
    pub value: &'static str,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        core_routes::home,
        core_routes::health,
        core_routes::search,
        stock_routes::search_results,
        stock_routes::search_suggestions,
        stock_routes::refresh_company,
        company_routes::company_detail,
        company_routes::company_financials,
        company_routes::company_peers,
        company_routes::company_news,
        chart_routes::price_chart,
        chart_routes::price_data,
        chart_routes::financial_chart,
        chart_routes::financial_data,
        chart_routes::comparison_chart,
        chart_routes::comparison_data,
        chart_routes::technical_chart,
        chart_routes::technical_data,
    ),
    tags(
        (name = "Core", description = "Home page, health and search dispatch"),
        (name = "Stock Data", description = "Company search and cache maintenance"),
        (name = "Company", description = "Company profile pages"),
        (name = "Charts", description = "Chart pages and chart data"),
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// Build the full router with middleware
pub fn app(state: AppState, cors_origins: &[String]) -> Router {
    let request_id = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(core_routes::core_routes())
        .merge(stock_routes::stock_routes(state.clone()))
        .merge(company_routes::company_routes())
        .merge(chart_routes::chart_routes())
        .route("/api-docs/openapi.json", get(openapi_json))
        .with_state(state)
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        }))
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(cors_layer(cors_origins))
}

fn init_tracing() {
    let json_logging = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "api_server=info,stock_data=info,yahoo_client=warn,tower_http=info".into())
    };

    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(filter()).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let server_config = ServerConfig::from_env()?;
    let data_config = StockDataConfig::from_env()?;

    let provider = Arc::new(YahooClient::new()?);
    let db = StockDb::new(&data_config.database_url).await?;
    let service = StockDataService::new(provider, CacheStore::new(db), data_config);

    let staff_keys = auth::load_staff_keys();
    if staff_keys.is_empty() {
        tracing::warn!("STAFF_API_KEYS not set; cache refresh endpoint is disabled");
    }

    let state = AppState { service, staff_keys: Arc::new(staff_keys) };
    let app = app(state, &server_config.cors_origins);

    let listener = tokio::net::TcpListener::bind(&server_config.bind_addr).await?;
    tracing::info!("Listening on {}", server_config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
