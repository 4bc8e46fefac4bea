use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use stock_data::universe::popular_name;

use crate::{AppError, AppState};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

#[derive(Serialize)]
pub struct PopularCompany {
    pub ticker: String,
    pub name: String,
}

#[derive(Serialize)]
pub struct HomePage {
    pub popular_companies: Vec<PopularCompany>,
}

pub fn core_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/search", get(search))
}

/// Upper-case ticker of at most five characters, e.g. `AAPL` or `BRK.B`.
pub(crate) fn looks_like_ticker(query: &str) -> bool {
    let has_cased = query.chars().any(|c| c.is_uppercase() || c.is_lowercase());
    has_cased && !query.chars().any(char::is_lowercase) && query.chars().count() <= 5
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Popular companies for the home page")),
    tag = "Core"
)]
pub async fn home(State(state): State<AppState>) -> Result<Json<HomePage>, AppError> {
    let mut popular_companies = Vec::new();

    for ticker in &state.service.config().popular_tickers {
        let name = match state.service.store().get_company(ticker).await? {
            Some(company) => company.name,
            None => popular_name(ticker)
                .map(str::to_string)
                .unwrap_or_else(|| ticker.clone()),
        };
        popular_companies.push(PopularCompany { ticker: ticker.clone(), name });
    }

    Ok(Json(HomePage { popular_companies }))
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up")),
    tag = "Core"
)]
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[utoipa::path(
    get,
    path = "/search",
    params(SearchQuery),
    responses((status = 303, description = "Redirect to a company page or search results")),
    tag = "Core"
)]
pub async fn search(Query(params): Query<SearchQuery>) -> Redirect {
    let query = params.query.trim();

    if query.is_empty() {
        return Redirect::to("/");
    }
    if looks_like_ticker(query) {
        return Redirect::to(&format!("/company/{}", urlencoding::encode(query)));
    }
    Redirect::to(&format!("/stock/search?query={}", urlencoding::encode(query)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_ticker() {
        assert!(looks_like_ticker("AAPL"));
        assert!(looks_like_ticker("BRK.B"));
        assert!(looks_like_ticker("F"));
        assert!(!looks_like_ticker("Apple"));
        assert!(!looks_like_ticker("GOOGLE"));
        assert!(!looks_like_ticker("123"));
        assert!(!looks_like_ticker("aapl"));
    }
}
