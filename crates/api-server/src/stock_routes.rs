use analysis_core::SymbolMatch;
use axum::{
    extract::{Path, Query, State},
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::auth::require_staff_middleware;
use crate::core_routes::SearchQuery;
use crate::{AppError, AppState};

#[derive(Serialize)]
pub struct SearchResultsPage {
    pub query: String,
    pub results: Vec<SymbolMatch>,
}

#[derive(Serialize)]
pub struct Suggestions {
    pub suggestions: Vec<SymbolMatch>,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub status: &'static str,
    pub message: String,
}

pub fn stock_routes(state: AppState) -> Router<AppState> {
    let staff = Router::new()
        .route("/stock/refresh/:ticker", post(refresh_company))
        .route_layer(middleware::from_fn_with_state(state, require_staff_middleware));

    Router::new()
        .route("/stock/search", get(search_results))
        .route("/stock/api/search-suggestions", get(search_suggestions))
        .merge(staff)
}

#[utoipa::path(
    get,
    path = "/stock/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Companies matching the query"),
        (status = 303, description = "Empty query, redirect home")
    ),
    tag = "Stock Data"
)]
pub async fn search_results(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Response, AppError> {
    let query = params.query.trim();
    if query.is_empty() {
        return Ok(Redirect::to("/").into_response());
    }

    let results = state.service.cached_search(query).await?;
    Ok(Json(SearchResultsPage { query: query.to_string(), results }).into_response())
}

#[utoipa::path(
    get,
    path = "/stock/api/search-suggestions",
    params(SearchQuery),
    responses((status = 200, description = "Autocomplete suggestions, empty below two characters")),
    tag = "Stock Data"
)]
pub async fn search_suggestions(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<Suggestions>, AppError> {
    let query = params.query.trim();
    if query.chars().count() < 2 {
        return Ok(Json(Suggestions { suggestions: Vec::new() }));
    }

    let suggestions = state.service.cached_search(query).await?;
    Ok(Json(Suggestions { suggestions }))
}

#[utoipa::path(
    post,
    path = "/stock/refresh/{ticker}",
    params(("ticker" = String, Path, description = "Stock ticker symbol")),
    responses(
        (status = 200, description = "Company data re-fetched"),
        (status = 403, description = "Caller is not staff"),
        (status = 404, description = "Company is not cached")
    ),
    tag = "Stock Data"
)]
pub async fn refresh_company(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<RefreshResponse>, AppError> {
    let ticker = ticker.to_uppercase();
    state.service.refresh_company_data(&ticker).await?;

    Ok(Json(RefreshResponse {
        status: "success",
        message: format!("Data for {} refreshed successfully", ticker),
    }))
}
