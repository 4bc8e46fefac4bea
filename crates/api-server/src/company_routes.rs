use analysis_core::{Interval, NewsItem, Period, StatementFrequency};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use fundamental_analysis::{financial_history, format_thousands, statement_lines, FinancialHistory, StatementLine};
use serde::Serialize;
use serde_json::{Map, Value};
use stock_data::models::round_dp;
use stock_data::{CompanyProfile, FinancialData};

use crate::{AppError, AppState};

const NEWS_LIMIT: usize = 10;

#[derive(Serialize)]
pub struct PricePoint {
    pub date: String,
    pub price: f64,
}

#[derive(Serialize)]
pub struct DividendPoint {
    pub date: String,
    pub dividend: f64,
}

#[derive(Serialize)]
pub struct CompanyDetailPage {
    pub company: CompanyProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financial_history: Option<FinancialHistory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_data: Option<Vec<PricePoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dividend_data: Option<Vec<DividendPoint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct FinancialsPage {
    pub company: CompanyProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub income_data: Option<Vec<StatementLine>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_data: Option<Vec<StatementLine>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cashflow_data: Option<Vec<StatementLine>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct PeersPage {
    pub company: CompanyProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peers: Option<Vec<CompanyProfile>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison_data: Option<Vec<Map<String, Value>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct NewsPage {
    pub company: CompanyProfile,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news_items: Option<Vec<NewsItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn company_routes() -> Router<AppState> {
    Router::new()
        .route("/company/:ticker", get(company_detail))
        .route("/company/:ticker/financials", get(company_financials))
        .route("/company/:ticker/peers", get(company_peers))
        .route("/company/:ticker/news", get(company_news))
}

/// Cached profile for an upper-cased ticker, or 404.
pub(crate) async fn load_company(state: &AppState, ticker: &str) -> Result<CompanyProfile, AppError> {
    state
        .service
        .get_company_data(ticker)
        .await?
        .ok_or_else(|| AppError::not_found("Company not found"))
}

#[utoipa::path(
    get,
    path = "/company/{ticker}",
    params(("ticker" = String, Path, description = "Stock ticker symbol")),
    responses(
        (status = 200, description = "Company profile with price, dividend and statement history"),
        (status = 404, description = "Unknown company")
    ),
    tag = "Company"
)]
pub async fn company_detail(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<CompanyDetailPage>, AppError> {
    let ticker = ticker.to_uppercase();
    let company = load_company(&state, &ticker).await?;
    let provider = state.service.provider();

    let (ytd, statements, full_history) = tokio::join!(
        provider.history(&ticker, Period::Ytd, Interval::Day1),
        provider.statements(&ticker, StatementFrequency::Annual),
        provider.history(&ticker, Period::Max, Interval::Month3),
    );

    let charts = ytd.and_then(|ytd| Ok((ytd, statements?, full_history?)));
    let page = match charts {
        Ok((ytd, statements, full_history)) => CompanyDetailPage {
            company,
            financial_history: Some(financial_history(&statements)),
            price_data: Some(
                ytd.bars
                    .iter()
                    .map(|bar| PricePoint {
                        date: bar.timestamp.format("%Y-%m-%d").to_string(),
                        price: round_dp(Some(bar.close), 2).unwrap_or(bar.close),
                    })
                    .collect(),
            ),
            dividend_data: Some(
                full_history
                    .dividends
                    .iter()
                    .map(|d| DividendPoint {
                        date: d.date.format("%Y-%m-%d").to_string(),
                        dividend: d.amount,
                    })
                    .collect(),
            ),
            error: None,
        },
        Err(e) => {
            tracing::error!("Error loading chart data for {}: {}", ticker, e);
            CompanyDetailPage {
                company,
                financial_history: None,
                price_data: None,
                dividend_data: None,
                error: Some(e.to_string()),
            }
        }
    };

    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/company/{ticker}/financials",
    params(("ticker" = String, Path, description = "Stock ticker symbol")),
    responses(
        (status = 200, description = "Annual income, balance sheet and cash flow statements"),
        (status = 404, description = "Unknown company")
    ),
    tag = "Company"
)]
pub async fn company_financials(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<FinancialsPage>, AppError> {
    let ticker = ticker.to_uppercase();
    let company = load_company(&state, &ticker).await?;

    let page = match state.service.provider().statements(&ticker, StatementFrequency::Annual).await {
        Ok(statements) => FinancialsPage {
            company,
            income_data: Some(statement_lines(&statements.income)),
            balance_data: Some(statement_lines(&statements.balance_sheet)),
            cashflow_data: Some(statement_lines(&statements.cash_flow)),
            error: None,
        },
        Err(e) => {
            tracing::error!("Error fetching financial statements for {}: {}", ticker, e);
            FinancialsPage {
                company,
                income_data: None,
                balance_data: None,
                cashflow_data: None,
                error: Some(format!("Could not load financial statements: {}", e)),
            }
        }
    };

    Ok(Json(page))
}

#[derive(Clone, Copy)]
enum PeerFormat {
    Dollars,
    Ratio,
    Percent,
}

struct PeerMetric {
    name: &'static str,
    format: PeerFormat,
    value: fn(&FinancialData) -> Option<f64>,
}

const PEER_METRICS: &[PeerMetric] = &[
    PeerMetric { name: "Market Cap", format: PeerFormat::Dollars, value: |f| f.market_cap.map(|v| v as f64) },
    PeerMetric { name: "P/E Ratio", format: PeerFormat::Ratio, value: |f| f.pe_ratio },
    PeerMetric { name: "P/S Ratio", format: PeerFormat::Ratio, value: |f| f.ps_ratio },
    PeerMetric { name: "EV/EBITDA", format: PeerFormat::Ratio, value: |f| f.ev_ebitda },
    PeerMetric { name: "Profit Margin", format: PeerFormat::Percent, value: |f| f.profit_margin },
    PeerMetric { name: "Dividend Yield", format: PeerFormat::Percent, value: |f| f.dividend_yield },
];

/// Display value for one comparison cell. Missing and zero values show "N/A".
fn format_peer_value(value: Option<f64>, format: PeerFormat) -> String {
    match value {
        Some(v) if v != 0.0 => match format {
            PeerFormat::Dollars => format!("${}", format_thousands(v)),
            PeerFormat::Ratio => format!("{:.2}", v),
            PeerFormat::Percent => format!("{:.2}%", v),
        },
        _ => "N/A".to_string(),
    }
}

fn metric_cell(profile: &CompanyProfile, metric: &PeerMetric) -> Value {
    let value = profile.financials.as_ref().and_then(metric.value);
    Value::String(format_peer_value(value, metric.format))
}

fn comparison_rows(company: &CompanyProfile, peers: &[CompanyProfile]) -> Vec<Map<String, Value>> {
    PEER_METRICS
        .iter()
        .map(|metric| {
            let mut row = Map::new();
            row.insert("metric".to_string(), Value::String(metric.name.to_string()));
            row.insert("main".to_string(), metric_cell(company, metric));
            for peer in peers {
                row.insert(peer.company.ticker.clone(), metric_cell(peer, metric));
            }
            row
        })
        .collect()
}

#[utoipa::path(
    get,
    path = "/company/{ticker}/peers",
    params(("ticker" = String, Path, description = "Stock ticker symbol")),
    responses(
        (status = 200, description = "Key metrics side by side with peer companies"),
        (status = 404, description = "Unknown company")
    ),
    tag = "Company"
)]
pub async fn company_peers(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<PeersPage>, AppError> {
    let ticker = ticker.to_uppercase();
    let company = load_company(&state, &ticker).await?;

    if company.company.sector.is_none() {
        return Ok(Json(PeersPage {
            company,
            peers: None,
            comparison_data: None,
            error: Some("Sector information not available for peer comparison.".to_string()),
        }));
    }

    let mut peers = Vec::new();
    for peer_ticker in state.service.config().peer_tickers.iter().filter(|t| **t != ticker) {
        match state.service.get_company_data(peer_ticker).await {
            Ok(Some(peer)) => peers.push(peer),
            Ok(None) => {}
            Err(e) => {
                tracing::error!("Error comparing peers for {}: {}", ticker, e);
                return Ok(Json(PeersPage {
                    company,
                    peers: None,
                    comparison_data: None,
                    error: Some(format!("Could not load peer comparison: {}", e)),
                }));
            }
        }
    }

    let comparison_data = comparison_rows(&company, &peers);
    Ok(Json(PeersPage {
        company,
        peers: Some(peers),
        comparison_data: Some(comparison_data),
        error: None,
    }))
}

#[utoipa::path(
    get,
    path = "/company/{ticker}/news",
    params(("ticker" = String, Path, description = "Stock ticker symbol")),
    responses(
        (status = 200, description = "Recent headlines for the company"),
        (status = 404, description = "Unknown company")
    ),
    tag = "Company"
)]
pub async fn company_news(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<NewsPage>, AppError> {
    let ticker = ticker.to_uppercase();
    let company = load_company(&state, &ticker).await?;

    let page = match state.service.provider().news(&ticker, NEWS_LIMIT).await {
        Ok(news_items) => NewsPage { company, news_items: Some(news_items), error: None },
        Err(e) => {
            tracing::error!("Error fetching news for {}: {}", ticker, e);
            NewsPage {
                company,
                news_items: None,
                error: Some(format!("Could not load news: {}", e)),
            }
        }
    };

    Ok(Json(page))
}
