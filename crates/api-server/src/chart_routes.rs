//! Chart pages and the JSON feeds behind them.

use analysis_core::{Interval, MarketDataError, Period, StatementFrequency};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use fundamental_analysis::{metric_series, revenue_growth, FinancialMetric, MetricPoint};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use stock_data::CompanyProfile;
use technical_analysis::{indicator_points, ytd_change_series, IndicatorKind, IndicatorPoint};

use crate::company_routes::load_company;
use crate::{AppError, AppState, SelectOption};

#[derive(Debug, Clone, Serialize)]
pub struct RangeOption {
    pub label: &'static str,
    pub value: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<&'static str>,
}

const fn range(label: &'static str, value: &'static str, interval: Option<&'static str>) -> RangeOption {
    RangeOption { label, value, interval }
}

pub const PRICE_RANGES: [RangeOption; 8] = [
    range("1D", "1d", Some("5m")),
    range("5D", "5d", Some("15m")),
    range("1M", "1mo", Some("1d")),
    range("6M", "6mo", Some("1d")),
    range("YTD", "ytd", Some("1d")),
    range("1Y", "1y", Some("1d")),
    range("5Y", "5y", Some("1wk")),
    range("MAX", "max", Some("1mo")),
];

pub const TECHNICAL_RANGES: [RangeOption; 6] = [
    range("1M", "1mo", None),
    range("3M", "3mo", None),
    range("6M", "6mo", None),
    range("YTD", "ytd", None),
    range("1Y", "1y", None),
    range("2Y", "2y", None),
];

pub const COMPARISON_METRICS: [SelectOption; 6] = [
    SelectOption { label: "Stock Price (YTD)", value: "price_ytd" },
    SelectOption { label: "Market Cap", value: "market_cap" },
    SelectOption { label: "P/E Ratio", value: "pe_ratio" },
    SelectOption { label: "Revenue Growth", value: "revenue_growth" },
    SelectOption { label: "Profit Margin", value: "profit_margin" },
    SelectOption { label: "Dividend Yield", value: "dividend_yield" },
];

fn default_period() -> String {
    "ytd".to_string()
}

fn default_interval() -> String {
    "1d".to_string()
}

fn default_metric() -> String {
    "revenue".to_string()
}

fn default_statement_period() -> String {
    "annual".to_string()
}

fn default_comparison_metric() -> String {
    "price_ytd".to_string()
}

fn default_indicator() -> String {
    "sma".to_string()
}

fn default_technical_period() -> String {
    "6mo".to_string()
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PriceQuery {
    #[serde(default = "default_period")]
    pub period: String,
    #[serde(default = "default_interval")]
    pub interval: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct FinancialQuery {
    #[serde(default = "default_metric")]
    pub metric: String,
    #[serde(default = "default_statement_period")]
    pub period: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ComparisonQuery {
    #[serde(default)]
    pub tickers: String,
    #[serde(default = "default_comparison_metric")]
    pub metric: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct TechnicalQuery {
    #[serde(default = "default_indicator")]
    pub indicator: String,
    #[serde(default = "default_technical_period")]
    pub period: String,
}

#[derive(Serialize)]
pub struct PriceChartPage {
    pub company: CompanyProfile,
    pub ranges: &'static [RangeOption],
    pub default_range: &'static str,
}

#[derive(Serialize)]
pub struct Candle {
    /// Milliseconds since the epoch
    pub date: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

#[derive(Serialize)]
pub struct PriceData {
    pub ticker: String,
    pub period: String,
    pub interval: String,
    pub data: Vec<Candle>,
}

#[derive(Serialize)]
pub struct FinancialChartPage {
    pub company: CompanyProfile,
    pub metrics: Vec<SelectOption>,
    pub default_metric: &'static str,
}

#[derive(Serialize)]
pub struct FinancialChartData {
    pub ticker: String,
    pub metric: String,
    pub period: String,
    pub data: Vec<MetricPoint>,
}

#[derive(Serialize)]
pub struct ComparisonPage {
    pub companies: Vec<CompanyProfile>,
    pub tickers: String,
    pub metrics: &'static [SelectOption],
    pub default_metric: &'static str,
}

#[derive(Serialize)]
pub struct ComparisonData {
    pub metric: String,
    /// Series or single-value list per ticker
    pub data: Map<String, Value>,
}

#[derive(Serialize)]
pub struct TechnicalChartPage {
    pub company: CompanyProfile,
    pub indicators: Vec<SelectOption>,
    pub ranges: &'static [RangeOption],
    pub default_range: &'static str,
    pub default_indicator: &'static str,
}

#[derive(Serialize)]
pub struct DailyBar {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

#[derive(Serialize)]
pub struct TechnicalData {
    pub ticker: String,
    pub indicator: String,
    pub period: String,
    pub price_data: Vec<DailyBar>,
    pub indicator_data: Vec<IndicatorPoint>,
}

pub fn chart_routes() -> Router<AppState> {
    Router::new()
        .route("/charts/price/:ticker", get(price_chart))
        .route("/charts/api/price/:ticker", get(price_data))
        .route("/charts/financials/:ticker", get(financial_chart))
        .route("/charts/api/financials/:ticker", get(financial_data))
        .route("/charts/comparison", get(comparison_chart))
        .route("/charts/api/comparison", get(comparison_data))
        .route("/charts/technical/:ticker", get(technical_chart))
        .route("/charts/api/technical/:ticker", get(technical_data))
}

/// Chart feeds report every provider failure as a 500.
fn provider_failure(context: &str, err: MarketDataError) -> AppError {
    tracing::error!("Error fetching {}: {}", context, err);
    AppError::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

/// Upper-cased, comma-separated ticker list
fn parse_tickers(tickers: &str) -> Vec<String> {
    tickers
        .split(',')
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[utoipa::path(
    get,
    path = "/charts/price/{ticker}",
    params(("ticker" = String, Path, description = "Stock ticker symbol")),
    responses(
        (status = 200, description = "Price chart page with selectable ranges"),
        (status = 404, description = "Unknown company")
    ),
    tag = "Charts"
)]
pub async fn price_chart(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<PriceChartPage>, AppError> {
    let company = load_company(&state, &ticker.to_uppercase()).await?;
    Ok(Json(PriceChartPage { company, ranges: &PRICE_RANGES, default_range: "ytd" }))
}

#[utoipa::path(
    get,
    path = "/charts/api/price/{ticker}",
    params(("ticker" = String, Path, description = "Stock ticker symbol"), PriceQuery),
    responses(
        (status = 200, description = "OHLCV candles with millisecond timestamps"),
        (status = 400, description = "Unknown period or interval")
    ),
    tag = "Charts"
)]
pub async fn price_data(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(params): Query<PriceQuery>,
) -> Result<Json<PriceData>, AppError> {
    let ticker = ticker.to_uppercase();
    let period: Period = params.period.parse()?;
    let interval: Interval = params.interval.parse()?;

    let history = state
        .service
        .provider()
        .history(&ticker, period, interval)
        .await
        .map_err(|e| provider_failure(&format!("price data for {}", ticker), e))?;

    let data = history
        .bars
        .iter()
        .map(|bar| Candle {
            date: bar.timestamp.timestamp_millis(),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume as i64,
        })
        .collect();

    Ok(Json(PriceData { ticker, period: params.period, interval: params.interval, data }))
}

#[utoipa::path(
    get,
    path = "/charts/financials/{ticker}",
    params(("ticker" = String, Path, description = "Stock ticker symbol")),
    responses(
        (status = 200, description = "Financial chart page with selectable metrics"),
        (status = 404, description = "Unknown company")
    ),
    tag = "Charts"
)]
pub async fn financial_chart(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<FinancialChartPage>, AppError> {
    let company = load_company(&state, &ticker.to_uppercase()).await?;
    let metrics = FinancialMetric::ALL
        .iter()
        .map(|m| SelectOption { label: m.label(), value: m.as_str() })
        .collect();

    Ok(Json(FinancialChartPage { company, metrics, default_metric: "revenue" }))
}

#[utoipa::path(
    get,
    path = "/charts/api/financials/{ticker}",
    params(("ticker" = String, Path, description = "Stock ticker symbol"), FinancialQuery),
    responses(
        (status = 200, description = "Dated metric values, oldest first"),
        (status = 400, description = "Unknown metric")
    ),
    tag = "Charts"
)]
pub async fn financial_data(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(params): Query<FinancialQuery>,
) -> Result<Json<FinancialChartData>, AppError> {
    let ticker = ticker.to_uppercase();
    let metric: FinancialMetric = params.metric.parse()?;
    let frequency = StatementFrequency::from_param(&params.period);

    let statements = state
        .service
        .provider()
        .statements(&ticker, frequency)
        .await
        .map_err(|e| provider_failure(&format!("financial data for {}", ticker), e))?;

    Ok(Json(FinancialChartData {
        ticker,
        metric: params.metric,
        period: params.period,
        data: metric_series(&statements, metric),
    }))
}

#[utoipa::path(
    get,
    path = "/charts/comparison",
    params(ComparisonQuery),
    responses((status = 200, description = "Comparison page for the requested or default tickers")),
    tag = "Charts"
)]
pub async fn comparison_chart(
    State(state): State<AppState>,
    Query(params): Query<ComparisonQuery>,
) -> Result<Json<ComparisonPage>, AppError> {
    let mut tickers = parse_tickers(&params.tickers);
    if tickers.is_empty() {
        tickers = state.service.config().comparison_tickers.clone();
    }

    let mut companies = Vec::new();
    for ticker in &tickers {
        if let Some(company) = state.service.get_company_data(ticker).await? {
            companies.push(company);
        }
    }

    Ok(Json(ComparisonPage {
        companies,
        tickers: tickers.join(","),
        metrics: &COMPARISON_METRICS,
        default_metric: "price_ytd",
    }))
}

fn single_value(ticker: &str, value: Option<f64>) -> Option<Value> {
    value.map(|v| json!([{ "label": ticker, "value": v }]))
}

/// Comparison entry for one ticker, `None` when the provider has nothing to show.
async fn comparison_entry(state: &AppState, ticker: &str, metric: &str) -> Result<Option<Value>, MarketDataError> {
    let provider = state.service.provider();

    let entry = match metric {
        "price_ytd" => {
            let history = provider.history(ticker, Period::Ytd, Interval::Day1).await?;
            if history.is_empty() {
                None
            } else {
                Some(json!(ytd_change_series(&history.bars)))
            }
        }
        "market_cap" => single_value(ticker, provider.ticker_info(ticker).await?.market_cap),
        "pe_ratio" => single_value(ticker, provider.ticker_info(ticker).await?.trailing_pe),
        "profit_margin" => single_value(
            ticker,
            provider.ticker_info(ticker).await?.profit_margins.map(|v| v * 100.0),
        ),
        "dividend_yield" => single_value(
            ticker,
            provider.ticker_info(ticker).await?.dividend_yield.map(|v| v * 100.0),
        ),
        "revenue_growth" => {
            let income = provider.statements(ticker, StatementFrequency::Annual).await?.income;
            if income.has_row("Total Revenue") && income.column_count() >= 2 {
                Some(json!(revenue_growth(&income)))
            } else {
                None
            }
        }
        _ => None,
    };

    Ok(entry)
}

#[utoipa::path(
    get,
    path = "/charts/api/comparison",
    params(ComparisonQuery),
    responses(
        (status = 200, description = "Per-ticker series or values for the metric"),
        (status = 400, description = "No tickers provided")
    ),
    tag = "Charts"
)]
pub async fn comparison_data(
    State(state): State<AppState>,
    Query(params): Query<ComparisonQuery>,
) -> Result<Json<ComparisonData>, AppError> {
    let tickers = parse_tickers(&params.tickers);
    if tickers.is_empty() {
        return Err(AppError::bad_request("No tickers provided"));
    }

    let mut data = Map::new();
    for ticker in tickers {
        let entry = comparison_entry(&state, &ticker, &params.metric)
            .await
            .map_err(|e| provider_failure("comparison data", e))?;
        if let Some(entry) = entry {
            data.insert(ticker, entry);
        }
    }

    Ok(Json(ComparisonData { metric: params.metric, data }))
}

#[utoipa::path(
    get,
    path = "/charts/technical/{ticker}",
    params(("ticker" = String, Path, description = "Stock ticker symbol")),
    responses(
        (status = 200, description = "Technical chart page with indicators and ranges"),
        (status = 404, description = "Unknown company")
    ),
    tag = "Charts"
)]
pub async fn technical_chart(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Result<Json<TechnicalChartPage>, AppError> {
    let company = load_company(&state, &ticker.to_uppercase()).await?;
    let indicators = IndicatorKind::ALL
        .iter()
        .map(|k| SelectOption { label: k.label(), value: k.as_str() })
        .collect();

    Ok(Json(TechnicalChartPage {
        company,
        indicators,
        ranges: &TECHNICAL_RANGES,
        default_range: "6mo",
        default_indicator: "sma",
    }))
}

#[utoipa::path(
    get,
    path = "/charts/api/technical/{ticker}",
    params(("ticker" = String, Path, description = "Stock ticker symbol"), TechnicalQuery),
    responses(
        (status = 200, description = "Daily bars with indicator overlay points"),
        (status = 400, description = "Unknown period")
    ),
    tag = "Charts"
)]
pub async fn technical_data(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(params): Query<TechnicalQuery>,
) -> Result<Json<TechnicalData>, AppError> {
    let ticker = ticker.to_uppercase();
    let period: Period = params.period.parse()?;

    let history = state
        .service
        .provider()
        .history(&ticker, period, Interval::Day1)
        .await
        .map_err(|e| provider_failure(&format!("technical data for {}", ticker), e))?;

    let price_data = history
        .bars
        .iter()
        .map(|bar| DailyBar {
            date: bar.timestamp.format("%Y-%m-%d").to_string(),
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume as i64,
        })
        .collect();

    // Unknown indicators still return prices
    let indicator_data = params
        .indicator
        .parse::<IndicatorKind>()
        .map(|kind| indicator_points(&history.bars, kind))
        .unwrap_or_default();

    Ok(Json(TechnicalData {
        ticker,
        indicator: params.indicator,
        period: params.period,
        price_data,
        indicator_data,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tickers() {
        assert_eq!(parse_tickers(" aapl, msft ,,"), vec!["AAPL", "MSFT"]);
        assert!(parse_tickers("").is_empty());
    }

    #[test]
    fn test_price_ranges_cover_defaults() {
        assert!(PRICE_RANGES.iter().any(|r| r.value == "ytd"));
        assert!(TECHNICAL_RANGES.iter().any(|r| r.value == "6mo"));
        for r in PRICE_RANGES.iter() {
            assert!(r.value.parse::<Period>().is_ok());
            assert!(r.interval.map(|i| i.parse::<Interval>().is_ok()).unwrap_or(false));
        }
    }
}
