use analysis_core::{
    FinancialStatements, Interval, MarketDataError, MarketDataProvider, NewsItem, Period, PriceHistory,
    StatementFrequency, SymbolMatch, TickerInfo,
};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

pub mod parse;


const QUERY1_URL: &str = "https://query1.finance.yahoo.com";
const QUERY2_URL: &str = "https://query2.finance.yahoo.com";
const COOKIE_URL: &str = "https://fc.yahoo.com";
const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const QUOTE_SUMMARY_MODULES: &str = "price,assetProfile,summaryDetail,defaultKeyStatistics,financialData";

/// Sliding-window rate limiter: at most `max_requests` per `window` duration.
#[derive(Clone)]
struct RateLimiter {
    timestamps: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: Arc::new(Mutex::new(VecDeque::new())),
            max_requests: max_requests.max(1),
            window,
        }
    }

    async fn acquire(&self) {
        loop {
            let mut ts = self.timestamps.lock().await;
            let now = Instant::now();

            // Remove timestamps outside the window
            while let Some(&front) = ts.front() {
                if now.duration_since(front) >= self.window {
                    ts.pop_front();
                } else {
                    break;
                }
            }

            if ts.len() < self.max_requests {
                ts.push_back(now);
                return;
            }

            // Wait until the oldest request falls out of the window
            let sleep_dur = match ts.front() {
                Some(&oldest) => (oldest + self.window).duration_since(now) + Duration::from_millis(50),
                None => Duration::from_millis(50),
            };
            drop(ts);
            tracing::debug!("Rate limiter: waiting {:.1}s for Yahoo slot", sleep_dur.as_secs_f64());
            tokio::time::sleep(sleep_dur).await;
        }
    }
}

/// Yahoo Finance market data client.
///
/// `quoteSummary` requires a session crumb tied to a cookie, so the underlying
/// reqwest client keeps a cookie store and the crumb is cached until Yahoo
/// rejects it.
#[derive(Clone)]
pub struct YahooClient {
    client: Client,
    rate_limiter: RateLimiter,
    crumb: Arc<Mutex<Option<String>>>,
}

impl YahooClient {
    pub fn new() -> Result<Self, MarketDataError> {
        let rate_limit: usize = std::env::var("YAHOO_RATE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(120);
        Self::with_rate_limit(rate_limit)
    }

    pub fn with_rate_limit(requests_per_minute: usize) -> Result<Self, MarketDataError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .build()
            .map_err(|e| MarketDataError::ApiError(e.to_string()))?;

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(requests_per_minute, Duration::from_secs(60)),
            crumb: Arc::new(Mutex::new(None)),
        })
    }

    /// Send a request with rate limiting and automatic 429 retry.
    async fn send_request(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, MarketDataError> {
        let request = builder.build().map_err(|e| MarketDataError::ApiError(e.to_string()))?;

        for attempt in 0..3u32 {
            self.rate_limiter.acquire().await;
            let req_clone = request
                .try_clone()
                .ok_or_else(|| MarketDataError::ApiError("Cannot clone request".to_string()))?;
            let response = self
                .client
                .execute(req_clone)
                .await
                .map_err(|e| MarketDataError::ApiError(e.to_string()))?;

            if response.status() != StatusCode::TOO_MANY_REQUESTS {
                return Ok(response);
            }

            let wait_secs = 15u64;
            tracing::warn!("Yahoo 429 rate limited, waiting {}s before retry {}/3", wait_secs, attempt + 1);
            tokio::time::sleep(Duration::from_secs(wait_secs)).await;
        }

        Err(MarketDataError::RateLimited("Rate limited by Yahoo after 3 retries".to_string()))
    }

    /// Decode a JSON body, mapping 404 to `NotFound` and other failures to `ApiError`.
    async fn read_json(&self, symbol: &str, response: reqwest::Response) -> Result<Value, MarketDataError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(MarketDataError::NotFound(symbol.to_string()));
        }
        if !status.is_success() {
            return Err(MarketDataError::ApiError(format!(
                "HTTP {}: {}",
                status,
                response.text().await.unwrap_or_default()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| MarketDataError::InvalidData(e.to_string()))
    }

    async fn crumb(&self) -> Result<String, MarketDataError> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        // fc.yahoo.com answers 404 but sets the session cookie the crumb is bound to
        self.send_request(self.client.get(COOKIE_URL)).await?;

        let response = self
            .send_request(self.client.get(format!("{}/v1/test/getcrumb", QUERY1_URL)))
            .await?;
        if !response.status().is_success() {
            return Err(MarketDataError::ApiError(format!("crumb request failed: HTTP {}", response.status())));
        }
        let crumb = response
            .text()
            .await
            .map_err(|e| MarketDataError::ApiError(e.to_string()))?
            .trim()
            .to_string();
        if crumb.is_empty() || crumb.contains('<') {
            return Err(MarketDataError::ApiError("Yahoo returned an invalid crumb".to_string()));
        }

        tracing::debug!("Obtained new Yahoo crumb");
        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    async fn quote_summary(&self, symbol: &str) -> Result<Value, MarketDataError> {
        let url = format!(
            "{}/v10/finance/quoteSummary/{}",
            QUERY2_URL,
            urlencoding::encode(symbol)
        );

        for attempt in 0..2u32 {
            let crumb = self.crumb().await?;
            let response = self
                .send_request(
                    self.client
                        .get(&url)
                        .query(&[("modules", QUOTE_SUMMARY_MODULES), ("crumb", crumb.as_str())]),
                )
                .await?;

            if response.status() == StatusCode::UNAUTHORIZED && attempt == 0 {
                tracing::info!("Yahoo crumb rejected for {}, refreshing", symbol);
                *self.crumb.lock().await = None;
                continue;
            }
            return self.read_json(symbol, response).await;
        }

        Err(MarketDataError::ApiError("Yahoo rejected refreshed crumb".to_string()))
    }

    async fn search_raw(
        &self,
        query: &str,
        quotes_count: usize,
        news_count: usize,
    ) -> Result<Value, MarketDataError> {
        let url = format!("{}/v1/finance/search", QUERY2_URL);
        let response = self
            .send_request(self.client.get(&url).query(&[
                ("q", query.to_string()),
                ("quotesCount", quotes_count.to_string()),
                ("newsCount", news_count.to_string()),
                ("enableFuzzyQuery", "false".to_string()),
            ]))
            .await?;
        self.read_json(query, response).await
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn ticker_info(&self, symbol: &str) -> Result<TickerInfo, MarketDataError> {
        let json = self.quote_summary(symbol).await?;
        parse::parse_quote_summary(symbol, &json)
    }

    async fn history(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<PriceHistory, MarketDataError> {
        let url = format!("{}/v8/finance/chart/{}", QUERY2_URL, urlencoding::encode(symbol));
        let response = self
            .send_request(self.client.get(&url).query(&[
                ("range", period.as_str()),
                ("interval", interval.as_str()),
                ("events", "div"),
                ("includePrePost", "false"),
            ]))
            .await?;
        let json = self.read_json(symbol, response).await?;
        let history = parse::parse_chart(symbol, &json)?;
        tracing::debug!(
            "Fetched {} bars and {} dividends for {} ({}/{})",
            history.bars.len(),
            history.dividends.len(),
            symbol,
            period,
            interval
        );
        Ok(history)
    }

    async fn statements(
        &self,
        symbol: &str,
        frequency: StatementFrequency,
    ) -> Result<FinancialStatements, MarketDataError> {
        let url = format!(
            "{}/ws/fundamentals-timeseries/v1/finance/timeseries/{}",
            QUERY2_URL,
            urlencoding::encode(symbol)
        );
        let response = self
            .send_request(self.client.get(&url).query(&[
                ("symbol", symbol.to_string()),
                ("type", parse::timeseries_types(frequency)),
                ("period1", "493590046".to_string()),
                ("period2", Utc::now().timestamp().to_string()),
            ]))
            .await?;
        let json = self.read_json(symbol, response).await?;
        parse::parse_timeseries(&json, frequency)
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SymbolMatch>, MarketDataError> {
        let json = self.search_raw(query, limit, 0).await?;
        Ok(parse::parse_search_quotes(&json, limit))
    }

    async fn news(&self, symbol: &str, limit: usize) -> Result<Vec<NewsItem>, MarketDataError> {
        let json = self.search_raw(symbol, 0, limit).await?;
        Ok(parse::parse_search_news(&json, limit))
    }
}
