//! Conversion of raw Yahoo Finance JSON payloads into the shared domain types.
//!
//! Kept free of I/O so every payload shape can be exercised with fixtures.

use analysis_core::{
    Bar, Dividend, FinancialStatements, MarketDataError, NewsItem, PriceHistory, StatementFrequency,
    StatementTable, SymbolMatch, TickerInfo,
};
use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Statement {
    Income,
    Balance,
    CashFlow,
}

/// Timeseries keys (without the annual/quarterly prefix) and the row label each becomes.
pub(crate) const TIMESERIES_FIELDS: &[(Statement, &str, &str)] = &[
    (Statement::Income, "TotalRevenue", "Total Revenue"),
    (Statement::Income, "CostOfRevenue", "Cost Of Revenue"),
    (Statement::Income, "GrossProfit", "Gross Profit"),
    (Statement::Income, "OperatingIncome", "Operating Income"),
    (Statement::Income, "EBITDA", "EBITDA"),
    (Statement::Income, "NetIncome", "Net Income"),
    (Statement::Income, "BasicEPS", "Basic EPS"),
    (Statement::Income, "DilutedEPS", "Diluted EPS"),
    (Statement::Balance, "TotalAssets", "Total Assets"),
    (Statement::Balance, "CurrentAssets", "Current Assets"),
    (Statement::Balance, "CurrentLiabilities", "Current Liabilities"),
    (Statement::Balance, "TotalLiabilitiesNetMinorityInterest", "Total Liabilities Net Minority Interest"),
    (Statement::Balance, "TotalDebt", "Total Debt"),
    (Statement::Balance, "LongTermDebt", "Long Term Debt"),
    (Statement::Balance, "CashAndCashEquivalents", "Cash And Cash Equivalents"),
    (Statement::Balance, "CommonStock", "Common Stock"),
    (Statement::Balance, "StockholdersEquity", "Stockholders Equity"),
    (Statement::CashFlow, "OperatingCashFlow", "Operating Cash Flow"),
    (Statement::CashFlow, "CapitalExpenditure", "Capital Expenditure"),
    (Statement::CashFlow, "FreeCashFlow", "Free Cash Flow"),
    (Statement::CashFlow, "CashDividendsPaid", "Cash Dividends Paid"),
    (Statement::CashFlow, "RepurchaseOfCapitalStock", "Repurchase Of Capital Stock"),
];

/// Comma separated `type` parameter for the timeseries endpoint.
pub(crate) fn timeseries_types(frequency: StatementFrequency) -> String {
    TIMESERIES_FIELDS
        .iter()
        .map(|(_, key, _)| format!("{}{}", frequency.as_str(), key))
        .collect::<Vec<_>>()
        .join(",")
}

/// Yahoo wraps most numbers as `{"raw": 1.0, "fmt": "1.00"}`; some endpoints send bare numbers.
fn raw_f64(v: Option<&Value>) -> Option<f64> {
    let v = v?;
    v.get("raw")
        .and_then(|r| r.as_f64())
        .or_else(|| v.as_f64())
        .filter(|x| x.is_finite())
}

fn text(v: Option<&Value>) -> Option<String> {
    v.and_then(|s| s.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn error_description(err: &Value) -> Option<String> {
    if err.is_null() {
        return None;
    }
    let code = err.get("code").and_then(|c| c.as_str()).unwrap_or("error");
    let description = err.get("description").and_then(|d| d.as_str()).unwrap_or("");
    Some(format!("{}: {}", code, description))
}

/// Parse a `v10/finance/quoteSummary` response.
pub fn parse_quote_summary(symbol: &str, json: &Value) -> Result<TickerInfo, MarketDataError> {
    let summary = json
        .get("quoteSummary")
        .ok_or_else(|| MarketDataError::InvalidData("missing quoteSummary".to_string()))?;

    if let Some(err) = summary.get("error").and_then(error_description) {
        if err.starts_with("Not Found") {
            return Err(MarketDataError::NotFound(symbol.to_string()));
        }
        return Err(MarketDataError::ApiError(err));
    }

    let result = summary
        .get("result")
        .and_then(|r| r.as_array())
        .and_then(|arr| arr.first())
        .ok_or_else(|| MarketDataError::NotFound(symbol.to_string()))?;

    let price = result.get("price");
    let profile = result.get("assetProfile");
    let detail = result.get("summaryDetail");
    let stats = result.get("defaultKeyStatistics");
    let financial = result.get("financialData");

    let field = |module: Option<&Value>, key: &str| raw_f64(module.and_then(|m| m.get(key)));
    let string = |module: Option<&Value>, key: &str| text(module.and_then(|m| m.get(key)));

    Ok(TickerInfo {
        long_name: string(price, "longName"),
        short_name: string(price, "shortName"),
        sector: string(profile, "sector"),
        industry: string(profile, "industry"),
        country: string(profile, "country"),
        website: string(profile, "website"),
        logo_url: string(profile, "logo_url"),
        exchange: string(price, "exchange"),
        current_price: field(financial, "currentPrice").or_else(|| field(price, "regularMarketPrice")),
        market_cap: field(price, "marketCap").or_else(|| field(detail, "marketCap")),
        trailing_pe: field(detail, "trailingPE"),
        price_to_sales: field(detail, "priceToSalesTrailing12Months"),
        price_to_book: field(stats, "priceToBook"),
        profit_margins: field(financial, "profitMargins").or_else(|| field(stats, "profitMargins")),
        operating_margins: field(financial, "operatingMargins"),
        shares_outstanding: field(stats, "sharesOutstanding"),
        dividend_yield: field(detail, "dividendYield"),
        payout_ratio: field(detail, "payoutRatio"),
        ex_dividend_date: field(detail, "exDividendDate").map(|v| v as i64),
    })
}

/// Parse a `v8/finance/chart` response. Candles with any null field are skipped.
pub fn parse_chart(symbol: &str, json: &Value) -> Result<PriceHistory, MarketDataError> {
    let chart = json
        .get("chart")
        .ok_or_else(|| MarketDataError::InvalidData("missing chart".to_string()))?;

    if let Some(err) = chart.get("error").and_then(error_description) {
        if err.starts_with("Not Found") {
            return Err(MarketDataError::NotFound(symbol.to_string()));
        }
        return Err(MarketDataError::ApiError(err));
    }

    let result = chart
        .get("result")
        .and_then(|r| r.as_array())
        .and_then(|arr| arr.first())
        .ok_or_else(|| MarketDataError::NotFound(symbol.to_string()))?;

    let mut history = PriceHistory::default();

    // A delisted or brand new symbol returns a result with no timestamps at all
    let Some(timestamps) = result.get("timestamp").and_then(|v| v.as_array()) else {
        return Ok(history);
    };

    let quote = result
        .get("indicators")
        .and_then(|v| v.get("quote"))
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .ok_or_else(|| MarketDataError::InvalidData("no quote data".to_string()))?;

    let series = |key: &str| -> Vec<Value> {
        quote
            .get(key)
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default()
    };
    let opens = series("open");
    let highs = series("high");
    let lows = series("low");
    let closes = series("close");
    let volumes = series("volume");

    for (i, ts) in timestamps.iter().enumerate() {
        if let (Some(ts), Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
            ts.as_i64(),
            opens.get(i).and_then(Value::as_f64),
            highs.get(i).and_then(Value::as_f64),
            lows.get(i).and_then(Value::as_f64),
            closes.get(i).and_then(Value::as_f64),
            volumes.get(i).and_then(Value::as_f64),
        ) {
            let Some(timestamp) = DateTime::from_timestamp(ts, 0) else {
                continue;
            };
            history.bars.push(Bar { timestamp, open, high, low, close, volume });
        }
    }
    history.bars.sort_by_key(|b| b.timestamp);

    if let Some(events) = result
        .get("events")
        .and_then(|e| e.get("dividends"))
        .and_then(|d| d.as_object())
    {
        for event in events.values() {
            let date = event
                .get("date")
                .and_then(|d| d.as_i64())
                .and_then(|d| DateTime::from_timestamp(d, 0));
            let amount = event.get("amount").and_then(|a| a.as_f64());
            if let (Some(date), Some(amount)) = (date, amount) {
                history.dividends.push(Dividend { date, amount });
            }
        }
        history.dividends.sort_by_key(|d| d.date);
    }

    Ok(history)
}

/// Parse a fundamentals-timeseries response into the three statements.
///
/// Each statement gets its own period axis, newest first. Rows with no reported
/// value in any period are dropped.
pub fn parse_timeseries(json: &Value, frequency: StatementFrequency) -> Result<FinancialStatements, MarketDataError> {
    let results = json
        .get("timeseries")
        .and_then(|t| t.get("result"))
        .and_then(|r| r.as_array())
        .ok_or_else(|| MarketDataError::InvalidData("missing timeseries result".to_string()))?;

    let prefix = frequency.as_str();
    let mut cells: BTreeMap<&'static str, BTreeMap<NaiveDate, f64>> = BTreeMap::new();

    for entry in results {
        let Some(type_key) = entry
            .get("meta")
            .and_then(|m| m.get("type"))
            .and_then(|t| t.as_array())
            .and_then(|arr| arr.first())
            .and_then(|t| t.as_str())
        else {
            continue;
        };
        let Some(field) = type_key.strip_prefix(prefix) else {
            continue;
        };
        let Some((_, _, label)) = TIMESERIES_FIELDS.iter().find(|(_, key, _)| *key == field) else {
            continue;
        };
        let Some(points) = entry.get(type_key).and_then(|p| p.as_array()) else {
            continue;
        };

        let row = cells.entry(*label).or_default();
        for point in points.iter().filter(|p| !p.is_null()) {
            let date = point
                .get("asOfDate")
                .and_then(|d| d.as_str())
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());
            let value = raw_f64(point.get("reportedValue"));
            if let (Some(date), Some(value)) = (date, value) {
                row.insert(date, value);
            }
        }
    }

    let build = |statement: Statement| -> StatementTable {
        let fields: Vec<&'static str> = TIMESERIES_FIELDS
            .iter()
            .filter(|(s, _, _)| *s == statement)
            .map(|(_, _, label)| *label)
            .collect();

        let periods: BTreeSet<NaiveDate> = fields
            .iter()
            .filter_map(|label| cells.get(label))
            .flat_map(|row| row.keys().copied())
            .collect();
        let mut table = StatementTable::new(periods.into_iter().rev().collect());

        for label in fields {
            let Some(row) = cells.get(label).filter(|r| !r.is_empty()) else {
                continue;
            };
            let values = table.periods.iter().map(|d| row.get(d).copied()).collect();
            table.push_row(label, values);
        }
        table
    };

    Ok(FinancialStatements {
        income: build(Statement::Income),
        balance_sheet: build(Statement::Balance),
        cash_flow: build(Statement::CashFlow),
    })
}

/// Equity-like hits from `v1/finance/search`.
pub fn parse_search_quotes(json: &Value, limit: usize) -> Vec<SymbolMatch> {
    json.get("quotes")
        .and_then(|q| q.as_array())
        .map(|quotes| {
            quotes
                .iter()
                .filter_map(|q| {
                    let ticker = text(q.get("symbol"))?;
                    let name = text(q.get("longname"))
                        .or_else(|| text(q.get("shortname")))
                        .unwrap_or_else(|| ticker.clone());
                    let exchange = text(q.get("exchDisp"))
                        .or_else(|| text(q.get("exchange")))
                        .unwrap_or_default();
                    Some(SymbolMatch { ticker, name, exchange })
                })
                .take(limit)
                .collect()
        })
        .unwrap_or_default()
}

/// News stories from `v1/finance/search`.
pub fn parse_search_news(json: &Value, limit: usize) -> Vec<NewsItem> {
    json.get("news")
        .and_then(|n| n.as_array())
        .map(|stories| {
            stories
                .iter()
                .filter_map(|n| {
                    let title = text(n.get("title"))?;
                    let url = text(n.get("link"))?;
                    let date = n
                        .get("providerPublishTime")
                        .and_then(|t| t.as_i64())
                        .and_then(|t| DateTime::from_timestamp(t, 0))
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_default();
                    Some(NewsItem {
                        title,
                        source: text(n.get("publisher")).unwrap_or_default(),
                        date,
                        url,
                        summary: text(n.get("summary")),
                    })
                })
                .take(limit)
                .collect()
        })
        .unwrap_or_default()
}
