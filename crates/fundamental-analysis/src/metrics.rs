use analysis_core::{stats, FinancialStatements, PriceHistory, TickerInfo};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::piotroski::piotroski_score;

/// Valuation, quality and dividend snapshot for one company.
/// Margins, yields and payout ratio are percentages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    pub market_cap: Option<f64>,
    pub current_price: Option<f64>,
    pub price_change_ytd: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub ps_ratio: Option<f64>,
    pub pb_ratio: Option<f64>,
    pub ev_ebitda: Option<f64>,
    pub fcf_yield: Option<f64>,
    pub quality_score: Option<i32>,
    pub profit_margin: Option<f64>,
    pub operating_margin: Option<f64>,
    pub cash: Option<f64>,
    pub total_debt: Option<f64>,
    pub net_cash: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub payout_ratio: Option<f64>,
    pub ex_dividend_date: Option<NaiveDate>,
}

fn calculate_ev(market_cap: Option<f64>, total_debt: f64, cash: f64) -> Option<f64> {
    match market_cap {
        Some(cap) if cap != 0.0 => Some(cap + total_debt - cash),
        _ => None,
    }
}

fn calculate_ev_ebitda(ev: Option<f64>, ebitda: f64) -> Option<f64> {
    match ev {
        Some(ev) if ev != 0.0 && ebitda > 0.0 => Some(ev / ebitda),
        _ => None,
    }
}

fn calculate_fcf_yield(fcf: Option<f64>, market_cap: Option<f64>) -> Option<f64> {
    match (fcf, market_cap) {
        (Some(fcf), Some(cap)) if fcf != 0.0 && cap > 0.0 => Some(fcf / cap * 100.0),
        _ => None,
    }
}

/// YTD change from the first close of the year to the current price,
/// falling back to the last close when the provider reports no price.
fn calculate_price_change_ytd(info: &TickerInfo, ytd: &PriceHistory) -> Option<f64> {
    let first = ytd.bars.first()?;
    let last = ytd.bars.last()?;
    let current = info.current_price.unwrap_or(last.close);
    stats::percent_change(first.close, current)
}

fn percent(fraction: Option<f64>) -> f64 {
    fraction.unwrap_or(0.0) * 100.0
}

/// Compute the stored metric set from provider info, annual statements and
/// the year-to-date price history. Dividend fields are zeroed unless the
/// company has ever paid a dividend.
pub fn compute_financial_metrics(
    info: &TickerInfo,
    annual: &FinancialStatements,
    ytd: &PriceHistory,
    dividends_paid: bool,
) -> FinancialMetrics {
    let total_debt = annual.balance_sheet.latest("Total Debt").unwrap_or(0.0);
    let cash = annual.balance_sheet.latest("Cash And Cash Equivalents").unwrap_or(0.0);
    let ebitda = annual.income.latest("EBITDA").unwrap_or(0.0);
    let fcf = annual.cash_flow.latest("Free Cash Flow");

    let ev = calculate_ev(info.market_cap, total_debt, cash);

    let (dividend_yield, payout_ratio, ex_dividend_date) = if dividends_paid {
        (
            percent(info.dividend_yield),
            percent(info.payout_ratio),
            info.ex_dividend_date
                .and_then(|ts| DateTime::from_timestamp(ts, 0))
                .map(|dt| dt.date_naive()),
        )
    } else {
        (0.0, 0.0, None)
    };

    FinancialMetrics {
        market_cap: info.market_cap,
        current_price: info.current_price,
        price_change_ytd: calculate_price_change_ytd(info, ytd),
        pe_ratio: info.trailing_pe,
        ps_ratio: info.price_to_sales,
        pb_ratio: info.price_to_book,
        ev_ebitda: calculate_ev_ebitda(ev, ebitda),
        fcf_yield: calculate_fcf_yield(fcf, info.market_cap),
        quality_score: Some(piotroski_score(annual) as i32),
        profit_margin: Some(percent(info.profit_margins)),
        operating_margin: Some(percent(info.operating_margins)),
        cash: Some(cash),
        total_debt: Some(total_debt),
        net_cash: Some(cash - total_debt),
        shares_outstanding: info.shares_outstanding,
        dividend_yield: Some(dividend_yield),
        payout_ratio: Some(payout_ratio),
        ex_dividend_date,
    }
}
