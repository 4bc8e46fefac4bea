use analysis_core::{FinancialStatements, MarketDataError, StatementTable};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Statement-derived metrics that can be charted over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinancialMetric {
    Revenue,
    NetIncome,
    Ebitda,
    Eps,
    Fcf,
    ProfitMargin,
    OperatingMargin,
    Roe,
    Roa,
}

impl FinancialMetric {
    pub const ALL: [FinancialMetric; 9] = [
        FinancialMetric::Revenue,
        FinancialMetric::NetIncome,
        FinancialMetric::Ebitda,
        FinancialMetric::Eps,
        FinancialMetric::Fcf,
        FinancialMetric::ProfitMargin,
        FinancialMetric::OperatingMargin,
        FinancialMetric::Roe,
        FinancialMetric::Roa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FinancialMetric::Revenue => "revenue",
            FinancialMetric::NetIncome => "net_income",
            FinancialMetric::Ebitda => "ebitda",
            FinancialMetric::Eps => "eps",
            FinancialMetric::Fcf => "fcf",
            FinancialMetric::ProfitMargin => "profit_margin",
            FinancialMetric::OperatingMargin => "operating_margin",
            FinancialMetric::Roe => "roe",
            FinancialMetric::Roa => "roa",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FinancialMetric::Revenue => "Revenue",
            FinancialMetric::NetIncome => "Net Income",
            FinancialMetric::Ebitda => "EBITDA",
            FinancialMetric::Eps => "EPS",
            FinancialMetric::Fcf => "Free Cash Flow",
            FinancialMetric::ProfitMargin => "Profit Margin",
            FinancialMetric::OperatingMargin => "Operating Margin",
            FinancialMetric::Roe => "ROE",
            FinancialMetric::Roa => "ROA",
        }
    }
}

impl FromStr for FinancialMetric {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FinancialMetric::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| MarketDataError::InvalidParameter(format!("unknown metric '{}'", s)))
    }
}

/// Dated value on a financial chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub date: String,
    pub value: f64,
}

fn point(table: &StatementTable, col: usize, value: f64) -> MetricPoint {
    MetricPoint {
        date: table.periods[col].format("%Y-%m-%d").to_string(),
        value,
    }
}

/// Every non-empty cell of one row
fn row_series(table: &StatementTable, item: &str) -> Vec<MetricPoint> {
    (0..table.column_count())
        .filter_map(|col| table.value(item, col).map(|v| point(table, col, v)))
        .collect()
}

/// `numerator / Total Revenue * 100` for columns with positive revenue
fn margin_series(income: &StatementTable, numerator: &str) -> Vec<MetricPoint> {
    if !income.has_row("Total Revenue") || !income.has_row(numerator) {
        return Vec::new();
    }
    (0..income.column_count())
        .filter_map(|col| {
            let revenue = income.value("Total Revenue", col).filter(|r| *r > 0.0)?;
            let value = income.value(numerator, col)?;
            Some(point(income, col, value / revenue * 100.0))
        })
        .collect()
}

/// `Net Income / <balance item> * 100`, matching balance columns by date
fn return_series(statements: &FinancialStatements, denominator: &str) -> Vec<MetricPoint> {
    let income = &statements.income;
    let balance = &statements.balance_sheet;
    if !income.has_row("Net Income") || !balance.has_row(denominator) {
        return Vec::new();
    }
    (0..income.column_count())
        .filter_map(|col| {
            let date = income.periods[col];
            let base = balance.value_at(denominator, date).filter(|v| *v > 0.0)?;
            let net_income = income.value("Net Income", col)?;
            Some(point(income, col, net_income / base * 100.0))
        })
        .collect()
}

/// Chart series for `metric`, sorted by date ascending.
pub fn metric_series(statements: &FinancialStatements, metric: FinancialMetric) -> Vec<MetricPoint> {
    let mut data = match metric {
        FinancialMetric::Revenue => row_series(&statements.income, "Total Revenue"),
        FinancialMetric::NetIncome => row_series(&statements.income, "Net Income"),
        FinancialMetric::Ebitda => row_series(&statements.income, "EBITDA"),
        FinancialMetric::Eps => row_series(&statements.income, "Basic EPS"),
        FinancialMetric::Fcf => row_series(&statements.cash_flow, "Free Cash Flow"),
        FinancialMetric::ProfitMargin => margin_series(&statements.income, "Net Income"),
        FinancialMetric::OperatingMargin => margin_series(&statements.income, "Operating Income"),
        FinancialMetric::Roe => return_series(statements, "Stockholders Equity"),
        FinancialMetric::Roa => return_series(statements, "Total Assets"),
    };
    data.sort_by(|a, b| a.date.cmp(&b.date));
    data
}

/// Year-over-year revenue growth in percent, newest first.
pub fn revenue_growth(income: &StatementTable) -> Vec<MetricPoint> {
    if !income.has_row("Total Revenue") || income.column_count() < 2 {
        return Vec::new();
    }
    (0..income.column_count() - 1)
        .filter_map(|i| {
            let previous = income.value("Total Revenue", i + 1).filter(|r| *r > 0.0)?;
            let current = income.value("Total Revenue", i)?;
            Some(point(income, i, (current - previous) / previous * 100.0))
        })
        .collect()
}
