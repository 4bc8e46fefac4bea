use analysis_core::{FinancialStatements, StatementTable};
use serde::{Deserialize, Serialize};

/// Multi-year series shown on the company page. Every vector has one entry
/// per statement column; missing rows or cells read as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialHistory {
    pub years: Vec<String>,
    pub revenue: Vec<f64>,
    pub ebitda: Vec<f64>,
    pub net_income: Vec<f64>,
    pub eps: Vec<f64>,
    pub fcf: Vec<f64>,
    pub cash: Vec<f64>,
    pub debt: Vec<f64>,
}

fn series(table: &StatementTable, item: &str, columns: usize) -> Vec<f64> {
    (0..columns).map(|c| table.value(item, c).unwrap_or(0.0)).collect()
}

pub fn financial_history(statements: &FinancialStatements) -> FinancialHistory {
    let income = &statements.income;
    let balance = &statements.balance_sheet;
    let income_cols = income.column_count();
    let balance_cols = balance.column_count();

    FinancialHistory {
        years: income.periods.iter().map(|d| d.format("%Y").to_string()).collect(),
        revenue: series(income, "Total Revenue", income_cols),
        ebitda: series(income, "EBITDA", income_cols),
        net_income: series(income, "Net Income", income_cols),
        eps: series(income, "Basic EPS", income_cols),
        // cash flow matched to income statement periods by date
        fcf: income
            .periods
            .iter()
            .map(|&date| statements.cash_flow.value_at("Free Cash Flow", date).unwrap_or(0.0))
            .collect(),
        cash: series(balance, "Cash And Cash Equivalents", balance_cols),
        debt: series(balance, "Total Debt", balance_cols),
    }
}
