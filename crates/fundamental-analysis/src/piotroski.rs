use analysis_core::FinancialStatements;

const REQUIRED_ROWS: [(&str, Source); 4] = [
    ("Net Income", Source::Income),
    ("Total Revenue", Source::Income),
    ("Total Assets", Source::Balance),
    ("Operating Cash Flow", Source::CashFlow),
];

#[derive(Clone, Copy)]
enum Source {
    Income,
    Balance,
    CashFlow,
}

/// Piotroski F-score (0-9) from annual statements, comparing the latest
/// year (column 0) with the one before it (column 1).
///
/// Missing cells read as NaN so any comparison involving them fails.
pub fn piotroski_score(statements: &FinancialStatements) -> u8 {
    let income = &statements.income;
    let balance = &statements.balance_sheet;
    let cash_flow = &statements.cash_flow;

    if income.column_count() < 2 {
        return 0;
    }

    for (row, source) in REQUIRED_ROWS {
        let table = match source {
            Source::Income => income,
            Source::Balance => balance,
            Source::CashFlow => cash_flow,
        };
        if !table.has_row(row) {
            tracing::error!("Error calculating Piotroski score: missing '{}' row", row);
            return 0;
        }
    }

    // Balance and cash flow columns are matched to the income statement by date
    let (cur, prev) = (income.periods[0], income.periods[1]);
    let cell = |table: &analysis_core::StatementTable, item: &str, date| table.value_at(item, date).unwrap_or(f64::NAN);
    // Optional rows fall back to `default` when absent from the statement entirely
    let optional = |item: &str, date, default: f64| {
        if balance.has_row(item) {
            cell(balance, item, date)
        } else {
            default
        }
    };

    let net_income = cell(income, "Net Income", cur);
    let revenue = cell(income, "Total Revenue", cur);
    let prev_revenue = cell(income, "Total Revenue", prev);
    let assets = cell(balance, "Total Assets", cur);
    let prev_assets = cell(balance, "Total Assets", prev);
    let ocf = cell(cash_flow, "Operating Cash Flow", cur);

    let mut score = 0u8;

    // 1. Positive net income
    if net_income > 0.0 {
        score += 1;
    }

    // 2. Positive ROA
    if assets > 0.0 && net_income / assets > 0.0 {
        score += 1;
    }

    // 3. Positive operating cash flow
    if ocf > 0.0 {
        score += 1;
    }

    // 4. Cash flow exceeds earnings
    if ocf > net_income {
        score += 1;
    }

    // 5. Long-term debt to assets fell
    let debt = optional("Long Term Debt", cur, 0.0);
    let prev_debt = optional("Long Term Debt", prev, 0.0);
    if debt / assets < prev_debt / prev_assets {
        score += 1;
    }

    // 6. Current ratio rose
    let current_ratio = |date| {
        let current_assets = optional("Current Assets", date, 0.0);
        let current_liabilities = optional("Current Liabilities", date, 1.0);
        if current_liabilities != 0.0 {
            current_assets / current_liabilities
        } else {
            0.0
        }
    };
    if current_ratio(cur) > current_ratio(prev) {
        score += 1;
    }

    // 7. No dilution
    if optional("Common Stock", cur, 0.0) <= optional("Common Stock", prev, 0.0) {
        score += 1;
    }

    // 8. Gross margin rose
    let gross_margin = |date, revenue: f64| {
        if income.has_row("Gross Profit") && revenue != 0.0 {
            cell(income, "Gross Profit", date) / revenue
        } else {
            0.0
        }
    };
    if gross_margin(cur, revenue) > gross_margin(prev, prev_revenue) {
        score += 1;
    }

    // 9. Asset turnover rose
    let turnover = |revenue: f64, assets: f64| if assets != 0.0 { revenue / assets } else { 0.0 };
    if turnover(revenue, assets) > turnover(prev_revenue, prev_assets) {
        score += 1;
    }

    score
}
