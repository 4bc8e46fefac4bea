use analysis_core::StatementTable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearValue {
    pub year: String,
    pub value: String,
}

/// One statement line as displayed on the financials page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementLine {
    pub item: String,
    pub values: Vec<YearValue>,
}

/// Format with thousands separators and no decimals, rounding half to even.
pub fn format_thousands(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = value.round_ties_even() as i128;
    let digits = rounded.unsigned_abs().to_string();

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Every row of `table`, one formatted value per period. Empty cells show as 0.
pub fn statement_lines(table: &StatementTable) -> Vec<StatementLine> {
    let years: Vec<String> = table.periods.iter().map(|d| d.format("%Y").to_string()).collect();

    table
        .rows
        .iter()
        .map(|row| StatementLine {
            item: row.item.clone(),
            values: years
                .iter()
                .enumerate()
                .map(|(col, year)| YearValue {
                    year: year.clone(),
                    value: format_thousands(table.value(&row.item, col).unwrap_or(0.0)),
                })
                .collect(),
        })
        .collect()
}
