use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One line item across all reported periods.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementRow {
    pub item: String,
    /// One entry per period, aligned with `StatementTable::periods`
    pub values: Vec<Option<f64>>,
}

/// A financial statement laid out as line items by period.
///
/// `periods` is ordered newest first, so column 0 is the most recent report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementTable {
    pub periods: Vec<NaiveDate>,
    pub rows: Vec<StatementRow>,
}

impl StatementTable {
    pub fn new(periods: Vec<NaiveDate>) -> Self {
        Self { periods, rows: Vec::new() }
    }

    /// Append a line item. Values shorter than `periods` are padded with `None`.
    pub fn push_row(&mut self, item: impl Into<String>, mut values: Vec<Option<f64>>) {
        values.resize(self.periods.len(), None);
        self.rows.push(StatementRow { item: item.into(), values });
    }

    pub fn has_row(&self, item: &str) -> bool {
        self.row(item).is_some()
    }

    pub fn row(&self, item: &str) -> Option<&StatementRow> {
        self.rows.iter().find(|r| r.item == item)
    }

    pub fn column_count(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty() || self.rows.is_empty()
    }

    /// Value of `item` in column `column`; `None` when either is absent or the cell is empty.
    pub fn value(&self, item: &str, column: usize) -> Option<f64> {
        self.row(item)
            .and_then(|r| r.values.get(column).copied().flatten())
            .filter(|v| v.is_finite())
    }

    /// Value of `item` for the period ending on `date`.
    pub fn value_at(&self, item: &str, date: NaiveDate) -> Option<f64> {
        let column = self.periods.iter().position(|d| *d == date)?;
        self.value(item, column)
    }

    pub fn latest(&self, item: &str) -> Option<f64> {
        self.value(item, 0)
    }
}

/// Income statement, balance sheet and cash flow statement for one company
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialStatements {
    pub income: StatementTable,
    pub balance_sheet: StatementTable,
    pub cash_flow: StatementTable,
}
