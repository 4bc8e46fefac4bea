pub mod history;
pub mod metrics;
pub mod piotroski;
pub mod series;
pub mod statements;

pub use history::{financial_history, FinancialHistory};
pub use metrics::{compute_financial_metrics, FinancialMetrics};
pub use piotroski::piotroski_score;
pub use series::{metric_series, revenue_growth, FinancialMetric, MetricPoint};
pub use statements::{format_thousands, statement_lines, StatementLine, YearValue};
