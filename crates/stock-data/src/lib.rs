pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
pub mod universe;
pub mod updater;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::StockDataConfig;
pub use db::StockDb;
pub use error::{StoreError, StoreResult};
pub use models::{Company, CompanyProfile, FinancialData, SearchResult};
pub use service::StockDataService;
pub use store::CacheStore;
pub use updater::UpdateSummary;
