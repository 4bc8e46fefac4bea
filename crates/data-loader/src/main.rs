//! data-loader: cache maintenance commands.
//!
//! Usage:
//!   cargo run -p data-loader -- update-stock-data            # companies older than a day
//!   cargo run -p data-loader -- update-stock-data --all --limit 50
//!   cargo run -p data-loader -- update-popular-stocks

use clap::{Parser, Subcommand};
use std::sync::Arc;
use stock_data::{CacheStore, StockDataConfig, StockDataService, StockDb};
use yahoo_client::YahooClient;

#[derive(Parser)]
#[command(name = "data-loader")]
#[command(about = "Refresh the stock market cache", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Update stock data for companies in the database
    UpdateStockData {
        /// Update all companies regardless of last update time
        #[arg(long)]
        all: bool,
        /// Limit the number of companies to update
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Update data for the popular companies shown on the home page
    UpdatePopularStocks,
}

fn is_json_format(log_format: Option<&str>) -> bool {
    log_format.is_some_and(|v| v.eq_ignore_ascii_case("json"))
}

fn init_tracing() {
    let json_logging = is_json_format(std::env::var("LOG_FORMAT").ok().as_deref());
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "data_loader=info,stock_data=info,yahoo_client=warn".into())
    };

    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(filter()).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let config = StockDataConfig::from_env()?;
    let db = StockDb::new(&config.database_url).await?;
    let provider = Arc::new(YahooClient::new()?);
    let service = StockDataService::new(provider, CacheStore::new(db), config);

    match cli.command {
        Commands::UpdateStockData { all, limit } => {
            let summary = service.update_stock_data(all, limit).await?;
            println!(
                "Updated {} companies successfully. {} errors.",
                summary.updated, summary.errors
            );
        }
        Commands::UpdatePopularStocks => {
            let tickers = service.config().popular_tickers.clone();
            tracing::info!("Updating data for {} popular companies", tickers.len());
            let summary = service.update_popular_stocks(&tickers).await;
            println!(
                "Updated {} popular companies successfully. {} errors.",
                summary.updated, summary.errors
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_update_stock_data() {
        let cli = Cli::try_parse_from(["data-loader", "update-stock-data", "--all", "--limit", "5"]).unwrap();
        match cli.command {
            Commands::UpdateStockData { all, limit } => {
                assert!(all);
                assert_eq!(limit, Some(5));
            }
            _ => panic!("wrong subcommand"),
        }
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["data-loader", "update-stock-data"]).unwrap();
        assert!(matches!(cli.command, Commands::UpdateStockData { all: false, limit: None }));

        let cli = Cli::try_parse_from(["data-loader", "update-popular-stocks"]).unwrap();
        assert!(matches!(cli.command, Commands::UpdatePopularStocks));
    }

    #[test]
    fn test_log_format_selection() {
        assert!(is_json_format(Some("json")));
        assert!(is_json_format(Some("JSON")));
        assert!(!is_json_format(Some("pretty")));
        assert!(!is_json_format(None));
    }
}
