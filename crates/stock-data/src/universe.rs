//! Built-in ticker lists.

/// Companies featured on the home page, with display names used before
/// anything has been cached.
pub const POPULAR_COMPANIES: &[(&str, &str)] = &[
    ("AAPL", "Apple Inc."),
    ("MSFT", "Microsoft Corporation"),
    ("GOOGL", "Alphabet Inc."),
    ("AMZN", "Amazon.com, Inc."),
    ("META", "Meta Platforms, Inc."),
    ("TSLA", "Tesla, Inc."),
    ("NVDA", "NVIDIA Corporation"),
    ("JPM", "JPMorgan Chase & Co."),
    ("V", "Visa Inc."),
    ("JNJ", "Johnson & Johnson"),
];

/// Fallback search universe: large US listings across sectors.
pub const UNIVERSE: &[&str] = &[
    // Technology
    "AAPL", "MSFT", "GOOGL", "GOOG", "NVDA", "META", "AVGO", "TSM", "ORCL", "CRM", "AMD",
    "ADBE", "INTC", "CSCO", "QCOM", "TXN", "NOW", "IBM", "AMAT", "MU", "SNPS",
    // Healthcare
    "JNJ", "UNH", "PFE", "ABBV", "MRK", "LLY", "TMO", "ABT", "DHR", "BMY",
    "AMGN", "GILD", "MDT", "ISRG", "VRTX",
    // Financials
    "JPM", "BAC", "GS", "V", "MA", "BRK-B", "WFC", "MS", "AXP", "SCHW",
    "BLK", "C", "CB", "MMC", "ICE",
    // Energy
    "XOM", "CVX", "COP", "SLB", "EOG", "MPC", "PSX", "VLO", "OXY", "HAL",
    // Consumer discretionary
    "AMZN", "TSLA", "HD", "NKE", "SBUX", "MCD", "LOW", "TJX", "BKNG", "CMG",
    "ORLY", "ROST", "DHI", "LEN", "GM",
    // Industrials
    "CAT", "BA", "HON", "UPS", "GE", "RTX", "DE", "LMT", "UNP", "ETN",
    "WM", "EMR", "ITW", "FDX", "NSC",
    // Utilities
    "NEE", "DUK", "SO", "AEP", "D", "SRE", "EXC", "XEL",
    // Materials
    "LIN", "APD", "ECL", "SHW", "NEM", "FCX", "DOW", "NUE",
    // Real estate
    "AMT", "PLD", "CCI", "EQIX", "SPG", "PSA", "O", "DLR",
    // Communications
    "NFLX", "DIS", "CMCSA", "T", "VZ", "TMUS", "CHTR", "EA", "TTWO", "WBD",
    // Consumer staples
    "PG", "KO", "PEP", "COST", "WMT", "PM", "MO", "CL", "KHC", "GIS",
    // Mid caps
    "SQ", "SHOP", "SNAP", "ROKU", "DKNG", "COIN", "PLTR", "CRWD",
    "PANW", "ZS", "NET", "DDOG", "SNOW", "MELI", "SE", "UBER",
];

/// Display name for a popular ticker, if it has one.
pub fn popular_name(ticker: &str) -> Option<&'static str> {
    POPULAR_COMPANIES
        .iter()
        .find(|(t, _)| *t == ticker)
        .map(|(_, name)| *name)
}

/// Universe tickers containing `query`, case-insensitively, in list order
/// and without duplicates.
pub fn matching_tickers(query: &str, limit: usize) -> Vec<&'static str> {
    let needle = query.to_lowercase();
    let mut out: Vec<&'static str> = Vec::new();
    for ticker in UNIVERSE {
        if out.len() >= limit {
            break;
        }
        if ticker.to_lowercase().contains(&needle) && !out.contains(ticker) {
            out.push(*ticker);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_tickers() {
        let hits = matching_tickers("goog", 10);
        assert_eq!(hits, vec!["GOOGL", "GOOG"]);

        assert_eq!(matching_tickers("a", 3).len(), 3);
        assert!(matching_tickers("zzzz", 10).is_empty());
    }

    #[test]
    fn test_no_duplicates() {
        // AAPL appears only once even though it matches
        assert_eq!(matching_tickers("aapl", 10), vec!["AAPL"]);
    }

    #[test]
    fn test_popular_name() {
        assert_eq!(popular_name("NVDA"), Some("NVIDIA Corporation"));
        assert_eq!(popular_name("XYZ"), None);
    }
}
