//! Watchlist parsing: comma-separated ticker lists from configuration.

use std::collections::HashSet;

#[derive(Debug, Clone, thiserror::Error)]
pub enum WatchlistError {
    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),
}

/// Parse a comma-separated ticker list.
///
/// Tickers are upper-cased and class-share dots become hyphens (BRK.B →
/// BRK-B), matching the quote-source symbol convention. Duplicates after
/// normalization are rejected.
pub fn parse_tickers(input: &str) -> Result<Vec<String>, WatchlistError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(WatchlistError::EmptyToken);
        }
        let ticker = trimmed.to_uppercase().replace('.', "-");
        if seen.contains(&ticker) {
            return Err(WatchlistError::DuplicateTicker(ticker));
        }
        seen.insert(ticker.clone());
        tickers.push(ticker);
    }

    Ok(tickers)
}
