//! Column normalizer: maps heterogeneous source labels onto the canonical
//! schema column set.
//!
//! Pure and total — never fails. Known synonyms map to the single canonical
//! name; every other label is lower-cased with spaces replaced by underscores
//! and passes through unchanged (the typed-record constructors drop anything
//! outside the schema later).

use crate::domain::row::RawRow;

/// Canonicalize a single column label.
pub fn canonical_label(label: &str) -> String {
    match label.trim() {
        "Date" => "date".into(),
        "Open" => "open".into(),
        "High" => "high".into(),
        "Low" => "low".into(),
        "Close" => "close".into(),
        "Adj Close" | "Adj_Close" => "adj_close".into(),
        "Volume" => "volume".into(),
        "Ticker" | "Symbol" => "ticker".into(),
        "Market Cap" | "Market_Cap" => "market_cap".into(),
        "P/E Ratio" | "P/E_Ratio" => "pe_ratio".into(),
        "Dividend Yield" | "Dividend_Yield" => "dividend_yield".into(),
        other => other.to_lowercase().replace(' ', "_"),
    }
}

/// Canonicalize every key of a raw row; values are untouched.
pub fn normalize_row(row: &RawRow) -> RawRow {
    row.iter()
        .map(|(k, v)| (canonical_label(k), v.clone()))
        .collect()
}
