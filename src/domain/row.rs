//! Typed time-series records and the relations that hold them.
//!
//! External input arrives as untyped label→value maps ([`RawRow`]); the column
//! normalizer canonicalizes the labels and the `from_normalized` constructors
//! here are the only place untyped data becomes a typed record. Rows are
//! immutable once persisted; the only mutation the store ever sees is insertion.

use crate::domain::error::FinledgerError;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// One row of external input: column label → string cell, as read from CSV.
pub type RawRow = BTreeMap<String, String>;

/// The two relations managed by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    PriceHistory,
    Fundamentals,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::PriceHistory => "finance_price_history",
            Table::Fundamentals => "finance_fundamentals",
        }
    }

    /// Canonical column set, in schema order.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Table::PriceHistory => &[
                "date",
                "ticker",
                "open",
                "high",
                "low",
                "close",
                "adj_close",
                "volume",
            ],
            Table::Fundamentals => &["date", "ticker", "market_cap", "pe_ratio", "dividend_yield"],
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One instrument's trading data for one calendar date.
///
/// Primary key (`date`, `ticker`). Price fields are `None` when the source did
/// not supply them.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    pub date: NaiveDate,
    pub ticker: String,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
    pub volume: Option<i64>,
}

impl PriceRow {
    /// Build a typed row from a normalized [`RawRow`].
    ///
    /// Unknown columns are dropped (projection onto the schema column set).
    /// A missing `ticker` yields an empty ticker, stamped later by the loader.
    /// A missing or unparseable `date` is a [`FinledgerError::Validation`].
    pub fn from_normalized(row: &RawRow) -> Result<Self, FinledgerError> {
        Ok(Self {
            date: required_date(row)?,
            ticker: row.get("ticker").cloned().unwrap_or_default(),
            open: optional_f64(row, "open"),
            high: optional_f64(row, "high"),
            low: optional_f64(row, "low"),
            close: optional_f64(row, "close"),
            adj_close: optional_f64(row, "adj_close"),
            volume: optional_volume(row),
        })
    }

    /// Price used for analytics: adjusted close when present, else close.
    pub fn effective_price(&self) -> Option<f64> {
        self.adj_close.or(self.close)
    }
}

/// One instrument's derived valuation snapshot for one date.
#[derive(Debug, Clone, PartialEq)]
pub struct FundamentalsRow {
    pub date: NaiveDate,
    pub ticker: String,
    pub market_cap: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub dividend_yield: Option<f64>,
}

impl FundamentalsRow {
    pub fn from_normalized(row: &RawRow) -> Result<Self, FinledgerError> {
        Ok(Self {
            date: required_date(row)?,
            ticker: row.get("ticker").cloned().unwrap_or_default(),
            market_cap: optional_f64(row, "market_cap"),
            pe_ratio: optional_f64(row, "pe_ratio"),
            dividend_yield: optional_f64(row, "dividend_yield"),
        })
    }
}

fn required_date(row: &RawRow) -> Result<NaiveDate, FinledgerError> {
    let cell = row
        .get("date")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| FinledgerError::Validation {
            reason: "missing date column".into(),
        })?;

    // Tolerate datetime cells ("2023-01-01 00:00:00") by keeping the date part.
    let date_part = cell.get(..10).unwrap_or(cell);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|e| FinledgerError::Validation {
        reason: format!("unparseable date {cell:?}: {e}"),
    })
}

fn optional_f64(row: &RawRow, key: &str) -> Option<f64> {
    let cell = row.get(key)?.trim();
    if cell.is_empty() {
        return None;
    }
    match cell.to_lowercase().as_str() {
        "null" | "none" | "nan" | "na" => None,
        _ => cell.parse::<f64>().ok().filter(|v| v.is_finite()),
    }
}

fn optional_volume(row: &RawRow) -> Option<i64> {
    // Sources emit volume as "1234" or "1234.0"; negative values are garbage.
    let v = optional_f64(row, "volume")?;
    if v < 0.0 {
        return None;
    }
    Some(v as i64)
}
