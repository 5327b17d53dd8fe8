//! Incremental synchronization of time-series rows into the store.
//!
//! Watermark-based: only rows strictly newer than the most recent persisted
//! date for the (ticker, table) pair are appended. Replaying an overlapping
//! batch never re-inserts or corrupts existing rows.
//!
//! Correctness depends on watermark-then-write being effectively atomic per
//! (ticker, table); concurrent sync calls for the same ticker must be
//! serialized by the caller. Different tickers are independent.

use crate::domain::error::FinledgerError;
use crate::domain::row::{FundamentalsRow, PriceRow, Table};
use crate::ports::store_port::StorePort;
use chrono::NaiveDate;
use tracing::{debug, info};

/// Sync price rows for one ticker; returns the number of rows written.
///
/// Rows at or below the watermark are silently dropped. Rows with an empty
/// ticker are stamped with the caller-supplied one.
pub fn sync_prices(
    store: &dyn StorePort,
    ticker: &str,
    rows: &[PriceRow],
) -> Result<usize, FinledgerError> {
    let watermark = store.latest_date(ticker, Table::PriceHistory)?;
    log_watermark(ticker, Table::PriceHistory, watermark);

    let new_rows: Vec<PriceRow> = rows
        .iter()
        .filter(|r| is_new(r.date, watermark))
        .map(|r| {
            let mut row = r.clone();
            if row.ticker.is_empty() {
                row.ticker = ticker.to_string();
            }
            row
        })
        .collect();

    if new_rows.is_empty() {
        debug!(ticker, "no new price rows past watermark");
        return Ok(0);
    }

    let written = store.append_prices(&new_rows)?;
    info!(ticker, written, "price rows synced");
    Ok(written)
}

/// Sync fundamentals rows for one ticker; same watermark semantics as
/// [`sync_prices`].
pub fn sync_fundamentals(
    store: &dyn StorePort,
    ticker: &str,
    rows: &[FundamentalsRow],
) -> Result<usize, FinledgerError> {
    let watermark = store.latest_date(ticker, Table::Fundamentals)?;
    log_watermark(ticker, Table::Fundamentals, watermark);

    let new_rows: Vec<FundamentalsRow> = rows
        .iter()
        .filter(|r| is_new(r.date, watermark))
        .map(|r| {
            let mut row = r.clone();
            if row.ticker.is_empty() {
                row.ticker = ticker.to_string();
            }
            row
        })
        .collect();

    if new_rows.is_empty() {
        debug!(ticker, "no new fundamentals rows past watermark");
        return Ok(0);
    }

    let written = store.append_fundamentals(&new_rows)?;
    info!(ticker, written, "fundamentals rows synced");
    Ok(written)
}

fn is_new(date: NaiveDate, watermark: Option<NaiveDate>) -> bool {
    match watermark {
        Some(w) => date > w,
        None => true,
    }
}

fn log_watermark(ticker: &str, table: Table, watermark: Option<NaiveDate>) {
    match watermark {
        Some(w) => debug!(ticker, table = table.name(), watermark = %w, "watermark resolved"),
        None => debug!(ticker, table = table.name(), "no watermark, all rows are new"),
    }
}
