//! Durable store port trait.
//!
//! The store is an explicit object passed to every operation; implementations
//! acquire a scoped connection per call and release it on every exit path.

use crate::domain::error::FinledgerError;
use crate::domain::row::{FundamentalsRow, PriceRow, Table};
use chrono::NaiveDate;

pub trait StorePort {
    /// Create both relations if absent. Idempotent.
    fn ensure_schema(&self) -> Result<(), FinledgerError>;

    /// Watermark resolver: the most recent persisted date for a ticker.
    ///
    /// `Ok(None)` when the ticker has no rows — absence of data is not an
    /// error; only a connectivity/query fault is.
    fn latest_date(&self, ticker: &str, table: Table)
        -> Result<Option<NaiveDate>, FinledgerError>;

    /// Append price rows in a single operation; returns rows actually written.
    fn append_prices(&self, rows: &[PriceRow]) -> Result<usize, FinledgerError>;

    /// Append fundamentals rows; returns rows actually written.
    fn append_fundamentals(&self, rows: &[FundamentalsRow]) -> Result<usize, FinledgerError>;

    /// Chronologically ordered price rows for a ticker within a date window.
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceRow>, FinledgerError>;

    /// Distinct tickers present in a relation, sorted.
    fn list_tickers(&self, table: Table) -> Result<Vec<String>, FinledgerError>;

    /// (min date, max date, row count) for a ticker, `None` when absent.
    fn data_range(
        &self,
        ticker: &str,
        table: Table,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, FinledgerError>;
}
