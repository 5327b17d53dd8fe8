//! CSV ingestion adapter.
//!
//! The ingestion boundary accepts any tabular file with a date column and some
//! subset of recognized labels. Three file shapes are understood, by name:
//!
//! - `daily_prices.csv` — long format, many tickers, a `Price` column that
//!   maps to `close`;
//! - `history_<TICKER>.csv` — one ticker's OHLCV history, ticker inferred
//!   from the file name;
//! - `fundamentals_<TICKER>.csv` — one ticker's valuation snapshots.
//!
//! Malformed rows (missing or unparseable date) are dropped with a warning,
//! never fatal to the batch.

use crate::domain::error::FinledgerError;
use crate::domain::normalize::normalize_row;
use crate::domain::period::Period;
use crate::domain::row::{FundamentalsRow, PriceRow, RawRow};
use crate::ports::quote_port::QuotePort;
use chrono::Local;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::warn;

/// How a scanned file should be routed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileKind {
    DailyPrices,
    History(String),
    Fundamentals(String),
    PerformanceReport,
    Unknown,
}

/// Classify a file name from the data directory.
pub fn classify(file_name: &str) -> FileKind {
    if !file_name.ends_with(".csv") {
        return FileKind::Unknown;
    }
    let stem = &file_name[..file_name.len() - 4];

    if stem == "daily_prices" {
        FileKind::DailyPrices
    } else if let Some(ticker) = stem.strip_prefix("history_") {
        FileKind::History(ticker.to_string())
    } else if let Some(ticker) = stem.strip_prefix("fundamentals_") {
        FileKind::Fundamentals(ticker.to_string())
    } else if stem.starts_with("performance_") {
        FileKind::PerformanceReport
    } else {
        FileKind::Unknown
    }
}

/// Read a CSV file into raw label→value rows, labels already canonicalized.
pub fn read_normalized_rows(path: &Path) -> Result<Vec<RawRow>, FinledgerError> {
    let file = File::open(path)?;
    let mut rdr = csv::Reader::from_reader(file);

    let headers = rdr
        .headers()
        .map_err(|e| FinledgerError::Validation {
            reason: format!("{}: bad CSV header: {e}", path.display()),
        })?
        .clone();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| FinledgerError::Validation {
            reason: format!("{}: CSV parse error: {e}", path.display()),
        })?;

        let raw: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        rows.push(normalize_row(&raw));
    }

    Ok(rows)
}

/// Load a single-ticker history file into typed price rows.
pub fn load_history_file(path: &Path, ticker: &str) -> Result<Vec<PriceRow>, FinledgerError> {
    let raw_rows = read_normalized_rows(path)?;
    let mut rows = Vec::with_capacity(raw_rows.len());

    for raw in &raw_rows {
        match PriceRow::from_normalized(raw) {
            Ok(mut row) => {
                if row.ticker.is_empty() {
                    row.ticker = ticker.to_string();
                }
                rows.push(row);
            }
            Err(e) => warn!(ticker, file = %path.display(), "row dropped: {e}"),
        }
    }

    rows.sort_by_key(|r| r.date);
    Ok(rows)
}

/// Load a single-ticker fundamentals file.
pub fn load_fundamentals_file(
    path: &Path,
    ticker: &str,
) -> Result<Vec<FundamentalsRow>, FinledgerError> {
    let raw_rows = read_normalized_rows(path)?;
    let mut rows = Vec::with_capacity(raw_rows.len());

    for raw in &raw_rows {
        match FundamentalsRow::from_normalized(raw) {
            Ok(mut row) => {
                if row.ticker.is_empty() {
                    row.ticker = ticker.to_string();
                }
                rows.push(row);
            }
            Err(e) => warn!(ticker, file = %path.display(), "row dropped: {e}"),
        }
    }

    rows.sort_by_key(|r| r.date);
    Ok(rows)
}

/// Load the long-format `daily_prices.csv` and split it per ticker,
/// preserving first-seen ticker order.
///
/// The file carries a generic `Price` column; it maps to `close`.
pub fn load_daily_prices(path: &Path) -> Result<Vec<(String, Vec<PriceRow>)>, FinledgerError> {
    let raw_rows = read_normalized_rows(path)?;
    let mut groups: Vec<(String, Vec<PriceRow>)> = Vec::new();

    for raw in &raw_rows {
        let mut raw = raw.clone();
        if let Some(price) = raw.remove("price") {
            raw.entry("close".to_string()).or_insert(price);
        }

        let Some(ticker) = raw.get("ticker").filter(|t| !t.is_empty()).cloned() else {
            warn!(file = %path.display(), "row dropped: missing ticker column");
            continue;
        };

        match PriceRow::from_normalized(&raw) {
            Ok(row) => match groups.iter_mut().find(|(t, _)| *t == ticker) {
                Some((_, rows)) => rows.push(row),
                None => groups.push((ticker, vec![row])),
            },
            Err(e) => warn!(ticker, file = %path.display(), "row dropped: {e}"),
        }
    }

    for (_, rows) in &mut groups {
        rows.sort_by_key(|r| r.date);
    }
    Ok(groups)
}

/// File-backed price source: serves `history_<TICKER>.csv` files from a base
/// directory through the quote port.
pub struct CsvSource {
    base_dir: PathBuf,
}

impl CsvSource {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    fn history_path(&self, ticker: &str) -> PathBuf {
        self.base_dir.join(format!("history_{ticker}.csv"))
    }
}

impl QuotePort for CsvSource {
    fn get_series(&self, ticker: &str, period: Period) -> Result<Vec<PriceRow>, FinledgerError> {
        let path = self.history_path(ticker);
        let rows =
            load_history_file(&path, ticker).map_err(|e| FinledgerError::SourceUnavailable {
                ticker: ticker.to_string(),
                reason: e.to_string(),
            })?;

        let start = period.start_date(Local::now().date_naive());
        Ok(rows.into_iter().filter(|r| r.date >= start).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn classify_known_shapes() {
        assert_eq!(classify("daily_prices.csv"), FileKind::DailyPrices);
        assert_eq!(
            classify("history_AAPL.csv"),
            FileKind::History("AAPL".into())
        );
        assert_eq!(
            classify("fundamentals_MSFT.csv"),
            FileKind::Fundamentals("MSFT".into())
        );
        assert_eq!(
            classify("performance_1week_2023-01-01.csv"),
            FileKind::PerformanceReport
        );
        assert_eq!(classify("notes.txt"), FileKind::Unknown);
        assert_eq!(classify("prices.csv"), FileKind::Unknown);
    }

    #[test]
    fn history_file_rows_are_typed_and_stamped() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "history_AAPL.csv",
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             2023-01-04,126.89,128.66,125.08,126.36,125.50,89113600\n\
             2023-01-03,130.28,130.90,124.17,125.07,124.22,112117500\n",
        );

        let rows = load_history_file(&path, "AAPL").unwrap();
        assert_eq!(rows.len(), 2);
        // Sorted ascending even though the file was not.
        assert_eq!(rows[0].date, date(2023, 1, 3));
        assert_eq!(rows[0].ticker, "AAPL");
        assert_eq!(rows[0].adj_close, Some(124.22));
        assert_eq!(rows[1].volume, Some(89_113_600));
    }

    #[test]
    fn malformed_rows_are_dropped_not_fatal() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "history_AAPL.csv",
            "Date,Close\n\
             not-a-date,1.0\n\
             2023-01-03,125.07\n",
        );

        let rows = load_history_file(&path, "AAPL").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, date(2023, 1, 3));
    }

    #[test]
    fn daily_prices_maps_price_to_close_and_groups() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "daily_prices.csv",
            "Ticker,Price,Date,Sector\n\
             AAPL,125.07,2023-01-03,Information Technology\n\
             MSFT,227.12,2023-01-03,Information Technology\n\
             AAPL,126.36,2023-01-04,Information Technology\n",
        );

        let groups = load_daily_prices(&path).unwrap();
        assert_eq!(groups.len(), 2);
        // First-seen order preserved.
        assert_eq!(groups[0].0, "AAPL");
        assert_eq!(groups[1].0, "MSFT");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[0].1[0].close, Some(125.07));
        assert_eq!(groups[1].1[0].close, Some(227.12));
    }

    #[test]
    fn daily_prices_rows_without_ticker_are_dropped() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "daily_prices.csv",
            "Price,Date\n125.07,2023-01-03\n",
        );
        let groups = load_daily_prices(&path).unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn fundamentals_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "fundamentals_AAPL.csv",
            "Date,Market Cap,P/E Ratio,Dividend Yield\n\
             2023-01-03,2066000000000,21.4,0.0061\n",
        );

        let rows = load_fundamentals_file(&path, "AAPL").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].ticker, "AAPL");
        assert_eq!(rows[0].pe_ratio, Some(21.4));
    }

    #[test]
    fn csv_source_missing_file_is_source_unavailable() {
        let dir = TempDir::new().unwrap();
        let source = CsvSource::new(dir.path().to_path_buf());
        match source.get_series("XYZ", Period::Year) {
            Err(FinledgerError::SourceUnavailable { ticker, .. }) => assert_eq!(ticker, "XYZ"),
            other => panic!("expected SourceUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn csv_source_serves_recent_window() {
        let dir = TempDir::new().unwrap();
        let today = Local::now().date_naive();
        let recent = today - chrono::Duration::days(2);
        let ancient = date(2000, 1, 1);
        let content = format!(
            "Date,Close\n{},100.0\n{},125.0\n",
            ancient.format("%Y-%m-%d"),
            recent.format("%Y-%m-%d")
        );
        write_file(&dir, "history_AAPL.csv", &content);

        let source = CsvSource::new(dir.path().to_path_buf());
        let rows = source.get_series("AAPL", Period::Month).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].close, Some(125.0));
    }
}
