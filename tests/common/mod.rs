#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use finledger::domain::error::FinledgerError;
use finledger::domain::period::Period;
pub use finledger::domain::row::{FundamentalsRow, PriceRow, Table};
use finledger::ports::quote_port::QuotePort;
use std::collections::HashMap;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn price_row(ticker: &str, d: NaiveDate, close: f64) -> PriceRow {
    PriceRow {
        date: d,
        ticker: ticker.to_string(),
        open: Some(close - 1.0),
        high: Some(close + 1.0),
        low: Some(close - 2.0),
        close: Some(close),
        adj_close: Some(close),
        volume: Some(10_000),
    }
}

/// Consecutive calendar-day rows starting at `start`, closes walking up by 1.
pub fn generate_rows(ticker: &str, start: NaiveDate, count: usize, base: f64) -> Vec<PriceRow> {
    (0..count)
        .map(|i| price_row(ticker, start + Duration::days(i as i64), base + i as f64))
        .collect()
}

pub struct MockQuoteSource {
    pub data: HashMap<String, Vec<PriceRow>>,
    pub errors: HashMap<String, String>,
}

impl MockQuoteSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, ticker: &str, rows: Vec<PriceRow>) -> Self {
        self.data.insert(ticker.to_string(), rows);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl QuotePort for MockQuoteSource {
    fn get_series(&self, ticker: &str, _period: Period) -> Result<Vec<PriceRow>, FinledgerError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(FinledgerError::SourceUnavailable {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(ticker).cloned().unwrap_or_default())
    }
}
