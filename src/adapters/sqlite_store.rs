//! SQLite store adapter.
//!
//! Owns the table definitions and connection lifecycle for the two relations.
//! Connections are checked out of an r2d2 pool per operation and returned on
//! every exit path. Dates are persisted as ISO-8601 `YYYY-MM-DD` strings.

use crate::domain::error::FinledgerError;
use crate::domain::row::{FundamentalsRow, PriceRow, Table};
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::StorePort;
use chrono::NaiveDate;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use tracing::warn;

pub struct SqliteStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStore {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, FinledgerError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| FinledgerError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4) as u32;
        Self::open(&db_path, pool_size)
    }

    pub fn open(db_path: &str, pool_size: u32) -> Result<Self, FinledgerError> {
        let manager = SqliteConnectionManager::file(db_path);
        let pool =
            Pool::builder()
                .max_size(pool_size)
                .build(manager)
                .map_err(|e: r2d2::Error| FinledgerError::Database {
                    reason: e.to_string(),
                })?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, FinledgerError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| FinledgerError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    fn conn(
        &self,
    ) -> Result<r2d2::PooledConnection<SqliteConnectionManager>, FinledgerError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| FinledgerError::Database {
                reason: e.to_string(),
            })
    }
}

fn query_err(e: rusqlite::Error) -> FinledgerError {
    FinledgerError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn parse_stored_date(s: &str, table: Table) -> Result<NaiveDate, FinledgerError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e: chrono::ParseError| {
        FinledgerError::Integrity {
            table: table.name().to_string(),
            reason: format!("unparseable stored date {s:?}: {e}"),
        }
    })
}

fn date_str(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

impl StorePort for SqliteStore {
    fn ensure_schema(&self) -> Result<(), FinledgerError> {
        let conn = self.conn()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS finance_price_history (
                date TEXT NOT NULL,
                ticker TEXT NOT NULL,
                open REAL,
                high REAL,
                low REAL,
                close REAL,
                adj_close REAL,
                volume INTEGER,
                PRIMARY KEY (date, ticker)
            );
            CREATE TABLE IF NOT EXISTS finance_fundamentals (
                date TEXT NOT NULL,
                ticker TEXT NOT NULL,
                market_cap REAL,
                pe_ratio REAL,
                dividend_yield REAL,
                PRIMARY KEY (date, ticker)
            );",
        )
        .map_err(query_err)?;

        Ok(())
    }

    fn latest_date(
        &self,
        ticker: &str,
        table: Table,
    ) -> Result<Option<NaiveDate>, FinledgerError> {
        let conn = self.conn()?;

        let query = format!("SELECT MAX(date) FROM {} WHERE ticker = ?1", table.name());
        let max: Option<String> = conn
            .query_row(&query, params![ticker], |row| row.get(0))
            .map_err(query_err)?;

        match max {
            Some(s) => Ok(Some(parse_stored_date(&s, table)?)),
            None => Ok(None),
        }
    }

    /// Best-effort row-by-row append: a primary-key conflict on an individual
    /// row is logged and skipped, the rest of the batch commits. Any other
    /// fault rolls the whole transaction back.
    fn append_prices(&self, rows: &[PriceRow]) -> Result<usize, FinledgerError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;
        let mut written = 0usize;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO finance_price_history
                     (date, ticker, open, high, low, close, adj_close, volume)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )
                .map_err(query_err)?;

            for row in rows {
                let result = stmt.execute(params![
                    date_str(row.date),
                    row.ticker,
                    row.open,
                    row.high,
                    row.low,
                    row.close,
                    row.adj_close,
                    row.volume
                ]);
                match result {
                    Ok(_) => written += 1,
                    Err(e) if is_constraint_violation(&e) => {
                        warn!(
                            ticker = %row.ticker,
                            date = %row.date,
                            "integrity conflict, row skipped: {e}"
                        );
                    }
                    Err(e) => return Err(query_err(e)),
                }
            }
        }

        tx.commit().map_err(query_err)?;
        Ok(written)
    }

    fn append_fundamentals(&self, rows: &[FundamentalsRow]) -> Result<usize, FinledgerError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;
        let mut written = 0usize;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO finance_fundamentals
                     (date, ticker, market_cap, pe_ratio, dividend_yield)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(query_err)?;

            for row in rows {
                let result = stmt.execute(params![
                    date_str(row.date),
                    row.ticker,
                    row.market_cap,
                    row.pe_ratio,
                    row.dividend_yield
                ]);
                match result {
                    Ok(_) => written += 1,
                    Err(e) if is_constraint_violation(&e) => {
                        warn!(
                            ticker = %row.ticker,
                            date = %row.date,
                            "integrity conflict, row skipped: {e}"
                        );
                    }
                    Err(e) => return Err(query_err(e)),
                }
            }
        }

        tx.commit().map_err(query_err)?;
        Ok(written)
    }

    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<PriceRow>, FinledgerError> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare(
                "SELECT date, ticker, open, high, low, close, adj_close, volume
                 FROM finance_price_history
                 WHERE ticker = ?1 AND date >= ?2 AND date <= ?3
                 ORDER BY date ASC",
            )
            .map_err(query_err)?;

        let mapped = stmt
            .query_map(
                params![ticker, date_str(start_date), date_str(end_date)],
                |row| {
                    let date_cell: String = row.get(0)?;
                    let date = NaiveDate::parse_from_str(&date_cell, "%Y-%m-%d").map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            date_cell.len(),
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?;
                    Ok(PriceRow {
                        date,
                        ticker: row.get(1)?,
                        open: row.get(2)?,
                        high: row.get(3)?,
                        low: row.get(4)?,
                        close: row.get(5)?,
                        adj_close: row.get(6)?,
                        volume: row.get(7)?,
                    })
                },
            )
            .map_err(query_err)?;

        let mut rows = Vec::new();
        for row in mapped {
            rows.push(row.map_err(query_err)?);
        }

        Ok(rows)
    }

    fn list_tickers(&self, table: Table) -> Result<Vec<String>, FinledgerError> {
        let conn = self.conn()?;

        let query = format!("SELECT DISTINCT ticker FROM {} ORDER BY ticker", table.name());
        let mut stmt = conn.prepare(&query).map_err(query_err)?;

        let mapped = stmt
            .query_map([], |row| row.get(0))
            .map_err(query_err)?;

        let mut tickers = Vec::new();
        for ticker in mapped {
            tickers.push(ticker.map_err(query_err)?);
        }

        Ok(tickers)
    }

    fn data_range(
        &self,
        ticker: &str,
        table: Table,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, FinledgerError> {
        let conn = self.conn()?;

        let query = format!(
            "SELECT MIN(date), MAX(date), COUNT(*) FROM {} WHERE ticker = ?1",
            table.name()
        );

        let result: (Option<String>, Option<String>, i64) = conn
            .query_row(&query, params![ticker], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })
            .map_err(query_err)?;

        match result {
            (Some(min_str), Some(max_str), count) if count > 0 => {
                let min = parse_stored_date(&min_str, table)?;
                let max = parse_stored_date(&max_str, table)?;
                Ok(Some((min, max, count as usize)))
            }
            _ => Ok(None),
        }
    }
}
