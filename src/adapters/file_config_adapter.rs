//! INI file configuration adapter.
//!
//! Wraps `configparser` behind the config port and adds typed accessors for
//! the sections finledger reads: `[sqlite]`, `[sync]`, `[watchlist]` and
//! `[summary]`. Values are trimmed; an empty value counts as absent.

use crate::domain::error::FinledgerError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::{Path, PathBuf};

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file(path: &Path) -> Result<Self, FinledgerError> {
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| FinledgerError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    /// `[sqlite] path` — required.
    pub fn sqlite_path(&self) -> Result<String, FinledgerError> {
        self.get_string("sqlite", "path")
            .ok_or_else(|| FinledgerError::ConfigMissing {
                section: "sqlite".into(),
                key: "path".into(),
            })
    }

    /// `[sync] data_dir`, defaulting to `stock_data`.
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(
            self.get_string("sync", "data_dir")
                .unwrap_or_else(|| "stock_data".to_string()),
        )
    }

    /// `[watchlist] tickers` — required for watchlist-driven commands.
    pub fn watchlist_tickers(&self) -> Result<String, FinledgerError> {
        self.get_string("watchlist", "tickers")
            .ok_or_else(|| FinledgerError::ConfigMissing {
                section: "watchlist".into(),
                key: "tickers".into(),
            })
    }

    /// `[watchlist] benchmarks` — optional extras appended to the watchlist.
    pub fn watchlist_benchmarks(&self) -> Option<String> {
        self.get_string("watchlist", "benchmarks")
    }

    /// `[summary] benchmark`, defaulting to SPY.
    pub fn benchmark(&self) -> String {
        self.get_string("summary", "benchmark")
            .unwrap_or_else(|| "SPY".to_string())
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.get_string(section, key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.get_string(section, key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        match self
            .get_string(section, key)
            .map(|v| v.to_lowercase())
            .as_deref()
        {
            Some("true" | "yes" | "on" | "1") => true,
            Some("false" | "no" | "off" | "0") => false,
            _ => default,
        }
    }
}
