//! CLI integration tests: end-to-end command dispatch against real files.
//!
//! Tests cover:
//! - `init` creates the database file and schema
//! - `sync` loads a data directory and is idempotent across runs
//! - `summary` runs against synced data without error
//! - `summary` against a store with no schema fails with the storage exit class
//! - Config errors map to the config exit class

mod common;

use chrono::{Duration, Local};
use common::*;
use finledger::adapters::sqlite_store::SqliteStore;
use finledger::cli::{run, Cli, Command};
use finledger::ports::store_port::StorePort;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tempfile::TempDir;

fn write_config(dir: &Path) -> PathBuf {
    let db_path = dir.join("finance.db");
    let data_dir = dir.join("stock_data");
    fs::create_dir_all(&data_dir).unwrap();

    let config_path = dir.join("finledger.ini");
    fs::write(
        &config_path,
        format!(
            "[sqlite]\npath = {}\npool_size = 1\n\n\
             [sync]\ndata_dir = {}\n\n\
             [watchlist]\ntickers = AAPL\nbenchmarks = SPY\n\n\
             [summary]\nbenchmark = SPY\n",
            db_path.display(),
            data_dir.display()
        ),
    )
    .unwrap();
    config_path
}

fn assert_success(code: ExitCode) {
    assert_eq!(format!("{code:?}"), format!("{:?}", ExitCode::SUCCESS));
}

fn seed_history_files(dir: &Path) {
    // Recent dates so the summary lookback window covers them.
    let today = Local::now().date_naive();
    for (ticker, base) in [("AAPL", 100.0), ("SPY", 380.0)] {
        let mut content = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
        for i in (1..=5).rev() {
            let d = today - Duration::days(i);
            let close = base + i as f64;
            content.push_str(&format!(
                "{},{},{},{},{close},{close},1000\n",
                d.format("%Y-%m-%d"),
                close - 1.0,
                close + 1.0,
                close - 2.0,
            ));
        }
        fs::write(
            dir.join("stock_data").join(format!("history_{ticker}.csv")),
            content,
        )
        .unwrap();
    }
}

#[test]
fn init_creates_schema_on_disk() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());

    assert_success(run(Cli {
        verbose: false,
        command: Command::Init {
            config: config.clone(),
        },
    }));

    assert!(dir.path().join("finance.db").exists());

    // Schema is queryable and empty.
    let store = SqliteStore::open(dir.path().join("finance.db").to_str().unwrap(), 1).unwrap();
    assert_eq!(store.list_tickers(Table::PriceHistory).unwrap().len(), 0);
}

#[test]
fn sync_loads_data_dir_and_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    seed_history_files(dir.path());

    assert_success(run(Cli {
        verbose: false,
        command: Command::Sync {
            config: config.clone(),
            data_dir: None,
        },
    }));

    let db = dir.path().join("finance.db");
    let store = SqliteStore::open(db.to_str().unwrap(), 1).unwrap();
    let range = store.data_range("AAPL", Table::PriceHistory).unwrap();
    assert_eq!(range.map(|(_, _, count)| count), Some(5));
    drop(store);

    // Second run over the same files writes nothing new.
    assert_success(run(Cli {
        verbose: false,
        command: Command::Sync {
            config,
            data_dir: None,
        },
    }));

    let store = SqliteStore::open(db.to_str().unwrap(), 1).unwrap();
    let range = store.data_range("AAPL", Table::PriceHistory).unwrap();
    assert_eq!(range.map(|(_, _, count)| count), Some(5));
}

#[test]
fn summary_runs_against_synced_store() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    seed_history_files(dir.path());

    assert_success(run(Cli {
        verbose: false,
        command: Command::Sync {
            config: config.clone(),
            data_dir: None,
        },
    }));

    assert_success(run(Cli {
        verbose: false,
        command: Command::Summary {
            config,
            period: "1m".into(),
            benchmark: None,
            tickers: None,
        },
    }));
}

#[test]
fn summary_without_schema_surfaces_storage_fault() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());

    // No init, no sync: the database has no tables. The summary must fail
    // with the storage exit class, not report an empty result.
    let code = run(Cli {
        verbose: false,
        command: Command::Summary {
            config,
            period: "1m".into(),
            benchmark: None,
            tickers: None,
        },
    });
    assert_eq!(format!("{code:?}"), format!("{:?}", ExitCode::from(3)));
}

#[test]
fn fetch_pulls_from_source_dir() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());
    seed_history_files(dir.path());

    assert_success(run(Cli {
        verbose: false,
        command: Command::Fetch {
            config: config.clone(),
            tickers: "AAPL".into(),
            period: "1y".into(),
        },
    }));

    let store =
        SqliteStore::open(dir.path().join("finance.db").to_str().unwrap(), 1).unwrap();
    let range = store.data_range("AAPL", Table::PriceHistory).unwrap();
    assert_eq!(range.map(|(_, _, count)| count), Some(5));
}

#[test]
fn missing_config_file_maps_to_config_exit_class() {
    let code = run(Cli {
        verbose: false,
        command: Command::Init {
            config: PathBuf::from("/nonexistent/finledger.ini"),
        },
    });
    assert_eq!(format!("{code:?}"), format!("{:?}", ExitCode::from(2)));
}

#[test]
fn info_for_unknown_ticker_fails_with_no_data() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path());

    assert_success(run(Cli {
        verbose: false,
        command: Command::Init {
            config: config.clone(),
        },
    }));

    let code = run(Cli {
        verbose: false,
        command: Command::Info {
            config,
            ticker: Some("GHOST".into()),
        },
    });
    assert_eq!(format!("{code:?}"), format!("{:?}", ExitCode::from(5)));
}
