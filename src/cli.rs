//! CLI definition and dispatch.

use chrono::Local;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_ingest::{self, CsvSource, FileKind};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::sqlite_store::SqliteStore;
use crate::domain::error::FinledgerError;
use crate::domain::performance::{summarize, PerformanceRecord, PriceSeries};
use crate::domain::period::Period;
use crate::domain::row::Table;
use crate::domain::sync::{sync_fundamentals, sync_prices};
use crate::domain::watchlist::parse_tickers;
use crate::ports::quote_port::QuotePort;
use crate::ports::store_port::StorePort;

#[derive(Parser, Debug)]
#[command(name = "finledger", about = "Daily price ledger and performance tracker")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database schema if absent
    Init {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Scan the data directory and load new rows into the store
    Sync {
        #[arg(short, long)]
        config: PathBuf,
        /// Override [sync] data_dir
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Fetch ticker series from the configured source and sync them
    Fetch {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated ticker list
        #[arg(long)]
        tickers: String,
        #[arg(long, default_value = "1y")]
        period: String,
    },
    /// Print a ranked performance summary for the watchlist
    Summary {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long, default_value = "1m")]
        period: String,
        /// Override [summary] benchmark
        #[arg(long)]
        benchmark: Option<String>,
        /// Override [watchlist] tickers
        #[arg(long)]
        tickers: Option<String>,
    },
    /// Show the stored date range for a ticker, or for all tickers
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        ticker: Option<String>,
    },
    /// List tickers present in the price-history relation
    ListTickers {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Init { config } => run_init(&config),
        Command::Sync { config, data_dir } => run_sync(&config, data_dir.as_deref()),
        Command::Fetch {
            config,
            tickers,
            period,
        } => run_fetch(&config, &tickers, &period),
        Command::Summary {
            config,
            period,
            benchmark,
            tickers,
        } => run_summary(&config, &period, benchmark.as_deref(), tickers.as_deref()),
        Command::Info { config, ticker } => run_info(&config, ticker.as_deref()),
        Command::ListTickers { config } => run_list_tickers(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "finledger=debug"
    } else {
        "finledger=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_period(s: &str) -> Result<Period, FinledgerError> {
    s.parse().map_err(|reason| FinledgerError::ConfigInvalid {
        section: "summary".into(),
        key: "period".into(),
        reason,
    })
}

fn parse_ticker_list(s: &str) -> Result<Vec<String>, FinledgerError> {
    parse_tickers(s).map_err(|e| FinledgerError::ConfigInvalid {
        section: "watchlist".into(),
        key: "tickers".into(),
        reason: e.to_string(),
    })
}

fn data_dir(config: &FileConfigAdapter, override_dir: Option<&Path>) -> PathBuf {
    match override_dir {
        Some(d) => d.to_path_buf(),
        None => config.data_dir(),
    }
}

fn run_init(config_path: &Path) -> Result<(), FinledgerError> {
    let config = FileConfigAdapter::from_file(config_path)?;
    let store = SqliteStore::from_config(&config)?;
    store.ensure_schema()?;

    println!("Schema ensured in {}", config.sqlite_path()?);
    Ok(())
}

fn run_sync(config_path: &Path, data_dir_override: Option<&Path>) -> Result<(), FinledgerError> {
    let config = FileConfigAdapter::from_file(config_path)?;
    let store = SqliteStore::from_config(&config)?;
    store.ensure_schema()?;

    let dir = data_dir(&config, data_dir_override);
    info!(dir = %dir.display(), "scanning data directory");

    let mut paths: Vec<PathBuf> = fs::read_dir(&dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .collect();
    paths.sort();

    let mut total = 0usize;
    for path in paths {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        match csv_ingest::classify(name) {
            FileKind::DailyPrices => {
                for (ticker, rows) in csv_ingest::load_daily_prices(&path)? {
                    total += sync_prices(&store, &ticker, &rows)?;
                }
            }
            FileKind::History(ticker) => {
                let rows = csv_ingest::load_history_file(&path, &ticker)?;
                total += sync_prices(&store, &ticker, &rows)?;
            }
            FileKind::Fundamentals(ticker) => {
                let rows = csv_ingest::load_fundamentals_file(&path, &ticker)?;
                total += sync_fundamentals(&store, &ticker, &rows)?;
            }
            FileKind::PerformanceReport => {
                debug!(file = name, "performance report skipped")
            }
            FileKind::Unknown => debug!(file = name, "unrecognized file skipped"),
        }
    }

    println!("Synced {total} new rows from {}", dir.display());
    Ok(())
}

fn run_fetch(config_path: &Path, tickers: &str, period_arg: &str) -> Result<(), FinledgerError> {
    let config = FileConfigAdapter::from_file(config_path)?;
    let store = SqliteStore::from_config(&config)?;
    store.ensure_schema()?;

    let period = parse_period(period_arg)?;
    let tickers = parse_ticker_list(tickers)?;
    let source = CsvSource::new(data_dir(&config, None));

    let mut total = 0usize;
    for ticker in &tickers {
        match source.get_series(ticker, period) {
            Ok(rows) if rows.is_empty() => info!(ticker = %ticker, "source returned no data"),
            Ok(rows) => total += sync_prices(&store, ticker, &rows)?,
            // Retryable by the operator; one bad instrument never aborts the rest.
            Err(e) => warn!(ticker = %ticker, "fetch failed, instrument skipped: {e}"),
        }
    }

    println!(
        "Fetched and synced {total} new rows across {} tickers",
        tickers.len()
    );
    Ok(())
}

fn run_summary(
    config_path: &Path,
    period_arg: &str,
    benchmark_override: Option<&str>,
    tickers_override: Option<&str>,
) -> Result<(), FinledgerError> {
    let config = FileConfigAdapter::from_file(config_path)?;
    let store = SqliteStore::from_config(&config)?;
    let period = parse_period(period_arg)?;

    let benchmark = benchmark_override
        .map(str::to_string)
        .unwrap_or_else(|| config.benchmark());

    let mut tickers = match tickers_override {
        Some(list) => parse_ticker_list(list)?,
        None => {
            let mut tickers = parse_ticker_list(&config.watchlist_tickers()?)?;
            if let Some(benchmarks) = config.watchlist_benchmarks() {
                for b in parse_ticker_list(&benchmarks)? {
                    if !tickers.contains(&b) {
                        tickers.push(b);
                    }
                }
            }
            tickers
        }
    };
    if !tickers.contains(&benchmark) {
        tickers.push(benchmark.clone());
    }

    let today = Local::now().date_naive();
    let start = period.start_date(today);

    let series = collect_series(&store, &tickers, start, today)?;
    let records = summarize(&series, &benchmark);
    if records.is_empty() {
        println!(
            "No instruments with enough data for a {} summary",
            period.label()
        );
        return Ok(());
    }

    print_summary(&records, &benchmark, period);
    Ok(())
}

/// Fetch each ticker's series from the store. Missing or thin data excludes
/// only that instrument; a storage fault aborts the whole summary.
fn collect_series(
    store: &dyn StorePort,
    tickers: &[String],
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
) -> Result<Vec<PriceSeries>, FinledgerError> {
    let mut series = Vec::new();
    for ticker in tickers {
        match store.fetch_prices(ticker, start, end) {
            Ok(rows) => {
                let prices: Vec<f64> = rows.iter().filter_map(|r| r.effective_price()).collect();
                if prices.len() < 2 {
                    debug!(ticker = %ticker, observations = prices.len(), "not enough data");
                }
                series.push(PriceSeries::new(ticker.clone(), prices));
            }
            Err(
                e @ (FinledgerError::SourceUnavailable { .. } | FinledgerError::NoData { .. }),
            ) => {
                warn!(ticker = %ticker, "instrument skipped: {e}");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(series)
}

fn print_summary(records: &[PerformanceRecord], benchmark: &str, period: Period) {
    println!(
        "Performance summary ({}), benchmark {benchmark}",
        period.label()
    );
    println!(
        "{:<8} {:>9} {:>10} {:>8} {:>8} {:>9} {:>10} {:>9}",
        "Ticker", "Total %", "Annual %", "Vol %", "Sharpe", "MaxDD %", "Price", "vs BM"
    );
    for r in records {
        let vs = r
            .vs_benchmark_pct
            .map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
        println!(
            "{:<8} {:>9.2} {:>10.2} {:>8.2} {:>8.2} {:>9.2} {:>10.2} {:>9}",
            r.ticker,
            r.total_return_pct,
            r.annualized_return_pct,
            r.volatility_pct,
            r.sharpe_ratio,
            r.max_drawdown_pct,
            r.current_price,
            vs
        );
    }

    let winners = records.iter().filter(|r| r.total_return_pct > 0.0).count();
    let losers = records.iter().filter(|r| r.total_return_pct < 0.0).count();
    println!();
    println!("Breadth: {winners} winners, {losers} losers");
    if let (Some(best), Some(worst)) = (records.first(), records.last()) {
        println!(
            "Best: {} ({:+.2}%)  Worst: {} ({:+.2}%)",
            best.ticker, best.total_return_pct, worst.ticker, worst.total_return_pct
        );
    }
}

fn run_info(config_path: &Path, ticker: Option<&str>) -> Result<(), FinledgerError> {
    let config = FileConfigAdapter::from_file(config_path)?;
    let store = SqliteStore::from_config(&config)?;

    let tickers = match ticker {
        Some(t) => vec![t.to_uppercase()],
        None => store.list_tickers(Table::PriceHistory)?,
    };
    if tickers.is_empty() {
        println!("Store is empty");
        return Ok(());
    }

    for t in &tickers {
        match store.data_range(t, Table::PriceHistory)? {
            Some((min, max, count)) => println!("{t}: {count} rows from {min} to {max}"),
            None => {
                return Err(FinledgerError::NoData {
                    ticker: t.clone(),
                    table: Table::PriceHistory.name().to_string(),
                })
            }
        }
    }
    Ok(())
}

fn run_list_tickers(config_path: &Path) -> Result<(), FinledgerError> {
    let config = FileConfigAdapter::from_file(config_path)?;
    let store = SqliteStore::from_config(&config)?;

    for ticker in store.list_tickers(Table::PriceHistory)? {
        println!("{ticker}");
    }
    Ok(())
}
