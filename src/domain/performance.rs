//! Performance analytics engine.
//!
//! Computes the standard metric set for a reporting period from a price
//! series: total and annualized return, annualized volatility, Sharpe ratio
//! (zero risk-free rate), maximum drawdown, and benchmark-relative return.

use std::cmp::Ordering;

/// Fixed annualization constant. Deliberately not derived from the actual
/// calendar span, so numeric outputs stay reproducible.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// A chronologically ordered, gap-free price series for one instrument.
///
/// The caller is responsible for ordering and filling; at least 2 observations
/// are needed for an instrument to appear in the summary.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    pub ticker: String,
    pub prices: Vec<f64>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, prices: Vec<f64>) -> Self {
        Self {
            ticker: ticker.into(),
            prices,
        }
    }
}

/// One instrument's computed metrics. Percentages and the Sharpe ratio are
/// rounded to 2 decimals for presentation; intermediate math is full precision.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceRecord {
    pub ticker: String,
    pub total_return_pct: f64,
    pub annualized_return_pct: f64,
    pub volatility_pct: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown_pct: f64,
    pub current_price: f64,
    /// Present only when the benchmark's own record was computed; the
    /// benchmark itself carries `Some(0.0)`.
    pub vs_benchmark_pct: Option<f64>,
}

/// Compute the metric set for every instrument with at least 2 observations.
///
/// Output is sorted by descending total return; ties keep input order.
/// Instruments with too little data are skipped, never an error.
pub fn summarize(series: &[PriceSeries], benchmark_ticker: &str) -> Vec<PerformanceRecord> {
    struct Computed {
        record: PerformanceRecord,
        exact_total: f64,
    }

    let mut computed: Vec<Computed> = Vec::with_capacity(series.len());

    for s in series {
        let Some((record, exact_total)) = compute_one(&s.ticker, &s.prices) else {
            continue;
        };
        computed.push(Computed {
            record,
            exact_total,
        });
    }

    let benchmark_total = computed
        .iter()
        .find(|c| c.record.ticker == benchmark_ticker)
        .map(|c| c.exact_total);

    let mut records: Vec<PerformanceRecord> = computed
        .into_iter()
        .map(|c| {
            let vs_benchmark_pct = benchmark_total.map(|bench_total| {
                if c.record.ticker == benchmark_ticker {
                    0.0
                } else {
                    round2(c.exact_total - bench_total)
                }
            });
            PerformanceRecord {
                vs_benchmark_pct,
                ..c.record
            }
        })
        .collect();

    // Stable sort: equal returns preserve input iteration order.
    records.sort_by(|a, b| {
        b.total_return_pct
            .partial_cmp(&a.total_return_pct)
            .unwrap_or(Ordering::Equal)
    });

    records
}

/// Metrics for a single series, or `None` when there are fewer than 2 prices.
/// Returns the rounded record together with the full-precision total return.
fn compute_one(ticker: &str, prices: &[f64]) -> Option<(PerformanceRecord, f64)> {
    if prices.len() < 2 {
        return None;
    }

    let n = prices.len();
    let first = prices[0];
    let last = prices[n - 1];
    if first <= 0.0 {
        return None;
    }

    let total_return_pct = (last / first - 1.0) * 100.0;

    let daily_returns: Vec<f64> = prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect();

    let years = n as f64 / TRADING_DAYS_PER_YEAR;
    let annualized_return_pct = if years > 0.0 {
        ((1.0 + total_return_pct / 100.0).powf(1.0 / years) - 1.0) * 100.0
    } else {
        0.0
    };

    let volatility_pct = stddev(&daily_returns) * TRADING_DAYS_PER_YEAR.sqrt() * 100.0;

    let sharpe_ratio = if volatility_pct > 0.0 {
        annualized_return_pct / volatility_pct
    } else {
        0.0
    };

    let max_drawdown_pct = max_drawdown(&daily_returns);

    let record = PerformanceRecord {
        ticker: ticker.to_string(),
        total_return_pct: round2(total_return_pct),
        annualized_return_pct: round2(annualized_return_pct),
        volatility_pct: round2(volatility_pct),
        sharpe_ratio: round2(sharpe_ratio),
        max_drawdown_pct: round2(max_drawdown_pct),
        current_price: round2(last),
        vs_benchmark_pct: None,
    };

    Some((record, total_return_pct))
}

/// Sample standard deviation (ddof = 1), matching the original report's
/// statistics. Zero when fewer than 2 returns.
fn stddev(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

/// Deepest percentage decline of the cumulative-return curve from its running
/// peak. Zero or negative; zero when the curve never dips below a prior peak.
fn max_drawdown(daily_returns: &[f64]) -> f64 {
    let mut cum = 1.0_f64;
    let mut running_max = f64::MIN;
    let mut worst = 0.0_f64;

    for r in daily_returns {
        cum *= 1.0 + r;
        if cum > running_max {
            running_max = cum;
        }
        let dd = (cum - running_max) / running_max * 100.0;
        if dd < worst {
            worst = dd;
        }
    }

    worst
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
