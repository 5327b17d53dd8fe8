//! Reporting-period presets for lookback windows.

use chrono::{Datelike, Duration, Months, NaiveDate};
use std::str::FromStr;

/// Lookback window presets matching the daily report timeframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Week,
    Month,
    ThreeMonths,
    YearToDate,
    Year,
}

impl Period {
    /// First date of the window ending at `today`.
    pub fn start_date(&self, today: NaiveDate) -> NaiveDate {
        match self {
            Period::Week => today - Duration::days(7),
            Period::Month => today - Months::new(1),
            Period::ThreeMonths => today - Months::new(3),
            Period::YearToDate => NaiveDate::from_ymd_opt(today.year(), 1, 1)
                .unwrap_or(today),
            Period::Year => today - Months::new(12),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Period::Week => "1week",
            Period::Month => "1month",
            Period::ThreeMonths => "3month",
            Period::YearToDate => "ytd",
            Period::Year => "1year",
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1w" | "1week" | "5d" => Ok(Period::Week),
            "1m" | "1mo" | "1month" => Ok(Period::Month),
            "3m" | "3mo" | "3month" => Ok(Period::ThreeMonths),
            "ytd" => Ok(Period::YearToDate),
            "1y" | "1year" => Ok(Period::Year),
            other => Err(format!(
                "unknown period {other:?} (expected 1w, 1m, 3m, ytd or 1y)"
            )),
        }
    }
}
