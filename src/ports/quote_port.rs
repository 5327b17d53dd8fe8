//! External price source port trait.

use crate::domain::error::FinledgerError;
use crate::domain::period::Period;
use crate::domain::row::PriceRow;

/// A black-box source of point-in-time OHLCV rows.
///
/// An empty result means "no data", not an error; implementations fail with
/// [`FinledgerError::SourceUnavailable`] only on fetch/parse faults. Retrying
/// is the caller's business — nothing here retries internally.
pub trait QuotePort {
    fn get_series(&self, ticker: &str, period: Period) -> Result<Vec<PriceRow>, FinledgerError>;
}
