//! Core domain types and logic.

pub mod error;
pub mod normalize;
pub mod performance;
pub mod period;
pub mod row;
pub mod sync;
pub mod watchlist;
