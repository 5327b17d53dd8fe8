//! Port traits at the seams of the application.

pub mod config_port;
pub mod quote_port;
pub mod store_port;
