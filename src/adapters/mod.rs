//! Concrete adapter implementations for ports.

pub mod csv_ingest;
pub mod file_config_adapter;
pub mod sqlite_store;
