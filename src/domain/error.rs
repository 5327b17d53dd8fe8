//! Domain error types.

/// Top-level error type for finledger.
#[derive(Debug, thiserror::Error)]
pub enum FinledgerError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("integrity conflict in {table}: {reason}")]
    Integrity { table: String, reason: String },

    #[error("invalid row: {reason}")]
    Validation { reason: String },

    #[error("price source unavailable for {ticker}: {reason}")]
    SourceUnavailable { ticker: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no data for {ticker} in {table}")]
    NoData { ticker: String, table: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&FinledgerError> for std::process::ExitCode {
    fn from(err: &FinledgerError) -> Self {
        let code: u8 = match err {
            FinledgerError::Io(_) => 1,
            FinledgerError::ConfigParse { .. }
            | FinledgerError::ConfigMissing { .. }
            | FinledgerError::ConfigInvalid { .. } => 2,
            FinledgerError::Database { .. } | FinledgerError::DatabaseQuery { .. } => 3,
            FinledgerError::Integrity { .. } | FinledgerError::Validation { .. } => 4,
            FinledgerError::SourceUnavailable { .. } | FinledgerError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
