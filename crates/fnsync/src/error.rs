use fnsync_sql::QuoteError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(
        "{function}: cannot change return type of an existing function ({current} -> {desired}); drop and recreate it"
    )]
    ImmutableAttribute {
        function: String,
        current: String,
        desired: String,
    },

    #[error("statement failed: {message}\n  statement: {statement}")]
    Execution { statement: String, message: String },

    #[error("cannot inspect {function}: {message}")]
    Inspection { function: String, message: String },
}

impl From<QuoteError> for Error {
    fn from(err: QuoteError) -> Self {
        Error::Configuration(err.to_string())
    }
}

/// Text for a driver error, preferring what the server said.
pub(crate) fn describe(err: &tokio_postgres::Error) -> String {
    match err.as_db_error() {
        Some(db) => match db.detail() {
            Some(detail) => format!("{}: {} ({})", db.severity(), db.message(), detail),
            None => format!("{}: {}", db.severity(), db.message()),
        },
        None => err.to_string(),
    }
}
