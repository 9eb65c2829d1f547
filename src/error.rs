use std::error::Error as _;
use std::fmt::Write as _;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SmokeError {
    #[error("{}", describe_postgres(.0))]
    PostgresError(#[from] tokio_postgres::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Unimplemented feature: {0}")]
    Unimplemented(String),

    #[error("Unexpected result at {step}: expected {expected}, got {actual}")]
    Mismatch {
        step: String,
        expected: String,
        actual: String,
    },

    #[error("Other database error: {0}")]
    Other(String),
}

impl SmokeError {
    /// Build a [`SmokeError::Mismatch`] from anything that renders.
    pub fn mismatch(
        step: impl Into<String>,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        SmokeError::Mismatch {
            step: step.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Render a driver error with what the server reported: severity, SQLSTATE, message,
/// then detail, hint and context when present. Non-server errors print their source chain.
pub(crate) fn describe_postgres(err: &tokio_postgres::Error) -> String {
    if let Some(db) = err.as_db_error() {
        let mut text = format!("{} {}: {}", db.severity(), db.code().code(), db.message());
        if let Some(detail) = db.detail() {
            let _ = write!(text, "; detail: {detail}");
        }
        if let Some(hint) = db.hint() {
            let _ = write!(text, "; hint: {hint}");
        }
        if let Some(location) = db.where_() {
            let _ = write!(text, "; where: {location}");
        }
        return text;
    }

    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(text, ": {cause}");
        source = cause.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_names_the_step() {
        let err = SmokeError::mismatch("res2", "[[2, record2, 2]]", "[]");
        assert_eq!(
            err.to_string(),
            "Unexpected result at res2: expected [[2, record2, 2]], got []"
        );
    }
}
