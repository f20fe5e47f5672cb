//! Core error types for Taxonomer

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Taxonomer operations
#[derive(Error, Debug)]
pub enum TaxonomerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A row named a parent that had not been seen yet.
    #[error("Missing parent: taxon {tax_id} references unknown parent {parent_id}")]
    MissingParent { tax_id: String, parent_id: String },

    /// Uniqueness or foreign-key failure raised while loading a batch.
    #[error("Integrity error: {0}")]
    Integrity(String),

    #[error("Database error: {0}")]
    Database(String),

    /// An invariant the store relies on was broken upstream. Never recoverable.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Missing file: {}", .0.display())]
    MissingResource(PathBuf),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parsing error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// Result type alias for Taxonomer operations
pub type TaxonomerResult<T> = Result<T, TaxonomerError>;

impl TaxonomerError {
    /// Construct a parse error for a 1-based input line
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        TaxonomerError::Parse {
            line,
            message: message.into(),
        }
    }

    /// Errors that must abort the whole run rather than be reported and skipped
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TaxonomerError::MissingParent { .. }
                | TaxonomerError::InvariantViolation(_)
                | TaxonomerError::MissingResource(_)
        )
    }
}

impl From<anyhow::Error> for TaxonomerError {
    fn from(err: anyhow::Error) -> Self {
        TaxonomerError::Other(err.to_string())
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for TaxonomerError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref failure, _)
                if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                TaxonomerError::Integrity(err.to_string())
            }
            other => TaxonomerError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let io_error = TaxonomerError::Io(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        assert!(format!("{}", io_error).contains("IO error"));

        let missing = TaxonomerError::MissingParent {
            tax_id: "562".to_string(),
            parent_id: "561".to_string(),
        };
        assert_eq!(
            format!("{}", missing),
            "Missing parent: taxon 562 references unknown parent 561"
        );

        let integrity = TaxonomerError::Integrity("UNIQUE constraint failed".to_string());
        assert_eq!(format!("{}", integrity), "Integrity error: UNIQUE constraint failed");

        let resource = TaxonomerError::MissingResource(PathBuf::from("/data/taxonomy_16S"));
        assert_eq!(format!("{}", resource), "Missing file: /data/taxonomy_16S");

        let parse = TaxonomerError::parse(3, "unknown rank prefix 'x'");
        assert_eq!(format!("{}", parse), "Parsing error at line 3: unknown rank prefix 'x'");
    }

    #[test]
    fn test_fatal_classification() {
        assert!(TaxonomerError::InvariantViolation("two rows".into()).is_fatal());
        assert!(TaxonomerError::MissingResource(PathBuf::from("x")).is_fatal());
        assert!(!TaxonomerError::Integrity("dup".into()).is_fatal());
        assert!(!TaxonomerError::NotFound("x".into()).is_fatal());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: TaxonomerError = io_err.into();

        match err {
            TaxonomerError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn test_anyhow_error_conversion() {
        let err: TaxonomerError = anyhow::anyhow!("custom error message").into();

        match err {
            TaxonomerError::Other(msg) => assert_eq!(msg, "custom error message"),
            _ => panic!("Expected Other error variant"),
        }
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_constraint_violation_becomes_integrity() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id TEXT PRIMARY KEY); INSERT INTO t VALUES ('a');")
            .unwrap();
        let err: TaxonomerError = conn
            .execute("INSERT INTO t VALUES ('a')", [])
            .unwrap_err()
            .into();
        assert!(matches!(err, TaxonomerError::Integrity(_)));

        let err: TaxonomerError = conn.execute("SELECT * FROM nope", []).unwrap_err().into();
        assert!(matches!(err, TaxonomerError::Database(_)));
    }
}
