//! Error types for shop-db.

use std::sync::OnceLock;

use diesel::result::DatabaseErrorKind;
use miette::Diagnostic;
use regex::Regex;
use thiserror::Error;

use crate::write::WriteStep;

/// Regex for extracting `table.column` from SQLite uniqueness violations.
static UNIQUE_RE: OnceLock<Regex> = OnceLock::new();

/// Transport-neutral classification a request handler can map to a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller sent something the store rejected (conflict, unknown reference).
    BadInput,
    /// The requested entity does not exist.
    NotFound,
    /// Anything else: store failures, decode failures, timeouts.
    Internal,
}

/// Database error type for shop-db operations.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error("Database connection failed: {0}")]
    #[diagnostic(
        code(shop_db::connection),
        help("Check if the database file exists and is accessible")
    )]
    ConnectionError(String),

    #[error("Database query failed: {0}")]
    #[diagnostic(code(shop_db::query))]
    QueryError(String),

    #[error("Database migration failed: {0}")]
    #[diagnostic(
        code(shop_db::migration),
        help("The database schema may be corrupted. Try recreating the database file.")
    )]
    MigrationError(String),

    #[error("{0} not found")]
    #[diagnostic(code(shop_db::not_found))]
    NotFound(String),

    #[error("{0}")]
    #[diagnostic(
        code(shop_db::conflict),
        help("A record with the same unique value already exists")
    )]
    Conflict(String),

    #[error("Invalid input: {0}")]
    #[diagnostic(code(shop_db::invalid_input))]
    InvalidInput(String),

    #[error("Failed to decode stored document: {0}")]
    #[diagnostic(
        code(shop_db::decode),
        help("The row could not be parsed into the target entity")
    )]
    DecodeError(String),

    #[error("Transaction could not start: {0}")]
    #[diagnostic(code(shop_db::transaction_begin))]
    TransactionBegin(String),

    #[error("{step} failed: {reason}")]
    #[diagnostic(
        code(shop_db::write),
        help("The transaction was rolled back; nothing was written")
    )]
    WriteFailed { step: WriteStep, reason: String },

    #[error("Deadline exceeded while {0}")]
    #[diagnostic(code(shop_db::timeout))]
    Timeout(String),

    #[error("IO error: {0}")]
    #[diagnostic(code(shop_db::io), help("Check file permissions and disk space"))]
    IoError(#[from] std::io::Error),
}

impl DbError {
    /// Classifies the error for the caller.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::NotFound(_) => ErrorKind::NotFound,
            DbError::Conflict(_) | DbError::InvalidInput(_) => ErrorKind::BadInput,
            _ => ErrorKind::Internal,
        }
    }

    /// Maps a failed write statement, turning uniqueness violations on known
    /// natural keys into a stable conflict reason and dangling references
    /// into invalid input.
    pub fn from_write(step: WriteStep, err: diesel::result::Error) -> Self {
        match &err {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                DbError::Conflict(conflict_reason(info.message()))
            }
            diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                DbError::InvalidInput(format!("{step}: referenced record does not exist"))
            }
            _ => DbError::WriteFailed {
                step,
                reason: err.to_string(),
            },
        }
    }
}

/// Turns `UNIQUE constraint failed: users.email` into a stable reason string.
pub fn conflict_reason(message: &str) -> String {
    let re = UNIQUE_RE
        .get_or_init(|| Regex::new(r"UNIQUE constraint failed: (\w+)\.(\w+)").unwrap());

    let Some(captures) = re.captures(message) else {
        return "record already exists".to_string();
    };

    match (&captures[1], &captures[2]) {
        ("users", "email") => "email have been used".to_string(),
        ("users", "username") => "username have been used".to_string(),
        ("products", "title") => "product title have been used".to_string(),
        ("categories", "title") => "category title have been used".to_string(),
        (table, column) => format!("{table}.{column} already exists"),
    }
}

impl From<diesel::result::Error> for DbError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => DbError::NotFound("Record".to_string()),
            diesel::result::Error::DatabaseError(_, info) => {
                DbError::QueryError(info.message().to_string())
            }
            other => DbError::QueryError(other.to_string()),
        }
    }
}

impl From<diesel::result::ConnectionError> for DbError {
    fn from(err: diesel::result::ConnectionError) -> Self {
        DbError::ConnectionError(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::DecodeError(err.to_string())
    }
}

/// Result type alias for shop-db operations.
pub type Result<T> = std::result::Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_reason_known_keys() {
        assert_eq!(
            conflict_reason("UNIQUE constraint failed: users.email"),
            "email have been used"
        );
        assert_eq!(
            conflict_reason("UNIQUE constraint failed: users.username"),
            "username have been used"
        );
        assert_eq!(
            conflict_reason("UNIQUE constraint failed: products.title"),
            "product title have been used"
        );
    }

    #[test]
    fn test_conflict_reason_unknown_key() {
        assert_eq!(
            conflict_reason("UNIQUE constraint failed: roles.title"),
            "roles.title already exists"
        );
        assert_eq!(conflict_reason("something else"), "record already exists");
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(DbError::NotFound("Product".into()).kind(), ErrorKind::NotFound);
        assert_eq!(DbError::Conflict("x".into()).kind(), ErrorKind::BadInput);
        assert_eq!(DbError::InvalidInput("x".into()).kind(), ErrorKind::BadInput);
        assert_eq!(DbError::Timeout("x".into()).kind(), ErrorKind::Internal);
        assert_eq!(
            DbError::WriteFailed {
                step: WriteStep::InsertChildren,
                reason: "boom".into()
            }
            .kind(),
            ErrorKind::Internal
        );
    }
}
