//! # Database Error Types
//!
//! Error types for the stock ledger.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError ← Adds context and categorization                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SubmitError (submission only)                                         │
//! │  ├── Invalid(violations)  → user fixes fields, resubmits               │
//! │  ├── StockConflict        → client re-fetches stock, retries           │
//! │  └── Database             → infrastructure failure                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use upkeep_core::{Quantity, Violation};

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - Part or transaction ID doesn't exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a duplicate part number
    /// - Transaction number collision
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Line item referencing a non-existent part
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Stored value could not be decoded into a domain type.
    ///
    /// ## When This Occurs
    /// - Quantity/money TEXT column holds something that isn't a decimal
    /// - Unknown enum string written by an older schema
    #[error("Corrupt {column} value: '{value}'")]
    Decode { column: String, value: String },

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn decode(column: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::Decode {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                // "UNIQUE constraint failed: <table>.<column>"
                // "FOREIGN KEY constraint failed"
                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: field.to_string(),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Submit Error
// =============================================================================

/// Why a stock transaction was not posted.
///
/// Nothing is written in any of these cases.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The payload breaks structural or business rules; the user must fix fields.
    #[error("Transaction is invalid ({} violations)", .0.len())]
    Invalid(Vec<Violation>),

    /// The client's view of stock is stale.
    ///
    /// ## When This Occurs
    /// - Another issue committed first and stock no longer covers the request
    /// - A part's version changed between read and write
    /// - A referenced part was deleted
    #[error("Stock changed for part {part_id}: available {available}, requested {requested}")]
    StockConflict {
        part_id: String,
        available: Quantity,
        requested: Quantity,
    },

    /// Infrastructure failure.
    #[error(transparent)]
    Database(#[from] DbError),
}

impl SubmitError {
    /// True when re-fetching stock and resubmitting may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SubmitError::StockConflict { .. })
    }

    /// Field violations, if the payload itself was rejected.
    pub fn violations(&self) -> &[Violation] {
        match self {
            SubmitError::Invalid(violations) => violations,
            _ => &[],
        }
    }
}

impl From<sqlx::Error> for SubmitError {
    fn from(err: sqlx::Error) -> Self {
        SubmitError::Database(err.into())
    }
}

/// Result type for stock-transaction submission.
pub type SubmitResult<T> = Result<T, SubmitError>;
