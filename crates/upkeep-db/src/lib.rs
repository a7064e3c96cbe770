//! # upkeep-db: Stock Ledger for Upkeep Stockroom
//!
//! Authoritative part stock in SQLite, and atomic posting of stock
//! transactions validated by `upkeep-core`.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Upkeep Stockroom Data Flow                          │
//! │                                                                         │
//! │  Client form (validated against its own, possibly stale, snapshot)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     upkeep-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ PartRepo      │    │ 001_init.sql │  │   │
//! │  │   │ SqlitePool    │◄───│ StockTxnRepo  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           ▲                                                     │   │
//! │  │   ┌───────┴───────┐                                             │   │
//! │  │   │   AppConfig   │  upkeep.toml + UPKEEP_* env                 │   │
//! │  │   └───────────────┘                                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL)                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`config`] - Application configuration loading
//! - [`error`] - Database and submission error types
//! - [`repository`] - Part and stock transaction repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use upkeep_db::{AppConfig, Database, SubmitError};
//!
//! let config = AppConfig::load(None)?;
//! let db = Database::new(config.db_config()).await?;
//!
//! match db.stock_transactions().submit(&tx, Utc::now(), &config.validation).await {
//!     Ok(posted) => println!("Posted {}", posted.transaction_number),
//!     Err(e) if e.is_retryable() => { /* re-fetch snapshot, let the user retry */ }
//!     Err(SubmitError::Invalid(violations)) => { /* show field errors */ }
//!     Err(e) => return Err(e.into()),
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{AppConfig, ConfigError, DatabaseSettings};
pub use error::{DbError, DbResult, SubmitError, SubmitResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::part::PartRepository;
pub use repository::stock_transaction::{
    PostedTransaction, StockTransactionRepository, StoredTransaction, TransactionSummary,
};
