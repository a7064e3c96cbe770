//! # Repository Module
//!
//! Database repository implementations for the stock ledger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Caller (API handler, seed binary, tests)                              │
//! │       │                                                                 │
//! │       │  db.stock_transactions().submit(&tx, now, &config)             │
//! │       ▼                                                                 │
//! │  StockTransactionRepository          PartRepository                    │
//! │  ├── submit                          ├── insert                        │
//! │  ├── get_by_id                       ├── get_by_id / get_by_part_number│
//! │  ├── get_items                       ├── snapshot                      │
//! │  └── list_recent                     ├── list_below_min_stock          │
//! │       │                              └── count                         │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`PartRepository`] - Spare parts and stock snapshots
//! - [`StockTransactionRepository`] - Atomic posting and history

pub mod part;
pub mod stock_transaction;

pub use part::PartRepository;
pub use stock_transaction::{
    PostedTransaction, StockTransactionRepository, StoredTransaction, TransactionSummary,
};
