//! # upkeep-core: Pure Business Logic for Upkeep Stockroom
//!
//! This crate holds the stock-transaction rule set as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Upkeep Stockroom Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web Client (forms)                           │   │
//! │  │   Pick parts ──► Edit lines ──► Validate ──► Submit            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ ts-rs bindings                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ upkeep-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   draft   │  │ validation│  │   │
//! │  │   │ StockTxn  │  │ Quantity  │  │  session  │  │ structure │  │   │
//! │  │   │ LineItem  │  │  Money    │  │ autofill  │  │ rules     │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO CLOCK • NO DATABASE • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    upkeep-db (Stock Ledger)                     │   │
//! │  │        re-validates and posts atomically at submission          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (StockTransaction, LineItem, Part, StockSnapshot)
//! - [`money`] - Decimal `Quantity` and `Money`
//! - [`error`] - Domain error types and violations
//! - [`validation`] - Structural, business-rule and availability checks
//! - [`autofill`] - One-shot procurement field copy for issue transactions
//! - [`draft`] - Editing session that keeps derived totals consistent
//! - [`config`] - Tunable validation limits
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use upkeep_core::{validate, StockSnapshot, StockTransaction, TransactionType, ValidationConfig};
//!
//! let now = Utc::now();
//! let tx = StockTransaction::new(TransactionType::Receipt, now);
//!
//! let report = validate(&tx, &StockSnapshot::default(), now, &ValidationConfig::default());
//!
//! // No supplier, no description, no items
//! assert!(!report.valid);
//! assert!(report.violations.iter().any(|v| v.field == "supplier"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod autofill;
pub mod config;
pub mod draft;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use autofill::{compute_auto_fill, derive_auto_fill, AutoFillPatch};
pub use config::ValidationConfig;
pub use draft::TransactionDraft;
pub use error::{CoreError, ValidationError, Violation, ViolationKind};
pub use money::{Money, Quantity};
pub use types::*;
pub use validation::{validate, StockWarning, ValidationReport};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single stock transaction.
pub const MAX_LINE_ITEMS: usize = 50;

/// Minimum quantity on a line item, in hundredths (0.01).
pub const MIN_QUANTITY_HUNDREDTHS: i64 = 1;

/// Maximum quantity on a line item.
///
/// ## Business Reason
/// Catches fat-fingered entries (typing 1000000 instead of 100).
pub const MAX_QUANTITY: i64 = 999_999;

/// Minimum length of a transaction description.
pub const DESCRIPTION_MIN_LENGTH: usize = 5;

/// Maximum length of a transaction description.
pub const DESCRIPTION_MAX_LENGTH: usize = 500;

/// Maximum length of short identifiers (material code, PO number, part number).
pub const CODE_MAX_LENGTH: usize = 50;

/// Maximum length of names, locations and references.
pub const NAME_MAX_LENGTH: usize = 100;

/// Maximum length of a part name.
pub const PART_NAME_MAX_LENGTH: usize = 200;

/// Maximum length of transaction notes.
pub const NOTES_MAX_LENGTH: usize = 1000;

/// Maximum length of line item notes.
pub const LINE_NOTES_MAX_LENGTH: usize = 500;
