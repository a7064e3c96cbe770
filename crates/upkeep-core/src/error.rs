//! # Error Types
//!
//! Domain-specific error types for upkeep-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  upkeep-core errors (this file)                                        │
//! │  ├── CoreError        - Draft/session operation failures               │
//! │  ├── ValidationError  - One failed rule on one field                   │
//! │  └── Violation        - {field, message, kind} shown to the user       │
//! │                                                                         │
//! │  upkeep-db errors (separate crate)                                     │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── SubmitError      - Invalid payload vs. retryable stock conflict   │
//! │                                                                         │
//! │  Flow: ValidationError → Violation → ValidationReport → SubmitError    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (part number, quantities)
//! 3. Errors are enum variants, never String
//! 4. Each validation variant renders the user-facing message

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::money::Quantity;
use crate::types::TransactionType;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised while editing a transaction draft.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Line index does not exist in the draft.
    #[error("Line item {index} does not exist (draft has {len} items)")]
    LineItemNotFound { index: usize, len: usize },

    /// Adding another line would exceed the per-transaction cap.
    #[error("A transaction cannot have more than {max} items")]
    TooManyItems { max: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single failed rule on a single field.
///
/// `field` is the camelCase payload path (`supplier`, `items[2].quantity`).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: String,
        min: Decimal,
        max: Decimal,
    },

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Date lies after the injected current time.
    #[error("{field} cannot be in the future")]
    InFuture { field: String },

    /// Collection has fewer entries than allowed.
    #[error("At least one item is required")]
    TooFewItems { field: String },

    /// Collection has more entries than allowed.
    #[error("A transaction cannot exceed {max} items")]
    TooManyItems { field: String, max: usize },

    /// Derived value disagrees with its inputs.
    #[error("{field} must equal quantity × unit cost ({expected})")]
    DerivedMismatch { field: String, expected: Decimal },

    /// Derived value does not fit in a decimal.
    #[error("{field} is too large to calculate")]
    TooLarge { field: String },

    /// Field is mandatory for this transaction type.
    #[error("{field} is required for {transaction_type} transactions")]
    RequiredFor {
        field: String,
        transaction_type: TransactionType,
    },

    /// Issue transactions need somewhere for the stock to go.
    #[error("Recipient or destination location is required for issue transactions")]
    RecipientOrDestinationRequired { field: String },

    /// Two fields that must differ hold the same value.
    #[error("{field} must be different from {other}")]
    MustDiffer { field: String, other: String },

    /// Referenced part is not in the stock snapshot.
    #[error("Part {part_id} not found")]
    PartNotFound { field: String, part_id: String },

    /// Part has nothing left to issue.
    #[error("{part_number} is out of stock")]
    OutOfStock { field: String, part_number: String },

    /// Requested quantity exceeds what is on hand.
    #[error("Insufficient stock for {part_number}: available {available}, requested {requested}")]
    InsufficientStock {
        field: String,
        part_number: String,
        available: Quantity,
        requested: Quantity,
    },
}

impl ValidationError {
    /// Returns the payload path this error is attached to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::Negative { field }
            | ValidationError::InFuture { field }
            | ValidationError::TooFewItems { field }
            | ValidationError::TooManyItems { field, .. }
            | ValidationError::DerivedMismatch { field, .. }
            | ValidationError::TooLarge { field }
            | ValidationError::RequiredFor { field, .. }
            | ValidationError::RecipientOrDestinationRequired { field }
            | ValidationError::MustDiffer { field, .. }
            | ValidationError::PartNotFound { field, .. }
            | ValidationError::OutOfStock { field, .. }
            | ValidationError::InsufficientStock { field, .. } => field,
        }
    }

    /// Classifies the error for blocking policy.
    pub fn kind(&self) -> ViolationKind {
        match self {
            ValidationError::RequiredFor { .. }
            | ValidationError::RecipientOrDestinationRequired { .. }
            | ValidationError::MustDiffer { .. } => ViolationKind::BusinessRule,
            ValidationError::PartNotFound { .. }
            | ValidationError::OutOfStock { .. }
            | ValidationError::InsufficientStock { .. } => ViolationKind::Availability,
            _ => ViolationKind::Structural,
        }
    }
}

// =============================================================================
// Violation
// =============================================================================

/// Which rule family produced a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Type/length/range failure on one field.
    Structural,
    /// Cross-field dependency keyed by transaction type.
    BusinessRule,
    /// Stock on hand cannot cover the request.
    Availability,
}

/// A `{field, message}` pair the client renders next to the offending input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub field: String,
    pub message: String,
    pub kind: ViolationKind,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>, kind: ViolationKind) -> Self {
        Violation {
            field: field.into(),
            message: message.into(),
            kind,
        }
    }
}

impl From<ValidationError> for Violation {
    fn from(err: ValidationError) -> Self {
        Violation {
            field: err.field().to_string(),
            message: err.to_string(),
            kind: err.kind(),
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message() {
        let err = ValidationError::InsufficientStock {
            field: "items[0].quantity".to_string(),
            part_number: "BRG-6204".to_string(),
            available: Quantity::from_units(5),
            requested: Quantity::from_units(10),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for BRG-6204: available 5, requested 10"
        );
        assert_eq!(err.kind(), ViolationKind::Availability);
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::RequiredFor {
            field: "supplier".to_string(),
            transaction_type: TransactionType::Receipt,
        };
        assert_eq!(err.to_string(), "supplier is required for receipt transactions");

        let err = ValidationError::TooShort {
            field: "description".to_string(),
            min: 5,
        };
        assert_eq!(err.to_string(), "description must be at least 5 characters");
    }

    #[test]
    fn test_violation_from_error() {
        let violation: Violation = ValidationError::MustDiffer {
            field: "destinationLocation".to_string(),
            other: "sourceLocation".to_string(),
        }
        .into();
        assert_eq!(violation.field, "destinationLocation");
        assert_eq!(violation.kind, ViolationKind::BusinessRule);
        assert_eq!(
            violation.message,
            "destinationLocation must be different from sourceLocation"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "description".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
