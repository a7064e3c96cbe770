//! # Transaction Draft
//!
//! The editing session behind the stock-transaction form.
//!
//! The draft owns the transaction being edited plus the one-shot auto-fill
//! flag. Every edit that touches a line's quantity or unit cost goes through
//! here so `total_cost` never goes stale.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::autofill::{compute_auto_fill, AutoFillPatch};
use crate::config::ValidationConfig;
use crate::error::{CoreError, CoreResult};
use crate::money::{Money, Quantity};
use crate::types::{LineItem, Part, StockSnapshot, StockTransaction, TransactionType};
use crate::validation::{validate, ValidationReport};

/// A stock transaction under edit.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    transaction: StockTransaction,
    auto_filled: bool,
    max_line_items: usize,
}

impl TransactionDraft {
    /// Starts an empty draft.
    pub fn new(transaction_type: TransactionType, transaction_date: DateTime<Utc>) -> Self {
        TransactionDraft {
            transaction: StockTransaction::new(transaction_type, transaction_date),
            auto_filled: false,
            max_line_items: ValidationConfig::default().max_line_items,
        }
    }

    /// Resumes editing an existing transaction with configured limits.
    ///
    /// The auto-fill flag starts cleared.
    pub fn with_limits(transaction: StockTransaction, config: &ValidationConfig) -> Self {
        TransactionDraft {
            transaction,
            auto_filled: false,
            max_line_items: config.max_line_items,
        }
    }

    pub fn transaction(&self) -> &StockTransaction {
        &self.transaction
    }

    /// Direct access to header fields.
    ///
    /// Line items edited through this reference bypass total recomputation;
    /// the validator will flag any resulting mismatch.
    pub fn transaction_mut(&mut self) -> &mut StockTransaction {
        &mut self.transaction
    }

    pub fn into_transaction(self) -> StockTransaction {
        self.transaction
    }

    pub fn has_auto_filled(&self) -> bool {
        self.auto_filled
    }

    /// Changes the transaction type, re-arming auto-fill when it actually changes.
    pub fn set_transaction_type(&mut self, transaction_type: TransactionType) {
        if self.transaction.transaction_type != transaction_type {
            debug!(
                from = %self.transaction.transaction_type,
                to = %transaction_type,
                "Transaction type changed, auto-fill re-armed"
            );
            self.transaction.transaction_type = transaction_type;
            self.auto_filled = false;
        }
    }

    /// Appends a line for `part`, priced at its unit price.
    ///
    /// On the first eligible part of an issue session the procurement fields
    /// are copied into the header; the applied patch is returned so the form
    /// can highlight what changed.
    ///
    /// ## Errors
    /// [`CoreError::TooManyItems`] when the draft is already at the line cap.
    pub fn add_part(&mut self, part: &Part, quantity: Quantity) -> CoreResult<Option<AutoFillPatch>> {
        if self.transaction.items.len() >= self.max_line_items {
            return Err(CoreError::TooManyItems {
                max: self.max_line_items,
            });
        }

        self.transaction.items.push(LineItem::from_part(part, quantity));

        let patch = compute_auto_fill(part, self.transaction.transaction_type, self.auto_filled);
        if let Some(patch) = &patch {
            let written = patch.apply_to(&mut self.transaction);
            self.auto_filled = true;
            debug!(part_number = %part.part_number, fields = written, "Applied procurement auto-fill");
        }

        Ok(patch)
    }

    /// Updates a line's quantity and re-derives its total.
    pub fn set_quantity(&mut self, index: usize, quantity: Quantity) -> CoreResult<()> {
        self.item_mut(index)?.set_quantity(quantity);
        Ok(())
    }

    /// Updates a line's unit cost and re-derives its total.
    pub fn set_unit_cost(&mut self, index: usize, unit_cost: Money) -> CoreResult<()> {
        self.item_mut(index)?.set_unit_cost(unit_cost);
        Ok(())
    }

    /// Removes a line and returns it.
    pub fn remove_item(&mut self, index: usize) -> CoreResult<LineItem> {
        let len = self.transaction.items.len();
        if index >= len {
            return Err(CoreError::LineItemNotFound { index, len });
        }
        Ok(self.transaction.items.remove(index))
    }

    /// Runs the full rule set against the current draft.
    pub fn validate(
        &self,
        snapshot: &StockSnapshot,
        now: DateTime<Utc>,
        config: &ValidationConfig,
    ) -> ValidationReport {
        validate(&self.transaction, snapshot, now, config)
    }

    fn item_mut(&mut self, index: usize) -> CoreResult<&mut LineItem> {
        let len = self.transaction.items.len();
        self.transaction
            .items
            .get_mut(index)
            .ok_or(CoreError::LineItemNotFound { index, len })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
