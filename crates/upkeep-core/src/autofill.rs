//! # Procurement Auto-Fill
//!
//! Copies procurement fields from the first part picked on an issue
//! transaction into the transaction header.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Issue form session                                                     │
//! │                                                                         │
//! │  pick part #1 ──► compute_auto_fill(part, Issue, false) ──► Some(patch) │
//! │                        │                                                │
//! │                        └── caller applies patch, sets flag = true       │
//! │                                                                         │
//! │  pick part #2 ──► compute_auto_fill(part, Issue, true)  ──► None        │
//! │                                                                         │
//! │  change type  ──► caller resets flag = false                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The flag lives with the caller (see [`crate::draft::TransactionDraft`]);
//! the functions here are pure.

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::types::{is_filled, Part, StockTransaction, TransactionType};

/// Header fields to copy from a part. `None` means "leave alone".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AutoFillPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_order_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
}

impl AutoFillPatch {
    /// True when the patch would not touch any field.
    pub fn is_empty(&self) -> bool {
        self.material_code.is_none()
            && self.purchase_order_number.is_none()
            && self.vendor_name.is_none()
            && self.vendor_contact.is_none()
            && self.supplier.is_none()
    }

    /// Writes the patch into a transaction header.
    ///
    /// A field is only written while the transaction's own value is still
    /// empty, so anything the user typed survives. Returns how many fields
    /// were written.
    pub fn apply_to(&self, tx: &mut StockTransaction) -> usize {
        let pairs = [
            (&self.material_code, &mut tx.material_code),
            (&self.purchase_order_number, &mut tx.purchase_order_number),
            (&self.vendor_name, &mut tx.vendor_name),
            (&self.vendor_contact, &mut tx.vendor_contact),
            (&self.supplier, &mut tx.supplier),
        ];

        let mut written = 0;
        for (patch, target) in pairs {
            if let Some(value) = patch {
                if !is_filled(target) {
                    *target = Some(value.clone());
                    written += 1;
                }
            }
        }
        written
    }
}

/// Builds the patch for a part, ignoring session state.
///
/// Returns `None` for non-issue types, or when the part carries no
/// procurement data at all.
///
/// ## Example
/// ```rust
/// use upkeep_core::{derive_auto_fill, Money, Part, Quantity, TransactionType};
///
/// let part = Part {
///     id: "p-1".into(),
///     part_number: "BRG-6204".into(),
///     name: "Deep groove ball bearing".into(),
///     quantity: Quantity::from_units(12),
///     min_stock_level: Quantity::from_units(4),
///     unit_price: Money::from_cents(899),
///     material_code: None,
///     purchase_order_number: None,
///     vendor_name: Some("SKF Distribution".into()),
///     vendor_contact: None,
///     supplier: None,
/// };
///
/// let patch = derive_auto_fill(&part, TransactionType::Issue).unwrap();
/// assert_eq!(patch.vendor_name.as_deref(), Some("SKF Distribution"));
/// assert!(patch.material_code.is_none());
///
/// assert!(derive_auto_fill(&part, TransactionType::Receipt).is_none());
/// ```
pub fn derive_auto_fill(part: &Part, transaction_type: TransactionType) -> Option<AutoFillPatch> {
    if transaction_type != TransactionType::Issue {
        return None;
    }

    let copy = |value: &Option<String>| {
        if is_filled(value) {
            value.as_deref().map(|v| v.trim().to_string())
        } else {
            None
        }
    };

    let patch = AutoFillPatch {
        material_code: copy(&part.material_code),
        purchase_order_number: copy(&part.purchase_order_number),
        vendor_name: copy(&part.vendor_name),
        vendor_contact: copy(&part.vendor_contact),
        supplier: copy(&part.supplier),
    };

    if patch.is_empty() {
        None
    } else {
        Some(patch)
    }
}

/// One-shot auto-fill: `None` once the session has already auto-filled.
pub fn compute_auto_fill(
    part: &Part,
    transaction_type: TransactionType,
    already_auto_filled: bool,
) -> Option<AutoFillPatch> {
    if already_auto_filled {
        debug!(part_number = %part.part_number, "Auto-fill already applied this session");
        return None;
    }

    derive_auto_fill(part, transaction_type)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::{Money, Quantity};
    use chrono::Utc;

    fn part_with_vendor(vendor: Option<&str>) -> Part {
        Part {
            id: "p-1".to_string(),
            part_number: "FLT-220".to_string(),
            name: "Hydraulic return filter".to_string(),
            quantity: Quantity::from_units(8),
            min_stock_level: Quantity::from_units(2),
            unit_price: Money::from_cents(4250),
            material_code: Some("MAT-HF-01".to_string()),
            purchase_order_number: Some("  ".to_string()),
            vendor_name: vendor.map(str::to_string),
            vendor_contact: None,
            supplier: Some("Parker Hannifin".to_string()),
        }
    }

    #[test]
    fn test_only_present_fields_are_copied() {
        let patch = derive_auto_fill(&part_with_vendor(None), TransactionType::Issue).unwrap();
        assert_eq!(patch.material_code.as_deref(), Some("MAT-HF-01"));
        assert_eq!(patch.supplier.as_deref(), Some("Parker Hannifin"));
        // Blank on the part means absent
        assert!(patch.purchase_order_number.is_none());
        assert!(patch.vendor_name.is_none());
        assert!(patch.vendor_contact.is_none());
    }

    #[test]
    fn test_issue_only() {
        let part = part_with_vendor(Some("Acme"));
        for tt in [
            TransactionType::Receipt,
            TransactionType::Transfer,
            TransactionType::Adjustment,
            TransactionType::Scrap,
        ] {
            assert!(derive_auto_fill(&part, tt).is_none());
        }
    }

    #[test]
    fn test_part_without_procurement_data() {
        let mut part = part_with_vendor(None);
        part.material_code = None;
        part.supplier = None;
        assert!(derive_auto_fill(&part, TransactionType::Issue).is_none());
    }

    #[test]
    fn test_one_shot() {
        let part = part_with_vendor(Some("Acme"));
        assert!(compute_auto_fill(&part, TransactionType::Issue, false).is_some());
        assert!(compute_auto_fill(&part, TransactionType::Issue, true).is_none());
    }

    #[test]
    fn test_apply_keeps_user_values() {
        let mut tx = StockTransaction::new(TransactionType::Issue, Utc::now());
        tx.vendor_name = Some("Typed by user".to_string());
        tx.material_code = Some(String::new());

        let patch = derive_auto_fill(&part_with_vendor(Some("Acme")), TransactionType::Issue).unwrap();
        let written = patch.apply_to(&mut tx);

        assert_eq!(written, 2);
        assert_eq!(tx.vendor_name.as_deref(), Some("Typed by user"));
        assert_eq!(tx.material_code.as_deref(), Some("MAT-HF-01"));
        assert_eq!(tx.supplier.as_deref(), Some("Parker Hannifin"));
    }

    #[test]
    fn test_patch_serializes_only_present_fields() {
        let patch = AutoFillPatch {
            vendor_name: Some("Acme".to_string()),
            ..AutoFillPatch::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({ "vendorName": "Acme" }));
    }
}
