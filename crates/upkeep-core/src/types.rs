//! # Domain Types
//!
//! Core domain types used throughout Upkeep Stockroom.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────────┐        ┌─────────────────────┐                │
//! │  │  StockTransaction   │ 1..50  │      LineItem       │                │
//! │  │  ─────────────────  │───────►│  ─────────────────  │                │
//! │  │  transaction_type   │        │  part_id (FK)       │                │
//! │  │  transaction_date   │        │  quantity           │                │
//! │  │  supplier/recipient │        │  unit_cost          │                │
//! │  │  locations          │        │  total_cost (deriv) │                │
//! │  └─────────────────────┘        └─────────────────────┘                │
//! │                                                                         │
//! │  ┌─────────────────────┐        ┌─────────────────────┐                │
//! │  │       Part          │◄───────│   StockSnapshot     │                │
//! │  │  (external lookup)  │  map   │  part_id → Part     │                │
//! │  └─────────────────────┘        └─────────────────────┘                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Parts, assets and work orders are owned by other modules. A transaction
//! only keeps foreign keys plus denormalized display copies (part number,
//! asset name, work order number) frozen at the time of entry.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Money, Quantity};

// =============================================================================
// Transaction Type
// =============================================================================

/// Classification of a stock movement.
///
/// ## Mandatory fields per type
/// ```text
/// receipt     → supplier
/// issue       → recipient OR destination location   (stock checked)
/// transfer    → source AND destination, different
/// adjustment  → (none)
/// scrap       → (none)                               (stock checked)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Stock arriving from a supplier.
    Receipt,
    /// Stock leaving to a person, department, work order or asset.
    Issue,
    /// Stock moving between two locations.
    Transfer,
    /// Stock count correction.
    Adjustment,
    /// Stock written off as unusable.
    Scrap,
}

impl TransactionType {
    /// Returns true for types that take stock out of inventory.
    pub fn is_outbound(&self) -> bool {
        matches!(self, TransactionType::Issue | TransactionType::Scrap)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Receipt => "receipt",
            TransactionType::Issue => "issue",
            TransactionType::Transfer => "transfer",
            TransactionType::Adjustment => "adjustment",
            TransactionType::Scrap => "scrap",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "receipt" => Ok(TransactionType::Receipt),
            "issue" => Ok(TransactionType::Issue),
            "transfer" => Ok(TransactionType::Transfer),
            "adjustment" => Ok(TransactionType::Adjustment),
            "scrap" => Ok(TransactionType::Scrap),
            other => Err(format!("Unknown transaction type: {}", other)),
        }
    }
}

// =============================================================================
// Recipient Type
// =============================================================================

/// Who receives issued stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RecipientType {
    Employee,
    Department,
    WorkOrder,
    Asset,
    Other,
}

// =============================================================================
// Priority
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

// =============================================================================
// Part (external lookup)
// =============================================================================

/// Read-only view of a spare part, supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub id: String,
    pub part_number: String,
    pub name: String,

    /// Quantity currently on hand.
    #[ts(as = "String")]
    pub quantity: Quantity,

    /// Reorder threshold; dropping below it raises a warning.
    #[ts(as = "String")]
    pub min_stock_level: Quantity,

    #[ts(as = "String")]
    pub unit_price: Money,

    #[serde(default)]
    pub material_code: Option<String>,
    #[serde(default)]
    pub purchase_order_number: Option<String>,
    #[serde(default)]
    pub vendor_name: Option<String>,
    #[serde(default)]
    pub vendor_contact: Option<String>,
    #[serde(default)]
    pub supplier: Option<String>,
}

// =============================================================================
// Stock Snapshot
// =============================================================================

/// Caller-supplied view of current part stock, keyed by part ID.
///
/// The validator only reads it. Fetching (and refreshing after a stock
/// conflict) is the caller's job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockSnapshot {
    parts: HashMap<String, Part>,
}

impl StockSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from a list of parts.
    pub fn from_parts(parts: impl IntoIterator<Item = Part>) -> Self {
        StockSnapshot {
            parts: parts.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    /// Inserts or replaces a part.
    pub fn insert(&mut self, part: Part) {
        self.parts.insert(part.id.clone(), part);
    }

    pub fn get(&self, part_id: &str) -> Option<&Part> {
        self.parts.get(part_id)
    }

    /// Quantity on hand for a part, if known.
    pub fn available(&self, part_id: &str) -> Option<Quantity> {
        self.parts.get(part_id).map(|p| p.quantity)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One part/quantity/cost entry within a transaction.
///
/// ## Derived total
/// `total_cost` always equals `quantity × unit_cost` when changed through
/// [`LineItem::set_quantity`] / [`LineItem::set_unit_cost`], unless the
/// product overflows, in which case it is left at zero. Payloads that arrive
/// over the wire are re-checked by the validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub part_id: String,
    /// Part number at time of entry (frozen).
    pub part_number: String,
    /// Part name at time of entry (frozen).
    pub part_name: String,

    #[ts(as = "String")]
    pub quantity: Quantity,
    #[ts(as = "String")]
    pub unit_cost: Money,
    #[ts(as = "String")]
    pub total_cost: Money,

    #[serde(default)]
    pub from_location: Option<String>,
    #[serde(default)]
    pub to_location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl LineItem {
    /// Creates a line item with its total derived.
    pub fn new(
        part_id: impl Into<String>,
        part_number: impl Into<String>,
        part_name: impl Into<String>,
        quantity: Quantity,
        unit_cost: Money,
    ) -> Self {
        LineItem {
            part_id: part_id.into(),
            part_number: part_number.into(),
            part_name: part_name.into(),
            quantity,
            unit_cost,
            total_cost: quantity.checked_total(unit_cost).unwrap_or_default(),
            from_location: None,
            to_location: None,
            notes: None,
        }
    }

    /// Creates a line item from a part snapshot, pricing at the part's unit price.
    pub fn from_part(part: &Part, quantity: Quantity) -> Self {
        LineItem::new(
            part.id.clone(),
            part.part_number.clone(),
            part.name.clone(),
            quantity,
            part.unit_price,
        )
    }

    pub fn set_quantity(&mut self, quantity: Quantity) {
        self.quantity = quantity;
        self.recompute_total();
    }

    pub fn set_unit_cost(&mut self, unit_cost: Money) {
        self.unit_cost = unit_cost;
        self.recompute_total();
    }

    /// Re-derives `total_cost` from the current inputs.
    pub fn recompute_total(&mut self) {
        self.total_cost = self.expected_total().unwrap_or_default();
    }

    /// `quantity × unit_cost`, regardless of the stored total.
    ///
    /// `None` when the product does not fit in a decimal.
    pub fn expected_total(&self) -> Option<Money> {
        self.quantity.checked_total(self.unit_cost)
    }
}

// =============================================================================
// Stock Transaction
// =============================================================================

/// A candidate stock movement as entered on the transaction form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockTransaction {
    pub transaction_type: TransactionType,

    #[ts(as = "String")]
    pub transaction_date: DateTime<Utc>,

    #[serde(default)]
    pub reference_number: Option<String>,
    #[serde(default)]
    pub description: String,

    // Procurement fields (auto-fill targets)
    #[serde(default)]
    pub material_code: Option<String>,
    #[serde(default)]
    pub purchase_order_number: Option<String>,
    #[serde(default)]
    pub vendor_name: Option<String>,
    #[serde(default)]
    pub vendor_contact: Option<String>,
    #[serde(default)]
    pub supplier: Option<String>,

    // Movement endpoints
    #[serde(default)]
    pub source_location: Option<String>,
    #[serde(default)]
    pub destination_location: Option<String>,
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default)]
    pub recipient_type: Option<RecipientType>,

    // Denormalized cross-references (Asset, Work Order)
    #[serde(default)]
    pub asset_id: Option<String>,
    #[serde(default)]
    pub asset_name: Option<String>,
    #[serde(default)]
    pub work_order_id: Option<String>,
    #[serde(default)]
    pub work_order_number: Option<String>,

    #[serde(default)]
    pub items: Vec<LineItem>,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub internal_notes: Option<String>,
}

impl StockTransaction {
    /// Creates an empty transaction of the given type.
    pub fn new(transaction_type: TransactionType, transaction_date: DateTime<Utc>) -> Self {
        StockTransaction {
            transaction_type,
            transaction_date,
            reference_number: None,
            description: String::new(),
            material_code: None,
            purchase_order_number: None,
            vendor_name: None,
            vendor_contact: None,
            supplier: None,
            source_location: None,
            destination_location: None,
            recipient: None,
            recipient_type: None,
            asset_id: None,
            asset_name: None,
            work_order_id: None,
            work_order_number: None,
            items: Vec::new(),
            priority: Priority::default(),
            notes: None,
            internal_notes: None,
        }
    }

    /// Sum of line totals, or `None` on overflow.
    pub fn total_cost(&self) -> Option<Money> {
        self.items
            .iter()
            .try_fold(Money::zero(), |acc, i| acc.checked_add(i.total_cost))
    }

    /// Total requested quantity per part, in first-seen order.
    pub fn quantities_by_part(&self) -> Vec<(String, Quantity)> {
        let mut totals: Vec<(String, Quantity)> = Vec::new();
        for item in &self.items {
            match totals.iter_mut().find(|(id, _)| *id == item.part_id) {
                Some((_, qty)) => *qty += item.quantity,
                None => totals.push((item.part_id.clone(), item.quantity)),
            }
        }
        totals
    }
}

/// Returns true when an optional text field holds something other than whitespace.
pub fn is_filled(value: &Option<String>) -> bool {
    value.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false)
}

// =============================================================================
// Unit Tests
// =============================================================================
