//! # Validation Module
//!
//! Stock-transaction validation for Upkeep Stockroom.
//!
//! ## Validation Passes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Passes                                  │
//! │                                                                         │
//! │  Pass 1: validate_structure          (every field change)              │
//! │  ├── Required / length / range per field                               │
//! │  ├── transactionDate <= now (injected)                                 │
//! │  └── 1..=50 items, totalCost == quantity × unitCost                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Pass 2: validate_business_rules     (every field change)              │
//! │  ├── receipt  → supplier                                               │
//! │  ├── issue    → recipient OR destinationLocation                       │
//! │  ├── transfer → sourceLocation AND destinationLocation                 │
//! │  └── transfer → locations differ                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Pass 3: validate_stock_availability (submit, issue/scrap only)        │
//! │  ├── part not found / out of stock / insufficient stock  (blocking)    │
//! │  └── below minimum stock level                          (warning)      │
//! │                                                                         │
//! │  No pass short-circuits: the form shows every error at once.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use chrono::Utc;
//! use upkeep_core::validation::validate_business_rules;
//! use upkeep_core::{StockTransaction, TransactionType};
//!
//! let tx = StockTransaction::new(TransactionType::Receipt, Utc::now());
//! let violations = validate_business_rules(&tx);
//! assert_eq!(violations[0].field, "supplier");
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::config::ValidationConfig;
use crate::error::{ValidationError, Violation, ViolationKind};
use crate::money::{Money, Quantity};
use crate::types::{is_filled, LineItem, StockSnapshot, StockTransaction, TransactionType};
use crate::{
    CODE_MAX_LENGTH, DESCRIPTION_MAX_LENGTH, LINE_NOTES_MAX_LENGTH, NAME_MAX_LENGTH,
    NOTES_MAX_LENGTH, PART_NAME_MAX_LENGTH,
};

/// Result type for single-field validators.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Reports
// =============================================================================

/// Non-blocking notice: the transaction leaves a part below its reorder level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockWarning {
    pub part_id: String,
    pub part_number: String,
    #[ts(as = "String")]
    pub remaining: Quantity,
    #[ts(as = "String")]
    pub min_stock_level: Quantity,
}

/// Outcome of [`validate_stock_availability`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvailabilityCheck {
    pub violations: Vec<Violation>,
    pub warnings: Vec<StockWarning>,
}

/// Outcome of the full rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub valid: bool,
    pub violations: Vec<Violation>,
    pub warnings: Vec<StockWarning>,
}

impl ValidationReport {
    /// Violations attached to one payload path.
    pub fn violations_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Violation> {
        self.violations.iter().filter(move |v| v.field == field)
    }

    /// True if any violation belongs to the given rule family.
    pub fn has_kind(&self, kind: ViolationKind) -> bool {
        self.violations.iter().any(|v| v.kind == kind)
    }
}

/// Accumulates violations without short-circuiting.
#[derive(Debug, Default)]
struct Collector {
    violations: Vec<Violation>,
}

impl Collector {
    fn check(&mut self, result: ValidationResult<()>) {
        if let Err(err) = result {
            self.violations.push(err.into());
        }
    }

    fn push(&mut self, err: ValidationError) {
        self.violations.push(err.into());
    }

    fn finish(self) -> Vec<Violation> {
        self.violations
    }
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required text field.
///
/// ## Rules
/// - Must not be empty after trimming
/// - Length (in characters) between `min` and `max`
///
/// ## Example
/// ```rust
/// use upkeep_core::validation::validate_required_text;
///
/// assert!(validate_required_text("description", "Bearings for conveyor 3", 5, 500).is_ok());
/// assert!(validate_required_text("description", "  ", 5, 500).is_err());
/// assert!(validate_required_text("description", "abc", 5, 500).is_err());
/// ```
pub fn validate_required_text(field: &str, value: &str, min: usize, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    let len = value.chars().count();
    if len < min {
        return Err(ValidationError::TooShort {
            field: field.to_string(),
            min,
        });
    }

    if len > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates an optional text field against a maximum length.
///
/// `None` and blank strings always pass.
pub fn validate_optional_text(field: &str, value: &Option<String>, max: usize) -> ValidationResult<()> {
    match value.as_deref().map(str::trim) {
        Some(v) if v.chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Between `config.min_quantity` (0.01) and `config.max_quantity` (999,999), inclusive
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Transaction form: edit quantity                                        │
/// │                                                                         │
/// │  User enters quantity: 0                                                │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity ← THIS FUNCTION                                      │
/// │       │                                                                 │
/// │       ├── q < 0.01?    → "items[0].quantity must be between ..."        │
/// │       ├── q > 999999?  → same message                                   │
/// │       └── OK → totalCost recomputed                                     │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(field: &str, qty: Quantity, config: &ValidationConfig) -> ValidationResult<()> {
    let value = qty.value();
    if value < config.min_quantity || value > config.max_quantity {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: config.min_quantity,
            max: config.max_quantity,
        });
    }

    Ok(())
}

/// Validates a monetary amount.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free-issue stock, donated parts)
pub fn validate_non_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a line total against its inputs.
pub fn validate_line_total(field: &str, item: &LineItem) -> ValidationResult<()> {
    validate_non_negative(field, item.total_cost)?;

    let expected = item.expected_total().ok_or_else(|| ValidationError::TooLarge {
        field: field.to_string(),
    })?;
    if item.total_cost != expected {
        return Err(ValidationError::DerivedMismatch {
            field: field.to_string(),
            expected: expected.amount(),
        });
    }

    Ok(())
}

// =============================================================================
// Date Validators
// =============================================================================

/// Validates that a date is not after `now`.
///
/// `now` is injected so the check is deterministic; equal to `now` passes.
pub fn validate_not_future(field: &str, date: DateTime<Utc>, now: DateTime<Utc>) -> ValidationResult<()> {
    if date > now {
        return Err(ValidationError::InFuture {
            field: field.to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the number of line items.
///
/// ## Rules
/// - At least one item
/// - At most `config.max_line_items` (50)
pub fn validate_item_count(count: usize, config: &ValidationConfig) -> ValidationResult<()> {
    if count == 0 {
        return Err(ValidationError::TooFewItems {
            field: "items".to_string(),
        });
    }

    if count > config.max_line_items {
        return Err(ValidationError::TooManyItems {
            field: "items".to_string(),
            max: config.max_line_items,
        });
    }

    Ok(())
}

// =============================================================================
// Pass 1: Structure
// =============================================================================

/// Checks every field against its type/length/range constraint.
///
/// Returns at most one violation per field and never stops early.
pub fn validate_structure(
    tx: &StockTransaction,
    now: DateTime<Utc>,
    config: &ValidationConfig,
) -> Vec<Violation> {
    let mut c = Collector::default();

    c.check(validate_not_future("transactionDate", tx.transaction_date, now));
    c.check(validate_required_text(
        "description",
        &tx.description,
        config.description_min_length,
        DESCRIPTION_MAX_LENGTH,
    ));

    let optional_fields: [(&str, &Option<String>, usize); 15] = [
        ("referenceNumber", &tx.reference_number, NAME_MAX_LENGTH),
        ("materialCode", &tx.material_code, CODE_MAX_LENGTH),
        ("purchaseOrderNumber", &tx.purchase_order_number, CODE_MAX_LENGTH),
        ("vendorName", &tx.vendor_name, NAME_MAX_LENGTH),
        ("vendorContact", &tx.vendor_contact, NAME_MAX_LENGTH),
        ("supplier", &tx.supplier, NAME_MAX_LENGTH),
        ("sourceLocation", &tx.source_location, NAME_MAX_LENGTH),
        ("destinationLocation", &tx.destination_location, NAME_MAX_LENGTH),
        ("recipient", &tx.recipient, NAME_MAX_LENGTH),
        ("assetId", &tx.asset_id, NAME_MAX_LENGTH),
        ("assetName", &tx.asset_name, NAME_MAX_LENGTH),
        ("workOrderId", &tx.work_order_id, NAME_MAX_LENGTH),
        ("workOrderNumber", &tx.work_order_number, NAME_MAX_LENGTH),
        ("notes", &tx.notes, NOTES_MAX_LENGTH),
        ("internalNotes", &tx.internal_notes, NOTES_MAX_LENGTH),
    ];
    for (field, value, max) in optional_fields {
        c.check(validate_optional_text(field, value, max));
    }

    c.check(validate_item_count(tx.items.len(), config));

    let mut violations = c.finish();
    for (index, item) in tx.items.iter().enumerate() {
        violations.extend(validate_line_item(index, item, config));
    }
    if tx.total_cost().is_none() {
        violations.push(
            ValidationError::TooLarge {
                field: "items".to_string(),
            }
            .into(),
        );
    }
    violations
}

/// Checks one line item; fields are reported as `items[index].field`.
pub fn validate_line_item(index: usize, item: &LineItem, config: &ValidationConfig) -> Vec<Violation> {
    let path = |name: &str| format!("items[{}].{}", index, name);
    let mut c = Collector::default();

    if item.part_id.trim().is_empty() {
        c.push(ValidationError::Required {
            field: path("partId"),
        });
    }
    c.check(validate_required_text(&path("partNumber"), &item.part_number, 1, CODE_MAX_LENGTH));
    c.check(validate_required_text(&path("partName"), &item.part_name, 1, PART_NAME_MAX_LENGTH));
    c.check(validate_quantity(&path("quantity"), item.quantity, config));
    c.check(validate_non_negative(&path("unitCost"), item.unit_cost));
    c.check(validate_line_total(&path("totalCost"), item));
    c.check(validate_optional_text(&path("fromLocation"), &item.from_location, NAME_MAX_LENGTH));
    c.check(validate_optional_text(&path("toLocation"), &item.to_location, NAME_MAX_LENGTH));
    c.check(validate_optional_text(&path("notes"), &item.notes, LINE_NOTES_MAX_LENGTH));

    c.finish()
}

// =============================================================================
// Pass 2: Business Rules
// =============================================================================

/// Applies the cross-field rules keyed by transaction type.
///
/// Each rule is evaluated independently. The issue rule always reports on
/// `recipient`, whichever of the two alternatives the user meant to fill.
pub fn validate_business_rules(tx: &StockTransaction) -> Vec<Violation> {
    let mut c = Collector::default();

    match tx.transaction_type {
        TransactionType::Receipt => {
            if !is_filled(&tx.supplier) {
                c.push(ValidationError::RequiredFor {
                    field: "supplier".to_string(),
                    transaction_type: tx.transaction_type,
                });
            }
        }
        TransactionType::Issue => {
            if !is_filled(&tx.recipient) && !is_filled(&tx.destination_location) {
                c.push(ValidationError::RecipientOrDestinationRequired {
                    field: "recipient".to_string(),
                });
            }
        }
        TransactionType::Transfer => {
            let source = is_filled(&tx.source_location);
            let destination = is_filled(&tx.destination_location);

            if !source {
                c.push(ValidationError::RequiredFor {
                    field: "sourceLocation".to_string(),
                    transaction_type: tx.transaction_type,
                });
            }
            if !destination {
                c.push(ValidationError::RequiredFor {
                    field: "destinationLocation".to_string(),
                    transaction_type: tx.transaction_type,
                });
            }
            if source && destination && same_location(&tx.source_location, &tx.destination_location) {
                c.push(ValidationError::MustDiffer {
                    field: "destinationLocation".to_string(),
                    other: "sourceLocation".to_string(),
                });
            }
        }
        TransactionType::Adjustment | TransactionType::Scrap => {}
    }

    c.finish()
}

fn same_location(a: &Option<String>, b: &Option<String>) -> bool {
    a.as_deref().map(str::trim) == b.as_deref().map(str::trim)
}

// =============================================================================
// Pass 3: Stock Availability
// =============================================================================

/// Checks requested quantities against a stock snapshot.
///
/// Only outbound types (issue, scrap) are checked; everything else returns an
/// empty result. Lines for the same part draw from the same pool, in order.
///
/// ## Precedence per line
/// ```text
/// part missing from snapshot   → PartNotFound       (items[i].partId)
/// available == 0               → OutOfStock         (items[i].quantity)
/// available <  requested       → InsufficientStock  (items[i].quantity)
/// otherwise                    → consume; warn later if below min level
/// ```
///
/// The snapshot is never mutated and nothing is reserved.
pub fn validate_stock_availability(
    transaction_type: TransactionType,
    items: &[LineItem],
    snapshot: &StockSnapshot,
) -> AvailabilityCheck {
    let mut check = AvailabilityCheck::default();
    if !transaction_type.is_outbound() {
        return check;
    }

    let mut consumed: HashMap<&str, Quantity> = HashMap::new();

    for (index, item) in items.iter().enumerate() {
        let Some(part) = snapshot.get(&item.part_id) else {
            check.violations.push(
                ValidationError::PartNotFound {
                    field: format!("items[{}].partId", index),
                    part_id: item.part_id.clone(),
                }
                .into(),
            );
            continue;
        };

        // Non-positive quantities are a structural violation, not a draw on stock.
        if item.quantity.value() <= Decimal::ZERO {
            continue;
        }

        let already = consumed.get(item.part_id.as_str()).copied().unwrap_or_default();
        let available = part.quantity - already;
        let field = format!("items[{}].quantity", index);

        if available.value() <= Decimal::ZERO {
            check.violations.push(
                ValidationError::OutOfStock {
                    field,
                    part_number: part.part_number.clone(),
                }
                .into(),
            );
        } else if available < item.quantity {
            check.violations.push(
                ValidationError::InsufficientStock {
                    field,
                    part_number: part.part_number.clone(),
                    available,
                    requested: item.quantity,
                }
                .into(),
            );
        } else {
            *consumed.entry(item.part_id.as_str()).or_default() += item.quantity;
        }
    }

    for (part_id, used) in consumed_in_order(items, &consumed) {
        if let Some(part) = snapshot.get(part_id) {
            let remaining = part.quantity - used;
            if remaining < part.min_stock_level {
                check.warnings.push(StockWarning {
                    part_id: part.id.clone(),
                    part_number: part.part_number.clone(),
                    remaining,
                    min_stock_level: part.min_stock_level,
                });
            }
        }
    }

    check
}

/// Parts with consumption, in the order they first appear on the form.
fn consumed_in_order<'a>(
    items: &'a [LineItem],
    consumed: &HashMap<&'a str, Quantity>,
) -> Vec<(&'a str, Quantity)> {
    let mut seen: Vec<(&str, Quantity)> = Vec::new();
    for item in items {
        let id = item.part_id.as_str();
        if let Some(qty) = consumed.get(id) {
            if !seen.iter().any(|(s, _)| *s == id) {
                seen.push((id, *qty));
            }
        }
    }
    seen
}

// =============================================================================
// Full Rule Set
// =============================================================================

/// Runs every pass and combines the results.
///
/// Structural and business-rule violations always block. Availability is
/// only evaluated for issue/scrap. Low-stock warnings never block; they are
/// logged and returned separately.
pub fn validate(
    tx: &StockTransaction,
    snapshot: &StockSnapshot,
    now: DateTime<Utc>,
    config: &ValidationConfig,
) -> ValidationReport {
    let mut violations = validate_structure(tx, now, config);
    violations.extend(validate_business_rules(tx));

    let mut warnings = Vec::new();
    if tx.transaction_type.is_outbound() {
        let check = validate_stock_availability(tx.transaction_type, &tx.items, snapshot);
        violations.extend(check.violations);

        if config.low_stock_warnings {
            for w in check.warnings {
                warn!(
                    part_number = %w.part_number,
                    remaining = %w.remaining,
                    min_stock_level = %w.min_stock_level,
                    "Transaction leaves part below minimum stock level"
                );
                warnings.push(w);
            }
        }
    }

    debug!(
        transaction_type = %tx.transaction_type,
        items = tx.items.len(),
        violations = violations.len(),
        "Validated stock transaction"
    );

    ValidationReport {
        valid: violations.is_empty(),
        violations,
        warnings,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Part;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap()
    }

    fn part(id: &str, qty: Decimal, min: Decimal) -> Part {
        Part {
            id: id.to_string(),
            part_number: format!("PN-{}", id),
            name: format!("Part {}", id),
            quantity: Quantity::new(qty),
            min_stock_level: Quantity::new(min),
            unit_price: Money::new(dec!(12.50)),
            material_code: None,
            purchase_order_number: None,
            vendor_name: None,
            vendor_contact: None,
            supplier: None,
        }
    }

    fn line(part_id: &str, qty: Decimal) -> LineItem {
        LineItem::new(
            part_id,
            format!("PN-{}", part_id),
            format!("Part {}", part_id),
            Quantity::new(qty),
            Money::new(dec!(12.50)),
        )
    }

    /// A transaction that passes every rule for its type.
    fn valid_tx(transaction_type: TransactionType) -> StockTransaction {
        let mut tx = StockTransaction::new(transaction_type, now());
        tx.description = "Quarterly PM on chiller 2".to_string();
        tx.supplier = Some("Acme Industrial".to_string());
        tx.recipient = Some("HVAC crew".to_string());
        tx.source_location = Some("Main store".to_string());
        tx.destination_location = Some("Plant room B".to_string());
        tx.items.push(line("A", dec!(2)));
        tx
    }

    fn fields(violations: &[Violation]) -> Vec<&str> {
        violations.iter().map(|v| v.field.as_str()).collect()
    }

    #[test]
    fn test_valid_transactions_pass() {
        let snapshot = StockSnapshot::from_parts(vec![part("A", dec!(100), dec!(0))]);
        for tt in [
            TransactionType::Receipt,
            TransactionType::Issue,
            TransactionType::Transfer,
            TransactionType::Adjustment,
            TransactionType::Scrap,
        ] {
            let report = validate(&valid_tx(tt), &snapshot, now(), &ValidationConfig::default());
            assert!(report.valid, "{:?}: {:?}", tt, report.violations);
        }
    }

    #[test]
    fn test_receipt_requires_supplier() {
        let mut tx = valid_tx(TransactionType::Receipt);
        tx.supplier = Some("   ".to_string());

        let violations = validate_business_rules(&tx);
        assert_eq!(fields(&violations), vec!["supplier"]);
        assert_eq!(violations[0].kind, ViolationKind::BusinessRule);
    }

    #[test]
    fn test_issue_requires_recipient_or_destination() {
        let mut tx = valid_tx(TransactionType::Issue);
        tx.recipient = None;
        tx.destination_location = None;
        assert_eq!(fields(&validate_business_rules(&tx)), vec!["recipient"]);

        // Either alternative satisfies the rule
        tx.destination_location = Some("Workshop".to_string());
        assert!(validate_business_rules(&tx).is_empty());

        tx.destination_location = None;
        tx.recipient = Some("J. Okafor".to_string());
        assert!(validate_business_rules(&tx).is_empty());
    }

    #[test]
    fn test_transfer_requires_both_locations() {
        let mut tx = valid_tx(TransactionType::Transfer);
        tx.source_location = None;
        tx.destination_location = Some(String::new());

        assert_eq!(
            fields(&validate_business_rules(&tx)),
            vec!["sourceLocation", "destinationLocation"]
        );
    }

    #[test]
    fn test_transfer_same_locations_independent_of_other_fields() {
        let mut tx = valid_tx(TransactionType::Transfer);
        tx.source_location = Some("Main store".to_string());
        tx.destination_location = Some(" Main store ".to_string());
        tx.description = String::new();

        let report = validate(&tx, &StockSnapshot::default(), now(), &ValidationConfig::default());
        let differ: Vec<_> = report.violations_for("destinationLocation").collect();
        assert_eq!(differ.len(), 1);
        assert!(differ[0].message.contains("must be different"));
        // Missing description is reported separately
        assert_eq!(report.violations_for("description").count(), 1);
        assert_eq!(report.violations.len(), 2);
    }

    #[test]
    fn test_other_types_ignore_type_specific_fields() {
        for tt in [TransactionType::Adjustment, TransactionType::Scrap] {
            let mut tx = valid_tx(tt);
            tx.supplier = None;
            tx.recipient = None;
            tx.source_location = None;
            tx.destination_location = None;
            assert!(validate_business_rules(&tx).is_empty());
        }
    }

    #[test]
    fn test_item_count_bounds() {
        let config = ValidationConfig::default();
        let mut tx = valid_tx(TransactionType::Receipt);

        tx.items.clear();
        let violations = validate_structure(&tx, now(), &config);
        assert_eq!(fields(&violations), vec!["items"]);
        assert_eq!(violations[0].message, "At least one item is required");

        tx.items = (0..51).map(|_| line("A", dec!(1))).collect();
        let violations = validate_structure(&tx, now(), &config);
        assert_eq!(fields(&violations), vec!["items"]);
        assert_eq!(violations[0].message, "A transaction cannot exceed 50 items");

        tx.items.pop();
        assert!(validate_structure(&tx, now(), &config).is_empty());
    }

    #[test]
    fn test_future_date_rejected_but_now_accepted() {
        let config = ValidationConfig::default();
        let mut tx = valid_tx(TransactionType::Receipt);

        tx.transaction_date = now();
        assert!(validate_structure(&tx, now(), &config).is_empty());

        tx.transaction_date = now() + Duration::seconds(1);
        assert_eq!(fields(&validate_structure(&tx, now(), &config)), vec!["transactionDate"]);

        tx.transaction_date = now() - Duration::days(3);
        assert!(validate_structure(&tx, now(), &config).is_empty());
    }

    #[test]
    fn test_structure_collects_all_field_errors() {
        let mut tx = valid_tx(TransactionType::Receipt);
        tx.description = "abc".to_string();
        tx.material_code = Some("M".repeat(51));
        tx.notes = Some("n".repeat(1001));
        tx.items[0].part_number = String::new();
        tx.items[0].quantity = Quantity::zero();
        tx.items[0].unit_cost = Money::new(dec!(-1));

        let violations = validate_structure(&tx, now(), &ValidationConfig::default());
        assert_eq!(
            fields(&violations),
            vec![
                "description",
                "materialCode",
                "notes",
                "items[0].partNumber",
                "items[0].quantity",
                "items[0].unitCost",
                "items[0].totalCost",
            ]
        );
        assert!(violations.iter().all(|v| v.kind == ViolationKind::Structural));
    }

    #[test]
    fn test_quantity_bounds() {
        let config = ValidationConfig::default();
        assert!(validate_quantity("q", Quantity::new(dec!(0.01)), &config).is_ok());
        assert!(validate_quantity("q", Quantity::new(dec!(999999)), &config).is_ok());
        assert!(validate_quantity("q", Quantity::new(dec!(0.009)), &config).is_err());
        assert!(validate_quantity("q", Quantity::zero(), &config).is_err());
        assert!(validate_quantity("q", Quantity::new(dec!(-3)), &config).is_err());
        assert!(validate_quantity("q", Quantity::new(dec!(1000000)), &config).is_err());
    }

    #[test]
    fn test_text_length_boundaries() {
        let config = ValidationConfig::default();
        let cases: Vec<(&str, fn(&mut StockTransaction, String), usize, usize)> = vec![
            ("description", |tx, v| tx.description = v, 5, 500),
            ("supplier", |tx, v| tx.supplier = Some(v), 0, 100),
            ("materialCode", |tx, v| tx.material_code = Some(v), 0, 50),
            ("notes", |tx, v| tx.notes = Some(v), 0, 1000),
            ("items[0].partName", |tx, v| tx.items[0].part_name = v, 1, 200),
            ("items[0].notes", |tx, v| tx.items[0].notes = Some(v), 0, 500),
        ];

        for (field, set, min, max) in cases {
            let check = |len: usize| {
                let mut tx = valid_tx(TransactionType::Receipt);
                set(&mut tx, "x".repeat(len));
                validate_structure(&tx, now(), &config)
                    .into_iter()
                    .filter(|v| v.field == field)
                    .count()
            };

            assert_eq!(check(max), 0, "{} at {} chars", field, max);
            assert_eq!(check(max + 1), 1, "{} at {} chars", field, max + 1);
            if min > 1 {
                assert_eq!(check(min), 0, "{} at {} chars", field, min);
                assert_eq!(check(min - 1), 1, "{} at {} chars", field, min - 1);
            }
        }
    }

    #[test]
    fn test_description_length_ignores_surrounding_whitespace() {
        let config = ValidationConfig::default();
        let mut tx = valid_tx(TransactionType::Receipt);

        tx.description = "  Pump  ".to_string();
        assert_eq!(fields(&validate_structure(&tx, now(), &config)), vec!["description"]);

        tx.description = " Pumps ".to_string();
        assert!(validate_structure(&tx, now(), &config).is_empty());
    }

    #[test]
    fn test_oversized_quantity_is_reported_not_panicking() {
        let json = r#"{
            "partId": "A",
            "partNumber": "PN-A",
            "partName": "Part A",
            "quantity": "79228162514264337593543950335",
            "unitCost": "2",
            "totalCost": "0"
        }"#;
        let mut tx = valid_tx(TransactionType::Issue);
        tx.items = vec![serde_json::from_str(json).unwrap()];

        let violations = validate_structure(&tx, now(), &ValidationConfig::default());
        assert_eq!(fields(&violations), vec!["items[0].quantity", "items[0].totalCost"]);
        assert!(violations[1].message.contains("too large"));

        let snapshot = StockSnapshot::from_parts(vec![part("A", dec!(5), dec!(0))]);
        let report = validate(&tx, &snapshot, now(), &ValidationConfig::default());
        assert!(!report.valid);
        assert_eq!(report.violations_for("items[0].quantity").count(), 2);
    }

    #[test]
    fn test_overflowing_transaction_total_is_reported() {
        let mut tx = valid_tx(TransactionType::Receipt);
        tx.items = vec![line("A", dec!(1)), line("B", dec!(1))];
        for item in &mut tx.items {
            item.set_unit_cost(Money::new(Decimal::MAX));
        }

        let violations = validate_structure(&tx, now(), &ValidationConfig::default());
        assert_eq!(fields(&violations), vec!["items"]);
    }

    #[test]
    fn test_non_positive_quantity_does_not_draw_stock() {
        let snapshot = StockSnapshot::from_parts(vec![part("A", dec!(5), dec!(0))]);
        let items = vec![line("A", -Decimal::MAX), line("A", dec!(5))];

        let check = validate_stock_availability(TransactionType::Issue, &items, &snapshot);
        assert!(check.violations.is_empty());
    }

    #[test]
    fn test_stale_total_is_rejected() {
        let mut tx = valid_tx(TransactionType::Receipt);
        // Edited directly, bypassing set_quantity
        tx.items[0].quantity = Quantity::new(dec!(3));

        let violations = validate_structure(&tx, now(), &ValidationConfig::default());
        assert_eq!(fields(&violations), vec!["items[0].totalCost"]);
        assert!(violations[0].message.contains("37.5"));

        tx.items[0].recompute_total();
        assert!(validate_structure(&tx, now(), &ValidationConfig::default()).is_empty());
    }

    #[test]
    fn test_insufficient_stock_single_violation() {
        let snapshot = StockSnapshot::from_parts(vec![part("A", dec!(5), dec!(0))]);
        let items = vec![line("A", dec!(10))];

        let check = validate_stock_availability(TransactionType::Issue, &items, &snapshot);
        assert_eq!(check.violations.len(), 1);
        assert_eq!(check.violations[0].field, "items[0].quantity");
        assert_eq!(
            check.violations[0].message,
            "Insufficient stock for PN-A: available 5, requested 10"
        );

        let check = validate_stock_availability(TransactionType::Receipt, &items, &snapshot);
        assert!(check.violations.is_empty());
    }

    #[test]
    fn test_receipt_report_has_no_availability_violations() {
        let snapshot = StockSnapshot::from_parts(vec![part("A", dec!(5), dec!(0))]);
        let mut tx = valid_tx(TransactionType::Receipt);
        tx.items = vec![line("A", dec!(10))];

        let report = validate(&tx, &snapshot, now(), &ValidationConfig::default());
        assert!(report.valid);
        assert!(!report.has_kind(ViolationKind::Availability));
    }

    #[test]
    fn test_out_of_stock_takes_precedence() {
        let snapshot = StockSnapshot::from_parts(vec![part("A", dec!(0), dec!(2))]);
        let check = validate_stock_availability(TransactionType::Scrap, &[line("A", dec!(1))], &snapshot);

        assert_eq!(check.violations.len(), 1);
        assert_eq!(check.violations[0].message, "PN-A is out of stock");
    }

    #[test]
    fn test_part_not_found() {
        let check = validate_stock_availability(
            TransactionType::Issue,
            &[line("ghost", dec!(1))],
            &StockSnapshot::default(),
        );
        assert_eq!(check.violations.len(), 1);
        assert_eq!(check.violations[0].field, "items[0].partId");
        assert_eq!(check.violations[0].message, "Part ghost not found");
    }

    #[test]
    fn test_repeated_part_draws_from_same_pool() {
        let snapshot = StockSnapshot::from_parts(vec![part("A", dec!(5), dec!(0))]);
        let items = vec![line("A", dec!(3)), line("A", dec!(3)), line("A", dec!(2))];

        let check = validate_stock_availability(TransactionType::Issue, &items, &snapshot);
        assert_eq!(check.violations.len(), 1);
        assert_eq!(check.violations[0].field, "items[1].quantity");
        assert_eq!(
            check.violations[0].message,
            "Insufficient stock for PN-A: available 2, requested 3"
        );
    }

    #[test]
    fn test_low_stock_is_a_warning_not_a_violation() {
        let snapshot = StockSnapshot::from_parts(vec![part("A", dec!(10), dec!(5))]);
        let mut tx = valid_tx(TransactionType::Issue);
        tx.items = vec![line("A", dec!(7))];

        let report = validate(&tx, &snapshot, now(), &ValidationConfig::default());
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].remaining, Quantity::from_units(3));

        let quiet = ValidationConfig {
            low_stock_warnings: false,
            ..ValidationConfig::default()
        };
        assert!(validate(&tx, &snapshot, now(), &quiet).warnings.is_empty());
    }

    #[test]
    fn test_report_serializes_for_client() {
        let mut tx = valid_tx(TransactionType::Receipt);
        tx.supplier = None;
        let report = validate(&tx, &StockSnapshot::default(), now(), &ValidationConfig::default());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["violations"][0]["field"], "supplier");
        assert_eq!(json["violations"][0]["kind"], "business_rule");
    }
}
