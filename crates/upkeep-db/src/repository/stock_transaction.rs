//! # Stock Transaction Repository
//!
//! Posts stock transactions and applies their movement to part stock.
//!
//! ## Submission
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  submit(tx, now, config)                                │
//! │                                                                         │
//! │  1. Structure + business rules    ──fail──► SubmitError::Invalid        │
//! │                                                                         │
//! │  2. BEGIN IMMEDIATE (concurrent posters queue on the write lock)        │
//! │     ├── fresh snapshot of referenced parts (with version)               │
//! │     ├── full re-validation        ──fail──► SubmitError::StockConflict  │
//! │     ├── per part:                                                       │
//! │     │     UPDATE parts SET quantity = ?, version = version + 1          │
//! │     │     WHERE id = ? AND version = ?                                  │
//! │     │     0 rows ──────────────────────────► SubmitError::StockConflict │
//! │     ├── INSERT header (TXN-YYYYMMDD-NNNN)                               │
//! │     └── INSERT items                                                    │
//! │  3. COMMIT                                                              │
//! │                                                                         │
//! │  Any early return drops the transaction: nothing is written.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stock Movement
//! ```text
//! receipt     on_hand + requested
//! issue       on_hand - requested
//! scrap       on_hand - requested
//! transfer    unchanged (stock moves between locations, total is the same)
//! adjustment  counted quantity replaces on_hand
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbResult, SubmitError, SubmitResult};
use crate::repository::part::{fetch_versioned, parse_decimal};
use upkeep_core::validation::{validate_business_rules, validate_structure};
use upkeep_core::{
    validate, LineItem, Money, Priority, Quantity, RecipientType, StockSnapshot, StockTransaction,
    StockWarning, TransactionType, ValidationConfig, ValidationError, ViolationKind,
};

const HEADER_COLUMNS: &str = "id, transaction_number, transaction_type, transaction_date, \
     reference_number, description, material_code, purchase_order_number, vendor_name, \
     vendor_contact, supplier, source_location, destination_location, recipient, recipient_type, \
     asset_id, asset_name, work_order_id, work_order_number, priority, total_cost, notes, \
     internal_notes, created_at";

// =============================================================================
// Records
// =============================================================================

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct PostedTransaction {
    pub id: String,
    pub transaction_number: String,
    pub total_cost: Money,
    /// Parts left below their minimum stock level by this transaction.
    pub warnings: Vec<StockWarning>,
}

/// A posted transaction as read back from the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTransaction {
    pub id: String,
    pub transaction_number: String,
    pub created_at: DateTime<Utc>,
    pub total_cost: Money,
    pub transaction: StockTransaction,
}

/// One row of the recent-activity list.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionSummary {
    pub id: String,
    pub transaction_number: String,
    pub transaction_type: TransactionType,
    pub transaction_date: DateTime<Utc>,
    pub description: String,
    pub total_cost: Money,
    pub item_count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct HeaderRow {
    id: String,
    transaction_number: String,
    transaction_type: TransactionType,
    transaction_date: DateTime<Utc>,
    reference_number: Option<String>,
    description: String,
    material_code: Option<String>,
    purchase_order_number: Option<String>,
    vendor_name: Option<String>,
    vendor_contact: Option<String>,
    supplier: Option<String>,
    source_location: Option<String>,
    destination_location: Option<String>,
    recipient: Option<String>,
    recipient_type: Option<RecipientType>,
    asset_id: Option<String>,
    asset_name: Option<String>,
    work_order_id: Option<String>,
    work_order_number: Option<String>,
    priority: Priority,
    total_cost: String,
    notes: Option<String>,
    internal_notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl HeaderRow {
    fn into_stored(self, items: Vec<LineItem>) -> DbResult<StoredTransaction> {
        Ok(StoredTransaction {
            total_cost: parse_decimal("stock_transactions.total_cost", &self.total_cost)?,
            id: self.id,
            transaction_number: self.transaction_number,
            created_at: self.created_at,
            transaction: StockTransaction {
                transaction_type: self.transaction_type,
                transaction_date: self.transaction_date,
                reference_number: self.reference_number,
                description: self.description,
                material_code: self.material_code,
                purchase_order_number: self.purchase_order_number,
                vendor_name: self.vendor_name,
                vendor_contact: self.vendor_contact,
                supplier: self.supplier,
                source_location: self.source_location,
                destination_location: self.destination_location,
                recipient: self.recipient,
                recipient_type: self.recipient_type,
                asset_id: self.asset_id,
                asset_name: self.asset_name,
                work_order_id: self.work_order_id,
                work_order_number: self.work_order_number,
                items,
                priority: self.priority,
                notes: self.notes,
                internal_notes: self.internal_notes,
            },
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    part_id: String,
    part_number: String,
    part_name: String,
    quantity: String,
    unit_cost: String,
    total_cost: String,
    from_location: Option<String>,
    to_location: Option<String>,
    notes: Option<String>,
}

impl ItemRow {
    fn into_line_item(self) -> DbResult<LineItem> {
        Ok(LineItem {
            quantity: parse_decimal("stock_transaction_items.quantity", &self.quantity)?,
            unit_cost: parse_decimal::<Money>("stock_transaction_items.unit_cost", &self.unit_cost)?,
            total_cost: parse_decimal::<Money>("stock_transaction_items.total_cost", &self.total_cost)?,
            part_id: self.part_id,
            part_number: self.part_number,
            part_name: self.part_name,
            from_location: self.from_location,
            to_location: self.to_location,
            notes: self.notes,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    id: String,
    transaction_number: String,
    transaction_type: TransactionType,
    transaction_date: DateTime<Utc>,
    description: String,
    total_cost: String,
    item_count: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for stock transaction database operations.
#[derive(Debug, Clone)]
pub struct StockTransactionRepository {
    pool: SqlitePool,
}

impl StockTransactionRepository {
    /// Creates a new StockTransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockTransactionRepository { pool }
    }

    /// Validates and posts a stock transaction atomically.
    ///
    /// The client's snapshot is never trusted: stock is re-read and the full
    /// rule set re-run inside the database transaction.
    ///
    /// ## Errors
    /// - [`SubmitError::Invalid`]: field or business-rule violations
    /// - [`SubmitError::StockConflict`]: stock changed since the client looked
    ///   (retryable after re-fetching)
    /// - [`SubmitError::Database`]: infrastructure failure
    pub async fn submit(
        &self,
        tx: &StockTransaction,
        now: DateTime<Utc>,
        config: &ValidationConfig,
    ) -> SubmitResult<PostedTransaction> {
        // Field-level problems never need the database
        let mut violations = validate_structure(tx, now, config);
        violations.extend(validate_business_rules(tx));
        if !violations.is_empty() {
            debug!(count = violations.len(), "Rejecting invalid stock transaction");
            return Err(SubmitError::Invalid(violations));
        }

        let requested = tx.quantities_by_part();
        let part_ids: Vec<String> = requested.iter().map(|(id, _)| id.clone()).collect();

        // Take the write lock before reading stock. A deferred transaction
        // would let two posters read the same levels and then fail the loser
        // with SQLITE_BUSY instead of re-validating it.
        let mut db_tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let versioned = fetch_versioned(&mut db_tx, &part_ids).await?;
        let snapshot = StockSnapshot::from_parts(versioned.iter().map(|(part, _)| part.clone()));

        // Every referenced part must still exist, whatever the type
        if let Some((part_id, qty)) = requested.iter().find(|(id, _)| snapshot.get(id).is_none()) {
            warn!(part_id = %part_id, "Referenced part no longer exists");
            return Err(SubmitError::StockConflict {
                part_id: part_id.clone(),
                available: Quantity::zero(),
                requested: *qty,
            });
        }

        let report = validate(tx, &snapshot, now, config);
        if !report.valid {
            if report.has_kind(ViolationKind::Structural) || report.has_kind(ViolationKind::BusinessRule) {
                return Err(SubmitError::Invalid(report.violations));
            }
            return Err(first_shortfall(&requested, &snapshot));
        }

        let stamp = now;
        for (part, version) in versioned.iter().map(|(p, v)| (p, *v)) {
            let Some((_, qty)) = requested.iter().find(|(id, _)| *id == part.id) else {
                continue;
            };

            let new_quantity = match tx.transaction_type {
                TransactionType::Receipt => part.quantity + *qty,
                TransactionType::Issue | TransactionType::Scrap => {
                    match part.quantity.checked_take(*qty) {
                        Some(remaining) => remaining,
                        None => {
                            return Err(SubmitError::StockConflict {
                                part_id: part.id.clone(),
                                available: part.quantity,
                                requested: *qty,
                            })
                        }
                    }
                }
                TransactionType::Adjustment => *qty,
                TransactionType::Transfer => continue,
            };

            let result = sqlx::query(
                r#"
                UPDATE parts SET
                    quantity = ?1,
                    version = version + 1,
                    updated_at = ?2
                WHERE id = ?3 AND version = ?4
                "#,
            )
            .bind(new_quantity.value().to_string())
            .bind(stamp)
            .bind(&part.id)
            .bind(version)
            .execute(&mut *db_tx)
            .await?;

            if result.rows_affected() == 0 {
                warn!(part_id = %part.id, version, "Lost stock update race");
                return Err(SubmitError::StockConflict {
                    part_id: part.id.clone(),
                    available: part.quantity,
                    requested: *qty,
                });
            }

            debug!(
                part_number = %part.part_number,
                from = %part.quantity,
                to = %new_quantity,
                "Stock level updated"
            );
        }

        let id = Uuid::new_v4().to_string();
        let transaction_number = next_transaction_number(&mut db_tx, now).await?;
        let total_cost = tx.total_cost().ok_or_else(|| {
            SubmitError::Invalid(vec![ValidationError::TooLarge {
                field: "items".to_string(),
            }
            .into()])
        })?;

        insert_header(&mut db_tx, &id, &transaction_number, tx, total_cost, stamp).await?;
        for (line_number, item) in tx.items.iter().enumerate() {
            insert_item(&mut db_tx, &id, line_number as i64 + 1, item).await?;
        }

        db_tx.commit().await?;

        info!(
            id = %id,
            transaction_number = %transaction_number,
            transaction_type = %tx.transaction_type,
            items = tx.items.len(),
            total_cost = %total_cost,
            "Stock transaction posted"
        );

        Ok(PostedTransaction {
            id,
            transaction_number,
            total_cost,
            warnings: report.warnings,
        })
    }

    /// Gets a posted transaction with its line items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<StoredTransaction>> {
        let header: Option<HeaderRow> =
            sqlx::query_as(&format!("SELECT {} FROM stock_transactions WHERE id = ?1", HEADER_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match header {
            Some(header) => {
                let items = self.get_items(id).await?;
                header.into_stored(items).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Gets the line items of a transaction, in entry order.
    pub async fn get_items(&self, transaction_id: &str) -> DbResult<Vec<LineItem>> {
        let rows: Vec<ItemRow> = sqlx::query_as(
            r#"
            SELECT
                part_id, part_number, part_name,
                quantity, unit_cost, total_cost,
                from_location, to_location, notes
            FROM stock_transaction_items
            WHERE transaction_id = ?1
            ORDER BY line_number
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ItemRow::into_line_item).collect()
    }

    /// Lists the most recent transactions, newest first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<TransactionSummary>> {
        let rows: Vec<SummaryRow> = sqlx::query_as(
            r#"
            SELECT
                t.id,
                t.transaction_number,
                t.transaction_type,
                t.transaction_date,
                t.description,
                t.total_cost,
                (SELECT COUNT(*) FROM stock_transaction_items i WHERE i.transaction_id = t.id) AS item_count
            FROM stock_transactions t
            ORDER BY t.transaction_date DESC, t.created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(TransactionSummary {
                    total_cost: parse_decimal("stock_transactions.total_cost", &row.total_cost)?,
                    id: row.id,
                    transaction_number: row.transaction_number,
                    transaction_type: row.transaction_type,
                    transaction_date: row.transaction_date,
                    description: row.description,
                    item_count: row.item_count,
                })
            })
            .collect()
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Builds the conflict for the first part whose stock cannot cover the request.
fn first_shortfall(requested: &[(String, Quantity)], snapshot: &StockSnapshot) -> SubmitError {
    let shortfall = requested.iter().find_map(|(id, qty)| {
        let available = snapshot.available(id).unwrap_or_default();
        (available < *qty).then(|| (id.clone(), available, *qty))
    });

    match shortfall {
        Some((part_id, available, requested)) => {
            warn!(part_id = %part_id, %available, %requested, "Stock no longer covers request");
            SubmitError::StockConflict {
                part_id,
                available,
                requested,
            }
        }
        None => {
            let (part_id, qty) = requested
                .first()
                .cloned()
                .unwrap_or_else(|| (String::new(), Quantity::zero()));
            SubmitError::StockConflict {
                available: snapshot.available(&part_id).unwrap_or_default(),
                part_id,
                requested: qty,
            }
        }
    }
}

/// Generates the next transaction number for the day: `TXN-YYYYMMDD-NNNN`.
///
/// Runs inside the posting transaction so numbers are gap-free per day.
async fn next_transaction_number(conn: &mut SqliteConnection, date: DateTime<Utc>) -> DbResult<String> {
    let prefix = format!("TXN-{}-", date.format("%Y%m%d"));

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM stock_transactions WHERE transaction_number LIKE ?1 || '%'",
    )
    .bind(&prefix)
    .fetch_one(&mut *conn)
    .await?;

    Ok(format!("{}{:04}", prefix, count + 1))
}

async fn insert_header(
    conn: &mut SqliteConnection,
    id: &str,
    transaction_number: &str,
    tx: &StockTransaction,
    total_cost: Money,
    created_at: DateTime<Utc>,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_transactions (
            id, transaction_number, transaction_type, transaction_date,
            reference_number, description,
            material_code, purchase_order_number, vendor_name, vendor_contact, supplier,
            source_location, destination_location, recipient, recipient_type,
            asset_id, asset_name, work_order_id, work_order_number,
            priority, total_cost, notes, internal_notes, created_at
        ) VALUES (
            ?1, ?2, ?3, ?4,
            ?5, ?6,
            ?7, ?8, ?9, ?10, ?11,
            ?12, ?13, ?14, ?15,
            ?16, ?17, ?18, ?19,
            ?20, ?21, ?22, ?23, ?24
        )
        "#,
    )
    .bind(id)
    .bind(transaction_number)
    .bind(tx.transaction_type)
    .bind(tx.transaction_date)
    .bind(&tx.reference_number)
    .bind(tx.description.trim())
    .bind(&tx.material_code)
    .bind(&tx.purchase_order_number)
    .bind(&tx.vendor_name)
    .bind(&tx.vendor_contact)
    .bind(&tx.supplier)
    .bind(&tx.source_location)
    .bind(&tx.destination_location)
    .bind(&tx.recipient)
    .bind(tx.recipient_type)
    .bind(&tx.asset_id)
    .bind(&tx.asset_name)
    .bind(&tx.work_order_id)
    .bind(&tx.work_order_number)
    .bind(tx.priority)
    .bind(total_cost.amount().to_string())
    .bind(&tx.notes)
    .bind(&tx.internal_notes)
    .bind(created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn insert_item(
    conn: &mut SqliteConnection,
    transaction_id: &str,
    line_number: i64,
    item: &LineItem,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_transaction_items (
            id, transaction_id, line_number,
            part_id, part_number, part_name,
            quantity, unit_cost, total_cost,
            from_location, to_location, notes
        ) VALUES (
            ?1, ?2, ?3,
            ?4, ?5, ?6,
            ?7, ?8, ?9,
            ?10, ?11, ?12
        )
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(transaction_id)
    .bind(line_number)
    .bind(&item.part_id)
    .bind(&item.part_number)
    .bind(&item.part_name)
    .bind(item.quantity.value().to_string())
    .bind(item.unit_cost.amount().to_string())
    .bind(item.total_cost.amount().to_string())
    .bind(&item.from_location)
    .bind(&item.to_location)
    .bind(&item.notes)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
