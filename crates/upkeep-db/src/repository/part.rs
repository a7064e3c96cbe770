//! # Part Repository
//!
//! Database operations for spare parts and their stock levels.
//!
//! ## Key Operations
//! - CRUD lookups (by ID, by part number)
//! - Stock snapshots for the validator
//! - Reorder report (parts below minimum stock)
//!
//! ## Stock Columns
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  parts                                                                  │
//! │                                                                         │
//! │  quantity         TEXT  "12.5"   ← Decimal, exact                       │
//! │  min_stock_level  TEXT  "4"                                             │
//! │  unit_price       TEXT  "8.99"                                          │
//! │  version          INT   7        ← bumped on every stock movement       │
//! │                                                                         │
//! │  Only StockTransactionRepository::submit writes quantity/version.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use upkeep_core::{Money, Part, Quantity, StockSnapshot};

const PART_COLUMNS: &str = "id, part_number, name, quantity, min_stock_level, unit_price, \
     material_code, purchase_order_number, vendor_name, vendor_contact, supplier, version";

// =============================================================================
// Row Mapping
// =============================================================================

/// Raw `parts` row; decimals still in TEXT form.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PartRow {
    id: String,
    part_number: String,
    name: String,
    quantity: String,
    min_stock_level: String,
    unit_price: String,
    material_code: Option<String>,
    purchase_order_number: Option<String>,
    vendor_name: Option<String>,
    vendor_contact: Option<String>,
    supplier: Option<String>,
    pub(crate) version: i64,
}

impl PartRow {
    pub(crate) fn into_part(self) -> DbResult<Part> {
        Ok(Part {
            quantity: parse_decimal("parts.quantity", &self.quantity)?,
            min_stock_level: parse_decimal("parts.min_stock_level", &self.min_stock_level)?,
            unit_price: parse_decimal::<Money>("parts.unit_price", &self.unit_price)?,
            id: self.id,
            part_number: self.part_number,
            name: self.name,
            material_code: self.material_code,
            purchase_order_number: self.purchase_order_number,
            vendor_name: self.vendor_name,
            vendor_contact: self.vendor_contact,
            supplier: self.supplier,
        })
    }
}

/// Parses a TEXT decimal column into a domain value.
pub(crate) fn parse_decimal<T: FromStr>(column: &str, value: &str) -> DbResult<T> {
    value.parse().map_err(|_| DbError::decode(column, value))
}

/// Loads parts together with their current version.
///
/// Takes a bare connection so submission can read inside its own transaction.
pub(crate) async fn fetch_versioned(
    conn: &mut SqliteConnection,
    part_ids: &[String],
) -> DbResult<Vec<(Part, i64)>> {
    if part_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {} FROM parts WHERE id IN (", PART_COLUMNS));
    let mut ids = qb.separated(", ");
    for id in part_ids {
        ids.push_bind(id.as_str());
    }
    ids.push_unseparated(")");

    let rows = qb.build_query_as::<PartRow>().fetch_all(&mut *conn).await?;

    rows.into_iter()
        .map(|row| {
            let version = row.version;
            row.into_part().map(|part| (part, version))
        })
        .collect()
}

/// Generates a new part ID.
pub fn generate_part_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for part database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.parts();
///
/// let part = repo.get_by_part_number("BRG-6204").await?;
/// let snapshot = repo.snapshot(&["uuid-1".into(), "uuid-2".into()]).await?;
/// ```
#[derive(Debug, Clone)]
pub struct PartRepository {
    pool: SqlitePool,
}

impl PartRepository {
    /// Creates a new PartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PartRepository { pool }
    }

    /// Inserts a part with its opening stock.
    ///
    /// ## Errors
    /// [`DbError::UniqueViolation`] if the part number is taken.
    pub async fn insert(&self, part: &Part) -> DbResult<()> {
        debug!(id = %part.id, part_number = %part.part_number, "Inserting part");
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO parts (
                id, part_number, name,
                quantity, min_stock_level, unit_price,
                material_code, purchase_order_number, vendor_name, vendor_contact, supplier,
                version, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3,
                ?4, ?5, ?6,
                ?7, ?8, ?9, ?10, ?11,
                0, ?12, ?12
            )
            "#,
        )
        .bind(&part.id)
        .bind(&part.part_number)
        .bind(&part.name)
        .bind(part.quantity.value().to_string())
        .bind(part.min_stock_level.value().to_string())
        .bind(part.unit_price.amount().to_string())
        .bind(&part.material_code)
        .bind(&part.purchase_order_number)
        .bind(&part.vendor_name)
        .bind(&part.vendor_contact)
        .bind(&part.supplier)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, part.part_number.clone()),
            other => other,
        })?;

        Ok(())
    }

    /// Gets a part by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Part>> {
        let row: Option<PartRow> = sqlx::query_as(&format!("SELECT {} FROM parts WHERE id = ?1", PART_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(PartRow::into_part).transpose()
    }

    /// Gets a part by its part number (case-sensitive).
    pub async fn get_by_part_number(&self, part_number: &str) -> DbResult<Option<Part>> {
        let row: Option<PartRow> =
            sqlx::query_as(&format!("SELECT {} FROM parts WHERE part_number = ?1", PART_COLUMNS))
                .bind(part_number.trim())
                .fetch_optional(&self.pool)
                .await?;

        row.map(PartRow::into_part).transpose()
    }

    /// Builds a stock snapshot for the given parts.
    ///
    /// Unknown IDs are simply absent from the snapshot; the validator
    /// reports them as "part not found".
    pub async fn snapshot(&self, part_ids: &[String]) -> DbResult<StockSnapshot> {
        let mut conn = self.pool.acquire().await?;
        let parts = fetch_versioned(&mut conn, part_ids).await?;
        debug!(requested = part_ids.len(), found = parts.len(), "Loaded stock snapshot");

        Ok(StockSnapshot::from_parts(parts.into_iter().map(|(part, _)| part)))
    }

    /// Lists parts whose on-hand quantity is below their minimum stock level.
    ///
    /// Comparison happens on exact decimals, so it is done here rather than
    /// in SQL (the columns are TEXT).
    pub async fn list_below_min_stock(&self) -> DbResult<Vec<Part>> {
        let rows: Vec<PartRow> =
            sqlx::query_as(&format!("SELECT {} FROM parts ORDER BY part_number", PART_COLUMNS))
                .fetch_all(&self.pool)
                .await?;

        let mut below = Vec::new();
        for row in rows {
            let part = row.into_part()?;
            if part.quantity < part.min_stock_level {
                below.push(part);
            }
        }

        debug!(count = below.len(), "Parts below minimum stock");
        Ok(below)
    }

    /// Counts all parts.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM parts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Current on-hand quantity for a part.
    pub async fn quantity_on_hand(&self, id: &str) -> DbResult<Quantity> {
        let value: Option<String> = sqlx::query_scalar("SELECT quantity FROM parts WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match value {
            Some(v) => parse_decimal("parts.quantity", &v),
            None => Err(DbError::not_found("Part", id)),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use rust_decimal_macros::dec;

    fn spare(part_number: &str, qty: rust_decimal::Decimal, min: rust_decimal::Decimal) -> Part {
        Part {
            id: generate_part_id(),
            part_number: part_number.to_string(),
            name: format!("Spare {}", part_number),
            quantity: Quantity::new(qty),
            min_stock_level: Quantity::new(min),
            unit_price: Money::new(dec!(8.99)),
            material_code: Some("MAT-01".to_string()),
            purchase_order_number: None,
            vendor_name: Some("Acme Industrial".to_string()),
            vendor_contact: None,
            supplier: None,
        }
    }

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get_preserves_decimals() {
        let db = db().await;
        let part = spare("HOSE-12", dec!(2.75), dec!(0.5));
        db.parts().insert(&part).await.unwrap();

        let loaded = db.parts().get_by_id(&part.id).await.unwrap().unwrap();
        assert_eq!(loaded, part);

        let by_number = db.parts().get_by_part_number("HOSE-12").await.unwrap().unwrap();
        assert_eq!(by_number.id, part.id);
        assert!(db.parts().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_part_number() {
        let db = db().await;
        db.parts().insert(&spare("BRG-6204", dec!(1), dec!(0))).await.unwrap();

        let err = db.parts().insert(&spare("BRG-6204", dec!(1), dec!(0))).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { ref value, .. } if value == "BRG-6204"));
        assert_eq!(db.parts().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_skips_unknown_ids() {
        let db = db().await;
        let a = spare("A-1", dec!(5), dec!(1));
        let b = spare("B-1", dec!(0), dec!(1));
        db.parts().insert(&a).await.unwrap();
        db.parts().insert(&b).await.unwrap();

        let snapshot = db
            .parts()
            .snapshot(&[a.id.clone(), "ghost".to_string()])
            .await
            .unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.available(&a.id), Some(Quantity::new(dec!(5))));
        assert!(snapshot.get("ghost").is_none());

        assert!(db.parts().snapshot(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_below_min_stock() {
        let db = db().await;
        db.parts().insert(&spare("OK-1", dec!(10), dec!(2))).await.unwrap();
        db.parts().insert(&spare("LOW-1", dec!(1.5), dec!(2))).await.unwrap();
        db.parts().insert(&spare("EDGE-1", dec!(2), dec!(2))).await.unwrap();

        let low = db.parts().list_below_min_stock().await.unwrap();
        let numbers: Vec<_> = low.iter().map(|p| p.part_number.as_str()).collect();
        assert_eq!(numbers, vec!["LOW-1"]);
    }

    #[tokio::test]
    async fn test_quantity_on_hand() {
        let db = db().await;
        let part = spare("V-BELT", dec!(3), dec!(1));
        db.parts().insert(&part).await.unwrap();

        assert_eq!(db.parts().quantity_on_hand(&part.id).await.unwrap(), Quantity::from_units(3));
        assert!(matches!(
            db.parts().quantity_on_hand("nope").await,
            Err(DbError::NotFound { .. })
        ));
    }
}
