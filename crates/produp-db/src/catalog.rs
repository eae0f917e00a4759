//! Read-only queries over the `products` and `imported_products` tables.
//!
//! Both queries are scoped to a single owner and return rows in
//! `(created_at, id)` order so repeated runs see the same candidate order.

use chrono::{DateTime, Utc};
use produp_core::ProductSnapshot;
use rust_decimal::{prelude::ToPrimitive, Decimal};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `products` table (the user's primary catalog).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub sku: Option<String>,
    /// `NOT NULL` in the schema; cast to `NUMERIC` in the select list.
    pub price: Decimal,
    pub category: Option<String>,
    /// Single image per product in this table.
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub stock_quantity: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// A row from the `imported_products` table (supplier imports).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ImportedProductRow {
    pub id: Uuid,
    pub name: String,
    pub sku: Option<String>,
    pub suggested_price: Option<Decimal>,
    pub import_price: Option<Decimal>,
    pub category: Option<String>,
    pub image_urls: Option<Vec<String>>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub ai_score: Option<Decimal>,
    pub created_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Parses the caller-supplied owner id into the `uuid` the tables key on.
///
/// # Errors
///
/// Returns [`DbError::InvalidUserId`] if `user_id` is not a UUID.
pub fn parse_user_uuid(user_id: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(user_id).map_err(|_| DbError::InvalidUserId(user_id.to_string()))
}

/// Returns every `products` row owned by `user_id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_products_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<ProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ProductRow>(
        "SELECT id, name, sku, price::numeric AS price, category, image_url, \
                description, tags, stock_quantity, created_at \
         FROM products \
         WHERE user_id = $1 \
         ORDER BY created_at, id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns every `imported_products` row owned by `user_id`.
///
/// Rows with a `NULL` `created_at` sort last.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_imported_products_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<ImportedProductRow>, DbError> {
    let rows = sqlx::query_as::<_, ImportedProductRow>(
        "SELECT id, name, sku, \
                suggested_price::numeric AS suggested_price, \
                import_price::numeric AS import_price, \
                category, image_urls, description, tags, \
                ai_score::numeric AS ai_score, created_at \
         FROM imported_products \
         WHERE user_id = $1 \
         ORDER BY created_at NULLS LAST, id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Row -> snapshot conversion
// ---------------------------------------------------------------------------

impl From<ProductRow> for ProductSnapshot {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id.to_string(),
            name: row.name,
            sku: non_blank(row.sku),
            price: amount(Some(row.price)),
            category: non_blank(row.category),
            image_urls: image_list(row.image_url.into_iter().collect()),
            description: row.description.unwrap_or_default(),
            tags: row.tags.unwrap_or_default(),
            ai_score: 0.0,
            stock_quantity: row.stock_quantity.map_or(0, i64::from),
            created_at: Some(row.created_at),
        }
    }
}

impl From<ImportedProductRow> for ProductSnapshot {
    fn from(row: ImportedProductRow) -> Self {
        // Listing price wins; the supplier cost is only a fallback.
        let price = match amount(row.suggested_price) {
            p if p > 0.0 => p,
            _ => amount(row.import_price),
        };

        Self {
            id: row.id.to_string(),
            name: row.name,
            sku: non_blank(row.sku),
            price,
            category: non_blank(row.category),
            image_urls: image_list(row.image_urls.unwrap_or_default()),
            description: row.description.unwrap_or_default(),
            tags: row.tags.unwrap_or_default(),
            ai_score: amount(row.ai_score),
            stock_quantity: 0,
            created_at: row.created_at,
        }
    }
}

/// Missing, negative, or unrepresentable amounts read as zero.
fn amount(value: Option<Decimal>) -> f64 {
    value
        .and_then(|d| d.to_f64())
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(0.0)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn image_list(urls: Vec<String>) -> Vec<String> {
    urls.into_iter().filter(|u| !u.trim().is_empty()).collect()
}
