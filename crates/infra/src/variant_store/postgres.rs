//! Postgres-backed variant store.
//!
//! Reads the `catalog_variants` table maintained by the catalog service:
//!
//! | column | type |
//! |--------|------|
//! | `id` | `TEXT PRIMARY KEY` |
//! | `ancestors` | `TEXT[] NOT NULL DEFAULT '{}'` (root first) |
//! | `inventory_in_stock` | `BIGINT NOT NULL DEFAULT 0` |
//! | `inventory_reserved` | `BIGINT NOT NULL DEFAULT 0` |
//! | `low_inventory_warning_threshold` | `BIGINT NULL` |
//! | `can_backorder` | `BOOLEAN NOT NULL DEFAULT FALSE` |
//! | `is_enabled` | `BOOLEAN NOT NULL DEFAULT TRUE` |
//!
//! A GIN index on `ancestors` keeps the `&&` overlap lookup cheap.
//!
//! ## Error Mapping
//!
//! | SQLx Error | VariantStoreError |
//! |------------|-------------------|
//! | `PoolClosed`, `PoolTimedOut`, `Io`, `Tls` | `Unavailable` |
//! | `ColumnDecode`, `Decode`, `ColumnNotFound` | `Decode` |
//! | `Database` and everything else | `Query` |

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::{Span, instrument};

use stockroll_core::VariantId;
use stockroll_inventory::Variant;

use super::r#trait::{VariantStore, VariantStoreError};

const FIND_WITH_DESCENDANTS: &str = r#"
    SELECT
        id,
        ancestors,
        inventory_in_stock,
        inventory_reserved,
        low_inventory_warning_threshold,
        can_backorder,
        is_enabled
    FROM catalog_variants
    WHERE id = ANY($1) OR ancestors && $1
"#;

/// Postgres-backed variant store.
///
/// `Send + Sync`; the SQLx pool handles connection sharing.
#[derive(Debug, Clone)]
pub struct PostgresVariantStore {
    pool: Arc<PgPool>,
}

impl PostgresVariantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, VariantStoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl VariantStore for PostgresVariantStore {
    #[instrument(skip(self, ids), fields(requested = ids.len(), fetched = tracing::field::Empty), err)]
    async fn find_with_descendants(&self, ids: &[VariantId]) -> Result<Vec<Variant>, VariantStoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();
        let rows = sqlx::query(FIND_WITH_DESCENDANTS)
            .bind(ids)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_with_descendants", e))?;

        let variants = rows.iter().map(variant_from_row).collect::<Result<Vec<_>, _>>()?;
        Span::current().record("fetched", variants.len());
        Ok(variants)
    }
}

fn variant_from_row(row: &PgRow) -> Result<Variant, VariantStoreError> {
    let decode = |e: sqlx::Error| map_sqlx_error("decode", e);

    let ancestors: Option<Vec<String>> = row.try_get("ancestors").map_err(decode)?;
    Ok(Variant {
        id: VariantId::new(row.try_get::<String, _>("id").map_err(decode)?),
        ancestors: ancestors
            .unwrap_or_default()
            .into_iter()
            .map(VariantId::new)
            .collect(),
        inventory_in_stock: row.try_get::<Option<i64>, _>("inventory_in_stock").map_err(decode)?.unwrap_or(0),
        inventory_reserved: row.try_get::<Option<i64>, _>("inventory_reserved").map_err(decode)?.unwrap_or(0),
        low_inventory_warning_threshold: row.try_get("low_inventory_warning_threshold").map_err(decode)?,
        can_backorder: row.try_get::<Option<bool>, _>("can_backorder").map_err(decode)?.unwrap_or(false),
        is_enabled: row.try_get::<Option<bool>, _>("is_enabled").map_err(decode)?.unwrap_or(true),
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> VariantStoreError {
    match err {
        sqlx::Error::PoolClosed => {
            VariantStoreError::Unavailable(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::PoolTimedOut => {
            VariantStoreError::Unavailable(format!("timed out acquiring a connection in {operation}"))
        }
        sqlx::Error::Io(e) => VariantStoreError::Unavailable(format!("io error in {operation}: {e}")),
        sqlx::Error::Tls(e) => VariantStoreError::Unavailable(format!("tls error in {operation}: {e}")),
        sqlx::Error::ColumnDecode { index, source } => {
            VariantStoreError::Decode(format!("column {index} in {operation}: {source}"))
        }
        sqlx::Error::ColumnNotFound(column) => {
            VariantStoreError::Decode(format!("missing column {column} in {operation}"))
        }
        sqlx::Error::Decode(e) => VariantStoreError::Decode(format!("{operation}: {e}")),
        sqlx::Error::Database(db_err) => {
            VariantStoreError::Query(format!("database error in {operation}: {}", db_err.message()))
        }
        other => VariantStoreError::Query(format!("{operation}: {other}")),
    }
}
