use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use stockroll_core::VariantId;
use stockroll_inventory::Variant;

/// Variant store operation error.
///
/// Any of these aborts the whole batch that triggered the fetch.
#[derive(Debug, Error)]
pub enum VariantStoreError {
    /// Backend unreachable (connection refused, pool closed or exhausted).
    #[error("variant store unavailable: {0}")]
    Unavailable(String),

    #[error("variant query failed: {0}")]
    Query(String),

    #[error("failed to decode variant record: {0}")]
    Decode(String),

    /// Snapshot file could not be read or parsed.
    #[error("variant snapshot error: {0}")]
    Snapshot(String),
}

/// Read-only access to catalog variants.
///
/// ## Contract
///
/// `find_with_descendants(ids)` returns, in **one** round trip, every record
/// whose `_id` is in `ids` **or** whose `ancestors` contain any of `ids`: the
/// named variants plus all their options. Callers must never fall back to one
/// query per configuration.
///
/// Missing ids are not an error; they are simply absent from the result.
#[async_trait]
pub trait VariantStore: Send + Sync {
    async fn find_with_descendants(&self, ids: &[VariantId]) -> Result<Vec<Variant>, VariantStoreError>;
}

#[async_trait]
impl<S> VariantStore for Arc<S>
where
    S: VariantStore + ?Sized,
{
    async fn find_with_descendants(&self, ids: &[VariantId]) -> Result<Vec<Variant>, VariantStoreError> {
        (**self).find_with_descendants(ids).await
    }
}
