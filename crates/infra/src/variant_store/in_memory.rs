use std::collections::HashSet;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use stockroll_core::VariantId;
use stockroll_inventory::Variant;

use super::r#trait::{VariantStore, VariantStoreError};

/// In-memory variant store.
///
/// Intended for tests/dev and for answering requests from a JSON snapshot of
/// the catalog collection.
///
/// Writers only ever push whole records, so a lock poisoned by a panicking
/// writer still guards consistent data; every accessor reads through it.
#[derive(Debug, Default)]
pub struct InMemoryVariantStore {
    variants: RwLock<Vec<Variant>>,
}

impl InMemoryVariantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_variants(variants: impl IntoIterator<Item = Variant>) -> Self {
        Self {
            variants: RwLock::new(variants.into_iter().collect()),
        }
    }

    /// Load a JSON array of catalog variant documents.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, VariantStoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| VariantStoreError::Snapshot(format!("{}: {e}", path.display())))?;
        let variants: Vec<Variant> = serde_json::from_str(&raw)
            .map_err(|e| VariantStoreError::Snapshot(format!("{}: {e}", path.display())))?;
        Ok(Self::from_variants(variants))
    }

    pub fn insert(&self, variant: Variant) {
        self.variants
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(variant);
    }

    pub fn len(&self) -> usize {
        self.variants
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl VariantStore for InMemoryVariantStore {
    async fn find_with_descendants(&self, ids: &[VariantId]) -> Result<Vec<Variant>, VariantStoreError> {
        let wanted: HashSet<&VariantId> = ids.iter().collect();
        let variants = self.variants.read().unwrap_or_else(PoisonError::into_inner);

        Ok(variants
            .iter()
            .filter(|v| wanted.contains(&v.id) || v.ancestors.iter().any(|a| wanted.contains(a)))
            .cloned()
            .collect())
    }
}
