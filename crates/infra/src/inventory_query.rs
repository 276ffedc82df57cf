//! Async orchestration of a batch inventory request.
//!
//! `compute_inventory` is the caller-facing entry point: it resolves the
//! variant set with a single bulk fetch, builds the per-batch index and hands
//! the pure computation to the engine's worker pool.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use stockroll_core::VariantId;
use stockroll_inventory::{
    ConfigurationInventory, EngineError, InventoryEngine, InventoryFields, InventoryInfo,
    ProductConfiguration, Variant, VariantIndex,
};

use crate::config::InventoryConfig;
use crate::variant_store::{VariantStore, VariantStoreError};

#[derive(Debug, Error)]
pub enum InventoryQueryError {
    #[error(transparent)]
    StoreUnavailable(#[from] VariantStoreError),

    #[error("variant fetch timed out after {after:?}")]
    FetchTimedOut { after: Duration },

    /// The blocking computation task panicked or was cancelled.
    #[error("inventory worker failed: {0}")]
    Worker(String),
}

/// Everything a batch needs besides the request itself.
#[derive(Clone)]
pub struct InventoryContext {
    store: Arc<dyn VariantStore>,
    engine: Arc<InventoryEngine>,
    fetch_timeout: Duration,
}

impl std::fmt::Debug for InventoryContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryContext")
            .field("engine", &self.engine)
            .field("fetch_timeout", &self.fetch_timeout)
            .finish_non_exhaustive()
    }
}

impl InventoryContext {
    pub fn new(store: Arc<dyn VariantStore>, engine: Arc<InventoryEngine>) -> Self {
        Self {
            store,
            engine,
            fetch_timeout: InventoryConfig::default().fetch_timeout,
        }
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Context with the engine and timeout described by `config`.
    pub fn from_config(store: Arc<dyn VariantStore>, config: &InventoryConfig) -> Result<Self, EngineError> {
        let engine = config.build_engine()?;
        Ok(Self::new(store, Arc::new(engine)).with_fetch_timeout(config.fetch_timeout))
    }

    pub fn engine(&self) -> &InventoryEngine {
        &self.engine
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRequest {
    pub product_configurations: Vec<ProductConfiguration>,
    #[serde(default = "InventoryFields::all")]
    pub fields: InventoryFields,
    /// Pre-resolved variant set; when present the store is not consulted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<Variant>>,
}

impl InventoryRequest {
    pub fn new(product_configurations: Vec<ProductConfiguration>, fields: InventoryFields) -> Self {
        Self {
            product_configurations,
            fields,
            variants: None,
        }
    }

    pub fn with_variants(mut self, variants: Vec<Variant>) -> Self {
        self.variants = Some(variants);
        self
    }
}

/// Compute inventory for every configuration in `request`, in input order.
///
/// Any store failure or a fetch exceeding the context's timeout fails the
/// whole batch. Configurations whose variant is not found get `DEFAULT_INFO`.
#[instrument(
    skip(context, request),
    fields(configurations = request.product_configurations.len(), fields = ?request.fields)
)]
pub async fn compute_inventory(
    context: &InventoryContext,
    request: InventoryRequest,
) -> Result<Vec<ConfigurationInventory>, InventoryQueryError> {
    let InventoryRequest {
        product_configurations,
        fields,
        variants,
    } = request;

    if product_configurations.is_empty() {
        return Ok(Vec::new());
    }

    let variants = match variants {
        Some(variants) => {
            debug!(supplied = variants.len(), "using caller-supplied variants");
            variants
        }
        None => fetch_variants(context, &product_configurations).await?,
    };

    let engine = Arc::clone(&context.engine);
    let span = tracing::Span::current();

    tokio::task::spawn_blocking(move || {
        span.in_scope(|| {
            let index = VariantIndex::build(variants);
            let unresolved = product_configurations
                .iter()
                .filter(|c| index.get(&c.variant_id).is_none())
                .count();
            if unresolved > 0 {
                debug!(unresolved, "configurations reference unknown variants; using defaults");
            }
            engine.compute_batch(&product_configurations, &fields, &index)
        })
    })
    .await
    .map_err(|e| InventoryQueryError::Worker(e.to_string()))
}

/// Single-configuration convenience over [`compute_inventory`].
pub async fn compute_inventory_for_configuration(
    context: &InventoryContext,
    configuration: ProductConfiguration,
    fields: InventoryFields,
) -> Result<InventoryInfo, InventoryQueryError> {
    let mut results =
        compute_inventory(context, InventoryRequest::new(vec![configuration], fields)).await?;
    Ok(results
        .pop()
        .map(|r| r.inventory_info)
        .unwrap_or(stockroll_inventory::DEFAULT_INFO))
}

async fn fetch_variants(
    context: &InventoryContext,
    configurations: &[ProductConfiguration],
) -> Result<Vec<Variant>, InventoryQueryError> {
    let mut seen = HashSet::new();
    let ids: Vec<VariantId> = configurations
        .iter()
        .filter(|c| seen.insert(&c.variant_id))
        .map(|c| c.variant_id.clone())
        .collect();

    let after = context.fetch_timeout;
    match tokio::time::timeout(after, context.store.find_with_descendants(&ids)).await {
        Ok(result) => {
            let variants = result?;
            debug!(requested = ids.len(), fetched = variants.len(), "resolved variants");
            Ok(variants)
        }
        Err(_) => {
            warn!(?after, requested = ids.len(), "variant fetch timed out");
            Err(InventoryQueryError::FetchTimedOut { after })
        }
    }
}
