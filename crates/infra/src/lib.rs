//! Infrastructure layer: variant stores, configuration, async orchestration.

pub mod config;
pub mod inventory_query;
pub mod variant_store;


pub use config::{ConfigError, InventoryConfig};
pub use inventory_query::{
    InventoryContext, InventoryQueryError, InventoryRequest, compute_inventory,
    compute_inventory_for_configuration,
};
pub use variant_store::{InMemoryVariantStore, PostgresVariantStore, VariantStore, VariantStoreError};
