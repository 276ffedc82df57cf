//! Inventory aggregation domain (pure).
//!
//! Derives stock, reservation and availability figures for catalog variants
//! and their options. No IO lives here: callers resolve the variant set and
//! hand it over as a [`VariantIndex`].

pub mod calculators;
pub mod configuration;
pub mod engine;
pub mod fields;
pub mod index;
pub mod info;
pub mod low_quantity;
pub mod variant;

pub use calculators::{available_to_sell_quantity, in_stock_quantity, reserved_quantity};
pub use configuration::ProductConfiguration;
pub use engine::{EngineError, InventoryEngine, InventoryEngineBuilder};
pub use fields::{InventoryField, InventoryFields};
pub use index::VariantIndex;
pub use info::{ConfigurationInventory, DEFAULT_INFO, InventoryInfo};
pub use low_quantity::{
    LowQuantityPolicy, LowQuantityPolicyKind, OptionAvailabilityPolicy, TargetAvailabilityPolicy,
};
pub use variant::Variant;
