use serde::{Deserialize, Serialize};

use stockroll_core::ValueObject;

use crate::configuration::ProductConfiguration;

/// Derived inventory figures for one product configuration.
///
/// Every attribute is `None` unless it was requested.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryInfo {
    pub inventory_available_to_sell: Option<u64>,
    pub inventory_in_stock: Option<u64>,
    pub inventory_reserved: Option<u64>,
    pub is_backorder: Option<bool>,
    pub is_low_quantity: Option<bool>,
    pub is_sold_out: Option<bool>,
}

/// Reported for configurations whose variant could not be resolved.
///
/// Unknown inventory is treated as sold out, on backorder and low.
pub const DEFAULT_INFO: InventoryInfo = InventoryInfo {
    inventory_available_to_sell: Some(0),
    inventory_in_stock: Some(0),
    inventory_reserved: Some(0),
    is_backorder: Some(true),
    is_low_quantity: Some(true),
    is_sold_out: Some(true),
};

impl ValueObject for InventoryInfo {}

/// One entry of a batch result, positionally matching the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationInventory {
    pub inventory_info: InventoryInfo,
    pub product_configuration: ProductConfiguration,
}
