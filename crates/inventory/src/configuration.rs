use serde::{Deserialize, Serialize};

use stockroll_core::{ProductId, ValueObject, VariantId};

/// Reference to exactly one variant or variant option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductConfiguration {
    pub variant_id: VariantId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
}

impl ProductConfiguration {
    pub fn new(variant_id: impl Into<VariantId>) -> Self {
        Self {
            variant_id: variant_id.into(),
            product_id: None,
        }
    }

    pub fn for_product(product_id: impl Into<ProductId>, variant_id: impl Into<VariantId>) -> Self {
        Self {
            variant_id: variant_id.into(),
            product_id: Some(product_id.into()),
        }
    }
}

impl ValueObject for ProductConfiguration {}
