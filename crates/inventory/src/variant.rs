use serde::{Deserialize, Serialize};

use stockroll_core::{Entity, VariantId};

/// A catalog variant or variant option, as stored in the catalog collection.
///
/// `ancestors` is ordered root first, nearest ancestor last: a top-level
/// variant carries `[]` or `[product]`, an option carries `[product, variant]`.
/// Identifiers in `ancestors` share the catalog id space, so the product id is
/// represented as a `VariantId` here too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    #[serde(rename = "_id")]
    pub id: VariantId,
    #[serde(default)]
    pub ancestors: Vec<VariantId>,
    #[serde(default)]
    pub inventory_in_stock: i64,
    /// Units held against unfulfilled orders (maintained by the order workflow).
    #[serde(default)]
    pub inventory_reserved: i64,
    #[serde(default)]
    pub low_inventory_warning_threshold: Option<i64>,
    /// Pass-through for callers; no calculator or flag reads it.
    #[serde(default)]
    pub can_backorder: bool,
    /// Inventory tracking switch. Untracked variants are still computed from
    /// their stored figures; see [`Variant::accepts_backorders`].
    #[serde(default = "tracked_by_default")]
    pub is_enabled: bool,
}

fn tracked_by_default() -> bool {
    true
}

impl Variant {
    pub fn new(id: impl Into<VariantId>) -> Self {
        Self {
            id: id.into(),
            ancestors: Vec::new(),
            inventory_in_stock: 0,
            inventory_reserved: 0,
            low_inventory_warning_threshold: None,
            can_backorder: false,
            is_enabled: true,
        }
    }

    pub fn with_ancestors<I, T>(mut self, ancestors: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<VariantId>,
    {
        self.ancestors = ancestors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_in_stock(mut self, quantity: i64) -> Self {
        self.inventory_in_stock = quantity;
        self
    }

    pub fn with_reserved(mut self, quantity: i64) -> Self {
        self.inventory_reserved = quantity;
        self
    }

    pub fn with_low_inventory_threshold(mut self, threshold: i64) -> Self {
        self.low_inventory_warning_threshold = Some(threshold);
        self
    }

    pub fn with_backorder(mut self, can_backorder: bool) -> Self {
        self.can_backorder = can_backorder;
        self
    }

    pub fn with_inventory_tracking(mut self, enabled: bool) -> Self {
        self.is_enabled = enabled;
        self
    }

    /// Whether the storefront may sell past zero: always for untracked
    /// variants, otherwise the stored `can_backorder` setting.
    pub fn accepts_backorders(&self) -> bool {
        !self.is_enabled || self.can_backorder
    }

    /// Nearest ancestor, if any.
    pub fn parent_id(&self) -> Option<&VariantId> {
        self.ancestors.last()
    }

    pub fn has_ancestor(&self, id: &VariantId) -> bool {
        self.ancestors.contains(id)
    }

    /// Stored on-hand quantity; negative records read as zero.
    pub fn stored_in_stock(&self) -> u64 {
        self.inventory_in_stock.max(0) as u64
    }

    /// Stored reserved quantity; negative records read as zero.
    pub fn stored_reserved(&self) -> u64 {
        self.inventory_reserved.max(0) as u64
    }

    /// Warning threshold with negative values read as zero.
    pub fn low_inventory_threshold(&self) -> Option<i64> {
        self.low_inventory_warning_threshold.map(|t| t.max(0))
    }
}

impl Entity for Variant {
    type Id = VariantId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_catalog_document_with_defaults() {
        let doc = r#"{"_id":"opt-1","ancestors":["prod-1","var-1"],"inventoryInStock":4}"#;
        let v: Variant = serde_json::from_str(doc).unwrap();

        assert_eq!(v.id, VariantId::new("opt-1"));
        assert_eq!(v.parent_id(), Some(&VariantId::new("var-1")));
        assert_eq!(v.stored_in_stock(), 4);
        assert_eq!(v.stored_reserved(), 0);
        assert_eq!(v.low_inventory_threshold(), None);
        assert!(!v.can_backorder);
        assert!(v.is_enabled);
        assert!(!v.accepts_backorders());
    }

    #[test]
    fn untracked_variants_always_accept_backorders() {
        let doc = r#"{"_id":"v","isEnabled":false,"canBackorder":false}"#;
        let untracked: Variant = serde_json::from_str(doc).unwrap();

        assert!(!untracked.is_enabled);
        assert!(untracked.accepts_backorders());
        assert!(Variant::new("w").with_backorder(true).accepts_backorders());
        assert!(!Variant::new("w").with_backorder(false).accepts_backorders());
    }

    #[test]
    fn pass_through_settings_survive_serialization() {
        let v = Variant::new("v").with_backorder(true).with_inventory_tracking(false);
        let json = serde_json::to_value(&v).unwrap();

        assert_eq!(json["canBackorder"], true);
        assert_eq!(json["isEnabled"], false);
        assert_eq!(serde_json::from_value::<Variant>(json).unwrap(), v);
    }

    #[test]
    fn negative_stored_values_read_as_zero() {
        let v = Variant::new("v")
            .with_in_stock(-3)
            .with_reserved(-1)
            .with_low_inventory_threshold(-7);

        assert_eq!(v.stored_in_stock(), 0);
        assert_eq!(v.stored_reserved(), 0);
        assert_eq!(v.low_inventory_threshold(), Some(0));
    }
}
