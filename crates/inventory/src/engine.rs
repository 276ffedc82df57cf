//! Batch inventory computation over a resolved variant index.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use thiserror::Error;

use crate::calculators::{available_to_sell_quantity, in_stock_quantity, reserved_quantity};
use crate::configuration::ProductConfiguration;
use crate::fields::{InventoryField, InventoryFields};
use crate::index::VariantIndex;
use crate::info::{ConfigurationInventory, DEFAULT_INFO, InventoryInfo};
use crate::low_quantity::{LowQuantityPolicy, TargetAvailabilityPolicy};
use crate::variant::Variant;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to build worker pool: {0}")]
    WorkerPool(String),
}

/// Computes [`InventoryInfo`] for batches of product configurations.
///
/// Configurations are independent of each other, so a batch fans out over a
/// rayon pool; results come back in input order.
#[derive(Debug)]
pub struct InventoryEngine {
    policy: Box<dyn LowQuantityPolicy>,
    pool: Option<ThreadPool>,
}

impl Default for InventoryEngine {
    fn default() -> Self {
        Self::sequential()
    }
}

impl InventoryEngine {
    pub fn builder() -> InventoryEngineBuilder {
        InventoryEngineBuilder::default()
    }

    /// Engine that computes on the calling thread (tests, tiny batches).
    pub fn sequential() -> Self {
        Self {
            policy: Box::new(TargetAvailabilityPolicy),
            pool: None,
        }
    }

    pub fn with_policy(mut self, policy: Box<dyn LowQuantityPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn worker_threads(&self) -> usize {
        self.pool.as_ref().map_or(1, ThreadPool::current_num_threads)
    }

    /// Compute one result per configuration, in input order.
    pub fn compute_batch(
        &self,
        configurations: &[ProductConfiguration],
        fields: &InventoryFields,
        index: &VariantIndex,
    ) -> Vec<ConfigurationInventory> {
        let compute = |configuration: &ProductConfiguration| ConfigurationInventory {
            inventory_info: self.compute_for(configuration, fields, index),
            product_configuration: configuration.clone(),
        };

        match &self.pool {
            Some(pool) if configurations.len() > 1 => {
                pool.install(|| configurations.par_iter().map(compute).collect::<Vec<_>>())
            }
            _ => configurations.iter().map(compute).collect(),
        }
    }

    /// `DEFAULT_INFO` when the configuration's variant is not in `index`.
    pub fn compute_for(
        &self,
        configuration: &ProductConfiguration,
        fields: &InventoryFields,
        index: &VariantIndex,
    ) -> InventoryInfo {
        match index.get(&configuration.variant_id) {
            Some(variant) => self.compute_info(variant, fields, index),
            None => DEFAULT_INFO,
        }
    }

    /// Run only the calculators `fields` asks for.
    pub fn compute_info(&self, variant: &Variant, fields: &InventoryFields, index: &VariantIndex) -> InventoryInfo {
        let mut info = InventoryInfo::default();

        // Shared by the quantity and every flag; computed at most once.
        let available = fields
            .needs_available_to_sell()
            .then(|| available_to_sell_quantity(variant, index));

        if fields.contains(InventoryField::InventoryInStock) {
            info.inventory_in_stock = Some(in_stock_quantity(variant, index));
        }

        if fields.contains(InventoryField::InventoryReserved) {
            info.inventory_reserved = Some(reserved_quantity(variant, index));
        }

        if let Some(available) = available {
            if fields.contains(InventoryField::InventoryAvailableToSell) {
                info.inventory_available_to_sell = Some(available.max(0) as u64);
            }
            if fields.contains(InventoryField::IsSoldOut) {
                info.is_sold_out = Some(available <= 0);
            }
            if fields.contains(InventoryField::IsBackorder) {
                info.is_backorder = Some(available <= 0);
            }
            if fields.contains(InventoryField::IsLowQuantity) {
                info.is_low_quantity = Some(self.policy.is_low_quantity(variant, available, index));
            }
        }

        info
    }
}

/// Builder for a pooled [`InventoryEngine`].
#[derive(Debug, Default)]
pub struct InventoryEngineBuilder {
    policy: Option<Box<dyn LowQuantityPolicy>>,
    worker_threads: Option<usize>,
}

impl InventoryEngineBuilder {
    pub fn policy(mut self, policy: Box<dyn LowQuantityPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Pool size; defaults to the machine's available parallelism.
    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads.max(1));
        self
    }

    pub fn build(self) -> Result<InventoryEngine, EngineError> {
        let threads = self.worker_threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|idx| format!("stockroll-worker-{idx}"))
            .build()
            .map_err(|e| EngineError::WorkerPool(e.to_string()))?;

        Ok(InventoryEngine {
            policy: self.policy.unwrap_or_else(|| Box::new(TargetAvailabilityPolicy)),
            pool: Some(pool),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::low_quantity::OptionAvailabilityPolicy;

    fn single_variant(in_stock: i64) -> VariantIndex {
        VariantIndex::build([Variant::new("V")
            .with_in_stock(in_stock)
            .with_low_inventory_threshold(5)])
    }

    #[test]
    fn plain_variant_with_all_fields() {
        let engine = InventoryEngine::sequential();
        let results = engine.compute_batch(
            &[ProductConfiguration::new("V")],
            &InventoryFields::all(),
            &single_variant(10),
        );

        assert_eq!(
            results[0].inventory_info,
            InventoryInfo {
                inventory_available_to_sell: Some(10),
                inventory_in_stock: Some(10),
                inventory_reserved: Some(0),
                is_backorder: Some(false),
                is_low_quantity: Some(false),
                is_sold_out: Some(false),
            }
        );
    }

    #[test]
    fn empty_stock_is_sold_out_and_backordered() {
        let engine = InventoryEngine::sequential();
        let info = engine.compute_for(
            &ProductConfiguration::new("V"),
            &InventoryFields::all(),
            &single_variant(0),
        );

        assert_eq!(info.is_sold_out, Some(true));
        assert_eq!(info.is_backorder, Some(true));
        assert_eq!(info.is_low_quantity, Some(true));
    }

    #[test]
    fn unknown_variant_gets_default_info_regardless_of_fields() {
        let engine = InventoryEngine::sequential();
        let fields = InventoryFields::none().with(InventoryField::InventoryInStock);
        let info = engine.compute_for(&ProductConfiguration::new("ghost"), &fields, &single_variant(10));

        assert_eq!(info, DEFAULT_INFO);
    }

    #[test]
    fn unrequested_fields_stay_none() {
        let engine = InventoryEngine::sequential();
        let fields = InventoryFields::none().with(InventoryField::IsSoldOut);
        let info = engine.compute_for(&ProductConfiguration::new("V"), &fields, &single_variant(3));

        assert_eq!(
            info,
            InventoryInfo {
                is_sold_out: Some(false),
                ..InventoryInfo::default()
            }
        );
    }

    #[test]
    fn reported_available_is_floored_but_flags_see_negative() {
        let index = VariantIndex::build([Variant::new("V").with_in_stock(1).with_reserved(4)]);
        let info = InventoryEngine::sequential().compute_for(
            &ProductConfiguration::new("V"),
            &InventoryFields::all(),
            &index,
        );

        assert_eq!(info.inventory_available_to_sell, Some(0));
        assert_eq!(info.inventory_reserved, Some(4));
        assert_eq!(info.is_sold_out, Some(true));
    }

    #[test]
    fn tracking_and_backorder_settings_do_not_change_the_figures() {
        let stored = |v: Variant| v.with_in_stock(0).with_low_inventory_threshold(5);
        let index = VariantIndex::build([
            stored(Variant::new("tracked")),
            stored(Variant::new("untracked").with_inventory_tracking(false)),
            stored(Variant::new("backorderable").with_backorder(true)),
        ]);
        let engine = InventoryEngine::sequential();
        let info = |id: &str| engine.compute_for(&ProductConfiguration::new(id), &InventoryFields::all(), &index);

        assert_eq!(info("tracked").is_sold_out, Some(true));
        assert_eq!(info("untracked"), info("tracked"));
        assert_eq!(info("backorderable"), info("tracked"));
    }

    #[test]
    fn variant_with_options_rolls_up_and_uses_policy() {
        let index = VariantIndex::build([
            Variant::new("var").with_ancestors(["prod"]),
            Variant::new("opt-a")
                .with_ancestors(["prod", "var"])
                .with_in_stock(8)
                .with_low_inventory_threshold(2),
            Variant::new("opt-b")
                .with_ancestors(["prod", "var"])
                .with_in_stock(1)
                .with_low_inventory_threshold(1),
        ]);
        let configuration = ProductConfiguration::for_product("prod", "var");

        let literal = InventoryEngine::sequential().compute_for(&configuration, &InventoryFields::all(), &index);
        assert_eq!(literal.inventory_in_stock, Some(9));
        assert_eq!(literal.is_low_quantity, Some(false));

        let per_option = InventoryEngine::sequential()
            .with_policy(Box::new(OptionAvailabilityPolicy))
            .compute_for(&configuration, &InventoryFields::all(), &index);
        assert_eq!(per_option.is_low_quantity, Some(true));
    }

    #[test]
    fn pooled_engine_preserves_order_and_duplicates() {
        let engine = InventoryEngine::builder().worker_threads(3).build().unwrap();
        let index = VariantIndex::build([
            Variant::new("a").with_in_stock(1),
            Variant::new("b").with_in_stock(2),
        ]);
        let configurations: Vec<_> = ["b", "ghost", "a", "b"]
            .into_iter()
            .map(ProductConfiguration::new)
            .collect();

        let results = engine.compute_batch(&configurations, &InventoryFields::all(), &index);

        let ids: Vec<_> = results
            .iter()
            .map(|r| r.product_configuration.variant_id.as_str())
            .collect();
        assert_eq!(ids, ["b", "ghost", "a", "b"]);
        assert_eq!(results[1].inventory_info, DEFAULT_INFO);
        assert_eq!(results[0], results[3]);
        assert_eq!(results[2].inventory_info.inventory_in_stock, Some(1));
        assert_eq!(engine.worker_threads(), 3);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn leaf_strategy() -> impl Strategy<Value = Vec<(i64, i64, Option<i64>)>> {
            prop::collection::vec((0i64..50, 0i64..50, prop::option::of(-5i64..30)), 1..8)
        }

        fn field_strategy() -> impl Strategy<Value = InventoryFields> {
            prop::collection::vec(prop::sample::select(InventoryField::ALL.to_vec()), 0..6)
                .prop_map(|fields| fields.into_iter().collect())
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 256,
                ..ProptestConfig::default()
            })]

            /// Property: results line up with the request, one for one.
            #[test]
            fn batch_preserves_length_and_order(
                leaves in leaf_strategy(),
                picks in prop::collection::vec(0usize..12, 1..20),
                fields in field_strategy(),
            ) {
                let index = VariantIndex::build(leaves.iter().enumerate().map(|(i, (stock, reserved, _))| {
                    Variant::new(format!("v{i}")).with_in_stock(*stock).with_reserved(*reserved)
                }));
                let configurations: Vec<_> = picks
                    .iter()
                    .map(|i| ProductConfiguration::new(format!("v{i}")))
                    .collect();

                let results = InventoryEngine::sequential().compute_batch(&configurations, &fields, &index);

                prop_assert_eq!(results.len(), configurations.len());
                for (result, configuration) in results.iter().zip(&configurations) {
                    prop_assert_eq!(&result.product_configuration, configuration);
                    if index.get(&configuration.variant_id).is_none() {
                        prop_assert_eq!(result.inventory_info, DEFAULT_INFO);
                    }
                }
            }

            /// Property: flags agree with each other and with the leaf rule;
            /// unrequested fields are never filled in.
            #[test]
            fn leaf_flags_are_consistent(
                leaves in leaf_strategy(),
                fields in field_strategy(),
            ) {
                let variants: Vec<_> = leaves.iter().enumerate().map(|(i, (stock, reserved, threshold))| {
                    let v = Variant::new(format!("v{i}")).with_in_stock(*stock).with_reserved(*reserved);
                    match threshold {
                        Some(t) => v.with_low_inventory_threshold(*t),
                        None => v,
                    }
                }).collect();
                let index = VariantIndex::build(variants.clone());
                let engine = InventoryEngine::sequential();

                for variant in &variants {
                    let info = engine.compute_info(variant, &fields, &index);
                    let available = variant.inventory_in_stock - variant.inventory_reserved;

                    for field in InventoryField::ALL {
                        let present = match field {
                            InventoryField::InventoryAvailableToSell => info.inventory_available_to_sell.is_some(),
                            InventoryField::InventoryInStock => info.inventory_in_stock.is_some(),
                            InventoryField::InventoryReserved => info.inventory_reserved.is_some(),
                            InventoryField::IsBackorder => info.is_backorder.is_some(),
                            InventoryField::IsLowQuantity => info.is_low_quantity.is_some(),
                            InventoryField::IsSoldOut => info.is_sold_out.is_some(),
                        };
                        prop_assert_eq!(present, fields.contains(field));
                    }

                    if let (Some(sold_out), Some(backorder)) = (info.is_sold_out, info.is_backorder) {
                        prop_assert_eq!(sold_out, backorder);
                    }
                    if let Some(sold_out) = info.is_sold_out {
                        prop_assert_eq!(sold_out, available <= 0);
                    }
                    if let Some(low) = info.is_low_quantity {
                        let expected = variant
                            .low_inventory_threshold()
                            .is_some_and(|t| available <= t);
                        prop_assert_eq!(low, expected);
                    }
                }
            }
        }
    }
}
