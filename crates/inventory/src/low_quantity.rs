//! Low-quantity flag policies.
//!
//! A missing threshold never reports low; negative thresholds read as 0.

use core::fmt::Debug;
use core::str::FromStr;

use stockroll_core::DomainError;

use crate::calculators::available_to_sell_quantity;
use crate::index::VariantIndex;
use crate::variant::Variant;

/// Decides `isLowQuantity` for a resolved target variant.
pub trait LowQuantityPolicy: Debug + Send + Sync {
    /// `target_available` is the target's already computed available-to-sell.
    fn is_low_quantity(&self, target: &Variant, target_available: i64, index: &VariantIndex) -> bool;
}

fn at_or_below(available: i64, threshold: Option<i64>) -> bool {
    threshold.is_some_and(|t| available <= t)
}

/// Catalog behaviour: the target's own availability is checked against every
/// option's threshold. A variant with options is low as soon as its total
/// availability drops to any single option's threshold.
#[derive(Debug, Default, Clone, Copy)]
pub struct TargetAvailabilityPolicy;

impl LowQuantityPolicy for TargetAvailabilityPolicy {
    fn is_low_quantity(&self, target: &Variant, target_available: i64, index: &VariantIndex) -> bool {
        let mut options = index.descendants(&target.id).peekable();
        if options.peek().is_none() {
            return at_or_below(target_available, target.low_inventory_threshold());
        }
        options.any(|option| at_or_below(target_available, option.low_inventory_threshold()))
    }
}

/// Each option's own availability against its own threshold.
#[derive(Debug, Default, Clone, Copy)]
pub struct OptionAvailabilityPolicy;

impl LowQuantityPolicy for OptionAvailabilityPolicy {
    fn is_low_quantity(&self, target: &Variant, target_available: i64, index: &VariantIndex) -> bool {
        let mut options = index.descendants(&target.id).peekable();
        if options.peek().is_none() {
            return at_or_below(target_available, target.low_inventory_threshold());
        }
        options.any(|option| {
            at_or_below(
                available_to_sell_quantity(option, index),
                option.low_inventory_threshold(),
            )
        })
    }
}

/// Named policy selector, used by configuration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LowQuantityPolicyKind {
    #[default]
    Target,
    Option,
}

impl LowQuantityPolicyKind {
    pub fn build(self) -> Box<dyn LowQuantityPolicy> {
        match self {
            LowQuantityPolicyKind::Target => Box::new(TargetAvailabilityPolicy),
            LowQuantityPolicyKind::Option => Box::new(OptionAvailabilityPolicy),
        }
    }
}

impl FromStr for LowQuantityPolicyKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "target" => Ok(Self::Target),
            "option" => Ok(Self::Option),
            other => Err(DomainError::validation(format!(
                "unknown low quantity policy '{other}' (expected 'target' or 'option')"
            ))),
        }
    }
}
