//! Per-variant quantity calculators.
//!
//! Each calculator is a pure function of the target variant and the batch's
//! [`VariantIndex`]. A variant with direct child options reports the sum of
//! its children's figures; a leaf reports its own stored values. Corrupt
//! ancestry (a cycle through `ancestors`) yields 0 instead of failing.

use std::collections::HashSet;

use stockroll_core::VariantId;

use crate::index::VariantIndex;
use crate::variant::Variant;

/// Quantity physically on hand.
pub fn in_stock_quantity(variant: &Variant, index: &VariantIndex) -> u64 {
    let total = rollup(variant, index, &|leaf| leaf.stored_in_stock() as i64).unwrap_or(0);
    total.max(0) as u64
}

/// Quantity held against pending orders and not yet fulfilled.
pub fn reserved_quantity(variant: &Variant, index: &VariantIndex) -> u64 {
    let total = rollup(variant, index, &|leaf| leaf.stored_reserved() as i64).unwrap_or(0);
    total.max(0) as u64
}

/// In-stock minus reserved. Not clamped: oversold leaves go negative, and
/// flag derivation relies on seeing that.
pub fn available_to_sell_quantity(variant: &Variant, index: &VariantIndex) -> i64 {
    rollup(variant, index, &|leaf| {
        (leaf.stored_in_stock() as i64).saturating_sub(leaf.stored_reserved() as i64)
    })
    .unwrap_or(0)
}

/// One parent being summed: its direct children and the total so far.
struct Frame<'a> {
    id: &'a VariantId,
    children: Vec<&'a Variant>,
    next: usize,
    total: i64,
}

impl<'a> Frame<'a> {
    fn open(variant: &'a Variant, index: &'a VariantIndex) -> Self {
        Self {
            id: &variant.id,
            children: index.children(&variant.id).collect(),
            next: 0,
            total: 0,
        }
    }
}

/// Post-order sum over the option tree, driven by an explicit work stack so
/// hierarchy depth is bounded by memory rather than the thread stack.
/// `None` when a parent is reached again while still open (a cycle).
fn rollup(variant: &Variant, index: &VariantIndex, leaf: &dyn Fn(&Variant) -> i64) -> Option<i64> {
    if !index.has_children(&variant.id) {
        return Some(leaf(variant));
    }

    let mut open: HashSet<&VariantId> = HashSet::from([&variant.id]);
    let mut stack = vec![Frame::open(variant, index)];

    loop {
        let frame = stack.last_mut()?;
        if let Some(&child) = frame.children.get(frame.next) {
            frame.next += 1;
            if !index.has_children(&child.id) {
                frame.total = frame.total.saturating_add(leaf(child));
            } else if !open.insert(&child.id) {
                return None;
            } else {
                stack.push(Frame::open(child, index));
            }
            continue;
        }

        let done = stack.pop()?;
        open.remove(done.id);
        match stack.last_mut() {
            Some(parent) => parent.total = parent.total.saturating_add(done.total),
            None => return Some(done.total),
        }
    }
}
