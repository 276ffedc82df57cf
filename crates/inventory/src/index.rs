//! Per-batch lookup structure over a resolved variant set.

use std::collections::HashMap;

use stockroll_core::{Entity, VariantId};

use crate::variant::Variant;

/// Immutable snapshot of the variants resolved for one batch.
///
/// Built once, then shared read-only by every configuration in the batch:
/// - `by_id`: exact id lookup (first occurrence wins when a caller-supplied
///   set contains duplicates; later duplicates are dropped entirely)
/// - `children`: parent id (nearest ancestor) -> direct child options
/// - `descendants`: ancestor id -> every record listing it in `ancestors`
#[derive(Debug, Clone, Default)]
pub struct VariantIndex {
    variants: Vec<Variant>,
    by_id: HashMap<VariantId, usize>,
    children: HashMap<VariantId, Vec<usize>>,
    descendants: HashMap<VariantId, Vec<usize>>,
}

impl VariantIndex {
    pub fn build(variants: impl IntoIterator<Item = Variant>) -> Self {
        let mut index = Self::default();

        for variant in variants {
            let id = variant.id().clone();
            if index.by_id.contains_key(&id) {
                continue;
            }
            let pos = index.variants.len();
            index.by_id.insert(id.clone(), pos);

            if let Some(parent) = variant.parent_id() {
                if *parent != id {
                    index.children.entry(parent.clone()).or_default().push(pos);
                }
            }

            for (i, ancestor) in variant.ancestors.iter().enumerate() {
                // Self-references and repeated ancestors would double count.
                if *ancestor == id || variant.ancestors[..i].contains(ancestor) {
                    continue;
                }
                index.descendants.entry(ancestor.clone()).or_default().push(pos);
            }

            index.variants.push(variant);
        }

        index
    }

    pub fn get(&self, id: &VariantId) -> Option<&Variant> {
        self.by_id.get(id).map(|&pos| &self.variants[pos])
    }

    /// Direct child options (records whose nearest ancestor is `id`).
    pub fn children(&self, id: &VariantId) -> impl Iterator<Item = &Variant> + '_ {
        self.lookup(self.children.get(id))
    }

    pub fn has_children(&self, id: &VariantId) -> bool {
        self.children.get(id).is_some_and(|c| !c.is_empty())
    }

    /// Every record whose `ancestors` include `id`.
    pub fn descendants(&self, id: &VariantId) -> impl Iterator<Item = &Variant> + '_ {
        self.lookup(self.descendants.get(id))
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    fn lookup<'a>(
        &'a self,
        positions: Option<&'a Vec<usize>>,
    ) -> impl Iterator<Item = &'a Variant> + 'a {
        positions
            .into_iter()
            .flatten()
            .map(move |&pos| &self.variants[pos])
    }
}
