//! Catalog records that are addressed by a stable identifier.

/// A record whose identity is its id, independent of its current figures.
///
/// Two reads of the same catalog variant with different stock levels are still
/// the same variant; batch indexes key records by [`Entity::id`] and keep the
/// first record seen for each id.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
