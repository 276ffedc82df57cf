//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. A product
/// configuration that points at variant `"v1"` is equal to every other
/// configuration pointing at `"v1"` for the same product; a computed
/// inventory record is equal to another one with the same figures.
///
/// ## Value Object vs Entity
///
/// - **Value Object**: no identity (two value objects with same values are equal)
/// - **Entity**: has identity (two variant records with the same `_id` are the
///   same variant, even if their stock differs between reads)
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
