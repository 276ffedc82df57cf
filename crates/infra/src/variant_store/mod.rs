//! Variant store boundary.
//!
//! The engine reads catalog variants through [`VariantStore`] without making
//! storage assumptions: the in-memory store backs tests and JSON snapshots,
//! the Postgres store backs deployments.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryVariantStore;
pub use postgres::PostgresVariantStore;
pub use r#trait::{VariantStore, VariantStoreError};
