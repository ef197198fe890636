//! Storage implementations of the [`Model`](crate::core::model::Model) contract

#[cfg(feature = "in-memory")]
pub mod in_memory;

#[cfg(feature = "in-memory")]
pub use in_memory::{InMemoryDatabase, InMemoryModel};
