//! formgrade-store — Storage collaborator implementations.
//!
//! Implements the `FormStore` trait over an in-memory document collection,
//! used by tests and by embedders that don't need durable persistence.

pub mod memory;

pub use memory::MemoryStore;
