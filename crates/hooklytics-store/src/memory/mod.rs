//! In-process analytics store.

pub mod store;

pub use store::MemoryEventStore;
