//! Core traits defined in `hooklytics-core` and implemented by other crates.

pub mod store;

pub use store::{EventStore, StoreError};
