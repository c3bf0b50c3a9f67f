//! # hooklytics-store
//!
//! Analytics store providers for Hooklytics. Supports two modes:
//!
//! - **clickhouse**: columnar store reached over the ClickHouse HTTP interface
//! - **memory**: in-process store used for local runs and tests
//!
//! The provider is selected at runtime based on configuration.

#[cfg(feature = "clickhouse-backend")]
pub mod clickhouse;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;

pub use provider::StoreManager;
