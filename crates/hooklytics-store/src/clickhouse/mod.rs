//! ClickHouse-backed analytics store.

pub mod connection;
pub mod migration;
pub mod row;
pub mod store;

pub use connection::ClickHouseConnection;
pub use migration::ensure_schema;
pub use row::EventLogRow;
pub use store::ClickHouseEventStore;
