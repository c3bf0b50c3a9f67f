//! # hooklytics-core
//!
//! Core crate for Hooklytics ingestion. Contains configuration schemas,
//! the tracked-event domain types, the analytics store trait, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other Hooklytics crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
