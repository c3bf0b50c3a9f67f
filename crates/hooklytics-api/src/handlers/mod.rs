//! Request handlers organized by domain.

pub mod events;
pub mod health;
pub mod me;
