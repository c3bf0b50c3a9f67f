//! Event payload validation.

pub mod event;
pub mod violation;

pub use event::EventValidator;
pub use violation::{ValidationError, Violation};
