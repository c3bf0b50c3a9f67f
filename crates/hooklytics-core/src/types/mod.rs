//! Domain types shared by every Hooklytics crate.

pub mod event;

pub use event::{ElementMetadata, Event, EventRecord, HookType, UnknownHookType};
