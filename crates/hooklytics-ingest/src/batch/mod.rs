//! Batched writes to the analytics store.

pub mod flusher;
pub mod stats;
pub mod writer;

pub use flusher::BatchFlusher;
pub use stats::WriterStats;
pub use writer::{BatchWriter, FlushReport};
