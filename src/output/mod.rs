//! Result sinks and the run summary
//!
//! The sink receives each finalized record exactly once, in the order the
//! orchestrator pushes them, and the run summary at the end of the run. It
//! never reads or mutates crawl state.

mod json_lines;
mod memory;
mod summary;

pub use json_lines::JsonLinesSink;
pub use memory::MemorySink;
pub use summary::RunSummary;

use crate::record::OutputRecord;
use thiserror::Error;

/// Errors that can occur while writing output
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Receives finalized records and the end-of-run summary
pub trait ResultSink: Send {
    /// Appends one finalized record to the output stream
    fn push(&mut self, record: &OutputRecord) -> SinkResult<()>;

    /// Writes the run summary and flushes any buffered output
    fn finalize(&mut self, summary: &RunSummary) -> SinkResult<()>;
}
