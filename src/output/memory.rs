use crate::output::{ResultSink, RunSummary, SinkResult};
use crate::record::OutputRecord;
use std::sync::{Arc, Mutex};

/// In-memory sink for tests and dry inspection
///
/// Records are retained behind shared handles so a test can keep reading
/// after the coordinator has consumed the sink.
#[derive(Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<OutputRecord>>>,
    summary: Arc<Mutex<Option<RunSummary>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the pushed records
    pub fn records(&self) -> Arc<Mutex<Vec<OutputRecord>>> {
        Arc::clone(&self.records)
    }

    /// Shared handle to the finalized summary
    pub fn summary(&self) -> Arc<Mutex<Option<RunSummary>>> {
        Arc::clone(&self.summary)
    }
}

impl ResultSink for MemorySink {
    fn push(&mut self, record: &OutputRecord) -> SinkResult<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    fn finalize(&mut self, summary: &RunSummary) -> SinkResult<()> {
        *self.summary.lock().unwrap() = Some(summary.clone());
        Ok(())
    }
}
