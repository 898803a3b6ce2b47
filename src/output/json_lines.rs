use crate::output::{ResultSink, RunSummary, SinkResult};
use crate::record::OutputRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends one JSON object per record to a file, plus a summary document
/// at finalize
pub struct JsonLinesSink {
    writer: BufWriter<File>,
    summary_path: PathBuf,
}

impl JsonLinesSink {
    pub fn new(records_path: &Path, summary_path: &Path) -> SinkResult<Self> {
        let file = File::create(records_path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            summary_path: summary_path.to_path_buf(),
        })
    }
}

impl ResultSink for JsonLinesSink {
    fn push(&mut self, record: &OutputRecord) -> SinkResult<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn finalize(&mut self, summary: &RunSummary) -> SinkResult<()> {
        self.writer.flush()?;

        let pretty = serde_json::to_string_pretty(summary)?;
        std::fs::write(&self.summary_path, pretty)?;
        Ok(())
    }
}
