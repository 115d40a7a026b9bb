//! Outbound event sinks.
//!
//! Every captured event is forwarded once, as a flat
//! `{ "event": name, ...params }` record, to the tag-management queue. The
//! queue is an external collaborator the debugger writes to and never reads.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use tag_events::Params;

/// Errors a sink can report. They never reach producers.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// I/O error writing the record
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Record could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The queue refused the record
    #[error("sink rejected record: {0}")]
    Rejected(String),
}

/// Append-only destination for captured events.
pub trait EventSink: Send {
    /// Publishes one record. Delivery is best-effort.
    fn publish(&mut self, record: &Params) -> Result<(), SinkError>;
}

/// Shared in-memory queue, the `dataLayer` of the page.
///
/// Clones share the same queue, so the external runtime can hold one handle
/// and drain it while the debugger pushes through another.
#[derive(Debug, Clone, Default)]
pub struct DataLayer {
    entries: Arc<Mutex<Vec<Params>>>,
}

impl DataLayer {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record.
    pub fn push(&self, record: Params) {
        self.lock().push(record);
    }

    /// Returns a copy of every queued record, oldest first.
    pub fn entries(&self) -> Vec<Params> {
        self.lock().clone()
    }

    /// Removes and returns every queued record, oldest first.
    pub fn drain(&self) -> Vec<Params> {
        std::mem::take(&mut *self.lock())
    }

    /// Returns the number of queued records.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Params>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EventSink for DataLayer {
    fn publish(&mut self, record: &Params) -> Result<(), SinkError> {
        self.push(record.clone());
        Ok(())
    }
}

/// Sink writing one JSON record per line.
#[derive(Debug)]
pub struct JsonlSink {
    writer: BufWriter<File>,
    records_written: u64,
}

impl JsonlSink {
    /// Creates a sink appending to the file at `path`.
    pub fn append(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            records_written: 0,
        })
    }

    /// Returns the number of records written by this sink.
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Flushes buffered records to disk.
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl EventSink for JsonlSink {
    fn publish(&mut self, record: &Params) -> Result<(), SinkError> {
        let json = serde_json::to_string(record)?;
        writeln!(self.writer, "{}", json)?;
        self.records_written += 1;
        Ok(())
    }
}

impl Drop for JsonlSink {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!("Failed to flush event sink: {}", e);
        }
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&mut self, _record: &Params) -> Result<(), SinkError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::BufRead;
    use tag_events::into_params;
    use tempfile::tempdir;

    fn record(name: &str) -> Params {
        into_params(json!({ "event": name, "page_path": "/" }))
    }

    #[test]
    fn test_data_layer_shared_between_clones() {
        let queue = DataLayer::new();
        let mut sink = queue.clone();
        sink.publish(&record("page_view")).unwrap();
        sink.publish(&record("click")).unwrap();

        assert_eq!(queue.len(), 2);
        let names: Vec<_> = queue.entries().iter().map(|r| r["event"].clone()).collect();
        assert_eq!(names, vec![json!("page_view"), json!("click")]);
    }

    #[test]
    fn test_data_layer_drain() {
        let queue = DataLayer::new();
        queue.push(record("page_view"));
        assert_eq!(queue.drain().len(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_jsonl_sink_writes_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("datalayer.jsonl");
        {
            let mut sink = JsonlSink::append(&path).unwrap();
            sink.publish(&record("page_view")).unwrap();
            sink.publish(&record("click")).unwrap();
            assert_eq!(sink.records_written(), 2);
        }

        let file = File::open(&path).unwrap();
        let lines: Vec<String> = std::io::BufReader::new(file)
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"event":"page_view","page_path":"/"}"#);
    }

    #[test]
    fn test_jsonl_sink_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("datalayer.jsonl");
        JsonlSink::append(&path).unwrap().publish(&record("a")).unwrap();
        JsonlSink::append(&path).unwrap().publish(&record("b")).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_null_sink() {
        let mut sink = NullSink;
        assert!(sink.publish(&record("page_view")).is_ok());
    }
}
