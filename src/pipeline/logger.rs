// src/pipeline/logger.rs
// One structured record per finished classification

use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::classify::{Category, ClassificationResult, Subtype};

/// Tracing target for classification records
pub const LOG_TARGET: &str = "triage::classification";

/// Where the request input came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Text,
    File,
}

/// Logged shape of a classification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationRecord {
    pub ts: i64,
    pub rid: String,
    pub source: Source,
    pub input_bytes: usize,
    pub category: Category,
    pub subtype: Subtype,
    pub confidence: f64,
    pub truncated: bool,
    pub note: Option<String>,
}

impl ClassificationRecord {
    pub fn new(
        request_id: &str,
        source: Source,
        input_bytes: usize,
        result: &ClassificationResult,
        note: Option<&str>,
        truncated: bool,
    ) -> Self {
        Self {
            ts: chrono::Utc::now().timestamp(),
            rid: request_id.to_string(),
            source,
            input_bytes,
            category: result.category,
            subtype: result.subtype,
            confidence: round3(result.confidence),
            truncated: truncated || result.reasons_mention_truncation(),
            note: note.map(str::to_string),
        }
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Destination for serialized records
pub trait RecordSink: Send + Sync {
    fn emit(&self, line: &str);
}

/// Writes each record as an `info` event on [`LOG_TARGET`]
pub struct TracingSink;

impl RecordSink for TracingSink {
    fn emit(&self, line: &str) {
        info!(target: LOG_TARGET, "{line}");
    }
}

/// Keeps records in memory; handy for tests and the one-shot CLI
#[derive(Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}

impl RecordSink for MemorySink {
    fn emit(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

#[derive(Clone)]
pub struct ClassificationLogger {
    sink: Arc<dyn RecordSink>,
}

impl Default for ClassificationLogger {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

impl ClassificationLogger {
    pub fn new(sink: Arc<dyn RecordSink>) -> Self {
        Self { sink }
    }

    /// Emit one JSON line. Never fails; a record that will not serialize
    /// becomes a warning instead.
    pub fn record(
        &self,
        request_id: &str,
        source: Source,
        input_bytes: usize,
        result: &ClassificationResult,
        note: Option<&str>,
        truncated: bool,
    ) {
        let record =
            ClassificationRecord::new(request_id, source, input_bytes, result, note, truncated);
        match serde_json::to_string(&record) {
            Ok(line) => self.sink.emit(&line),
            Err(e) => warn!(request_id, error = %e, "Failed to serialize classification record"),
        }
    }
}
