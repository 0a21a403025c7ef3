// src/pipeline/mod.rs
// Classification pipeline and its structured record log

pub mod logger;
pub mod orchestrator;

pub use logger::{ClassificationLogger, ClassificationRecord, MemorySink, RecordSink, Source, TracingSink};
pub use orchestrator::{ClassificationOrchestrator, Upload};
