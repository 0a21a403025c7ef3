// src/classify/mod.rs
// Classification record, provider trait and the timeout-bounded gateway

pub mod gateway;
pub mod gemini;
pub mod prompt;
pub mod provider;
pub mod types;

pub use gateway::ClassificationGateway;
pub use gemini::GeminiClassifier;
pub use provider::Classifier;
pub use types::{Category, ClassificationResult, Subtype};
