// src/classify/provider.rs
// Classifier abstraction - the provider behind the gateway

use async_trait::async_trait;

use super::ClassificationResult;
use crate::error::Result;

/// A service that turns text into a classification.
///
/// Implementations make a single attempt per call; timeouts and worker
/// bounds are applied by [`super::ClassificationGateway`].
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify `text`, failing with `ClassificationProvider` on any provider error
    async fn classify(&self, text: &str) -> Result<ClassificationResult>;

    /// Provider name for logs
    fn name(&self) -> &'static str;
}
