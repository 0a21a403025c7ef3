// src/classify/gateway.rs
// Timeout-bounded, offloaded calls to the classifier

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use super::{ClassificationResult, Classifier};
use crate::error::{Result, TriageError};

/// Aborts the wrapped task when dropped, whether the caller timed out or was itself cancelled
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Runs classifier calls as background tasks, at most `max_in_flight` at a time,
/// and stops waiting for them at the deadline
#[derive(Clone)]
pub struct ClassificationGateway {
    classifier: Arc<dyn Classifier>,
    timeout: Duration,
    permits: Arc<Semaphore>,
}

impl ClassificationGateway {
    pub fn new(classifier: Arc<dyn Classifier>, timeout: Duration, max_in_flight: usize) -> Self {
        Self {
            classifier,
            timeout,
            permits: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.classifier.name()
    }

    /// Classify `text` with a single attempt.
    ///
    /// Waiting for a worker slot counts against the deadline. On timeout the
    /// background task is aborted and `ClassificationTimeout` is returned.
    pub async fn classify(&self, text: String) -> Result<ClassificationResult> {
        let classifier = Arc::clone(&self.classifier);
        let permits = Arc::clone(&self.permits);
        let chars = text.chars().count();
        let start = Instant::now();

        let task = tokio::spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|_| TriageError::Internal("classifier pool closed".to_string()))?;
            classifier.classify(&text).await
        });
        let _guard = AbortOnDrop(task.abort_handle());

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => {
                debug!(
                    provider = self.classifier.name(),
                    chars,
                    duration_ms = start.elapsed().as_millis() as u64,
                    ok = result.is_ok(),
                    "Classifier call finished"
                );
                result.map(ClassificationResult::normalized)
            }
            Ok(Err(join_err)) => Err(join_err.into()),
            Err(_) => {
                warn!(
                    provider = self.classifier.name(),
                    chars,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Classifier call timed out"
                );
                Err(TriageError::ClassificationTimeout {
                    timeout: self.timeout,
                })
            }
        }
    }
}
