// src/web/state.rs
// Shared, read-only server state

use std::sync::Arc;

use crate::classify::Classifier;
use crate::config::Settings;
use crate::pipeline::ClassificationOrchestrator;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub orchestrator: Arc<ClassificationOrchestrator>,
}

impl AppState {
    pub fn new(settings: Arc<Settings>, orchestrator: ClassificationOrchestrator) -> Self {
        Self {
            settings,
            orchestrator: Arc::new(orchestrator),
        }
    }

    /// Build the default pipeline around `classifier`
    pub fn from_settings(settings: Settings, classifier: Arc<dyn Classifier>) -> Self {
        let orchestrator = ClassificationOrchestrator::from_settings(&settings, classifier);
        Self::new(Arc::new(settings), orchestrator)
    }
}
