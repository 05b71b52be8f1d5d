//! Shared application state.

use std::sync::Arc;

use taleforge_core::store::StoryStore;
use taleforge_jobs::JobOrchestrator;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Durable entity store, used directly by the query side.
    pub store: Arc<dyn StoryStore>,
    /// Job creation and polling.
    pub orchestrator: Arc<JobOrchestrator>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(store: Arc<dyn StoryStore>, orchestrator: Arc<JobOrchestrator>) -> Self {
        Self {
            store,
            orchestrator,
        }
    }
}
