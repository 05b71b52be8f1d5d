//! Test stores — in-memory and failing `StoryStore` implementations.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use taleforge_core::error::DomainError;
use taleforge_core::model::{Story, StoryJob, StoryNode};
use taleforge_core::store::StoryStore;
use uuid::Uuid;

/// An in-memory store with the same observable semantics as the Postgres
/// implementation: the story/root pair commits atomically and job updates
/// require an existing row.
#[derive(Default)]
pub struct InMemoryStoryStore {
    jobs: Mutex<HashMap<Uuid, StoryJob>>,
    stories: Mutex<HashMap<Uuid, Story>>,
    nodes: Mutex<Vec<StoryNode>>,
}

impl InMemoryStoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted stories.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn story_count(&self) -> usize {
        self.stories.lock().unwrap().len()
    }

    /// Number of persisted nodes.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.lock().unwrap().len()
    }

    /// Seeds a story without any nodes. Only integrity tests want this
    /// state; `insert_story_with_root` cannot produce it.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn seed_story_without_root(&self, story: Story) {
        self.stories.lock().unwrap().insert(story.id, story);
    }
}

#[async_trait]
impl StoryStore for InMemoryStoryStore {
    async fn insert_job(&self, job: &StoryJob) -> Result<(), DomainError> {
        self.jobs.lock().unwrap().insert(job.job_id, job.clone());
        Ok(())
    }

    async fn find_job(&self, job_id: Uuid) -> Result<Option<StoryJob>, DomainError> {
        Ok(self.jobs.lock().unwrap().get(&job_id).cloned())
    }

    async fn update_job(&self, job: &StoryJob) -> Result<(), DomainError> {
        let mut jobs = self.jobs.lock().unwrap();
        if !jobs.contains_key(&job.job_id) {
            return Err(DomainError::Infrastructure(format!(
                "job row {} does not exist",
                job.job_id
            )));
        }
        jobs.insert(job.job_id, job.clone());
        Ok(())
    }

    async fn insert_story_with_root(
        &self,
        story: &Story,
        root: &StoryNode,
    ) -> Result<(), DomainError> {
        let mut stories = self.stories.lock().unwrap();
        let mut nodes = self.nodes.lock().unwrap();
        stories.insert(story.id, story.clone());
        nodes.push(root.clone());
        Ok(())
    }

    async fn find_story(&self, story_id: Uuid) -> Result<Option<Story>, DomainError> {
        Ok(self.stories.lock().unwrap().get(&story_id).cloned())
    }

    async fn find_story_nodes(&self, story_id: Uuid) -> Result<Vec<StoryNode>, DomainError> {
        Ok(self
            .nodes
            .lock()
            .unwrap()
            .iter()
            .filter(|node| node.story_id == story_id)
            .cloned()
            .collect())
    }
}

/// A store that always returns an infrastructure error. Useful for testing
/// error-handling paths.
#[derive(Debug)]
pub struct FailingStoryStore;

#[async_trait]
impl StoryStore for FailingStoryStore {
    async fn insert_job(&self, _job: &StoryJob) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn find_job(&self, _job_id: Uuid) -> Result<Option<StoryJob>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn update_job(&self, _job: &StoryJob) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn insert_story_with_root(
        &self,
        _story: &Story,
        _root: &StoryNode,
    ) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn find_story(&self, _story_id: Uuid) -> Result<Option<Story>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn find_story_nodes(&self, _story_id: Uuid) -> Result<Vec<StoryNode>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
