//! Entity store abstraction.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DomainError;
use crate::model::{Story, StoryJob, StoryNode};

/// Repository trait for the durable story entities.
///
/// Writes are durable when a call returns: the background execution unit and
/// polling request handlers coordinate exclusively through committed rows,
/// so partial writes must never be observable. Each job-row update is
/// internally consistent; no cross-job locking exists since jobs are
/// independent.
#[async_trait]
pub trait StoryStore: Send + Sync {
    /// Persists a newly created job.
    async fn insert_job(&self, job: &StoryJob) -> Result<(), DomainError>;

    /// Loads a job by its client-facing handle.
    async fn find_job(&self, job_id: Uuid) -> Result<Option<StoryJob>, DomainError>;

    /// Writes back the mutable fields of an existing job row.
    async fn update_job(&self, job: &StoryJob) -> Result<(), DomainError>;

    /// Persists a story together with its root node. The pair commits
    /// atomically: a story must never be observable without its root.
    async fn insert_story_with_root(
        &self,
        story: &Story,
        root: &StoryNode,
    ) -> Result<(), DomainError>;

    /// Loads a story by id.
    async fn find_story(&self, story_id: Uuid) -> Result<Option<Story>, DomainError>;

    /// Loads all nodes belonging to a story.
    async fn find_story_nodes(&self, story_id: Uuid) -> Result<Vec<StoryNode>, DomainError>;
}
