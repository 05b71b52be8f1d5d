//! Domain records for stories, story nodes, and story jobs.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A generated story. Immutable after creation except through new node
/// attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    /// Unique story identifier.
    pub id: Uuid,
    /// The theme string the story was requested with.
    pub title: String,
    /// The client session that owns this story.
    pub session_id: Uuid,
    /// Timestamp set at creation.
    pub created_at: DateTime<Utc>,
}

/// A single node of a story tree. Created once, never mutated.
///
/// `options` maps a choice label to the id of the next node. Branch
/// generation is an unimplemented extension point, so the map is always
/// empty; it is kept for schema compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryNode {
    /// Unique node identifier.
    pub id: Uuid,
    /// The story this node belongs to.
    pub story_id: Uuid,
    /// Generated narrative text.
    pub content: String,
    /// Exactly one node per story has this set.
    pub is_root: bool,
    /// Whether this node ends the story.
    pub is_ending: bool,
    /// Whether this ending is a winning one.
    pub is_winning_ending: bool,
    /// Choice label to next-node reference.
    pub options: BTreeMap<String, Uuid>,
}

/// Lifecycle state of a story job.
///
/// Transitions only move forward: `Pending` → `Processing` →
/// `Completed` | `Failed`. Both terminal states are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Created, not yet picked up by background execution.
    Pending,
    /// Background execution has started.
    Processing,
    /// Generation succeeded; `story_id` points at the result.
    Completed,
    /// Generation failed; `error` carries the cause.
    Failed,
}

impl JobStatus {
    /// Returns true for `Completed` and `Failed`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Stable lowercase name, matching the serialized form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parses the stable lowercase name back into a status.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// The durable record tracking one asynchronous generation request.
///
/// Mutated exclusively through the transition methods below, which keep the
/// status monotonic and the terminal fields consistent with the state that
/// set them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryJob {
    /// Client-facing job handle.
    pub job_id: Uuid,
    /// The client session that created the job.
    pub session_id: Uuid,
    /// User-supplied prompt input.
    pub theme: String,
    /// Current lifecycle state.
    pub status: JobStatus,
    /// Set only when the job completed successfully.
    pub story_id: Option<Uuid>,
    /// Set only when the job failed.
    pub error: Option<String>,
    /// Set on both terminal states.
    pub completed_at: Option<DateTime<Utc>>,
}

impl StoryJob {
    /// Creates a new pending job.
    #[must_use]
    pub fn new(job_id: Uuid, session_id: Uuid, theme: String) -> Self {
        Self {
            job_id,
            session_id,
            theme,
            status: JobStatus::Pending,
            story_id: None,
            error: None,
            completed_at: None,
        }
    }

    /// Marks the job as picked up by background execution. No-op once the
    /// job has left `Pending`.
    pub fn begin_processing(&mut self) {
        if self.status == JobStatus::Pending {
            self.status = JobStatus::Processing;
        }
    }

    /// Marks the job as completed with the produced story. No-op if the job
    /// is already terminal.
    pub fn complete(&mut self, story_id: Uuid, now: DateTime<Utc>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Completed;
        self.story_id = Some(story_id);
        self.completed_at = Some(now);
    }

    /// Marks the job as failed with the cause. No-op if the job is already
    /// terminal.
    pub fn fail(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Failed;
        self.error = Some(message.into());
        self.completed_at = Some(now);
    }
}
