//! `PostgreSQL` implementation of the `StoryStore` trait.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use taleforge_core::error::DomainError;
use taleforge_core::model::{JobStatus, Story, StoryJob, StoryNode};
use taleforge_core::store::StoryStore;

/// PostgreSQL-backed story store.
#[derive(Debug, Clone)]
pub struct PgStoryStore {
    pool: PgPool,
}

impl PgStoryStore {
    /// Creates a new `PgStoryStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn infra(err: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(err.to_string())
}

#[derive(sqlx::FromRow)]
struct JobRow {
    job_id: Uuid,
    session_id: Uuid,
    theme: String,
    status: String,
    story_id: Option<Uuid>,
    error: Option<String>,
    completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<JobRow> for StoryJob {
    type Error = DomainError;

    fn try_from(row: JobRow) -> Result<Self, DomainError> {
        let status = JobStatus::parse(&row.status).ok_or_else(|| {
            DomainError::Infrastructure(format!(
                "job {} carries unknown status {:?}",
                row.job_id, row.status
            ))
        })?;
        Ok(Self {
            job_id: row.job_id,
            session_id: row.session_id,
            theme: row.theme,
            status,
            story_id: row.story_id,
            error: row.error,
            completed_at: row.completed_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct StoryRow {
    id: Uuid,
    title: String,
    session_id: Uuid,
    created_at: DateTime<Utc>,
}

impl From<StoryRow> for Story {
    fn from(row: StoryRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            session_id: row.session_id,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct NodeRow {
    id: Uuid,
    story_id: Uuid,
    content: String,
    is_root: bool,
    is_ending: bool,
    is_winning_ending: bool,
    options: serde_json::Value,
}

impl TryFrom<NodeRow> for StoryNode {
    type Error = DomainError;

    fn try_from(row: NodeRow) -> Result<Self, DomainError> {
        let options: BTreeMap<String, Uuid> =
            serde_json::from_value(row.options).map_err(|err| {
                DomainError::Infrastructure(format!(
                    "node {} carries malformed options: {err}",
                    row.id
                ))
            })?;
        Ok(Self {
            id: row.id,
            story_id: row.story_id,
            content: row.content,
            is_root: row.is_root,
            is_ending: row.is_ending,
            is_winning_ending: row.is_winning_ending,
            options,
        })
    }
}

#[async_trait]
impl StoryStore for PgStoryStore {
    async fn insert_job(&self, job: &StoryJob) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO story_jobs \
             (job_id, session_id, theme, status, story_id, error, completed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(job.job_id)
        .bind(job.session_id)
        .bind(&job.theme)
        .bind(job.status.as_str())
        .bind(job.story_id)
        .bind(&job.error)
        .bind(job.completed_at)
        .execute(&self.pool)
        .await
        .map_err(infra)?;
        Ok(())
    }

    async fn find_job(&self, job_id: Uuid) -> Result<Option<StoryJob>, DomainError> {
        let row: Option<JobRow> = sqlx::query_as(
            "SELECT job_id, session_id, theme, status, story_id, error, completed_at \
             FROM story_jobs WHERE job_id = $1",
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(infra)?;

        row.map(StoryJob::try_from).transpose()
    }

    async fn update_job(&self, job: &StoryJob) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE story_jobs \
             SET status = $2, story_id = $3, error = $4, completed_at = $5 \
             WHERE job_id = $1",
        )
        .bind(job.job_id)
        .bind(job.status.as_str())
        .bind(job.story_id)
        .bind(&job.error)
        .bind(job.completed_at)
        .execute(&self.pool)
        .await
        .map_err(infra)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::Infrastructure(format!(
                "job row {} does not exist",
                job.job_id
            )));
        }
        Ok(())
    }

    async fn insert_story_with_root(
        &self,
        story: &Story,
        root: &StoryNode,
    ) -> Result<(), DomainError> {
        let options = serde_json::to_value(&root.options).map_err(|err| {
            DomainError::Infrastructure(format!("failed to encode node options: {err}"))
        })?;

        let mut tx = self.pool.begin().await.map_err(infra)?;

        sqlx::query(
            "INSERT INTO stories (id, title, session_id, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(story.id)
        .bind(&story.title)
        .bind(story.session_id)
        .bind(story.created_at)
        .execute(&mut *tx)
        .await
        .map_err(infra)?;

        sqlx::query(
            "INSERT INTO story_nodes \
             (id, story_id, content, is_root, is_ending, is_winning_ending, options) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(root.id)
        .bind(root.story_id)
        .bind(&root.content)
        .bind(root.is_root)
        .bind(root.is_ending)
        .bind(root.is_winning_ending)
        .bind(options)
        .execute(&mut *tx)
        .await
        .map_err(infra)?;

        tx.commit().await.map_err(infra)?;
        Ok(())
    }

    async fn find_story(&self, story_id: Uuid) -> Result<Option<Story>, DomainError> {
        let row: Option<StoryRow> = sqlx::query_as(
            "SELECT id, title, session_id, created_at FROM stories WHERE id = $1",
        )
        .bind(story_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(infra)?;

        Ok(row.map(Story::from))
    }

    async fn find_story_nodes(&self, story_id: Uuid) -> Result<Vec<StoryNode>, DomainError> {
        let rows: Vec<NodeRow> = sqlx::query_as(
            "SELECT id, story_id, content, is_root, is_ending, is_winning_ending, options \
             FROM story_nodes WHERE story_id = $1 ORDER BY id",
        )
        .bind(story_id)
        .fetch_all(&self.pool)
        .await
        .map_err(infra)?;

        rows.into_iter().map(StoryNode::try_from).collect()
    }
}
