//! Job orchestration: create a job row, run it in the background, drive the
//! state machine to a terminal state.

use std::sync::Arc;

use taleforge_core::clock::Clock;
use taleforge_core::error::DomainError;
use taleforge_core::model::StoryJob;
use taleforge_core::store::StoryStore;
use taleforge_core::task::TaskExecutor;
use taleforge_genai::TextGenerator;
use taleforge_stories::generator::generate_story;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Creates jobs and drives their background execution.
///
/// All coordination between the request path and the background path goes
/// through the durable store; the job id is the only shared handle.
#[derive(Clone)]
pub struct JobOrchestrator {
    store: Arc<dyn StoryStore>,
    generator: Arc<dyn TextGenerator>,
    clock: Arc<dyn Clock>,
    executor: Arc<dyn TaskExecutor>,
}

impl JobOrchestrator {
    /// Creates a new orchestrator over the given seams.
    #[must_use]
    pub fn new(
        store: Arc<dyn StoryStore>,
        generator: Arc<dyn TextGenerator>,
        clock: Arc<dyn Clock>,
        executor: Arc<dyn TaskExecutor>,
    ) -> Self {
        Self {
            store,
            generator,
            clock,
            executor,
        }
    }

    /// Persists a pending job and schedules its background execution. The
    /// caller gets the job handle immediately and never waits for
    /// generation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` when the job row cannot be
    /// persisted. Generation problems never fail this call.
    pub async fn create_job(
        &self,
        session_id: Uuid,
        theme: &str,
    ) -> Result<StoryJob, DomainError> {
        let job = StoryJob::new(Uuid::new_v4(), session_id, theme.to_owned());
        self.store.insert_job(&job).await?;

        info!(job_id = %job.job_id, session_id = %session_id, "story job created");

        let worker = self.clone();
        let job_id = job.job_id;
        let theme = job.theme.clone();
        self.executor.spawn(Box::pin(async move {
            worker.run_job(job_id, &theme, session_id).await;
        }));

        Ok(job)
    }

    /// Loads a job for client polling.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::JobNotFound` when the handle is unknown.
    pub async fn find_job(&self, job_id: Uuid) -> Result<StoryJob, DomainError> {
        self.store
            .find_job(job_id)
            .await?
            .ok_or(DomainError::JobNotFound(job_id))
    }

    /// Background execution unit: marks the job `processing`, invokes the
    /// story generator, and commits the terminal state.
    ///
    /// Every failure after the job row was loaded is absorbed into the
    /// `failed` state; nothing propagates out of the background task. A
    /// missing job row is a silent no-op since there is no client-visible
    /// handle to report into.
    pub async fn run_job(&self, job_id: Uuid, theme: &str, session_id: Uuid) {
        let mut job = match self.store.find_job(job_id).await {
            Ok(Some(job)) => job,
            Ok(None) => {
                debug!(%job_id, "job row missing before execution, nothing to do");
                return;
            }
            Err(err) => {
                error!(%job_id, error = %err, "failed to load job row");
                return;
            }
        };

        job.begin_processing();
        if let Err(err) = self.store.update_job(&job).await {
            error!(%job_id, error = %err, "failed to mark job as processing");
            job.fail(err.to_string(), self.clock.now());
            self.commit_terminal_state(&job).await;
            return;
        }

        match generate_story(
            session_id,
            theme,
            self.generator.as_ref(),
            self.store.as_ref(),
            self.clock.as_ref(),
        )
        .await
        {
            Ok(story) => {
                job.complete(story.id, self.clock.now());
                info!(%job_id, story_id = %story.id, "story job completed");
            }
            Err(err) => {
                warn!(%job_id, error = %err, "story job failed");
                job.fail(err.to_string(), self.clock.now());
            }
        }

        self.commit_terminal_state(&job).await;
    }

    async fn commit_terminal_state(&self, job: &StoryJob) {
        if let Err(err) = self.store.update_job(job).await {
            error!(job_id = %job.job_id, error = %err, "failed to persist terminal job state");
        }
    }
}
