//! Test executor — drainable `TaskExecutor` implementation for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use taleforge_core::task::{BoxedTask, TaskExecutor};

/// An executor that queues scheduled tasks instead of spawning them, so a
/// test can run background work at a point of its choosing.
#[derive(Default)]
pub struct QueueExecutor {
    tasks: Mutex<VecDeque<BoxedTask>>,
}

impl QueueExecutor {
    /// Creates an empty queue executor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting to run.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn scheduled(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    /// Runs every queued task to completion, in scheduling order. Tasks
    /// queued while draining are run as well.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub async fn drain(&self) {
        loop {
            let task = self.tasks.lock().unwrap().pop_front();
            match task {
                Some(task) => task.await,
                None => break,
            }
        }
    }
}

impl TaskExecutor for QueueExecutor {
    fn spawn(&self, task: BoxedTask) {
        self.tasks.lock().unwrap().push_back(task);
    }
}
