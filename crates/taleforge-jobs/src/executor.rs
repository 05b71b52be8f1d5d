//! Production task executor backed by the tokio runtime.

use taleforge_core::task::{BoxedTask, TaskExecutor};

/// Spawns tasks onto the tokio runtime. The join handle is dropped: a
/// scheduled job runs to a terminal state even if the client disconnects.
#[derive(Debug, Clone, Copy)]
pub struct TokioExecutor;

impl TaskExecutor for TokioExecutor {
    fn spawn(&self, task: BoxedTask) {
        drop(tokio::spawn(task));
    }
}
