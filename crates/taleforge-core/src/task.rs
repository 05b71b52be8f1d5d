//! Background task scheduling abstraction.

use std::future::Future;
use std::pin::Pin;

/// A boxed unit of background work.
pub type BoxedTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Abstraction over fire-and-forget scheduling of background work.
///
/// Production code spawns onto the async runtime; tests queue the task and
/// drain it synchronously, so orchestration is observable without racing
/// against a detached task.
pub trait TaskExecutor: Send + Sync {
    /// Schedules the task to run independently of the caller.
    fn spawn(&self, task: BoxedTask);
}
