//! Shared test fakes and utilities for the Taleforge story service.

mod clock;
mod executor;
mod generator;
mod store;

pub use clock::FixedClock;
pub use executor::QueueExecutor;
pub use generator::{FailingGenerator, ScriptedGenerator, UnconfiguredGenerator};
pub use store::{FailingStoryStore, InMemoryStoryStore};
