//! Taleforge Store — PostgreSQL persistence.
//!
//! Implements the `StoryStore` trait over sqlx. The schema lives in the
//! workspace `migrations/` directory.

pub mod pg_story_store;

pub use pg_story_store::PgStoryStore;
