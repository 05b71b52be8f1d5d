//! Story generation: one provider call, one story, one root node.

use std::collections::BTreeMap;

use taleforge_core::clock::Clock;
use taleforge_core::error::DomainError;
use taleforge_core::model::{Story, StoryNode};
use taleforge_core::store::StoryStore;
use taleforge_genai::{Error as GenAiError, GenerationRequest, TextGenerator};
use tracing::info;
use uuid::Uuid;

const SYSTEM_PROMPT: &str = "You are a creative story writer.";
const MAX_STORY_TOKENS: u32 = 400;
const STORY_TEMPERATURE: f32 = 0.9;

fn story_request(theme: &str) -> GenerationRequest {
    GenerationRequest {
        system: SYSTEM_PROMPT.to_owned(),
        user: format!("Write a short story (200-400 words) about: {theme}"),
        max_tokens: MAX_STORY_TOKENS,
        temperature: STORY_TEMPERATURE,
    }
}

/// Generates a story for the theme and persists it together with its root
/// node. Blocking from the caller's point of view; the job orchestrator
/// runs it on the background execution path.
///
/// # Errors
///
/// Returns `DomainError::Configuration` when the provider credential is
/// missing, `DomainError::Generation` on provider failure or unusable
/// output, and `DomainError::Infrastructure` on persistence failure.
pub async fn generate_story(
    session_id: Uuid,
    theme: &str,
    generator: &dyn TextGenerator,
    store: &dyn StoryStore,
    clock: &dyn Clock,
) -> Result<Story, DomainError> {
    let request = story_request(theme);
    let text = generator.generate(&request).await.map_err(|err| match err {
        GenAiError::NoApiKey => DomainError::Configuration(err.to_string()),
        other => DomainError::Generation(other.to_string()),
    })?;

    let content = text.trim();
    if content.is_empty() {
        return Err(DomainError::Generation(
            "provider returned an empty completion".to_owned(),
        ));
    }

    let story = Story {
        id: Uuid::new_v4(),
        title: theme.to_owned(),
        session_id,
        created_at: clock.now(),
    };
    let root = StoryNode {
        id: Uuid::new_v4(),
        story_id: story.id,
        content: content.to_owned(),
        is_root: true,
        is_ending: false,
        is_winning_ending: false,
        options: BTreeMap::new(),
    };

    store.insert_story_with_root(&story, &root).await?;

    info!(story_id = %story.id, session_id = %session_id, "story generated");

    Ok(story)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};
    use taleforge_test_support::{
        FailingGenerator, FailingStoryStore, FixedClock, InMemoryStoryStore, ScriptedGenerator,
        UnconfiguredGenerator,
    };

    fn fixed_clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
    }

    #[tokio::test]
    async fn test_generate_story_persists_story_with_root_node() {
        // Arrange
        let session_id = Uuid::new_v4();
        let store = InMemoryStoryStore::new();
        let generator = ScriptedGenerator::new("  A dragon wandered far from home.  ");
        let clock = fixed_clock();

        // Act
        let story = generate_story(session_id, "a lost dragon", &generator, &store, &clock)
            .await
            .unwrap();

        // Assert
        assert_eq!(story.title, "a lost dragon");
        assert_eq!(story.session_id, session_id);
        assert_eq!(story.created_at, clock.0);

        let persisted = store.find_story(story.id).await.unwrap().unwrap();
        assert_eq!(persisted.id, story.id);

        let nodes = store.find_story_nodes(story.id).await.unwrap();
        assert_eq!(nodes.len(), 1);
        let root = &nodes[0];
        assert!(root.is_root);
        assert!(!root.is_ending);
        assert!(!root.is_winning_ending);
        assert!(root.options.is_empty());
        assert_eq!(root.content, "A dragon wandered far from home.");
    }

    #[tokio::test]
    async fn test_generate_story_builds_the_fixed_prompt() {
        let store = InMemoryStoryStore::new();
        let generator = ScriptedGenerator::new("text");

        generate_story(
            Uuid::new_v4(),
            "a lost dragon",
            &generator,
            &store,
            &fixed_clock(),
        )
        .await
        .unwrap();

        let requests = generator.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system, "You are a creative story writer.");
        assert_eq!(
            requests[0].user,
            "Write a short story (200-400 words) about: a lost dragon"
        );
        assert_eq!(requests[0].max_tokens, 400);
        assert!((requests[0].temperature - 0.9).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_missing_credential_maps_to_configuration_error() {
        let store = InMemoryStoryStore::new();

        let result = generate_story(
            Uuid::new_v4(),
            "a lost dragon",
            &UnconfiguredGenerator,
            &store,
            &fixed_clock(),
        )
        .await;

        assert!(matches!(result, Err(DomainError::Configuration(_))));
        assert_eq!(store.story_count(), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_maps_to_generation_error_without_story() {
        let store = InMemoryStoryStore::new();

        let result = generate_story(
            Uuid::new_v4(),
            "a lost dragon",
            &FailingGenerator,
            &store,
            &fixed_clock(),
        )
        .await;

        assert!(matches!(result, Err(DomainError::Generation(_))));
        assert_eq!(store.story_count(), 0);
        assert_eq!(store.node_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_completion_is_a_generation_error() {
        let store = InMemoryStoryStore::new();
        let generator = ScriptedGenerator::new("   \n\t  ");

        let result = generate_story(
            Uuid::new_v4(),
            "a lost dragon",
            &generator,
            &store,
            &fixed_clock(),
        )
        .await;

        assert!(matches!(result, Err(DomainError::Generation(_))));
        assert_eq!(store.story_count(), 0);
    }

    #[tokio::test]
    async fn test_persistence_failure_propagates_as_infrastructure() {
        let generator = ScriptedGenerator::new("text");

        let result = generate_story(
            Uuid::new_v4(),
            "a lost dragon",
            &generator,
            &FailingStoryStore,
            &fixed_clock(),
        )
        .await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }
}
