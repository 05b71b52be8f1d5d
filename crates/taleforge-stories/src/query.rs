//! Query side: assembling a completed story tree.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use taleforge_core::error::DomainError;
use taleforge_core::model::StoryNode;
use taleforge_core::store::StoryStore;
use uuid::Uuid;

/// Read-only view of a single story node.
#[derive(Debug, Clone, Serialize)]
pub struct StoryNodeView {
    /// Node identifier.
    pub id: Uuid,
    /// Generated narrative text.
    pub content: String,
    /// Whether this node ends the story.
    pub is_ending: bool,
    /// Whether this ending is a winning one.
    pub is_winning_ending: bool,
    /// Choice label to next-node reference.
    pub options: BTreeMap<String, Uuid>,
}

impl From<StoryNode> for StoryNodeView {
    fn from(node: StoryNode) -> Self {
        Self {
            id: node.id,
            content: node.content,
            is_ending: node.is_ending,
            is_winning_ending: node.is_winning_ending,
            options: node.options,
        }
    }
}

/// Read-only view of a completed story: metadata, the root node, and every
/// node keyed by id so clients can resolve option references.
#[derive(Debug, Serialize)]
pub struct CompleteStoryView {
    /// Story identifier.
    pub id: Uuid,
    /// The theme the story was requested with.
    pub title: String,
    /// The owning client session.
    pub session_id: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// The story's entry node.
    pub root_node: StoryNodeView,
    /// Every node of the story, keyed by node id.
    pub all_nodes: BTreeMap<Uuid, StoryNodeView>,
}

/// Assembles the complete story tree for `story_id`.
///
/// Read-only: two calls with the same id return identical structure.
///
/// # Errors
///
/// Returns `DomainError::StoryNotFound` when the id is unknown and
/// `DomainError::MissingRootNode` when the story was persisted without its
/// mandatory root — a corrupt state the generator's atomic pair write is
/// designed to prevent.
pub async fn get_complete_story(
    story_id: Uuid,
    store: &dyn StoryStore,
) -> Result<CompleteStoryView, DomainError> {
    let story = store
        .find_story(story_id)
        .await?
        .ok_or(DomainError::StoryNotFound(story_id))?;

    let nodes = store.find_story_nodes(story_id).await?;

    let root_id = nodes
        .iter()
        .find(|node| node.is_root)
        .map(|node| node.id)
        .ok_or(DomainError::MissingRootNode(story_id))?;

    let all_nodes: BTreeMap<Uuid, StoryNodeView> = nodes
        .into_iter()
        .map(|node| (node.id, StoryNodeView::from(node)))
        .collect();
    let root_node = all_nodes[&root_id].clone();

    Ok(CompleteStoryView {
        id: story.id,
        title: story.title,
        session_id: story.session_id,
        created_at: story.created_at,
        root_node,
        all_nodes,
    })
}
