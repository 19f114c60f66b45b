//! Viewer-scoped visibility of secret comments.
//!
//! Redaction must run before a record leaves the trusted side: the placeholder
//! replaces the body, so the original text never reaches an unauthorized client.

use serde::{Deserialize, Serialize};

use crate::tree::map_tree;
use crate::types::CommentNode;

/// Who is looking. `id` is `None` for anonymous visitors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    pub id: Option<String>,
    pub is_moderator: bool,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            is_moderator: false,
        }
    }

    pub fn moderator(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            is_moderator: true,
        }
    }

    /// Whether this viewer authored a record written by `author_id`.
    pub fn owns(&self, author_id: &str) -> bool {
        self.id.as_deref() == Some(author_id)
    }

    /// Owner-or-moderator check used for deletes.
    pub fn can_remove(&self, author_id: &str) -> bool {
        self.is_moderator || self.owns(author_id)
    }
}

/// `!is_secret || author == viewer || moderator`
pub fn is_visible(node: &CommentNode, viewer: &Viewer) -> bool {
    !node.is_secret || viewer.is_moderator || viewer.owns(&node.author_id)
}

/// Copy of `node` (and its subtree) with hidden bodies replaced by `placeholder`.
pub fn redact(node: &CommentNode, viewer: &Viewer, placeholder: &str) -> CommentNode {
    map_tree(node, |n| {
        let mut out = n.detached();
        if !is_visible(n, viewer) {
            out.content = placeholder.to_string();
        }
        out
    })
}

/// [`redact`] over a forest.
pub fn redact_tree(nodes: &[CommentNode], viewer: &Viewer, placeholder: &str) -> Vec<CommentNode> {
    nodes.iter().map(|n| redact(n, viewer, placeholder)).collect()
}
