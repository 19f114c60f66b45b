//! Core record types shared by every component.
//!
//! With the `typescript` feature enabled, the wire-facing types can be exported
//! to TypeScript using ts-rs for consistency with the web frontend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "typescript")]
use ts_rs::TS;

use crate::error::{RejectReason, ReputationError};

/// A comment or reply.
///
/// Storage holds `parent_id` only; `children` is filled in by
/// [`crate::tree::build_tree`] or [`crate::thread::ReplyThread::to_nested`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    /// Unique comment ID
    pub id: String,
    /// Author user ID
    pub author_id: String,
    /// Body text
    pub content: String,
    /// Only the author and moderators may read the body
    #[serde(default)]
    pub is_secret: bool,
    /// When the comment was written
    pub created_at: DateTime<Utc>,
    /// Up-vote counter
    #[serde(default)]
    pub likes: u64,
    /// Down-vote counter
    #[serde(default)]
    pub dislikes: u64,
    /// Parent comment, fixed at creation
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Nested replies (derived, never stored)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CommentNode>,
}

impl CommentNode {
    /// Create a top-level, public comment stamped with the current time.
    pub fn new(
        id: impl Into<String>,
        author_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            author_id: author_id.into(),
            content: content.into(),
            is_secret: false,
            created_at: Utc::now(),
            likes: 0,
            dislikes: 0,
            parent_id: None,
            children: Vec::new(),
        }
    }

    /// Mark the comment secret.
    pub fn secret(mut self, is_secret: bool) -> Self {
        self.is_secret = is_secret;
        self
    }

    /// Attach to a parent comment.
    pub fn reply_to(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Override the creation time.
    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Whether `viewer_id` wrote this comment.
    pub fn is_mine(&self, viewer_id: &str) -> bool {
        self.author_id == viewer_id
    }

    /// Copy of this node with no children.
    pub fn detached(&self) -> Self {
        Self {
            id: self.id.clone(),
            author_id: self.author_id.clone(),
            content: self.content.clone(),
            is_secret: self.is_secret,
            created_at: self.created_at,
            likes: self.likes,
            dislikes: self.dislikes,
            parent_id: self.parent_id.clone(),
            children: Vec::new(),
        }
    }
}

impl Drop for CommentNode {
    /// Unlink descendants onto a heap stack so deep threads drop without
    /// recursing once per level.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Kind of entity a vote is cast on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    /// Community post
    Post,
    /// Comment or reply
    Comment,
    /// Landlord review (helpful / unhelpful)
    Review,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Comment => "comment",
            Self::Review => "review",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum VoteType {
    /// Like / helpful
    Up,
    /// Dislike / unhelpful
    Down,
}

impl VoteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    /// The other direction.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

impl FromStr for VoteType {
    type Err = ReputationError;

    /// Accepts `up`/`down`, and the review wording `helpful`/`unhelpful`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "up" | "helpful" => Ok(Self::Up),
            "down" | "unhelpful" => Ok(Self::Down),
            _ => Err(ReputationError::InvalidInput(RejectReason::InvalidVoteType)),
        }
    }
}

impl fmt::Display for VoteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single voter's vote on a single target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub voter_id: String,
    pub target_type: TargetType,
    pub target_id: String,
    pub vote_type: VoteType,
}

impl Vote {
    /// Ledger key: at most one vote per key.
    pub fn key(&self) -> VoteKey {
        VoteKey {
            voter_id: self.voter_id.clone(),
            target_type: self.target_type,
            target_id: self.target_id.clone(),
        }
    }
}

/// Identity of a vote slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoteKey {
    pub voter_id: String,
    pub target_type: TargetType,
    pub target_id: String,
}

impl VoteKey {
    pub fn new(
        voter_id: impl Into<String>,
        target_type: TargetType,
        target_id: impl Into<String>,
    ) -> Self {
        Self {
            voter_id: voter_id.into(),
            target_type,
            target_id: target_id.into(),
        }
    }
}

/// One landlord evaluation submission. Each axis is rated 1..=5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct EvaluationScore {
    /// Flexibility when negotiating terms
    pub negotiation_flexibility: u8,
    /// Manners around contract renewal
    pub renewal_manners: u8,
    /// How little the landlord interferes
    pub interference_index: u8,
    /// Cooperation on repairs and upkeep
    pub maintenance_cooperation: u8,
    /// Submission time
    pub created_at: DateTime<Utc>,
}

impl EvaluationScore {
    /// Create a score stamped with the current time.
    pub fn new(
        negotiation_flexibility: u8,
        renewal_manners: u8,
        interference_index: u8,
        maintenance_cooperation: u8,
    ) -> Self {
        Self {
            negotiation_flexibility,
            renewal_manners,
            interference_index,
            maintenance_cooperation,
            created_at: Utc::now(),
        }
    }

    /// Axis values in declaration order.
    pub fn axes(&self) -> [u8; 4] {
        [
            self.negotiation_flexibility,
            self.renewal_manners,
            self.interference_index,
            self.maintenance_cooperation,
        ]
    }
}

/// Per-axis averages, each rounded to one decimal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRecord {
    pub negotiation_flexibility: f64,
    pub renewal_manners: f64,
    pub interference_index: f64,
    pub maintenance_cooperation: f64,
}

impl EvaluationRecord {
    pub fn axes(&self) -> [f64; 4] {
        [
            self.negotiation_flexibility,
            self.renewal_manners,
            self.interference_index,
            self.maintenance_cooperation,
        ]
    }
}

/// One keyword-tag submission (1..=5 distinct tags).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct KeywordSelection {
    pub keywords: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl KeywordSelection {
    pub fn new<I, K>(keywords: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
            created_at: Utc::now(),
        }
    }

    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

/// Moderation status of a post, comment or review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    /// Publicly listed
    #[default]
    Active,
    /// Hidden pending review
    Blind,
    /// Removed (terminal)
    Deleted,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Blind => "blind",
            Self::Deleted => "deleted",
        }
    }

    /// Whether a status change from `self` to `next` is allowed.
    pub fn can_transition(&self, next: ContentStatus) -> bool {
        matches!(
            (self, next),
            (Self::Active, Self::Blind)
                | (Self::Blind, Self::Active)
                | (Self::Active, Self::Deleted)
                | (Self::Blind, Self::Deleted)
        )
    }

    /// Transition or reject.
    pub fn transition(&self, next: ContentStatus) -> Result<ContentStatus, ReputationError> {
        if self.can_transition(next) {
            Ok(next)
        } else {
            Err(ReputationError::InvalidInput(RejectReason::InvalidStatusTransition))
        }
    }
}

/// A written landlord review. One per (subject, author).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Unique review ID
    pub id: String,
    /// Subject (address / landlord) the review belongs to
    pub subject_id: String,
    /// Author user ID
    pub author_id: String,
    /// Review text
    pub content: String,
    /// Rounded mean of the submission's four axes
    pub rating: u8,
    /// Helpful votes
    #[serde(default)]
    pub helpful_count: u64,
    /// Unhelpful votes
    #[serde(default)]
    pub unhelpful_count: u64,
    /// Moderation status
    #[serde(default)]
    pub status: ContentStatus,
    /// Submission time
    pub created_at: DateTime<Utc>,
    /// Last content edit
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_type_parsing() {
        assert_eq!("up".parse::<VoteType>().unwrap(), VoteType::Up);
        assert_eq!("unhelpful".parse::<VoteType>().unwrap(), VoteType::Down);
        assert!(matches!(
            "sideways".parse::<VoteType>(),
            Err(ReputationError::InvalidInput(RejectReason::InvalidVoteType))
        ));
    }

    #[test]
    fn test_status_transitions() {
        assert!(ContentStatus::Active.can_transition(ContentStatus::Blind));
        assert!(ContentStatus::Blind.can_transition(ContentStatus::Active));
        assert!(ContentStatus::Blind.can_transition(ContentStatus::Deleted));
        assert!(!ContentStatus::Deleted.can_transition(ContentStatus::Active));
        assert!(!ContentStatus::Active.can_transition(ContentStatus::Active));
    }

    #[test]
    fn test_comment_node_wire_shape() {
        let node = CommentNode::new("c1", "u1", "hello").secret(true).reply_to("c0");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["authorId"], "u1");
        assert_eq!(json["isSecret"], true);
        assert_eq!(json["parentId"], "c0");
        assert!(json.get("children").is_none());
    }
}
