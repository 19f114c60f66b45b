//! Records owned by the service layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use reputation::{CommentNode, ContentStatus, EvaluationRecord, Review, TargetType};

/// Community post category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostCategory {
    /// First-hand experience
    Experience,
    /// Question to the community
    Question,
    /// Warning to other tenants
    Caution,
}

/// A community board post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub content: String,
    pub category: PostCategory,
    pub status: ContentStatus,
    pub likes: u64,
    pub dislikes: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored comment row: the node plus the subject it hangs off and its status.
///
/// The subject is a post id for board comments or a review id for review
/// comments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRow {
    pub subject_id: String,
    pub status: ContentStatus,
    pub node: CommentNode,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A votable entity's current counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoteCounts {
    pub likes: u64,
    pub dislikes: u64,
}

/// Reference to any moderatable entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRef {
    pub target_type: TargetType,
    pub target_id: String,
}

impl TargetRef {
    pub fn post(id: impl Into<String>) -> Self {
        Self {
            target_type: TargetType::Post,
            target_id: id.into(),
        }
    }

    pub fn comment(id: impl Into<String>) -> Self {
        Self {
            target_type: TargetType::Comment,
            target_id: id.into(),
        }
    }

    pub fn review(id: impl Into<String>) -> Self {
        Self {
            target_type: TargetType::Review,
            target_id: id.into(),
        }
    }
}

/// Aggregate view returned to the transport layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateView {
    pub average: Option<EvaluationRecord>,
    pub top_keywords: Vec<String>,
}

/// Result of a reputation submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationSummary {
    pub average: Option<EvaluationRecord>,
    pub top_keywords: Vec<String>,
    /// Stored review; drafts keep scores and tags only
    pub review: Option<Review>,
}

/// Subject a submission is recorded against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum SubjectRef {
    /// Not yet registered; keyed by the draft key of its address
    Draft(String),
    /// Registered subject id
    Registered(String),
}

/// Headline figures for a landlord report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub subject_id: String,
    /// Mean of the axis averages, one decimal; 0.0 without submissions
    pub rating: f64,
    pub total_reviews: usize,
    pub evaluation: Option<EvaluationRecord>,
    pub positive_traits: Vec<String>,
    pub negative_traits: Vec<String>,
}

/// Action recorded in the admin log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminAction {
    Blind,
    Unblind,
    Delete,
    Dismiss,
}

impl AdminAction {
    /// Log action for a status change.
    pub fn for_status(status: ContentStatus) -> Self {
        match status {
            ContentStatus::Blind => Self::Blind,
            ContentStatus::Active => Self::Unblind,
            ContentStatus::Deleted => Self::Delete,
        }
    }
}

/// Audit record of a moderator action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminLog {
    pub id: String,
    pub admin_id: String,
    pub action: AdminAction,
    pub target: TargetRef,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Why content was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportReason {
    Defamation,
    Privacy,
    Profanity,
    Other,
}

/// Review state of an abuse report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Reviewed,
    Dismissed,
}

/// An abuse report filed by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbuseReport {
    pub id: String,
    pub reporter_id: String,
    pub target: TargetRef,
    pub reason: ReportReason,
    pub detail: Option<String>,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
}

/// Notification category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Comment,
    Report,
    Admin,
    System,
}

/// A user inbox entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        user_id: impl Into<String>,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            kind,
            title: title.into(),
            message: message.into(),
            link: None,
            is_read: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}
