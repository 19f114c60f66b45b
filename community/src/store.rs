//! Persistence collaborator.
//!
//! The service layer talks to storage only through [`CommunityStore`], so a
//! database-backed implementation can replace [`InMemoryStore`] without
//! touching the reputation logic.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use reputation::{
    ContentStatus, EvaluationScore, KeywordSelection, Review, TargetType, Vote, VoteKey, VoteLedger,
    VoteOutcome, VoteType,
};

use crate::types::*;

/// Error types for store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Row not found
    #[error("Row not found: {0}")]
    NotFound(String),

    /// Unique constraint violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Backend failure
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Append-only evaluation and keyword history per subject.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append_evaluation(&self, subject_id: &str, score: EvaluationScore) -> StoreResult<()>;

    async fn evaluations(&self, subject_id: &str) -> StoreResult<Vec<EvaluationScore>>;

    async fn append_keywords(
        &self,
        subject_id: &str,
        selection: KeywordSelection,
    ) -> StoreResult<()>;

    async fn keyword_history(&self, subject_id: &str) -> StoreResult<Vec<KeywordSelection>>;
}

/// Storage for every record the service owns.
///
/// Rows with vote counters are never replaced wholesale. Edits and status
/// changes touch only their own columns, so a vote committed between a read
/// and a write is never overwritten.
#[async_trait]
pub trait CommunityStore: HistoryStore {
    // Posts

    async fn insert_post(&self, post: Post) -> StoreResult<()>;

    async fn get_post(&self, id: &str) -> StoreResult<Option<Post>>;

    /// Set title and body of a live post; returns the stored row.
    async fn edit_post(
        &self,
        id: &str,
        title: &str,
        content: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Post>;

    /// Posts with the given status, newest first.
    async fn list_posts(&self, status: ContentStatus) -> StoreResult<Vec<Post>>;

    // Comments

    async fn insert_comment(&self, row: CommentRow) -> StoreResult<()>;

    async fn get_comment(&self, id: &str) -> StoreResult<Option<CommentRow>>;

    /// Set the body of a live comment; returns the stored row.
    async fn edit_comment(
        &self,
        id: &str,
        content: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<CommentRow>;

    /// Every comment row on a subject, any status, in insertion order.
    async fn comments_for(&self, subject_id: &str) -> StoreResult<Vec<CommentRow>>;

    // Votes

    async fn find_vote(&self, key: &VoteKey) -> StoreResult<Option<Vote>>;

    /// Decide the vote transition and apply the ledger effect and counter
    /// delta as one step. Fails with `NotFound` if the target is missing.
    async fn commit_vote(
        &self,
        key: &VoteKey,
        requested: VoteType,
    ) -> StoreResult<(VoteOutcome, VoteCounts)>;

    /// Compare-and-set a target's status. Fails with `Conflict` if the stored
    /// status is no longer `expected`, `NotFound` if the row is missing.
    async fn set_status(
        &self,
        target: &TargetRef,
        expected: ContentStatus,
        next: ContentStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<()>;

    // Reviews

    /// Insert a review. Fails with `Conflict` if the author already reviewed
    /// the subject.
    async fn insert_review(&self, review: Review) -> StoreResult<()>;

    async fn get_review(&self, id: &str) -> StoreResult<Option<Review>>;

    /// Set the text of a live review; returns the stored row.
    async fn edit_review(&self, id: &str, content: &str, at: DateTime<Utc>) -> StoreResult<Review>;

    async fn find_review(&self, subject_id: &str, author_id: &str) -> StoreResult<Option<Review>>;

    /// Reviews on a subject, newest first.
    async fn reviews_for(&self, subject_id: &str) -> StoreResult<Vec<Review>>;

    // Moderation

    async fn insert_admin_log(&self, log: AdminLog) -> StoreResult<()>;

    /// Admin log, newest first.
    async fn admin_logs(&self) -> StoreResult<Vec<AdminLog>>;

    async fn insert_report(&self, report: AbuseReport) -> StoreResult<()>;

    async fn get_report(&self, id: &str) -> StoreResult<Option<AbuseReport>>;

    async fn update_report(&self, report: AbuseReport) -> StoreResult<()>;

    /// Reports with the given status, oldest first.
    async fn reports(&self, status: ReportStatus) -> StoreResult<Vec<AbuseReport>>;

    // Notifications

    async fn insert_notification(&self, notification: Notification) -> StoreResult<()>;

    async fn get_notification(&self, id: &str) -> StoreResult<Option<Notification>>;

    /// Inbox of a user, newest first, at most `limit` entries.
    async fn notifications_for(
        &self,
        user_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<Notification>>;

    async fn unread_count(&self, user_id: &str) -> StoreResult<usize>;

    /// Mark one notification read.
    async fn mark_read(&self, id: &str) -> StoreResult<()>;

    /// Mark a user's whole inbox read; returns how many changed.
    async fn mark_all_read(&self, user_id: &str) -> StoreResult<usize>;
}

/// In-memory store backed by `tokio::sync::RwLock` maps.
///
/// Vote commits take the ledger lock before the target table lock; no other
/// path takes both, so the pair cannot deadlock.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    posts: Arc<RwLock<HashMap<String, Post>>>,
    comments: Arc<RwLock<Vec<CommentRow>>>,
    votes: Arc<RwLock<VoteLedger>>,
    evaluations: Arc<RwLock<HashMap<String, Vec<EvaluationScore>>>>,
    keywords: Arc<RwLock<HashMap<String, Vec<KeywordSelection>>>>,
    reviews: Arc<RwLock<HashMap<String, Review>>>,
    admin_logs: Arc<RwLock<Vec<AdminLog>>>,
    reports: Arc<RwLock<HashMap<String, AbuseReport>>>,
    notifications: Arc<RwLock<Vec<Notification>>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a counter delta to the target and return the new counts.
    async fn apply_counts(&self, outcome: &VoteOutcome, key: &VoteKey) -> StoreResult<VoteCounts> {
        let missing = || StoreError::NotFound(format!("{} {}", key.target_type, key.target_id));
        let delta = outcome.delta;
        match key.target_type {
            TargetType::Post => {
                let mut posts = self.posts.write().await;
                let post = posts.get_mut(&key.target_id).ok_or_else(missing)?;
                (post.likes, post.dislikes) = delta.apply(post.likes, post.dislikes);
                Ok(VoteCounts {
                    likes: post.likes,
                    dislikes: post.dislikes,
                })
            }
            TargetType::Comment => {
                let mut comments = self.comments.write().await;
                let row = comments
                    .iter_mut()
                    .find(|r| r.node.id == key.target_id)
                    .ok_or_else(missing)?;
                (row.node.likes, row.node.dislikes) =
                    delta.apply(row.node.likes, row.node.dislikes);
                Ok(VoteCounts {
                    likes: row.node.likes,
                    dislikes: row.node.dislikes,
                })
            }
            TargetType::Review => {
                let mut reviews = self.reviews.write().await;
                let review = reviews.get_mut(&key.target_id).ok_or_else(missing)?;
                (review.helpful_count, review.unhelpful_count) =
                    delta.apply(review.helpful_count, review.unhelpful_count);
                Ok(VoteCounts {
                    likes: review.helpful_count,
                    dislikes: review.unhelpful_count,
                })
            }
        }
    }

    async fn target_exists(&self, key: &VoteKey) -> bool {
        match key.target_type {
            TargetType::Post => self.posts.read().await.contains_key(&key.target_id),
            TargetType::Comment => {
                let comments = self.comments.read().await;
                comments.iter().any(|r| r.node.id == key.target_id)
            }
            TargetType::Review => self.reviews.read().await.contains_key(&key.target_id),
        }
    }
}

#[async_trait]
impl HistoryStore for InMemoryStore {
    async fn append_evaluation(&self, subject_id: &str, score: EvaluationScore) -> StoreResult<()> {
        let mut evaluations = self.evaluations.write().await;
        evaluations.entry(subject_id.to_string()).or_default().push(score);
        Ok(())
    }

    async fn evaluations(&self, subject_id: &str) -> StoreResult<Vec<EvaluationScore>> {
        Ok(self.evaluations.read().await.get(subject_id).cloned().unwrap_or_default())
    }

    async fn append_keywords(
        &self,
        subject_id: &str,
        selection: KeywordSelection,
    ) -> StoreResult<()> {
        let mut keywords = self.keywords.write().await;
        keywords.entry(subject_id.to_string()).or_default().push(selection);
        Ok(())
    }

    async fn keyword_history(&self, subject_id: &str) -> StoreResult<Vec<KeywordSelection>> {
        Ok(self.keywords.read().await.get(subject_id).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl CommunityStore for InMemoryStore {
    async fn insert_post(&self, post: Post) -> StoreResult<()> {
        let mut posts = self.posts.write().await;
        if posts.contains_key(&post.id) {
            return Err(StoreError::Conflict(format!("post {}", post.id)));
        }
        posts.insert(post.id.clone(), post);
        Ok(())
    }

    async fn get_post(&self, id: &str) -> StoreResult<Option<Post>> {
        Ok(self.posts.read().await.get(id).cloned())
    }

    async fn edit_post(
        &self,
        id: &str,
        title: &str,
        content: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Post> {
        let mut posts = self.posts.write().await;
        let post = posts
            .get_mut(id)
            .filter(|p| p.status == ContentStatus::Active)
            .ok_or_else(|| StoreError::NotFound(format!("post {}", id)))?;
        post.title = title.to_string();
        post.content = content.to_string();
        post.updated_at = at;
        Ok(post.clone())
    }

    async fn list_posts(&self, status: ContentStatus) -> StoreResult<Vec<Post>> {
        let posts = self.posts.read().await;
        let mut listed: Vec<Post> =
            posts.values().filter(|p| p.status == status).cloned().collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(listed)
    }

    async fn insert_comment(&self, row: CommentRow) -> StoreResult<()> {
        let mut comments = self.comments.write().await;
        if comments.iter().any(|r| r.node.id == row.node.id) {
            return Err(StoreError::Conflict(format!("comment {}", row.node.id)));
        }
        comments.push(row);
        Ok(())
    }

    async fn get_comment(&self, id: &str) -> StoreResult<Option<CommentRow>> {
        Ok(self.comments.read().await.iter().find(|r| r.node.id == id).cloned())
    }

    async fn edit_comment(
        &self,
        id: &str,
        content: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<CommentRow> {
        let mut comments = self.comments.write().await;
        let row = comments
            .iter_mut()
            .find(|r| r.node.id == id && r.status == ContentStatus::Active)
            .ok_or_else(|| StoreError::NotFound(format!("comment {}", id)))?;
        row.node.content = content.to_string();
        row.updated_at = Some(at);
        Ok(row.clone())
    }

    async fn comments_for(&self, subject_id: &str) -> StoreResult<Vec<CommentRow>> {
        let comments = self.comments.read().await;
        Ok(comments.iter().filter(|r| r.subject_id == subject_id).cloned().collect())
    }

    async fn find_vote(&self, key: &VoteKey) -> StoreResult<Option<Vote>> {
        Ok(self.votes.read().await.get(key).cloned())
    }

    async fn commit_vote(
        &self,
        key: &VoteKey,
        requested: VoteType,
    ) -> StoreResult<(VoteOutcome, VoteCounts)> {
        let mut ledger = self.votes.write().await;
        if !self.target_exists(key).await {
            return Err(StoreError::NotFound(format!("{} {}", key.target_type, key.target_id)));
        }
        let outcome = reputation::apply_vote(key, ledger.get(key), requested);
        let counts = self.apply_counts(&outcome, key).await?;
        ledger.commit(&outcome);
        Ok((outcome, counts))
    }

    async fn set_status(
        &self,
        target: &TargetRef,
        expected: ContentStatus,
        next: ContentStatus,
        at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let id = target.target_id.as_str();
        let missing = || StoreError::NotFound(format!("{} {}", target.target_type, id));
        let stale = |found: ContentStatus| {
            StoreError::Conflict(format!(
                "{} {} is {:?}, expected {:?}",
                target.target_type, id, found, expected
            ))
        };
        match target.target_type {
            TargetType::Post => {
                let mut posts = self.posts.write().await;
                let post = posts.get_mut(id).ok_or_else(missing)?;
                if post.status != expected {
                    return Err(stale(post.status));
                }
                post.status = next;
                post.updated_at = at;
            }
            TargetType::Comment => {
                let mut comments = self.comments.write().await;
                let row = comments.iter_mut().find(|r| r.node.id == id).ok_or_else(missing)?;
                if row.status != expected {
                    return Err(stale(row.status));
                }
                row.status = next;
                row.updated_at = Some(at);
            }
            TargetType::Review => {
                let mut reviews = self.reviews.write().await;
                let review = reviews.get_mut(id).ok_or_else(missing)?;
                if review.status != expected {
                    return Err(stale(review.status));
                }
                review.status = next;
                review.updated_at = Some(at);
            }
        }
        Ok(())
    }

    async fn insert_review(&self, review: Review) -> StoreResult<()> {
        let mut reviews = self.reviews.write().await;
        let duplicate = reviews.values().any(|r| {
            r.subject_id == review.subject_id
                && r.author_id == review.author_id
                && r.status != ContentStatus::Deleted
        });
        if duplicate || reviews.contains_key(&review.id) {
            return Err(StoreError::Conflict(format!(
                "review by {} on {}",
                review.author_id, review.subject_id
            )));
        }
        reviews.insert(review.id.clone(), review);
        Ok(())
    }

    async fn get_review(&self, id: &str) -> StoreResult<Option<Review>> {
        Ok(self.reviews.read().await.get(id).cloned())
    }

    async fn edit_review(&self, id: &str, content: &str, at: DateTime<Utc>) -> StoreResult<Review> {
        let mut reviews = self.reviews.write().await;
        let review = reviews
            .get_mut(id)
            .filter(|r| r.status == ContentStatus::Active)
            .ok_or_else(|| StoreError::NotFound(format!("review {}", id)))?;
        review.content = content.to_string();
        review.updated_at = Some(at);
        Ok(review.clone())
    }

    async fn find_review(&self, subject_id: &str, author_id: &str) -> StoreResult<Option<Review>> {
        let reviews = self.reviews.read().await;
        Ok(reviews
            .values()
            .find(|r| {
                r.subject_id == subject_id
                    && r.author_id == author_id
                    && r.status != ContentStatus::Deleted
            })
            .cloned())
    }

    async fn reviews_for(&self, subject_id: &str) -> StoreResult<Vec<Review>> {
        let reviews = self.reviews.read().await;
        let mut listed: Vec<Review> = reviews
            .values()
            .filter(|r| r.subject_id == subject_id)
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(listed)
    }

    async fn insert_admin_log(&self, log: AdminLog) -> StoreResult<()> {
        self.admin_logs.write().await.push(log);
        Ok(())
    }

    async fn admin_logs(&self) -> StoreResult<Vec<AdminLog>> {
        let logs = self.admin_logs.read().await;
        Ok(logs.iter().rev().cloned().collect())
    }

    async fn insert_report(&self, report: AbuseReport) -> StoreResult<()> {
        self.reports.write().await.insert(report.id.clone(), report);
        Ok(())
    }

    async fn get_report(&self, id: &str) -> StoreResult<Option<AbuseReport>> {
        Ok(self.reports.read().await.get(id).cloned())
    }

    async fn update_report(&self, report: AbuseReport) -> StoreResult<()> {
        let mut reports = self.reports.write().await;
        let slot = reports
            .get_mut(&report.id)
            .ok_or_else(|| StoreError::NotFound(format!("report {}", report.id)))?;
        *slot = report;
        Ok(())
    }

    async fn reports(&self, status: ReportStatus) -> StoreResult<Vec<AbuseReport>> {
        let reports = self.reports.read().await;
        let mut listed: Vec<AbuseReport> =
            reports.values().filter(|r| r.status == status).cloned().collect();
        listed.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(listed)
    }

    async fn insert_notification(&self, notification: Notification) -> StoreResult<()> {
        self.notifications.write().await.push(notification);
        Ok(())
    }

    async fn get_notification(&self, id: &str) -> StoreResult<Option<Notification>> {
        Ok(self.notifications.read().await.iter().find(|n| n.id == id).cloned())
    }

    async fn notifications_for(
        &self,
        user_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<Notification>> {
        let notifications = self.notifications.read().await;
        // Insertion order is creation order; walk it backwards for newest first
        Ok(notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn unread_count(&self, user_id: &str) -> StoreResult<usize> {
        let notifications = self.notifications.read().await;
        Ok(notifications.iter().filter(|n| n.user_id == user_id && !n.is_read).count())
    }

    async fn mark_read(&self, id: &str) -> StoreResult<()> {
        let mut notifications = self.notifications.write().await;
        let notification = notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("notification {}", id)))?;
        notification.is_read = true;
        Ok(())
    }

    async fn mark_all_read(&self, user_id: &str) -> StoreResult<usize> {
        let mut notifications = self.notifications.write().await;
        let mut changed = 0;
        for n in notifications.iter_mut().filter(|n| n.user_id == user_id && !n.is_read) {
            n.is_read = true;
            changed += 1;
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reputation::{CommentNode, LedgerEffect};

    fn post(id: &str) -> Post {
        Post {
            id: id.to_string(),
            author_id: "alice".to_string(),
            title: "title".to_string(),
            content: "body".to_string(),
            category: PostCategory::Experience,
            status: ContentStatus::Active,
            likes: 0,
            dislikes: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_commit_vote_updates_ledger_and_counters() {
        let store = InMemoryStore::new();
        store.insert_post(post("p1")).await.unwrap();
        let key = VoteKey::new("bob", TargetType::Post, "p1");

        let (outcome, counts) = store.commit_vote(&key, VoteType::Up).await.unwrap();
        assert!(matches!(outcome.effect, LedgerEffect::Insert(_)));
        assert_eq!(counts, VoteCounts { likes: 1, dislikes: 0 });

        let (_, counts) = store.commit_vote(&key, VoteType::Down).await.unwrap();
        assert_eq!(counts, VoteCounts { likes: 0, dislikes: 1 });
        assert_eq!(store.find_vote(&key).await.unwrap().unwrap().vote_type, VoteType::Down);

        let (_, counts) = store.commit_vote(&key, VoteType::Down).await.unwrap();
        assert_eq!(counts, VoteCounts::default());
        assert!(store.find_vote(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_commit_vote_missing_target_leaves_ledger_untouched() {
        let store = InMemoryStore::new();
        let key = VoteKey::new("bob", TargetType::Comment, "ghost");
        let err = store.commit_vote(&key, VoteType::Up).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(store.find_vote(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_votes_are_counted_once_each() {
        let store = InMemoryStore::new();
        store.insert_post(post("p1")).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let key = VoteKey::new(format!("user-{}", i), TargetType::Post, "p1");
                store.commit_vote(&key, VoteType::Up).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let stored = store.get_post("p1").await.unwrap().unwrap();
        assert_eq!(stored.likes, 20);
    }

    #[tokio::test]
    async fn test_status_change_keeps_vote_committed_after_read() {
        let store = InMemoryStore::new();
        store.insert_post(post("p1")).await.unwrap();

        let snapshot = store.get_post("p1").await.unwrap().unwrap();
        let key = VoteKey::new("bob", TargetType::Post, "p1");
        store.commit_vote(&key, VoteType::Up).await.unwrap();

        store
            .set_status(&TargetRef::post("p1"), snapshot.status, ContentStatus::Blind, Utc::now())
            .await
            .unwrap();

        let stored = store.get_post("p1").await.unwrap().unwrap();
        assert_eq!(stored.status, ContentStatus::Blind);
        assert_eq!(stored.likes, 1);
    }

    #[tokio::test]
    async fn test_edits_keep_counters() {
        let store = InMemoryStore::new();
        store.insert_post(post("p1")).await.unwrap();
        store
            .insert_comment(CommentRow {
                subject_id: "p1".to_string(),
                status: ContentStatus::Active,
                node: CommentNode::new("c1", "alice", "hi"),
                updated_at: None,
            })
            .await
            .unwrap();

        let up = |target: TargetType, id: &str| VoteKey::new("bob", target, id);
        store.commit_vote(&up(TargetType::Post, "p1"), VoteType::Up).await.unwrap();
        store.commit_vote(&up(TargetType::Comment, "c1"), VoteType::Down).await.unwrap();

        let post = store.edit_post("p1", "new title", "new body", Utc::now()).await.unwrap();
        assert_eq!(post.title, "new title");
        assert_eq!(post.likes, 1);

        let row = store.edit_comment("c1", "edited", Utc::now()).await.unwrap();
        assert_eq!(row.node.content, "edited");
        assert_eq!(row.node.dislikes, 1);
    }

    #[tokio::test]
    async fn test_set_status_rejects_stale_expectation() {
        let store = InMemoryStore::new();
        store.insert_post(post("p1")).await.unwrap();
        let target = TargetRef::post("p1");

        store
            .set_status(&target, ContentStatus::Active, ContentStatus::Blind, Utc::now())
            .await
            .unwrap();
        let err = store
            .set_status(&target, ContentStatus::Active, ContentStatus::Deleted, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.get_post("p1").await.unwrap().unwrap().status, ContentStatus::Blind);

        // Edits only reach live rows
        let err = store.edit_post("p1", "t", "b", Utc::now()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));

        let missing = TargetRef::comment("ghost");
        let err = store
            .set_status(&missing, ContentStatus::Active, ContentStatus::Blind, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_one_review_per_author() {
        let store = InMemoryStore::new();
        let review = Review {
            id: "r1".to_string(),
            subject_id: "s1".to_string(),
            author_id: "alice".to_string(),
            content: "ok".to_string(),
            rating: 4,
            helpful_count: 0,
            unhelpful_count: 0,
            status: ContentStatus::Active,
            created_at: Utc::now(),
            updated_at: None,
        };
        store.insert_review(review.clone()).await.unwrap();

        let again = Review {
            id: "r2".to_string(),
            ..review
        };
        assert!(matches!(store.insert_review(again).await, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_notifications_newest_first_and_capped() {
        let store = InMemoryStore::new();
        for i in 0..5 {
            let n = Notification::new("alice", NotificationKind::System, format!("t{}", i), "m");
            store.insert_notification(n).await.unwrap();
        }
        store
            .insert_notification(Notification::new("bob", NotificationKind::System, "other", "m"))
            .await
            .unwrap();

        let inbox = store.notifications_for("alice", 3).await.unwrap();
        let titles: Vec<_> = inbox.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, ["t4", "t3", "t2"]);
        assert_eq!(store.unread_count("alice").await.unwrap(), 5);
        assert_eq!(store.mark_all_read("alice").await.unwrap(), 5);
        assert_eq!(store.unread_count("alice").await.unwrap(), 0);
        assert_eq!(store.unread_count("bob").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_comments_for_filters_subject() {
        let store = InMemoryStore::new();
        for (id, subject) in [("c1", "p1"), ("c2", "p2"), ("c3", "p1")] {
            let row = CommentRow {
                subject_id: subject.to_string(),
                status: ContentStatus::Active,
                node: CommentNode::new(id, "alice", "hi"),
                updated_at: None,
            };
            store.insert_comment(row).await.unwrap();
        }
        let rows = store.comments_for("p1").await.unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.node.id.as_str()).collect();
        assert_eq!(ids, ["c1", "c3"]);
    }
}
