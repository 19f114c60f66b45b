//! Community service: the calling layer around the reputation core.
//!
//! Every operation follows the same shape: fetch records from the store,
//! run the pure core over them, then persist the result. Secret comments are
//! redacted here, before any thread leaves the service.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use reputation::error::require_content;
use reputation::evaluation::{average, overall_rating, review_rating, validate_score};
use reputation::keywords::{normalize_selection, top_keywords};
use reputation::tree::{build_tree, sort_chronologically};
use reputation::{
    CommentNode, ContentStatus, EvaluationScore, KeywordSelection, ReplyThread, Review, TargetType,
    Viewer, VoteKey, VoteType,
};

use crate::config::CommunityConfig;
use crate::drafts::DraftSubjectStore;
use crate::error::{CommunityError, Result};
use crate::store::{CommunityStore, StoreError};
use crate::types::*;

/// Author and status of a moderatable entity.
#[derive(Debug, Clone)]
pub(crate) struct TargetMeta {
    pub author_id: String,
    pub status: ContentStatus,
    /// Subject a comment hangs off; `None` for posts and reviews
    pub subject_id: Option<String>,
}

/// The community service.
pub struct CommunityService<S: CommunityStore> {
    pub(crate) store: Arc<S>,
    pub(crate) drafts: DraftSubjectStore,
    pub(crate) config: CommunityConfig,
}

impl<S: CommunityStore> CommunityService<S> {
    /// Create a service over `store` with default configuration.
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
            drafts: DraftSubjectStore::new(),
            config: CommunityConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CommunityConfig) -> Self {
        self.config = config;
        self
    }

    /// Share an existing draft store.
    pub fn with_drafts(mut self, drafts: DraftSubjectStore) -> Self {
        self.drafts = drafts;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn drafts(&self) -> &DraftSubjectStore {
        &self.drafts
    }

    pub fn config(&self) -> &CommunityConfig {
        &self.config
    }

    /// Signed-in user id, or `Unauthorized`.
    pub(crate) fn require_user(viewer: &Viewer) -> Result<&str> {
        viewer
            .id
            .as_deref()
            .ok_or_else(|| CommunityError::Unauthorized("login required".to_string()))
    }

    // ========================================================================
    // Posts
    // ========================================================================

    pub async fn create_post(
        &self,
        viewer: &Viewer,
        title: &str,
        content: &str,
        category: PostCategory,
    ) -> Result<Post> {
        let author_id = Self::require_user(viewer)?;
        require_content(title)?;
        require_content(content)?;

        let now = Utc::now();
        let post = Post {
            id: uuid::Uuid::new_v4().to_string(),
            author_id: author_id.to_string(),
            title: title.trim().to_string(),
            content: content.to_string(),
            category,
            status: ContentStatus::Active,
            likes: 0,
            dislikes: 0,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_post(post.clone()).await?;

        info!(post_id = %post.id, author = %author_id, "Created post");
        Ok(post)
    }

    /// An active post.
    pub async fn get_post(&self, id: &str) -> Result<Post> {
        match self.store.get_post(id).await? {
            Some(post) if post.status == ContentStatus::Active => Ok(post),
            _ => Err(CommunityError::NotFound(format!("post {}", id))),
        }
    }

    /// Active posts, newest first, optionally filtered by category.
    pub async fn list_posts(&self, category: Option<PostCategory>) -> Result<Vec<Post>> {
        let posts = self.store.list_posts(ContentStatus::Active).await?;
        Ok(posts
            .into_iter()
            .filter(|p| category.map_or(true, |c| p.category == c))
            .collect())
    }

    /// Edit title and body. Author only.
    pub async fn edit_post(
        &self,
        viewer: &Viewer,
        id: &str,
        title: &str,
        content: &str,
    ) -> Result<Post> {
        require_content(title)?;
        require_content(content)?;
        let post = self.get_post(id).await?;
        if !viewer.owns(&post.author_id) {
            warn!(post_id = %id, "Rejected post edit by non-author");
            return Err(CommunityError::Unauthorized(format!("post {}", id)));
        }

        let post = self.store.edit_post(id, title.trim(), content, Utc::now()).await?;

        info!(post_id = %id, "Edited post");
        Ok(post)
    }

    /// Soft-delete a post. Author only; moderators go through moderation.
    pub async fn delete_post(&self, viewer: &Viewer, id: &str) -> Result<()> {
        let post = self.get_post(id).await?;
        if !viewer.owns(&post.author_id) {
            warn!(post_id = %id, "Rejected post delete by non-author");
            return Err(CommunityError::Unauthorized(format!("post {}", id)));
        }

        let next = post.status.transition(ContentStatus::Deleted)?;
        self.store
            .set_status(&TargetRef::post(id), post.status, next, Utc::now())
            .await?;

        info!(post_id = %id, "Deleted post");
        Ok(())
    }

    // ========================================================================
    // Comments
    // ========================================================================

    /// Author of an active post or review, i.e. a subject comments may hang off.
    async fn subject_author(&self, subject_id: &str) -> Result<String> {
        if let Some(post) = self.store.get_post(subject_id).await? {
            if post.status == ContentStatus::Active {
                return Ok(post.author_id);
            }
        }
        if let Some(review) = self.store.get_review(subject_id).await? {
            if review.status == ContentStatus::Active {
                return Ok(review.author_id);
            }
        }
        Err(CommunityError::NotFound(format!("subject {}", subject_id)))
    }

    /// Active comment nodes on a subject, oldest first.
    async fn active_nodes(&self, subject_id: &str) -> Result<Vec<CommentNode>> {
        let rows = self.store.comments_for(subject_id).await?;
        let mut nodes: Vec<CommentNode> = rows
            .into_iter()
            .filter(|r| r.status == ContentStatus::Active)
            .map(|r| r.node)
            .collect();
        sort_chronologically(&mut nodes);
        Ok(nodes)
    }

    /// Write a comment, or a reply when `parent_id` is given.
    ///
    /// The parent must be an active comment on the same subject. Replies
    /// below the depth cap attach to the deepest allowed ancestor instead.
    pub async fn create_comment(
        &self,
        viewer: &Viewer,
        subject_id: &str,
        parent_id: Option<&str>,
        content: &str,
        is_secret: bool,
    ) -> Result<CommentNode> {
        let author_id = Self::require_user(viewer)?;
        require_content(content)?;
        let subject_author = self.subject_author(subject_id).await?;

        let mut node = CommentNode::new(uuid::Uuid::new_v4().to_string(), author_id, content)
            .secret(is_secret);
        let mut parent_author = None;

        if let Some(parent_id) = parent_id {
            let nodes = self.active_nodes(subject_id).await?;
            let thread = ReplyThread::from_flat(&nodes)?;
            let effective = thread
                .reply_parent_for(parent_id, self.config.reputation.thread.max_depth)
                .ok_or_else(|| CommunityError::NotFound(format!("comment {}", parent_id)))?;
            if effective != parent_id {
                debug!(requested = %parent_id, effective = %effective, "Reply depth capped");
            }
            parent_author = thread.find(&effective).map(|p| p.author_id.clone());
            node = node.reply_to(effective);
        }

        self.store
            .insert_comment(CommentRow {
                subject_id: subject_id.to_string(),
                status: ContentStatus::Active,
                node: node.clone(),
                updated_at: None,
            })
            .await?;

        info!(
            comment_id = %node.id,
            subject_id = %subject_id,
            parent_id = ?node.parent_id,
            "Created comment"
        );

        // Reply notifies the parent's author, top-level comment the subject's
        let recipient = parent_author.unwrap_or(subject_author);
        if recipient != author_id {
            let (title, message) = if node.parent_id.is_some() {
                ("새 답글", "내 댓글에 새 답글이 달렸습니다.")
            } else {
                ("새 댓글", "내 글에 새 댓글이 달렸습니다.")
            };
            let notification =
                Notification::new(recipient, NotificationKind::Comment, title, message)
                    .with_link(subject_id);
            self.notify(notification).await;
        }

        Ok(node)
    }

    /// Active comment row by id.
    async fn active_comment(&self, id: &str) -> Result<CommentRow> {
        match self.store.get_comment(id).await? {
            Some(row) if row.status == ContentStatus::Active => Ok(row),
            _ => Err(CommunityError::NotFound(format!("comment {}", id))),
        }
    }

    /// Replace a comment's body. Author only.
    pub async fn edit_comment(
        &self,
        viewer: &Viewer,
        id: &str,
        content: &str,
    ) -> Result<CommentNode> {
        require_content(content)?;
        let row = self.active_comment(id).await?;
        if !viewer.owns(&row.node.author_id) {
            warn!(comment_id = %id, "Rejected comment edit by non-author");
            return Err(CommunityError::Unauthorized(format!("comment {}", id)));
        }

        let row = self.store.edit_comment(id, content, Utc::now()).await?;

        info!(comment_id = %id, "Edited comment");
        Ok(row.node)
    }

    /// Soft-delete a comment. Author or moderator.
    ///
    /// Replies stay stored; with their parent gone they surface as top-level
    /// comments in later thread views.
    pub async fn delete_comment(&self, viewer: &Viewer, id: &str) -> Result<()> {
        let row = self.active_comment(id).await?;
        if !viewer.can_remove(&row.node.author_id) {
            warn!(comment_id = %id, "Rejected comment delete");
            return Err(CommunityError::Unauthorized(format!("comment {}", id)));
        }

        let next = row.status.transition(ContentStatus::Deleted)?;
        self.store
            .set_status(&TargetRef::comment(id), row.status, next, Utc::now())
            .await?;

        info!(comment_id = %id, "Deleted comment");
        Ok(())
    }

    /// Nested, redacted thread of a subject as seen by `viewer`.
    pub async fn comment_thread(
        &self,
        subject_id: &str,
        viewer: &Viewer,
    ) -> Result<Vec<CommentNode>> {
        let nodes = self.active_nodes(subject_id).await?;
        let tree = build_tree(&nodes);
        Ok(reputation::redact_tree(
            &tree,
            viewer,
            &self.config.reputation.thread.secret_placeholder,
        ))
    }

    // ========================================================================
    // Votes
    // ========================================================================

    /// Cast, toggle off, or switch a vote; returns the target's new counters.
    pub async fn vote(
        &self,
        viewer: &Viewer,
        target_type: TargetType,
        target_id: &str,
        vote_type: &str,
    ) -> Result<VoteCounts> {
        let requested: VoteType = vote_type.parse()?;
        let voter_id = Self::require_user(viewer)?;

        let target = TargetRef {
            target_type,
            target_id: target_id.to_string(),
        };
        let meta = self.target_meta(&target).await?;
        if meta.status != ContentStatus::Active {
            return Err(CommunityError::NotFound(format!("{} {}", target_type, target_id)));
        }

        let key = VoteKey::new(voter_id, target_type, target_id);
        let (outcome, counts) = self.store.commit_vote(&key, requested).await?;

        info!(
            voter = %voter_id,
            target_type = %target_type,
            target_id = %target_id,
            effect = ?outcome.effect,
            likes = counts.likes,
            dislikes = counts.dislikes,
            "Committed vote"
        );
        Ok(counts)
    }

    // ========================================================================
    // Reputation
    // ========================================================================

    /// Record one evaluation, one keyword selection and (for registered
    /// subjects) the author's review. Every input is validated before the
    /// first write.
    pub async fn submit_reputation(
        &self,
        viewer: &Viewer,
        subject: &SubjectRef,
        content: &str,
        score: EvaluationScore,
        keywords: KeywordSelection,
    ) -> Result<ReputationSummary> {
        let author_id = Self::require_user(viewer)?;
        validate_score(&score)?;
        let ranking = &self.config.reputation.ranking;
        let selection = normalize_selection(keywords, ranking.min_keywords, ranking.max_keywords)?;

        let review = match subject {
            SubjectRef::Draft(key) => {
                self.drafts.append_evaluation(key, score).await;
                self.drafts.append_keywords(key, selection).await;
                info!(draft_key = %key, author = %author_id, "Recorded draft reputation");
                None
            }
            SubjectRef::Registered(subject_id) => {
                require_content(content)?;
                if self.store.find_review(subject_id, author_id).await?.is_some() {
                    warn!(
                        subject_id = %subject_id,
                        author = %author_id,
                        "Duplicate review rejected"
                    );
                    let duplicate = format!("review by {} on {}", author_id, subject_id);
                    return Err(StoreError::Conflict(duplicate).into());
                }

                let review = Review {
                    id: uuid::Uuid::new_v4().to_string(),
                    subject_id: subject_id.clone(),
                    author_id: author_id.to_string(),
                    content: content.to_string(),
                    rating: review_rating(&score),
                    helpful_count: 0,
                    unhelpful_count: 0,
                    status: ContentStatus::Active,
                    created_at: score.created_at,
                    updated_at: None,
                };
                self.store.insert_review(review.clone()).await?;
                self.store.append_evaluation(subject_id, score).await?;
                self.store.append_keywords(subject_id, selection).await?;

                info!(
                    subject_id = %subject_id,
                    review_id = %review.id,
                    rating = review.rating,
                    "Recorded reputation"
                );
                Some(review)
            }
        };

        let view = self.aggregate(subject).await?;
        Ok(ReputationSummary {
            average: view.average,
            top_keywords: view.top_keywords,
            review,
        })
    }

    /// Current averages and top keywords of a subject.
    pub async fn aggregate(&self, subject: &SubjectRef) -> Result<AggregateView> {
        let (evaluations, keywords) = match subject {
            SubjectRef::Draft(key) => {
                let history = self.drafts.history(key).await;
                (history.evaluations, history.keywords)
            }
            SubjectRef::Registered(id) => (
                self.store.evaluations(id).await?,
                self.store.keyword_history(id).await?,
            ),
        };
        Ok(AggregateView {
            average: average(&evaluations),
            top_keywords: top_keywords(&keywords, self.config.reputation.ranking.top_keywords),
        })
    }

    /// Headline figures for a registered subject.
    pub async fn report_summary(&self, subject_id: &str) -> Result<ReportSummary> {
        let view = self.aggregate(&SubjectRef::Registered(subject_id.to_string())).await?;
        let total_reviews = self
            .store
            .reviews_for(subject_id)
            .await?
            .iter()
            .filter(|r| r.status == ContentStatus::Active)
            .count();
        let (positive_traits, negative_traits) =
            self.config.reputation.ranking.catalog.split_traits(&view.top_keywords);

        Ok(ReportSummary {
            subject_id: subject_id.to_string(),
            rating: view.average.as_ref().map(overall_rating).unwrap_or(0.0),
            total_reviews,
            evaluation: view.average,
            positive_traits,
            negative_traits,
        })
    }

    /// Active reviews of a subject, newest first.
    pub async fn list_reviews(&self, subject_id: &str) -> Result<Vec<Review>> {
        let reviews = self.store.reviews_for(subject_id).await?;
        Ok(reviews.into_iter().filter(|r| r.status == ContentStatus::Active).collect())
    }

    async fn active_review(&self, id: &str) -> Result<Review> {
        match self.store.get_review(id).await? {
            Some(review) if review.status == ContentStatus::Active => Ok(review),
            _ => Err(CommunityError::NotFound(format!("review {}", id))),
        }
    }

    /// Replace a review's text. Author only.
    pub async fn edit_review(&self, viewer: &Viewer, id: &str, content: &str) -> Result<Review> {
        require_content(content)?;
        let review = self.active_review(id).await?;
        if !viewer.owns(&review.author_id) {
            warn!(review_id = %id, "Rejected review edit by non-author");
            return Err(CommunityError::Unauthorized(format!("review {}", id)));
        }

        let review = self.store.edit_review(id, content, Utc::now()).await?;

        info!(review_id = %id, "Edited review");
        Ok(review)
    }

    /// Soft-delete a review. Author or moderator.
    ///
    /// The submission's scores and tags stay in the append-only history.
    pub async fn delete_review(&self, viewer: &Viewer, id: &str) -> Result<()> {
        let review = self.active_review(id).await?;
        if !viewer.can_remove(&review.author_id) {
            warn!(review_id = %id, "Rejected review delete");
            return Err(CommunityError::Unauthorized(format!("review {}", id)));
        }

        let next = review.status.transition(ContentStatus::Deleted)?;
        self.store
            .set_status(&TargetRef::review(id), review.status, next, Utc::now())
            .await?;

        info!(review_id = %id, "Deleted review");
        Ok(())
    }

    // ========================================================================
    // Target helpers
    // ========================================================================

    pub(crate) async fn target_meta(&self, target: &TargetRef) -> Result<TargetMeta> {
        let id = target.target_id.as_str();
        let meta = match target.target_type {
            TargetType::Post => self.store.get_post(id).await?.map(|p| TargetMeta {
                author_id: p.author_id,
                status: p.status,
                subject_id: None,
            }),
            TargetType::Comment => self.store.get_comment(id).await?.map(|r| TargetMeta {
                author_id: r.node.author_id.clone(),
                status: r.status,
                subject_id: Some(r.subject_id),
            }),
            TargetType::Review => self.store.get_review(id).await?.map(|r| TargetMeta {
                author_id: r.author_id,
                status: r.status,
                subject_id: None,
            }),
        };
        meta.ok_or_else(|| CommunityError::NotFound(format!("{} {}", target.target_type, id)))
    }

    /// Move a target to `next`, checking the transition. Returns the old status.
    ///
    /// Only the status column is written; counters committed since the read
    /// are kept.
    pub(crate) async fn set_target_status(
        &self,
        target: &TargetRef,
        next: ContentStatus,
    ) -> Result<ContentStatus> {
        let previous = self.target_meta(target).await?.status;
        let next = previous.transition(next)?;
        self.store.set_status(target, previous, next, Utc::now()).await?;
        Ok(previous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drafts::draft_key;
    use crate::store::{HistoryStore, InMemoryStore};
    use reputation::{RejectReason, ReputationError};

    fn service() -> CommunityService<InMemoryStore> {
        CommunityService::new(InMemoryStore::new())
    }

    async fn seeded_post(service: &CommunityService<InMemoryStore>) -> Post {
        service
            .create_post(
                &Viewer::user("alice"),
                "Deposit story",
                "It took months",
                PostCategory::Experience,
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_post_lifecycle() {
        let service = service();
        let post = seeded_post(&service).await;
        assert_eq!(service.list_posts(None).await.unwrap().len(), 1);
        assert!(service.list_posts(Some(PostCategory::Question)).await.unwrap().is_empty());

        let err = service.edit_post(&Viewer::user("bob"), &post.id, "x", "y").await.unwrap_err();
        assert!(matches!(err, CommunityError::Unauthorized(_)));

        let edited = service
            .edit_post(&Viewer::user("alice"), &post.id, "Deposit story", "Resolved now")
            .await
            .unwrap();
        assert_eq!(edited.content, "Resolved now");

        service.delete_post(&Viewer::user("alice"), &post.id).await.unwrap();
        assert!(service.get_post(&post.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_blank_content_rejected() {
        let service = service();
        let err = service
            .create_post(&Viewer::user("alice"), "title", "   ", PostCategory::Question)
            .await
            .unwrap_err();
        assert_eq!(err.reason(), Some(RejectReason::EmptyContent));

        let err = service
            .create_post(&Viewer::anonymous(), "title", "body", PostCategory::Question)
            .await
            .unwrap_err();
        assert!(matches!(err, CommunityError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_comment_thread_nests_and_redacts() {
        let service = service();
        let post = seeded_post(&service).await;
        let bob = Viewer::user("bob");
        let carol = Viewer::user("carol");

        let root = service.create_comment(&bob, &post.id, None, "public", false).await.unwrap();
        let secret = service
            .create_comment(&carol, &post.id, Some(&root.id), "carol only", true)
            .await
            .unwrap();
        assert_eq!(secret.parent_id.as_deref(), Some(root.id.as_str()));

        let for_bob = service.comment_thread(&post.id, &bob).await.unwrap();
        assert_eq!(for_bob.len(), 1);
        assert_eq!(for_bob[0].children[0].content, "비밀 댓글입니다.");

        let for_carol = service.comment_thread(&post.id, &carol).await.unwrap();
        assert_eq!(for_carol[0].children[0].content, "carol only");

        let for_mod = service.comment_thread(&post.id, &Viewer::moderator("m")).await.unwrap();
        assert_eq!(for_mod[0].children[0].content, "carol only");
    }

    #[tokio::test]
    async fn test_reply_to_missing_parent_is_not_found() {
        let service = service();
        let post = seeded_post(&service).await;
        let err = service
            .create_comment(&Viewer::user("bob"), &post.id, Some("ghost"), "hi", false)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(service.comment_thread(&post.id, &Viewer::anonymous()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_comment_on_missing_subject_is_not_found() {
        let service = service();
        let err = service
            .create_comment(&Viewer::user("bob"), "nowhere", None, "hi", false)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_reply_depth_is_capped() {
        let mut config = CommunityConfig::default();
        config.reputation.thread.max_depth = 2;
        let service = service().with_config(config);
        let post = seeded_post(&service).await;
        let bob = Viewer::user("bob");

        let c0 = service.create_comment(&bob, &post.id, None, "0", false).await.unwrap();
        let c1 = service.create_comment(&bob, &post.id, Some(&c0.id), "1", false).await.unwrap();
        let c2 = service.create_comment(&bob, &post.id, Some(&c1.id), "2", false).await.unwrap();
        let c3 = service.create_comment(&bob, &post.id, Some(&c2.id), "3", false).await.unwrap();

        assert_eq!(c2.parent_id.as_deref(), Some(c1.id.as_str()));
        // c2 sits at the cap, so a reply to it lands beside it under c1
        assert_eq!(c3.parent_id.as_deref(), Some(c1.id.as_str()));
    }

    #[tokio::test]
    async fn test_deleted_parent_promotes_replies() {
        let service = service();
        let post = seeded_post(&service).await;
        let bob = Viewer::user("bob");
        let carol = Viewer::user("carol");

        let root = service.create_comment(&bob, &post.id, None, "root", false).await.unwrap();
        let reply = service
            .create_comment(&carol, &post.id, Some(&root.id), "reply", false)
            .await
            .unwrap();

        let err = service.delete_comment(&carol, &root.id).await.unwrap_err();
        assert!(matches!(err, CommunityError::Unauthorized(_)));
        service.delete_comment(&bob, &root.id).await.unwrap();

        let thread = service.comment_thread(&post.id, &bob).await.unwrap();
        assert_eq!(thread.len(), 1);
        assert_eq!(thread[0].id, reply.id);
    }

    #[tokio::test]
    async fn test_edit_comment_owner_only() {
        let service = service();
        let post = seeded_post(&service).await;
        let c = service
            .create_comment(&Viewer::user("bob"), &post.id, None, "typo", false)
            .await
            .unwrap();

        assert!(service.edit_comment(&Viewer::user("carol"), &c.id, "x").await.is_err());
        let edited = service.edit_comment(&Viewer::user("bob"), &c.id, "fixed").await.unwrap();
        assert_eq!(edited.content, "fixed");
        assert_eq!(edited.id, c.id);
    }

    #[tokio::test]
    async fn test_vote_toggle_and_switch() {
        let service = service();
        let post = seeded_post(&service).await;
        let bob = Viewer::user("bob");

        let counts = service.vote(&bob, TargetType::Post, &post.id, "up").await.unwrap();
        assert_eq!(counts, VoteCounts { likes: 1, dislikes: 0 });
        let counts = service.vote(&bob, TargetType::Post, &post.id, "down").await.unwrap();
        assert_eq!(counts, VoteCounts { likes: 0, dislikes: 1 });
        let counts = service.vote(&bob, TargetType::Post, &post.id, "down").await.unwrap();
        assert_eq!(counts, VoteCounts::default());
    }

    #[tokio::test]
    async fn test_votes_survive_concurrent_edits_and_moderation() {
        let service = Arc::new(service());
        let post = seeded_post(&service).await;

        let mut handles = Vec::new();
        for i in 0..20 {
            let voter_service = Arc::clone(&service);
            let id = post.id.clone();
            handles.push(tokio::spawn(async move {
                let voter = Viewer::user(format!("voter-{}", i));
                voter_service.vote(&voter, TargetType::Post, &id, "up").await.unwrap();
            }));
            let editor_service = Arc::clone(&service);
            let id = post.id.clone();
            handles.push(tokio::spawn(async move {
                let body = format!("revision {}", i);
                editor_service
                    .edit_post(&Viewer::user("alice"), &id, "Deposit story", &body)
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(service.get_post(&post.id).await.unwrap().likes, 20);

        let target = TargetRef::post(&post.id);
        service
            .moderate(&Viewer::moderator("mod"), &target, ContentStatus::Blind, None)
            .await
            .unwrap();
        let stored = service.store().get_post(&post.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ContentStatus::Blind);
        assert_eq!(stored.likes, 20);
    }

    #[tokio::test]
    async fn test_invalid_vote_type_rejected_before_lookup() {
        let service = service();
        let err = service
            .vote(&Viewer::user("bob"), TargetType::Post, "ghost", "sideways")
            .await
            .unwrap_err();
        assert_eq!(err.reason(), Some(RejectReason::InvalidVoteType));

        let err = service
            .vote(&Viewer::user("bob"), TargetType::Post, "ghost", "up")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_submit_reputation_and_summary() {
        let service = service();
        let subject = SubjectRef::Registered("landlord-1".to_string());

        let first = service
            .submit_reputation(
                &Viewer::user("alice"),
                &subject,
                "Kind and quick",
                EvaluationScore::new(5, 4, 4, 5),
                KeywordSelection::new(["친절해요", "응답 빨라요"]),
            )
            .await
            .unwrap();
        assert_eq!(first.review.as_ref().unwrap().rating, 5);

        let second = service
            .submit_reputation(
                &Viewer::user("bob"),
                &subject,
                "Slow replies",
                EvaluationScore::new(3, 2, 3, 2),
                KeywordSelection::new(["연락 느림", "친절해요"]),
            )
            .await
            .unwrap();
        let avg = second.average.unwrap();
        assert_eq!(avg.negotiation_flexibility, 4.0);
        assert_eq!(avg.renewal_manners, 3.0);
        assert_eq!(second.top_keywords[0], "친절해요");

        let summary = service.report_summary("landlord-1").await.unwrap();
        assert_eq!(summary.total_reviews, 2);
        // (4.0 + 3.0 + 3.5 + 3.5) / 4 = 3.5
        assert_eq!(summary.rating, 3.5);
        assert!(summary.positive_traits.contains(&"친절해요".to_string()));
        assert_eq!(summary.negative_traits, ["연락 느림"]);
    }

    #[tokio::test]
    async fn test_invalid_submission_writes_nothing() {
        let service = service();
        let subject = SubjectRef::Registered("landlord-1".to_string());
        let alice = Viewer::user("alice");

        let err = service
            .submit_reputation(
                &alice,
                &subject,
                "text",
                EvaluationScore::new(5, 0, 4, 5),
                KeywordSelection::new(["친절해요"]),
            )
            .await
            .unwrap_err();
        assert_eq!(err.reason(), Some(RejectReason::MissingRatingAxis));

        let err = service
            .submit_reputation(
                &alice,
                &subject,
                "text",
                EvaluationScore::new(5, 5, 4, 5),
                KeywordSelection::new(Vec::<String>::new()),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CommunityError::Reputation(ReputationError::InvalidInput(RejectReason::KeywordCount))
        ));

        let view = service.aggregate(&subject).await.unwrap();
        assert!(view.average.is_none());
        assert!(view.top_keywords.is_empty());
        assert!(service.list_reviews("landlord-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_one_review_per_author() {
        let service = service();
        let subject = SubjectRef::Registered("landlord-1".to_string());
        let alice = Viewer::user("alice");

        let mut results = Vec::new();
        for _ in 0..2 {
            let result = service
                .submit_reputation(
                    &alice,
                    &subject,
                    "text",
                    EvaluationScore::new(4, 4, 4, 4),
                    KeywordSelection::new(["친절해요"]),
                )
                .await;
            results.push(result);
        }
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(CommunityError::Store(StoreError::Conflict(_)))));
        assert_eq!(service.store().evaluations("landlord-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_draft_subject_then_promote() {
        let service = service();
        let key = draft_key("Seoul Gangnam 1");
        let draft = SubjectRef::Draft(key.clone());

        let summary = service
            .submit_reputation(
                &Viewer::user("alice"),
                &draft,
                "",
                EvaluationScore::new(2, 2, 2, 2),
                KeywordSelection::new(["보증금 지연"]),
            )
            .await
            .unwrap();
        assert!(summary.review.is_none());
        assert_eq!(summary.top_keywords, ["보증금 지연"]);

        service.drafts().promote(&key, "landlord-9", service.store()).await.unwrap();
        let registered = SubjectRef::Registered("landlord-9".to_string());
        let view = service.aggregate(&registered).await.unwrap();
        assert_eq!(view.average.unwrap().negotiation_flexibility, 2.0);
        assert!(service.aggregate(&draft).await.unwrap().average.is_none());
    }

    #[tokio::test]
    async fn test_review_helpful_votes_and_delete() {
        let service = service();
        let subject = SubjectRef::Registered("landlord-1".to_string());
        let summary = service
            .submit_reputation(
                &Viewer::user("alice"),
                &subject,
                "text",
                EvaluationScore::new(4, 4, 4, 4),
                KeywordSelection::new(["친절해요"]),
            )
            .await
            .unwrap();
        let review = summary.review.unwrap();

        let counts = service
            .vote(&Viewer::user("bob"), TargetType::Review, &review.id, "helpful")
            .await
            .unwrap();
        assert_eq!(counts.likes, 1);

        let edited = service
            .edit_review(&Viewer::user("alice"), &review.id, "updated")
            .await
            .unwrap();
        assert!(edited.updated_at.is_some());

        service.delete_review(&Viewer::moderator("m"), &review.id).await.unwrap();
        assert!(service.list_reviews("landlord-1").await.unwrap().is_empty());
        assert_eq!(service.report_summary("landlord-1").await.unwrap().total_reviews, 0);
    }
}
