//! Moderator status changes and abuse reports.

use chrono::Utc;
use tracing::{info, warn};

use reputation::{ContentStatus, TargetType, Viewer};

use crate::error::{CommunityError, Result};
use crate::service::CommunityService;
use crate::store::CommunityStore;
use crate::types::*;

const REPORT_RECEIVED_TITLE: &str = "신고 접수 완료";
const REPORT_RECEIVED_MESSAGE: &str =
    "신고가 접수되었습니다. 확인 기간 동안 해당 리뷰는 블라인드 처리되며, \
     사실이 아닌 것으로 확인되면 다시 공개됩니다.";
const REVIEW_BLINDED_TITLE: &str = "리뷰 블라인드 처리 안내";
const REVIEW_BLINDED_MESSAGE: &str = "귀하의 리뷰가 신고 접수로 인해 블라인드 처리되었습니다.";
const CONTENT_MODERATED_TITLE: &str = "게시물 상태 변경";

impl<S: CommunityStore> CommunityService<S> {
    fn require_moderator(viewer: &Viewer) -> Result<&str> {
        let id = Self::require_user(viewer)?;
        if !viewer.is_moderator {
            warn!(user = %id, "Moderator action by non-moderator");
            return Err(CommunityError::Unauthorized("moderator only".to_string()));
        }
        Ok(id)
    }

    /// Change a post, comment or review status and record it in the admin log.
    pub async fn moderate(
        &self,
        moderator: &Viewer,
        target: &TargetRef,
        status: ContentStatus,
        reason: Option<&str>,
    ) -> Result<AdminLog> {
        let admin_id = Self::require_moderator(moderator)?;
        let meta = self.target_meta(target).await?;
        let previous = self.set_target_status(target, status).await?;

        let log = AdminLog {
            id: uuid::Uuid::new_v4().to_string(),
            admin_id: admin_id.to_string(),
            action: AdminAction::for_status(status),
            target: target.clone(),
            reason: reason.map(str::to_string),
            created_at: Utc::now(),
        };
        self.store.insert_admin_log(log.clone()).await?;

        info!(
            admin = %admin_id,
            target_type = %target.target_type,
            target_id = %target.target_id,
            from = previous.as_str(),
            to = status.as_str(),
            "Moderated content"
        );

        if meta.author_id != admin_id {
            let message = format!(
                "{} 상태가 '{}'(으)로 변경되었습니다.",
                target.target_type,
                status.as_str()
            );
            let mut notification = Notification::new(
                &meta.author_id,
                NotificationKind::Admin,
                CONTENT_MODERATED_TITLE,
                message,
            );
            if let Some(subject_id) = meta.subject_id {
                notification = notification.with_link(subject_id);
            }
            self.notify(notification).await;
        }
        Ok(log)
    }

    /// File an abuse report.
    ///
    /// A reported review is blinded at once and its author is told; the
    /// reporter always gets a receipt.
    pub async fn report_content(
        &self,
        reporter: &Viewer,
        target: &TargetRef,
        reason: ReportReason,
        detail: Option<&str>,
    ) -> Result<AbuseReport> {
        let reporter_id = Self::require_user(reporter)?;
        let meta = self.target_meta(target).await?;
        if meta.status == ContentStatus::Deleted {
            return Err(CommunityError::NotFound(format!(
                "{} {}",
                target.target_type, target.target_id
            )));
        }

        let report = AbuseReport {
            id: uuid::Uuid::new_v4().to_string(),
            reporter_id: reporter_id.to_string(),
            target: target.clone(),
            reason,
            detail: detail.map(str::to_string),
            status: ReportStatus::Pending,
            created_at: Utc::now(),
        };
        self.store.insert_report(report.clone()).await?;
        info!(
            report_id = %report.id,
            target_id = %target.target_id,
            reason = ?reason,
            "Filed report"
        );

        let blinded =
            target.target_type == TargetType::Review && meta.status == ContentStatus::Active;
        if blinded {
            self.set_target_status(target, ContentStatus::Blind).await?;
            info!(review_id = %target.target_id, "Blinded reported review");
        }

        self.notify(Notification::new(
            reporter_id,
            NotificationKind::Report,
            REPORT_RECEIVED_TITLE,
            REPORT_RECEIVED_MESSAGE,
        ))
        .await;
        if blinded {
            self.notify(Notification::new(
                &meta.author_id,
                NotificationKind::Report,
                REVIEW_BLINDED_TITLE,
                REVIEW_BLINDED_MESSAGE,
            ))
            .await;
        }
        Ok(report)
    }

    /// Close a pending report.
    ///
    /// Upholding deletes the target. Dismissing restores a blinded target and
    /// logs the dismissal.
    pub async fn resolve_report(
        &self,
        moderator: &Viewer,
        report_id: &str,
        uphold: bool,
    ) -> Result<AbuseReport> {
        let admin_id = Self::require_moderator(moderator)?;
        let mut report = match self.store.get_report(report_id).await? {
            Some(report) if report.status == ReportStatus::Pending => report,
            _ => return Err(CommunityError::NotFound(format!("report {}", report_id))),
        };

        let meta = self.target_meta(&report.target).await?;
        if uphold {
            if meta.status != ContentStatus::Deleted {
                self.moderate(
                    moderator,
                    &report.target,
                    ContentStatus::Deleted,
                    Some("report upheld"),
                )
                .await?;
            }
            report.status = ReportStatus::Reviewed;
        } else {
            if meta.status == ContentStatus::Blind {
                self.moderate(
                    moderator,
                    &report.target,
                    ContentStatus::Active,
                    Some("report dismissed"),
                )
                .await?;
            }
            self.store
                .insert_admin_log(AdminLog {
                    id: uuid::Uuid::new_v4().to_string(),
                    admin_id: admin_id.to_string(),
                    action: AdminAction::Dismiss,
                    target: report.target.clone(),
                    reason: Some(format!("report {}", report.id)),
                    created_at: Utc::now(),
                })
                .await?;
            report.status = ReportStatus::Dismissed;
        }
        self.store.update_report(report.clone()).await?;

        info!(report_id = %report_id, status = ?report.status, "Resolved report");
        Ok(report)
    }

    /// Pending reports, oldest first. Moderator only.
    pub async fn pending_reports(&self, moderator: &Viewer) -> Result<Vec<AbuseReport>> {
        Self::require_moderator(moderator)?;
        Ok(self.store.reports(ReportStatus::Pending).await?)
    }

    /// Admin log, newest first. Moderator only.
    pub async fn admin_logs(&self, moderator: &Viewer) -> Result<Vec<AdminLog>> {
        Self::require_moderator(moderator)?;
        Ok(self.store.admin_logs().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use reputation::{EvaluationScore, KeywordSelection, RejectReason};

    async fn setup() -> (CommunityService<InMemoryStore>, Post) {
        let service = CommunityService::new(InMemoryStore::new());
        let post = service
            .create_post(&Viewer::user("alice"), "title", "body", PostCategory::Caution)
            .await
            .unwrap();
        (service, post)
    }

    async fn seeded_review(service: &CommunityService<InMemoryStore>) -> String {
        let summary = service
            .submit_reputation(
                &Viewer::user("alice"),
                &SubjectRef::Registered("landlord-1".to_string()),
                "Deposit came back late",
                EvaluationScore::new(2, 2, 3, 2),
                KeywordSelection::new(["보증금 지연"]),
            )
            .await
            .unwrap();
        summary.review.unwrap().id
    }

    #[tokio::test]
    async fn test_moderate_logs_action() {
        let (service, post) = setup().await;
        let moderator = Viewer::moderator("mod");
        let target = TargetRef::post(&post.id);

        let log = service
            .moderate(&moderator, &target, ContentStatus::Blind, Some("spam"))
            .await
            .unwrap();
        assert_eq!(log.action, AdminAction::Blind);
        assert!(service.get_post(&post.id).await.unwrap_err().is_not_found());

        let log = service.moderate(&moderator, &target, ContentStatus::Active, None).await.unwrap();
        assert_eq!(log.action, AdminAction::Unblind);

        let logs = service.admin_logs(&moderator).await.unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].action, AdminAction::Unblind);

        // Author heard about both changes
        assert_eq!(service.unread_count(&Viewer::user("alice")).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_moderate_requires_moderator_and_legal_transition() {
        let (service, post) = setup().await;
        let target = TargetRef::post(&post.id);

        let err = service
            .moderate(&Viewer::user("bob"), &target, ContentStatus::Blind, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CommunityError::Unauthorized(_)));

        let moderator = Viewer::moderator("mod");
        service.moderate(&moderator, &target, ContentStatus::Deleted, None).await.unwrap();
        let err = service
            .moderate(&moderator, &target, ContentStatus::Active, None)
            .await
            .unwrap_err();
        assert_eq!(err.reason(), Some(RejectReason::InvalidStatusTransition));
    }

    #[tokio::test]
    async fn test_report_blinds_review_and_notifies() {
        let (service, _) = setup().await;
        let review_id = seeded_review(&service).await;

        let report = service
            .report_content(
                &Viewer::user("bob"),
                &TargetRef::review(&review_id),
                ReportReason::Defamation,
                Some("not true"),
            )
            .await
            .unwrap();
        assert_eq!(report.status, ReportStatus::Pending);

        let stored = service.store().get_review(&review_id).await.unwrap().unwrap();
        assert_eq!(stored.status, ContentStatus::Blind);
        assert!(service.list_reviews("landlord-1").await.unwrap().is_empty());

        let bob_inbox = service.notifications(&Viewer::user("bob")).await.unwrap();
        assert_eq!(bob_inbox[0].title, REPORT_RECEIVED_TITLE);
        let alice_inbox = service.notifications(&Viewer::user("alice")).await.unwrap();
        assert_eq!(alice_inbox[0].title, REVIEW_BLINDED_TITLE);
    }

    #[tokio::test]
    async fn test_report_on_post_does_not_blind() {
        let (service, post) = setup().await;
        service
            .report_content(
                &Viewer::user("bob"),
                &TargetRef::post(&post.id),
                ReportReason::Profanity,
                None,
            )
            .await
            .unwrap();
        assert!(service.get_post(&post.id).await.is_ok());
        assert_eq!(service.unread_count(&Viewer::user("alice")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_dismissed_report_restores_review() {
        let (service, _) = setup().await;
        let review_id = seeded_review(&service).await;
        let moderator = Viewer::moderator("mod");

        let report = service
            .report_content(
                &Viewer::user("bob"),
                &TargetRef::review(&review_id),
                ReportReason::Other,
                None,
            )
            .await
            .unwrap();
        assert_eq!(service.pending_reports(&moderator).await.unwrap().len(), 1);

        let resolved = service.resolve_report(&moderator, &report.id, false).await.unwrap();
        assert_eq!(resolved.status, ReportStatus::Dismissed);
        assert_eq!(service.list_reviews("landlord-1").await.unwrap().len(), 1);
        assert!(service.pending_reports(&moderator).await.unwrap().is_empty());

        let actions: Vec<_> = service
            .admin_logs(&moderator)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.action)
            .collect();
        assert_eq!(actions, [AdminAction::Dismiss, AdminAction::Unblind]);

        assert!(service.resolve_report(&moderator, &report.id, true).await.is_err());
    }

    #[tokio::test]
    async fn test_upheld_report_deletes_review() {
        let (service, _) = setup().await;
        let review_id = seeded_review(&service).await;
        let moderator = Viewer::moderator("mod");

        let report = service
            .report_content(
                &Viewer::user("bob"),
                &TargetRef::review(&review_id),
                ReportReason::Privacy,
                None,
            )
            .await
            .unwrap();
        let resolved = service.resolve_report(&moderator, &report.id, true).await.unwrap();
        assert_eq!(resolved.status, ReportStatus::Reviewed);

        let stored = service.store().get_review(&review_id).await.unwrap().unwrap();
        assert_eq!(stored.status, ContentStatus::Deleted);
    }
}
