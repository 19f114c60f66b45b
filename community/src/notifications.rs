//! User inbox.

use tracing::{debug, warn};

use reputation::Viewer;

use crate::error::{CommunityError, Result};
use crate::service::CommunityService;
use crate::store::CommunityStore;
use crate::types::Notification;

impl<S: CommunityStore> CommunityService<S> {
    /// Deliver a notification. Delivery failures are logged, never surfaced:
    /// the action that triggered them has already been committed.
    pub(crate) async fn notify(&self, notification: Notification) {
        let user_id = notification.user_id.clone();
        let kind = notification.kind;
        match self.store.insert_notification(notification).await {
            Ok(()) => debug!(user = %user_id, kind = ?kind, "Queued notification"),
            Err(e) => warn!(user = %user_id, error = %e, "Failed to store notification"),
        }
    }

    /// Newest notifications of the viewer, capped at the configured limit.
    pub async fn notifications(&self, viewer: &Viewer) -> Result<Vec<Notification>> {
        let user_id = Self::require_user(viewer)?;
        Ok(self.store.notifications_for(user_id, self.config.inbox_limit).await?)
    }

    pub async fn unread_count(&self, viewer: &Viewer) -> Result<usize> {
        let user_id = Self::require_user(viewer)?;
        Ok(self.store.unread_count(user_id).await?)
    }

    /// Mark one of the viewer's notifications read.
    pub async fn mark_read(&self, viewer: &Viewer, id: &str) -> Result<()> {
        let user_id = Self::require_user(viewer)?;
        match self.store.get_notification(id).await? {
            Some(n) if n.user_id == user_id => {}
            Some(_) => return Err(CommunityError::Unauthorized(format!("notification {}", id))),
            None => return Err(CommunityError::NotFound(format!("notification {}", id))),
        }
        self.store.mark_read(id).await?;
        Ok(())
    }

    /// Mark the viewer's whole inbox read.
    pub async fn mark_all_read(&self, viewer: &Viewer) -> Result<usize> {
        let user_id = Self::require_user(viewer)?;
        let changed = self.store.mark_all_read(user_id).await?;
        debug!(user = %user_id, changed, "Marked inbox read");
        Ok(changed)
    }
}
