//! Error types for the service layer.

use reputation::{RejectReason, ReputationError};

use crate::store::StoreError;

/// Errors returned by [`crate::service::CommunityService`].
#[derive(Debug, thiserror::Error)]
pub enum CommunityError {
    /// Rejected by the reputation core
    #[error(transparent)]
    Reputation(#[from] ReputationError),

    /// Persistence failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is not allowed to perform the operation
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl CommunityError {
    /// Rejection reason for input errors.
    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            Self::Reputation(e) => e.reason(),
            _ => None,
        }
    }

    /// Whether this is a not-found outcome from either layer.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_)
                | Self::Reputation(ReputationError::NotFound(_))
                | Self::Store(StoreError::NotFound(_))
        )
    }
}

impl From<RejectReason> for CommunityError {
    fn from(reason: RejectReason) -> Self {
        Self::Reputation(reason.into())
    }
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, CommunityError>;
