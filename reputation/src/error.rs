//! Error taxonomy for the reputation core.
//!
//! All errors are deterministic outcomes of the input; nothing here is
//! retryable. Rejections happen before any state is touched.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an input was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Vote type outside {up, down}
    InvalidVoteType,
    /// Blank comment, post or review body
    EmptyContent,
    /// Keyword selection size outside the allowed range
    KeywordCount,
    /// A keyword that is blank after trimming
    EmptyKeyword,
    /// A rating axis left unset (zero)
    MissingRatingAxis,
    /// A rating axis above the scale maximum
    RatingOutOfRange,
    /// Identifier already present in the thread
    DuplicateId,
    /// Moderation status change not permitted
    InvalidStatusTransition,
}

impl RejectReason {
    /// Stable reason code for the transport layer.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidVoteType => "invalid_vote_type",
            Self::EmptyContent => "empty_content",
            Self::KeywordCount => "keyword_count",
            Self::EmptyKeyword => "empty_keyword",
            Self::MissingRatingAxis => "missing_rating_axis",
            Self::RatingOutOfRange => "rating_out_of_range",
            Self::DuplicateId => "duplicate_id",
            Self::InvalidStatusTransition => "invalid_status_transition",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error types for the reputation core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReputationError {
    /// Malformed input, rejected before any mutation
    #[error("Invalid input: {0}")]
    InvalidInput(RejectReason),

    /// Identifier absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller is neither the owner nor a moderator
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl ReputationError {
    /// Reason code when this is an input rejection.
    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            Self::InvalidInput(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl From<RejectReason> for ReputationError {
    fn from(reason: RejectReason) -> Self {
        Self::InvalidInput(reason)
    }
}

pub type Result<T> = std::result::Result<T, ReputationError>;

/// Reject blank text.
pub fn require_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(RejectReason::EmptyContent.into());
    }
    Ok(())
}
