//! Community board and landlord reputation service.
//!
//! Wraps the [`reputation`] core with storage, authorization and side
//! effects:
//!
//! - **Posts and comments**: soft deletes, depth-capped replies, redacted threads
//! - **Votes**: toggle/switch committed atomically with the target's counters
//! - **Reputation**: evaluations, keyword tags and reviews per subject
//! - **Draft subjects**: history kept before a subject is registered
//! - **Moderation**: status changes with an admin log, abuse reports
//! - **Notifications**: per-user inbox
//!
//! # Architecture
//!
//! ```text
//!  transport ──► CommunityService ──► reputation core (pure)
//!                      │
//!                      ├──► CommunityStore (trait) ──► InMemoryStore
//!                      └──► DraftSubjectStore
//! ```

pub mod config;
pub mod drafts;
pub mod error;
pub mod logging;
pub mod moderation;
pub mod notifications;
pub mod service;
pub mod store;
pub mod types;

// Re-export main types
pub use config::CommunityConfig;
pub use drafts::{draft_key, DraftSubjectStore};
pub use error::{CommunityError, Result};
pub use service::CommunityService;
pub use store::{CommunityStore, HistoryStore, InMemoryStore, StoreError};
pub use types::*;
