//! Reputation core for the community board and landlord reports.
//!
//! A synchronous, storage-agnostic library. Every operation takes
//! already-fetched records and returns new records, derived views, or a
//! side-effect descriptor for the caller to persist:
//!
//! - **Vote ledger**: one vote per (voter, target), toggle/switch semantics
//! - **Comment trees**: flat rows with parent links to ordered forests
//! - **Reply threads**: insert/update/delete at any depth over an id arena
//! - **Secret visibility**: viewer-scoped redaction of secret comments
//! - **Evaluation averages**: per-axis running means, one decimal
//! - **Keyword ranking**: top tags by frequency, recency tie-break
//!
//! # Data flow
//!
//! ```text
//!  submissions ──► ledgers / accumulators ──► derived views
//!  (votes, rows,     (VoteLedger, ReplyThread,   (trees, averages,
//!   scores, tags)     EvaluationAggregator)       ranked keywords)
//! ```
//!
//! # Example
//!
//! ```
//! use reputation::{build_tree, CommentNode};
//!
//! let flat = vec![
//!     CommentNode::new("c1", "alice", "first"),
//!     CommentNode::new("c2", "bob", "reply").reply_to("c1"),
//! ];
//! let tree = build_tree(&flat);
//! assert_eq!(tree.len(), 1);
//! assert_eq!(tree[0].children[0].id, "c2");
//! ```

pub mod config;
pub mod error;
pub mod evaluation;
pub mod keywords;
pub mod thread;
pub mod tree;
pub mod types;
pub mod visibility;
pub mod vote;

// Re-export main types
pub use config::ReputationConfig;
pub use error::{RejectReason, ReputationError, Result};
pub use evaluation::{average, validate_score, EvaluationAggregator};
pub use keywords::{top_keywords, KeywordCatalog};
pub use thread::{ReplyApplied, ReplyThread};
pub use tree::build_tree;
pub use types::*;
pub use visibility::{is_visible, redact_tree, Viewer};
pub use vote::{apply_vote, CounterDelta, LedgerEffect, VoteLedger, VoteOutcome};
