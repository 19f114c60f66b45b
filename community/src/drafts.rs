//! Scratch history for subjects that are not registered yet.
//!
//! A subject without a permanent id is keyed by a digest of its normalized
//! address. Once the subject is registered, [`DraftSubjectStore::promote`]
//! moves the history into the persistent store.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use reputation::{EvaluationScore, KeywordSelection};

use crate::store::{HistoryStore, StoreResult};

/// Trim, collapse inner whitespace and lower-case an address.
pub fn normalize_address(address: &str) -> String {
    address.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Draft key for an address: SHA-256 hex of its normalized form.
pub fn draft_key(address: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize_address(address).as_bytes());
    hex::encode(hasher.finalize())
}

/// History recorded against one draft subject.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftHistory {
    pub evaluations: Vec<EvaluationScore>,
    pub keywords: Vec<KeywordSelection>,
}

/// In-memory draft history keyed by draft key.
#[derive(Clone, Default)]
pub struct DraftSubjectStore {
    drafts: Arc<RwLock<HashMap<String, DraftHistory>>>,
}

impl DraftSubjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append_evaluation(&self, key: &str, score: EvaluationScore) {
        let mut drafts = self.drafts.write().await;
        drafts.entry(key.to_string()).or_default().evaluations.push(score);
    }

    pub async fn append_keywords(&self, key: &str, selection: KeywordSelection) {
        let mut drafts = self.drafts.write().await;
        drafts.entry(key.to_string()).or_default().keywords.push(selection);
    }

    /// History for a key; empty if nothing was recorded.
    pub async fn history(&self, key: &str) -> DraftHistory {
        self.drafts.read().await.get(key).cloned().unwrap_or_default()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.drafts.read().await.contains_key(key)
    }

    /// Move a draft's history under `subject_id` and forget the draft.
    ///
    /// Entries leave the draft one at a time, each only after the store
    /// accepted it. A failed promotion keeps the unwritten remainder, so
    /// calling again resumes without writing anything twice. Returns the
    /// number of entries moved by this call.
    pub async fn promote<S>(&self, key: &str, subject_id: &str, store: &S) -> StoreResult<usize>
    where
        S: HistoryStore + ?Sized,
    {
        let mut drafts = self.drafts.write().await;
        let Some(history) = drafts.get_mut(key) else {
            return Ok(0);
        };

        let mut moved = 0;
        while let Some(score) = history.evaluations.first().cloned() {
            store.append_evaluation(subject_id, score).await?;
            history.evaluations.remove(0);
            moved += 1;
        }
        while let Some(selection) = history.keywords.first().cloned() {
            store.append_keywords(subject_id, selection).await?;
            history.keywords.remove(0);
            moved += 1;
        }
        drafts.remove(key);

        tracing::info!(draft_key = %key, subject_id = %subject_id, moved, "Promoted draft subject");
        Ok(moved)
    }
}
