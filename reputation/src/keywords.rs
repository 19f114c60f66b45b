//! Keyword tag ranking.
//!
//! Tags are ranked by how many submissions carry them. Equal counts go to the
//! tag whose latest submission is newer; remaining ties keep first-seen order.
//! The ranking depends on timestamps, not on replay order of distinct tags, so
//! it can be rebuilt from stored history at any time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::{RejectReason, Result};
use crate::types::KeywordSelection;

/// Tags kept by default in the ranked view.
pub const DEFAULT_TOP_KEYWORDS: usize = 5;
/// Smallest allowed selection.
pub const MIN_KEYWORDS: usize = 1;
/// Largest allowed selection.
pub const MAX_KEYWORDS: usize = 5;

/// Trim, drop duplicates (first occurrence wins) and check the size bounds.
pub fn normalize_selection(
    selection: KeywordSelection,
    min: usize,
    max: usize,
) -> Result<KeywordSelection> {
    let mut seen = HashSet::new();
    let mut keywords = Vec::with_capacity(selection.keywords.len());
    for keyword in selection.keywords {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(RejectReason::EmptyKeyword.into());
        }
        if seen.insert(keyword.to_string()) {
            keywords.push(keyword.to_string());
        }
    }
    if keywords.len() < min || keywords.len() > max {
        return Err(RejectReason::KeywordCount.into());
    }
    Ok(KeywordSelection {
        keywords,
        created_at: selection.created_at,
    })
}

struct Tally {
    count: usize,
    latest: DateTime<Utc>,
    first_seen: usize,
}

/// Top `n` tags over the whole history.
pub fn top_keywords(history: &[KeywordSelection], n: usize) -> Vec<String> {
    let mut tallies: HashMap<&str, Tally> = HashMap::new();
    for selection in history {
        let mut in_selection = HashSet::new();
        for keyword in &selection.keywords {
            if !in_selection.insert(keyword.as_str()) {
                continue;
            }
            let next_rank = tallies.len();
            let tally = tallies.entry(keyword.as_str()).or_insert(Tally {
                count: 0,
                latest: selection.created_at,
                first_seen: next_rank,
            });
            tally.count += 1;
            tally.latest = tally.latest.max(selection.created_at);
        }
    }

    let mut ranked: Vec<(&str, Tally)> = tallies.into_iter().collect();
    ranked.sort_by(|(_, a), (_, b)| {
        b.count
            .cmp(&a.count)
            .then(b.latest.cmp(&a.latest))
            .then(a.first_seen.cmp(&b.first_seen))
    });
    ranked.into_iter().take(n).map(|(k, _)| k.to_string()).collect()
}

/// Append a selection and recompute the top tags with default bounds.
pub fn add_selection(
    mut history: Vec<KeywordSelection>,
    selection: KeywordSelection,
) -> Result<(Vec<KeywordSelection>, Vec<String>)> {
    let selection = normalize_selection(selection, MIN_KEYWORDS, MAX_KEYWORDS)?;
    history.push(selection);
    let top = top_keywords(&history, DEFAULT_TOP_KEYWORDS);
    Ok((history, top))
}

/// Whether a tag reads as praise or as a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Positive,
    Negative,
}

/// Known tags and their polarity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCatalog {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
}

impl Default for KeywordCatalog {
    fn default() -> Self {
        let owned = |tags: &[&str]| tags.iter().map(|t| t.to_string()).collect();
        Self {
            positive: owned(&[
                "친절해요",
                "응답 빨라요",
                "계약서 준수",
                "소통 원활",
                "약속 잘 지켜요",
                "응대 정중",
                "공지 명확",
                "정산 투명",
                "상담 설명 자세함",
                "문서 전달 빠름",
            ]),
            negative: owned(&["보증금 지연", "임대료 인상 잦음", "연락 느림"]),
        }
    }
}

impl KeywordCatalog {
    pub fn polarity(&self, keyword: &str) -> Option<Polarity> {
        if self.positive.iter().any(|k| k == keyword) {
            Some(Polarity::Positive)
        } else if self.negative.iter().any(|k| k == keyword) {
            Some(Polarity::Negative)
        } else {
            None
        }
    }

    /// Split ranked tags into (positive, negative); unknown tags are dropped.
    pub fn split_traits(&self, ranked: &[String]) -> (Vec<String>, Vec<String>) {
        let mut positive = Vec::new();
        let mut negative = Vec::new();
        for keyword in ranked {
            match self.polarity(keyword) {
                Some(Polarity::Positive) => positive.push(keyword.clone()),
                Some(Polarity::Negative) => negative.push(keyword.clone()),
                None => {}
            }
        }
        (positive, negative)
    }
}
