//! Multi-axis landlord evaluation averages.
//!
//! History is append-only. Averages are computed from integer totals, so the
//! result is independent of replay order and free of float accumulation drift.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RejectReason, Result};
use crate::types::{EvaluationRecord, EvaluationScore};

/// Allowed rating range for every axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingScale {
    pub min: u8,
    pub max: u8,
}

impl Default for RatingScale {
    fn default() -> Self {
        Self { min: 1, max: 5 }
    }
}

impl RatingScale {
    /// Zero means the axis was never picked.
    pub fn validate(&self, score: &EvaluationScore) -> Result<()> {
        for axis in score.axes() {
            if axis == 0 {
                return Err(RejectReason::MissingRatingAxis.into());
            }
            if axis < self.min || axis > self.max {
                return Err(RejectReason::RatingOutOfRange.into());
            }
        }
        Ok(())
    }
}

/// Check a submission against the default 1..=5 scale.
pub fn validate_score(score: &EvaluationScore) -> Result<()> {
    RatingScale::default().validate(score)
}

/// Round to one decimal, half away from zero.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `sum / count` to one decimal, rounded half up, in integer arithmetic.
fn mean_tenths(sum: u64, count: u64) -> f64 {
    let tenths = (sum * 20 + count) / (2 * count);
    tenths as f64 / 10.0
}

/// Running per-axis totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationAggregator {
    totals: [u64; 4],
    count: u64,
}

impl EvaluationAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted history.
    pub fn replay<'a, I>(history: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a EvaluationScore>,
    {
        let mut aggregator = Self::new();
        for score in history {
            aggregator.push(score)?;
        }
        Ok(aggregator)
    }

    /// Validate and fold in one submission.
    pub fn push(&mut self, score: &EvaluationScore) -> Result<()> {
        validate_score(score)?;
        for (total, axis) in self.totals.iter_mut().zip(score.axes()) {
            *total += u64::from(axis);
        }
        self.count += 1;
        Ok(())
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Per-axis means; `None` before the first submission.
    pub fn average(&self) -> Option<EvaluationRecord> {
        if self.count == 0 {
            return None;
        }
        let [a, b, c, d] = self.totals.map(|t| mean_tenths(t, self.count));
        Some(EvaluationRecord {
            negotiation_flexibility: a,
            renewal_manners: b,
            interference_index: c,
            maintenance_cooperation: d,
        })
    }
}

/// Averages over a whole history. Entries failing validation are skipped.
pub fn average(history: &[EvaluationScore]) -> Option<EvaluationRecord> {
    let mut aggregator = EvaluationAggregator::new();
    for score in history {
        if aggregator.push(score).is_err() {
            debug!(created_at = %score.created_at, "Skipping invalid stored score");
        }
    }
    aggregator.average()
}

/// Append `score` and recompute. The history is untouched on rejection.
pub fn add_score(
    mut history: Vec<EvaluationScore>,
    score: EvaluationScore,
) -> Result<(Vec<EvaluationScore>, Option<EvaluationRecord>)> {
    validate_score(&score)?;
    history.push(score);
    let average = average(&history);
    Ok((history, average))
}

/// Headline rating of one submission: mean of the four axes, nearest integer.
pub fn review_rating(score: &EvaluationScore) -> u8 {
    let sum: u32 = score.axes().iter().map(|&a| u32::from(a)).sum();
    ((sum + 2) / 4) as u8
}

/// Headline rating of a subject: mean of the axis averages, one decimal.
pub fn overall_rating(record: &EvaluationRecord) -> f64 {
    round_one_decimal(record.axes().iter().sum::<f64>() / 4.0)
}
