//! Vote ledger with toggle/switch semantics.
//!
//! A vote on a target either inserts a new vote, cancels an identical one
//! (toggle off), or flips an opposite one (switch). The outcome carries the
//! ledger effect and the counter delta; the caller must persist both as one
//! atomic unit per target.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Add;
use tracing::debug;

use crate::types::{TargetType, Vote, VoteKey, VoteType};

/// Change to apply to the vote ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "vote", rename_all = "snake_case")]
pub enum LedgerEffect {
    /// Store a new vote
    Insert(Vote),
    /// Replace the stored vote's type
    Update(Vote),
    /// Remove the stored vote
    Delete(Vote),
}

/// Change to apply to a target's like/dislike counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterDelta {
    pub like_delta: i8,
    pub dislike_delta: i8,
}

impl CounterDelta {
    fn side(vote_type: VoteType, amount: i8) -> Self {
        match vote_type {
            VoteType::Up => Self {
                like_delta: amount,
                dislike_delta: 0,
            },
            VoteType::Down => Self {
                like_delta: 0,
                dislike_delta: amount,
            },
        }
    }

    /// Apply to a pair of counters. Counters never go below zero.
    pub fn apply(&self, likes: u64, dislikes: u64) -> (u64, u64) {
        (shift(likes, self.like_delta), shift(dislikes, self.dislike_delta))
    }

    pub fn is_zero(&self) -> bool {
        self.like_delta == 0 && self.dislike_delta == 0
    }
}

impl Add for CounterDelta {
    type Output = CounterDelta;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            like_delta: self.like_delta + rhs.like_delta,
            dislike_delta: self.dislike_delta + rhs.dislike_delta,
        }
    }
}

fn shift(counter: u64, delta: i8) -> u64 {
    if delta >= 0 {
        counter.saturating_add(delta as u64)
    } else {
        counter.saturating_sub(delta.unsigned_abs() as u64)
    }
}

/// Result of applying a vote request to the current vote state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOutcome {
    pub effect: LedgerEffect,
    pub delta: CounterDelta,
}

impl VoteOutcome {
    /// Vote state after the effect is applied.
    pub fn resulting_vote(&self) -> Option<Vote> {
        match &self.effect {
            LedgerEffect::Insert(vote) | LedgerEffect::Update(vote) => Some(vote.clone()),
            LedgerEffect::Delete(_) => None,
        }
    }
}

/// Compute the effect of `requested` against the voter's `existing` vote.
///
/// Pure: nothing is written.
pub fn apply_vote(key: &VoteKey, existing: Option<&Vote>, requested: VoteType) -> VoteOutcome {
    let outcome = match existing {
        None => VoteOutcome {
            effect: LedgerEffect::Insert(Vote {
                voter_id: key.voter_id.clone(),
                target_type: key.target_type,
                target_id: key.target_id.clone(),
                vote_type: requested,
            }),
            delta: CounterDelta::side(requested, 1),
        },
        Some(vote) if vote.vote_type == requested => VoteOutcome {
            effect: LedgerEffect::Delete(vote.clone()),
            delta: CounterDelta::side(requested, -1),
        },
        Some(vote) => VoteOutcome {
            effect: LedgerEffect::Update(Vote {
                vote_type: requested,
                ..vote.clone()
            }),
            delta: CounterDelta::side(vote.vote_type, -1) + CounterDelta::side(requested, 1),
        },
    };

    debug!(
        voter = %key.voter_id,
        target_type = %key.target_type,
        target_id = %key.target_id,
        requested = %requested,
        delta = ?outcome.delta,
        "Computed vote outcome"
    );
    outcome
}

/// In-memory ledger holding at most one vote per (voter, target).
#[derive(Debug, Clone, Default)]
pub struct VoteLedger {
    votes: HashMap<VoteKey, Vote>,
}

impl VoteLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current vote for a slot.
    pub fn get(&self, key: &VoteKey) -> Option<&Vote> {
        self.votes.get(key)
    }

    /// Compute and commit in one step.
    pub fn cast(&mut self, key: &VoteKey, requested: VoteType) -> VoteOutcome {
        let outcome = apply_vote(key, self.votes.get(key), requested);
        self.commit(&outcome);
        outcome
    }

    /// Commit a previously computed outcome.
    pub fn commit(&mut self, outcome: &VoteOutcome) {
        match &outcome.effect {
            LedgerEffect::Insert(vote) | LedgerEffect::Update(vote) => {
                self.votes.insert(vote.key(), vote.clone());
            }
            LedgerEffect::Delete(vote) => {
                self.votes.remove(&vote.key());
            }
        }
    }

    /// Recount (likes, dislikes) for a target from the ledger.
    pub fn tally(&self, target_type: TargetType, target_id: &str) -> (u64, u64) {
        self.votes
            .values()
            .filter(|v| v.target_type == target_type && v.target_id == target_id)
            .fold((0, 0), |(up, down), v| match v.vote_type {
                VoteType::Up => (up + 1, down),
                VoteType::Down => (up, down + 1),
            })
    }

    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }
}
