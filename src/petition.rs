// src/petition.rs
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::Petition;

pub const DEFAULT_VOTING_WINDOW_DAYS: i64 = 30;
pub const DEFAULT_PASS_THRESHOLD: i64 = 100;

/// Fixed voting window and pass threshold applied to every petition.
#[derive(Debug, Clone, Copy)]
pub struct VotingRules {
    pub window: Duration,
    pub pass_threshold: i64,
}

impl Default for VotingRules {
    fn default() -> Self {
        Self {
            window: Duration::days(DEFAULT_VOTING_WINDOW_DAYS),
            pass_threshold: DEFAULT_PASS_THRESHOLD,
        }
    }
}

/// Three-way outcome: a petition that is neither passed nor expired is
/// still active and is not "successful" in either sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PetitionStatus {
    Active,
    Passed,
    Failed,
}

impl VotingRules {
    /// A petition expires once it has existed for the full voting window.
    pub fn is_expired(&self, petition: &Petition, now: DateTime<Utc>) -> bool {
        now - petition.created_at >= self.window
    }

    /// A petition passes once its voter set reaches the threshold,
    /// regardless of expiry.
    pub fn has_passed(&self, petition: &Petition) -> bool {
        petition.vote_count >= self.pass_threshold
    }

    pub fn status(&self, petition: &Petition, now: DateTime<Utc>) -> PetitionStatus {
        if self.has_passed(petition) {
            PetitionStatus::Passed
        } else if self.is_expired(petition, now) {
            PetitionStatus::Failed
        } else {
            PetitionStatus::Active
        }
    }

    /// Voting closes as soon as the petition expires or passes, whichever
    /// comes first.
    pub fn voting_closed(&self, petition: &Petition, now: DateTime<Utc>) -> bool {
        self.is_expired(petition, now) || self.has_passed(petition)
    }
}
