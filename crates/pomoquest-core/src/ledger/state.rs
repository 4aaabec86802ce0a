//! Persisted progress record.
//!
//! The JSON shape is fixed by what is already on users' devices:
//!
//! ```text
//! { "coins", "level", "completedPomodoros", "totalFocusTime",
//!   "sessions": [{ "timestamp", "objective", "duration", "completed" }],
//!   "badges":   [{ "name", "earnedAt" }] }
//! ```
//!
//! Older builds stored `badges` as a list of bare names; those still load.
//!
//! Timestamps are epoch milliseconds. Anything else in the document (old
//! timer fields such as `isTimerRunning`) is ignored on load.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::badges::BadgeId;

pub const COINS_PER_SESSION: u64 = 10;
pub const SESSIONS_PER_LEVEL: u64 = 10;

/// One entry of the session log. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub objective: String,
    #[serde(rename = "duration")]
    pub duration_secs: u64,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarnedBadge {
    #[serde(rename = "name")]
    pub id: BadgeId,
    #[serde(rename = "earnedAt", with = "chrono::serde::ts_milliseconds")]
    pub earned_at: DateTime<Utc>,
}

/// Cumulative progress. One per installation.
///
/// `level == completed_count / SESSIONS_PER_LEVEL + 1` and badge ids are
/// unique; both hold after every ledger mutation and after `from_json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    #[serde(default)]
    pub coins: u64,
    #[serde(default = "default_level")]
    pub level: u64,
    #[serde(default, rename = "completedPomodoros")]
    pub completed_count: u64,
    #[serde(default, rename = "totalFocusTime")]
    pub total_focus_seconds: u64,
    #[serde(default)]
    pub sessions: Vec<SessionRecord>,
    #[serde(default, deserialize_with = "known_badges")]
    pub badges: Vec<EarnedBadge>,
}

fn default_level() -> u64 {
    1
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            coins: 0,
            level: 1,
            completed_count: 0,
            total_focus_seconds: 0,
            sessions: Vec::new(),
            badges: Vec::new(),
        }
    }
}

pub fn level_for(completed_count: u64) -> u64 {
    completed_count / SESSIONS_PER_LEVEL + 1
}

impl ProgressState {
    pub fn has_badge(&self, id: BadgeId) -> bool {
        self.badges.iter().any(|b| b.id == id)
    }

    pub fn badge_ids(&self) -> BTreeSet<BadgeId> {
        self.badges.iter().map(|b| b.id).collect()
    }

    /// Add `id` unless it is already held.
    pub fn grant(&mut self, id: BadgeId, at: DateTime<Utc>) -> Option<EarnedBadge> {
        if self.has_badge(id) {
            return None;
        }
        let badge = EarnedBadge { id, earned_at: at };
        self.badges.push(badge);
        Some(badge)
    }

    pub fn recompute_level(&mut self) {
        self.level = level_for(self.completed_count);
    }

    /// Re-establish the invariants on data that came from outside.
    pub fn normalize(&mut self) {
        self.recompute_level();
        self.badges.sort_by_key(|b| b.earned_at);
        let mut seen = BTreeSet::new();
        self.badges.retain(|b| seen.insert(b.id));
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut state: Self = serde_json::from_str(json)?;
        state.normalize();
        Ok(state)
    }
}

/// Drops badges whose name is not in the catalog instead of failing the
/// whole document. Entries may be `{ "name", "earnedAt" }` objects or bare
/// names as written by older builds; a missing grant time becomes the load
/// time.
fn known_badges<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<EarnedBadge>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawBadge {
        Earned {
            name: String,
            #[serde(
                rename = "earnedAt",
                default,
                with = "chrono::serde::ts_milliseconds_option"
            )]
            earned_at: Option<DateTime<Utc>>,
        },
        Named(String),
    }

    let loaded_at = Utc::now();
    let raw = Vec::<RawBadge>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|b| {
            let (name, earned_at) = match b {
                RawBadge::Earned { name, earned_at } => (name, earned_at),
                RawBadge::Named(name) => (name, None),
            };
            match BadgeId::from_name(&name) {
                Some(id) => Some(EarnedBadge {
                    id,
                    earned_at: earned_at.unwrap_or(loaded_at),
                }),
                None => {
                    tracing::warn!(badge = %name, "dropping unknown badge from stored progress");
                    None
                }
            }
        })
        .collect())
}
