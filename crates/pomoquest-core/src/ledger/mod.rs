//! Progress ledger: coins, level, focus totals, badges and the session log.
//!
//! The ledger is the only writer of [`ProgressState`]. Every mutating call
//! ends with exactly one write of the whole document to the
//! [`PersistentStore`], so storage never holds a half-applied update. A
//! failing store is logged and otherwise ignored: the in-memory state stays
//! authoritative and the next successful write catches storage up.

mod policy;
mod state;

pub use policy::{ObjectiveKind, ObjectivePolicy};
pub use state::{
    level_for, EarnedBadge, ProgressState, SessionRecord, COINS_PER_SESSION, SESSIONS_PER_LEVEL,
};

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::badges::{self, BadgeId, RuleContext};
use crate::error::ValidationError;
use crate::storage::{LedgerConfig, PersistentStore};

/// Read-only figures for stats screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub coins: u64,
    pub level: u64,
    pub completed_count: u64,
    pub total_focus_seconds: u64,
    pub today_completed: u64,
    pub today_focus_seconds: u64,
    pub sessions_logged: usize,
    pub badges_earned: usize,
    pub badges_total: usize,
}

pub struct ProgressLedger<S: PersistentStore, Tz: TimeZone = Local> {
    store: S,
    key: String,
    policy: ObjectivePolicy,
    tz: Tz,
    state: ProgressState,
    /// In-memory state is ahead of the store.
    dirty: bool,
    /// The stored document could not be parsed or backed up.
    write_blocked: bool,
}

/// Where an unparseable progress document is kept.
pub fn unreadable_key(key: &str) -> String {
    format!("{key}.unreadable")
}

impl<S: PersistentStore> ProgressLedger<S, Local> {
    /// Load using the device's local time zone for badge rules.
    pub fn load(store: S, config: &LedgerConfig) -> Self {
        Self::load_in(store, config, Local)
    }
}

impl<S: PersistentStore, Tz: TimeZone> ProgressLedger<S, Tz> {
    /// Load the stored document, or start from the zero-valued default when
    /// there is none, it cannot be parsed, or the store is unreachable.
    ///
    /// An unparseable document is copied to `<key>.unreadable` before the
    /// ledger starts fresh. If that copy cannot be written, write-through
    /// stays off until [`ProgressLedger::reset_progress`] so the original
    /// text is never overwritten.
    pub fn load_in(store: S, config: &LedgerConfig, tz: Tz) -> Self {
        let key = config.storage_key.clone();
        let mut write_blocked = false;
        let state = match store.get(&key) {
            Ok(Some(json)) => match ProgressState::from_json(&json) {
                Ok(state) => state,
                Err(e) => {
                    let backup = unreadable_key(&key);
                    match store.set(&backup, &json) {
                        Ok(()) => tracing::warn!(
                            error = %e,
                            key = %key,
                            backup = %backup,
                            "stored progress is unreadable; kept a copy and starting fresh"
                        ),
                        Err(store_err) => {
                            tracing::warn!(
                                error = %e,
                                backup_error = %store_err,
                                key = %key,
                                "stored progress is unreadable and could not be backed up; not saving until reset"
                            );
                            write_blocked = true;
                        }
                    }
                    ProgressState::default()
                }
            },
            Ok(None) => ProgressState::default(),
            Err(e) => {
                tracing::warn!(error = %e, key = %key, "failed to read progress; continuing in memory");
                ProgressState::default()
            }
        };
        Self {
            store,
            key,
            policy: config.policy(),
            tz,
            state,
            dirty: false,
            write_blocked,
        }
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn policy(&self) -> &ObjectivePolicy {
        &self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    /// Record a finished or abandoned session at the current time.
    pub fn complete_session(
        &mut self,
        objective: &str,
        duration_secs: u64,
        fully_completed: bool,
    ) -> Result<Vec<EarnedBadge>, ValidationError> {
        self.complete_session_at(objective, duration_secs, fully_completed, Utc::now())
    }

    /// Append a session record, update counters, run the badge rules and
    /// persist. Returns the badges this call granted.
    ///
    /// # Errors
    /// Rejects an empty objective or a zero duration without mutating
    /// anything.
    pub fn complete_session_at(
        &mut self,
        objective: &str,
        duration_secs: u64,
        fully_completed: bool,
        now: DateTime<Utc>,
    ) -> Result<Vec<EarnedBadge>, ValidationError> {
        let objective = objective.trim();
        if objective.is_empty() {
            return Err(ValidationError::invalid("objective", "must not be empty"));
        }
        if duration_secs == 0 {
            return Err(ValidationError::invalid(
                "duration_secs",
                "must be greater than zero",
            ));
        }

        let record = SessionRecord {
            timestamp: now,
            objective: objective.to_string(),
            duration_secs,
            completed: fully_completed,
        };
        self.state.sessions.push(record.clone());

        if fully_completed && self.policy.counts(objective) {
            self.state.completed_count = self.state.completed_count.saturating_add(1);
            self.state.total_focus_seconds =
                self.state.total_focus_seconds.saturating_add(duration_secs);
            self.state.coins = self.state.coins.saturating_add(COINS_PER_SESSION);
        }
        self.state.recompute_level();

        let prior = self.state.badge_ids();
        let ctx = RuleContext {
            state: &self.state,
            trigger: &record,
            policy: &self.policy,
            tz: &self.tz,
        };
        let new_ids: Vec<BadgeId> = badges::evaluate(&prior, &ctx);
        let granted: Vec<EarnedBadge> = new_ids
            .into_iter()
            .filter_map(|id| self.state.grant(id, now))
            .collect();

        tracing::info!(
            objective,
            duration_secs,
            completed = fully_completed,
            completed_count = self.state.completed_count,
            new_badges = granted.len(),
            "session recorded"
        );
        for badge in &granted {
            tracing::info!(badge = %badge.id, "badge earned");
        }

        self.persist();
        Ok(granted)
    }

    /// Replace everything with the zero-valued default and clear storage.
    pub fn reset_progress(&mut self) {
        self.state = ProgressState::default();
        self.write_blocked = false;
        match self.store.remove(&self.key) {
            Ok(()) => self.dirty = false,
            Err(e) => {
                tracing::warn!(error = %e, key = %self.key, "failed to clear stored progress");
                self.dirty = true;
            }
        }
        tracing::info!("progress reset");
    }

    /// Empty the session log; coins, level, totals and badges stay.
    pub fn clear_session_log(&mut self) {
        self.state.sessions.clear();
        self.persist();
    }

    /// Forget earned badges; coins, level, totals and the log stay.
    pub fn reset_badges(&mut self) {
        self.state.badges.clear();
        self.persist();
    }

    pub fn summary(&self, now: DateTime<Utc>) -> ProgressSummary {
        let today = now.with_timezone(&self.tz).date_naive();
        let (today_completed, today_focus_seconds) = self
            .state
            .sessions
            .iter()
            .filter(|s| s.completed && self.policy.counts(&s.objective))
            .filter(|s| s.timestamp.with_timezone(&self.tz).date_naive() == today)
            .fold((0u64, 0u64), |(n, secs), s| {
                (n + 1, secs.saturating_add(s.duration_secs))
            });
        ProgressSummary {
            coins: self.state.coins,
            level: self.state.level,
            completed_count: self.state.completed_count,
            total_focus_seconds: self.state.total_focus_seconds,
            today_completed,
            today_focus_seconds,
            sessions_logged: self.state.sessions.len(),
            badges_earned: self.state.badges.len(),
            badges_total: BadgeId::ALL.len(),
        }
    }

    fn persist(&mut self) {
        if self.write_blocked {
            tracing::warn!(key = %self.key, "progress not saved; stored document is unreadable");
            self.dirty = true;
            return;
        }
        let json = match self.state.to_json() {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize progress");
                self.dirty = true;
                return;
            }
        };
        match self.store.set(&self.key, &json) {
            Ok(()) => self.dirty = false,
            Err(e) => {
                tracing::warn!(error = %e, key = %self.key, "failed to persist progress; keeping in-memory state");
                self.dirty = true;
            }
        }
    }
}
