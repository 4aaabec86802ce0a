//! Session timer implementation.
//!
//! The timer is a wall-clock-based state machine. It does not use internal
//! threads and never counts ticks: remaining time is always derived from
//! `(now, started_at)`, so a host that was suspended for an hour gets the
//! right answer from the first `tick()` after it wakes up.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |
//!            v
//!        Completed -> (reset) -> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = SessionTimer::new();
//! timer.start("Focus", 1500, Utc::now())?;
//! // Once per second, and once more right after the host is foregrounded:
//! if let Some(Event::TimerCompleted { .. }) = timer.tick(Utc::now()) { .. }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TimerError;
use crate::events::Event;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
}

/// The countdown currently owned by the timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSession {
    pub objective: String,
    /// Wall-clock anchor. Rewritten on resume so that
    /// `planned - (now - started_at)` equals the remaining time at pause.
    pub started_at: DateTime<Utc>,
    pub planned_duration_secs: u64,
    pub running: bool,
}

/// Core session timer.
///
/// Operates on wall-clock deltas -- no internal thread.
/// The caller is responsible for calling `tick()` periodically.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionTimer {
    state: TimerState,
    session: Option<TimerSession>,
    /// Frozen remaining seconds while paused.
    paused_remaining_secs: Option<u64>,
    /// Edge trigger: set the first time `tick` observes expiry.
    completion_fired: bool,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn session(&self) -> Option<&TimerSession> {
        self.session.as_ref()
    }

    pub fn objective(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.objective.as_str())
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn planned_secs(&self) -> u64 {
        self.session
            .as_ref()
            .map(|s| s.planned_duration_secs)
            .unwrap_or(0)
    }

    /// Remaining whole seconds at `now`. Pure; never mutates the timer.
    ///
    /// Always within `[0, planned]`, even when the device clock moved
    /// backwards past `started_at`.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> u64 {
        let Some(session) = self.session.as_ref() else {
            return 0;
        };
        match self.state {
            TimerState::Idle => session.planned_duration_secs,
            TimerState::Completed => 0,
            TimerState::Paused => self
                .paused_remaining_secs
                .unwrap_or(session.planned_duration_secs)
                .min(session.planned_duration_secs),
            TimerState::Running => derive_remaining(session, now),
        }
    }

    /// 0.0 .. 1.0 progress through the current session.
    ///
    /// A pure read for progress indicators; not a second source of truth.
    pub fn progress_at(&self, now: DateTime<Utc>) -> f64 {
        let total = self.planned_secs();
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_at(now) as f64 / total as f64)
    }

    /// Whole seconds already spent on the current session.
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> u64 {
        self.planned_secs().saturating_sub(self.remaining_at(now))
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, now: DateTime<Utc>) -> Event {
        Event::StateSnapshot {
            state: self.state,
            objective: self.objective().map(str::to_string),
            remaining_secs: self.remaining_at(now),
            total_secs: self.planned_secs(),
            progress: self.progress_at(now),
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a countdown. Only valid from `Idle`; a running, paused or
    /// finished session has to be reset first.
    pub fn start(
        &mut self,
        objective: &str,
        duration_secs: u64,
        now: DateTime<Utc>,
    ) -> Result<Event, TimerError> {
        if duration_secs == 0 {
            return Err(TimerError::InvalidDuration);
        }
        if self.state != TimerState::Idle {
            return Err(TimerError::AlreadyActive { state: self.state });
        }
        self.session = Some(TimerSession {
            objective: objective.to_string(),
            started_at: now,
            planned_duration_secs: duration_secs,
            running: true,
        });
        self.state = TimerState::Running;
        self.paused_remaining_secs = None;
        self.completion_fired = false;
        tracing::debug!(objective, duration_secs, "timer started");
        Ok(Event::TimerStarted {
            objective: objective.to_string(),
            duration_secs,
            at: now,
        })
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<Event, TimerError> {
        if self.state != TimerState::Running {
            return Err(TimerError::NotRunning);
        }
        let remaining = self.remaining_at(now);
        self.paused_remaining_secs = Some(remaining);
        self.state = TimerState::Paused;
        if let Some(session) = self.session.as_mut() {
            session.running = false;
        }
        tracing::debug!(remaining, "timer paused");
        Ok(Event::TimerPaused {
            remaining_secs: remaining,
            at: now,
        })
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<Event, TimerError> {
        if self.state != TimerState::Paused {
            return Err(TimerError::NotPaused);
        }
        let Some(session) = self.session.as_mut() else {
            return Err(TimerError::NotPaused);
        };
        let remaining = self
            .paused_remaining_secs
            .take()
            .unwrap_or(session.planned_duration_secs)
            .min(session.planned_duration_secs);
        let already_spent = session.planned_duration_secs - remaining;
        session.started_at = now
            .checked_sub_signed(chrono::Duration::seconds(secs_as_i64(already_spent)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        session.running = true;
        self.state = TimerState::Running;
        tracing::debug!(remaining, "timer resumed");
        Ok(Event::TimerResumed {
            remaining_secs: remaining,
            at: now,
        })
    }

    /// Back to "not started". The last session's objective and planned
    /// duration are kept so `remaining_at` reports the full duration.
    pub fn reset(&mut self, now: DateTime<Utc>) -> Event {
        self.state = TimerState::Idle;
        self.paused_remaining_secs = None;
        self.completion_fired = false;
        if let Some(session) = self.session.as_mut() {
            session.running = false;
        }
        tracing::debug!("timer reset");
        Event::TimerReset { at: now }
    }

    /// Call periodically, and once on foreground. Returns
    /// `Some(Event::TimerCompleted)` exactly once per session.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.state != TimerState::Running || self.completion_fired {
            return None;
        }
        let session = self.session.as_mut()?;
        if now < session.started_at {
            tracing::warn!(
                started_at = %session.started_at,
                now = %now,
                "clock moved backwards; clamping remaining time"
            );
        }
        if derive_remaining(session, now) > 0 {
            return None;
        }
        self.completion_fired = true;
        self.state = TimerState::Completed;
        session.running = false;
        tracing::debug!(objective = %session.objective, "timer completed");
        Some(Event::TimerCompleted {
            objective: session.objective.clone(),
            duration_secs: session.planned_duration_secs,
            at: now,
        })
    }
}

fn derive_remaining(session: &TimerSession, now: DateTime<Utc>) -> u64 {
    let elapsed_ms = (now - session.started_at).num_milliseconds();
    // Negative elapsed (clock skew) counts as nothing elapsed.
    let elapsed_secs = u64::try_from(elapsed_ms.div_euclid(1000)).unwrap_or(0);
    session.planned_duration_secs.saturating_sub(elapsed_secs)
}

fn secs_as_i64(secs: u64) -> i64 {
    i64::try_from(secs).unwrap_or(i64::MAX).min(i64::MAX / 1000)
}
