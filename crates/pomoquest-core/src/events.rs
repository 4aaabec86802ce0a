use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::badges::BadgeId;
use crate::timer::TimerState;

/// Every state change in the system produces an Event.
/// Hosts render them; the CLI prints them as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        objective: String,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerCompleted {
        objective: String,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// Session given up before the countdown reached zero.
    TimerAbandoned {
        objective: String,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    /// A record was appended to the ledger's session log.
    SessionRecorded {
        objective: String,
        duration_secs: u64,
        completed: bool,
        at: DateTime<Utc>,
    },
    BadgeEarned {
        badge: BadgeId,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        objective: Option<String>,
        remaining_secs: u64,
        total_secs: u64,
        progress: f64,
        at: DateTime<Utc>,
    },
}
