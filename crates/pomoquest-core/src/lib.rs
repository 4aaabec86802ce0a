//! # Pomoquest Core Library
//!
//! This library provides the core business logic for Pomoquest, a
//! Pomodoro-style focus timer with coins, levels and badges. The CLI binary
//! is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Session Timer**: A wall-clock-based state machine that requires the
//!   caller to periodically invoke `tick()`; remaining time is always derived
//!   from timestamps so suspension never causes drift
//! - **Progress Ledger**: Coins, level, focus totals, session log and earned
//!   badges, written through to a key-value store after every mutation
//! - **Badge Rules**: Pure predicates over a post-update snapshot, evaluated
//!   once per recorded session
//! - **Storage**: SQLite key-value store and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`SessionTimer`]: Countdown state machine
//! - [`ProgressLedger`]: Cumulative progress and the session completion entry point
//! - [`FocusApp`]: Wires timer, ledger and notifications together
//! - [`Database`]: SQLite-backed [`PersistentStore`]
//! - [`Config`]: Application configuration management

pub mod app;
pub mod badges;
pub mod error;
pub mod events;
pub mod ledger;
pub mod notify;
pub mod storage;
pub mod timer;

pub use app::{FocusApp, SessionOutcome};
pub use badges::{BadgeId, BadgeInfo, Tier};
pub use error::{ConfigError, CoreError, StorageError, TimerError, ValidationError};
pub use events::Event;
pub use ledger::{
    EarnedBadge, ObjectiveKind, ObjectivePolicy, ProgressLedger, ProgressState, ProgressSummary,
    SessionRecord,
};
pub use notify::{LogSink, NotificationKind, NotificationSink, NullSink};
pub use storage::{Config, Database, MemoryStore, PersistentStore};
pub use timer::{SessionTimer, TimerSession, TimerState};
