//! Host coordinator.
//!
//! [`FocusApp`] owns one [`SessionTimer`], one [`ProgressLedger`] and a
//! [`NotificationSink`]. It is built once at startup and handed to whatever
//! drives it (the CLI loop, a GUI event loop); there is no global state.
//!
//! Data flows one way: `tick` observes the timer's completion edge, the
//! ledger records the session and grants badges, and the sink is told about
//! both.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;

use crate::error::{CoreError, ValidationError};
use crate::events::Event;
use crate::ledger::{EarnedBadge, ProgressLedger};
use crate::notify::{NotificationKind, NotificationSink};
use crate::storage::{NotificationsConfig, PersistentStore};
use crate::timer::{SessionTimer, TimerState};

/// What happened to a session that ended, naturally or not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionOutcome {
    pub objective: String,
    pub duration_secs: u64,
    pub completed: bool,
    pub new_badges: Vec<EarnedBadge>,
}

impl SessionOutcome {
    /// Events describing the outcome, for hosts that render event streams.
    pub fn events(&self, at: DateTime<Utc>) -> Vec<Event> {
        let mut events = vec![Event::SessionRecorded {
            objective: self.objective.clone(),
            duration_secs: self.duration_secs,
            completed: self.completed,
            at,
        }];
        events.extend(self.new_badges.iter().map(|b| Event::BadgeEarned {
            badge: b.id,
            at: b.earned_at,
        }));
        events
    }
}

pub struct FocusApp<S: PersistentStore, N: NotificationSink, Tz: TimeZone = Local> {
    timer: SessionTimer,
    ledger: ProgressLedger<S, Tz>,
    notifier: N,
    notifications: NotificationsConfig,
}

impl<S: PersistentStore, N: NotificationSink, Tz: TimeZone> FocusApp<S, N, Tz> {
    pub fn new(
        ledger: ProgressLedger<S, Tz>,
        notifier: N,
        notifications: &NotificationsConfig,
    ) -> Self {
        Self {
            timer: SessionTimer::new(),
            ledger,
            notifier,
            notifications: notifications.clone(),
        }
    }

    pub fn notifications(&self) -> &NotificationsConfig {
        &self.notifications
    }

    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    pub fn ledger(&self) -> &ProgressLedger<S, Tz> {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut ProgressLedger<S, Tz> {
        &mut self.ledger
    }

    /// Whether the host should keep its periodic tick alive.
    pub fn is_ticking(&self) -> bool {
        self.timer.is_running()
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> Event {
        self.timer.snapshot(now)
    }

    pub fn start(
        &mut self,
        objective: &str,
        duration_secs: u64,
        now: DateTime<Utc>,
    ) -> Result<Event, CoreError> {
        let objective = objective.trim();
        if objective.is_empty() {
            return Err(ValidationError::invalid("objective", "must not be empty").into());
        }
        Ok(self.timer.start(objective, duration_secs, now)?)
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<Event, CoreError> {
        Ok(self.timer.pause(now)?)
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<Event, CoreError> {
        Ok(self.timer.resume(now)?)
    }

    pub fn reset(&mut self, now: DateTime<Utc>) -> Event {
        self.timer.reset(now)
    }

    /// Drive the timer. Returns the outcome exactly once per session, on
    /// the tick that observes expiry.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<SessionOutcome> {
        let Event::TimerCompleted {
            objective,
            duration_secs,
            ..
        } = self.timer.tick(now)?
        else {
            return None;
        };
        let outcome = self.record(objective, duration_secs, true, now);
        self.notify_session(&outcome);
        Some(outcome)
    }

    /// Recompute after the host was suspended. Same as a tick; named for
    /// the call site.
    pub fn on_foreground(&mut self, now: DateTime<Utc>) -> Option<SessionOutcome> {
        self.tick(now)
    }

    /// Give up on the running or paused session. The time already spent is
    /// logged as an incomplete session (nothing is logged when no whole
    /// second elapsed), then the timer is reset.
    pub fn abandon(&mut self, now: DateTime<Utc>) -> Result<Option<SessionOutcome>, CoreError> {
        if !matches!(self.timer.state(), TimerState::Running | TimerState::Paused) {
            return Err(crate::error::TimerError::NotRunning.into());
        }
        let objective = self.timer.objective().unwrap_or_default().to_string();
        let elapsed = self.timer.elapsed_at(now);
        self.timer.reset(now);

        if elapsed == 0 {
            tracing::debug!(objective = %objective, "abandoned before a second elapsed; not logged");
            return Ok(None);
        }
        let outcome = self.record(objective, elapsed, false, now);
        self.notify_session(&outcome);
        Ok(Some(outcome))
    }

    fn record(
        &mut self,
        objective: String,
        duration_secs: u64,
        completed: bool,
        now: DateTime<Utc>,
    ) -> SessionOutcome {
        let new_badges = self
            .ledger
            .complete_session_at(&objective, duration_secs, completed, now)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, objective = %objective, "session was not recorded");
                Vec::new()
            });
        SessionOutcome {
            objective,
            duration_secs,
            completed,
            new_badges,
        }
    }

    fn notify_session(&self, outcome: &SessionOutcome) {
        if !self.notifications.enabled {
            return;
        }
        let minutes = outcome.duration_secs / 60;
        if outcome.completed {
            self.notifier.show(
                "Session complete",
                &format!("{} finished after {} min", outcome.objective, minutes),
                NotificationKind::Success,
            );
        } else {
            self.notifier.show(
                "Session abandoned",
                &format!("{} stopped after {} min", outcome.objective, minutes),
                NotificationKind::Info,
            );
        }
        for badge in &outcome.new_badges {
            let info = badge.id.info();
            self.notifier.show(
                &format!("Badge earned: {}", info.name),
                info.description,
                NotificationKind::Success,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::badges::BadgeId;
    use crate::storage::{LedgerConfig, MemoryStore};
    use chrono::Duration;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingSink {
        shown: RefCell<Vec<(String, NotificationKind)>>,
    }

    impl NotificationSink for RecordingSink {
        fn show(&self, title: &str, _body: &str, kind: NotificationKind) {
            self.shown.borrow_mut().push((title.to_string(), kind));
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 4, 15, 0, 0).unwrap()
    }

    fn app<'a>(
        store: &'a MemoryStore,
        sink: &'a RecordingSink,
    ) -> FocusApp<&'a MemoryStore, &'a RecordingSink, Utc> {
        let ledger = ProgressLedger::load_in(store, &LedgerConfig::default(), Utc);
        FocusApp::new(ledger, sink, &NotificationsConfig::default())
    }

    #[test]
    fn completion_records_once_and_notifies() {
        let store = MemoryStore::new();
        let sink = RecordingSink::default();
        let mut app = app(&store, &sink);

        app.start("Focus", 1500, t0()).unwrap();
        assert!(app.is_ticking());
        assert!(app.tick(t0() + Duration::seconds(600)).is_none());

        let end = t0() + Duration::seconds(1500);
        let outcome = app.tick(end).expect("session should complete");
        assert!(outcome.completed);
        assert_eq!(outcome.new_badges.len(), 1);
        assert_eq!(outcome.new_badges[0].id, BadgeId::ProductivityPioneer);
        assert!(!app.is_ticking());

        // Repeated ticks after expiry change nothing.
        assert!(app.tick(end + Duration::seconds(1)).is_none());
        assert!(app.on_foreground(end + Duration::hours(1)).is_none());
        assert_eq!(app.ledger().state().completed_count, 1);
        assert_eq!(app.ledger().state().sessions.len(), 1);

        let shown = sink.shown.borrow();
        assert_eq!(shown.len(), 2);
        assert_eq!(shown[0].0, "Session complete");
        assert_eq!(shown[1].0, "Badge earned: Productivity pioneer");
    }

    #[test]
    fn foreground_after_long_suspension_completes() {
        let store = MemoryStore::new();
        let sink = RecordingSink::default();
        let mut app = app(&store, &sink);
        app.start("Focus", 1500, t0()).unwrap();
        let outcome = app.on_foreground(t0() + Duration::hours(2)).unwrap();
        assert_eq!(outcome.duration_secs, 1500);
        assert_eq!(app.ledger().state().total_focus_seconds, 1500);
    }

    #[test]
    fn paused_session_never_completes() {
        let store = MemoryStore::new();
        let sink = RecordingSink::default();
        let mut app = app(&store, &sink);
        app.start("Focus", 60, t0()).unwrap();
        app.pause(t0() + Duration::seconds(30)).unwrap();
        assert!(!app.is_ticking());
        assert!(app.tick(t0() + Duration::hours(1)).is_none());
        assert!(app.ledger().state().sessions.is_empty());
    }

    #[test]
    fn abandon_logs_elapsed_time_as_incomplete() {
        let store = MemoryStore::new();
        let sink = RecordingSink::default();
        let mut app = app(&store, &sink);
        app.start("Focus", 1500, t0()).unwrap();
        let outcome = app
            .abandon(t0() + Duration::seconds(400))
            .unwrap()
            .expect("elapsed time should be logged");
        assert!(!outcome.completed);
        assert_eq!(outcome.duration_secs, 400);
        assert_eq!(app.timer().state(), TimerState::Idle);

        let state = app.ledger().state();
        assert_eq!(state.completed_count, 0);
        assert_eq!(state.sessions.len(), 1);
        assert!(!state.sessions[0].completed);
        assert_eq!(sink.shown.borrow()[0].1, NotificationKind::Info);
    }

    #[test]
    fn abandon_without_elapsed_time_logs_nothing() {
        let store = MemoryStore::new();
        let sink = RecordingSink::default();
        let mut app = app(&store, &sink);
        app.start("Focus", 1500, t0()).unwrap();
        assert!(app.abandon(t0()).unwrap().is_none());
        assert!(app.ledger().state().sessions.is_empty());
        assert!(app.abandon(t0()).is_err());
    }

    #[test]
    fn empty_objective_is_rejected() {
        let store = MemoryStore::new();
        let sink = RecordingSink::default();
        let mut app = app(&store, &sink);
        assert!(matches!(
            app.start("  ", 60, t0()),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(app.start("Focus", 0, t0()), Err(CoreError::Timer(_))));
    }

    #[test]
    fn disabled_notifications_stay_quiet() {
        let store = MemoryStore::new();
        let sink = RecordingSink::default();
        let ledger = ProgressLedger::load_in(&store, &LedgerConfig::default(), Utc);
        let mut app = FocusApp::new(ledger, &sink, &NotificationsConfig { enabled: false });
        assert!(!app.notifications().enabled);
        app.start("Focus", 10, t0()).unwrap();
        assert!(app.tick(t0() + Duration::seconds(10)).is_some());
        assert!(sink.shown.borrow().is_empty());
    }

    #[test]
    fn outcome_events_list_record_then_badges() {
        let outcome = SessionOutcome {
            objective: "Focus".into(),
            duration_secs: 1500,
            completed: true,
            new_badges: vec![EarnedBadge {
                id: BadgeId::ProductivityPioneer,
                earned_at: t0(),
            }],
        };
        let events = outcome.events(t0());
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::SessionRecorded { completed: true, .. }));
        assert!(matches!(
            events[1],
            Event::BadgeEarned {
                badge: BadgeId::ProductivityPioneer,
                ..
            }
        ));
    }
}
