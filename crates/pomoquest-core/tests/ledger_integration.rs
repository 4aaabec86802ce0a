//! Integration tests for the progress ledger and badge rules.
//!
//! Exercises the public API end to end: recording sessions, badge grants,
//! resets and persistence through both store implementations.

use chrono::{DateTime, Duration, TimeZone, Utc};
use pomoquest_core::storage::LedgerConfig;
use pomoquest_core::{
    BadgeId, Database, MemoryStore, PersistentStore, ProgressLedger, ProgressState,
};

fn tuesday(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 4, hour, minute, 0).unwrap()
}

fn open<S: PersistentStore>(store: S) -> ProgressLedger<S, Utc> {
    ProgressLedger::load_in(store, &LedgerConfig::default(), Utc)
}

#[test]
fn fresh_ledger_first_focus_session() {
    let mut ledger = open(MemoryStore::new());
    let granted = ledger
        .complete_session_at("Focus", 1500, true, tuesday(15, 0))
        .unwrap();

    let state = ledger.state();
    assert_eq!(state.completed_count, 1);
    assert_eq!(state.total_focus_seconds, 1500);
    assert_eq!(state.coins, 10);
    assert_eq!(state.level, 1);
    let ids: Vec<_> = granted.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![BadgeId::ProductivityPioneer]);
}

#[test]
fn milestone_granted_only_when_first_reached() {
    let mut ledger = open(MemoryStore::new());
    for i in 0..4 {
        ledger
            .complete_session_at("Focus", 60, true, tuesday(15, i))
            .unwrap();
    }
    let fifth = ledger
        .complete_session_at("Focus", 60, true, tuesday(15, 4))
        .unwrap();
    assert!(fifth.iter().any(|b| b.id == BadgeId::FocusSeedling));

    let sixth = ledger
        .complete_session_at("Focus", 60, true, tuesday(15, 5))
        .unwrap();
    assert!(sixth.iter().all(|b| b.id != BadgeId::FocusSeedling));
    let held = ledger
        .state()
        .badges
        .iter()
        .filter(|b| b.id == BadgeId::FocusSeedling)
        .count();
    assert_eq!(held, 1);
}

#[test]
fn reset_then_complete_matches_fresh_install() {
    let store = MemoryStore::new();
    let mut ledger = open(&store);
    for i in 0..12 {
        ledger
            .complete_session_at("Focus", 1500, true, tuesday(9, i))
            .unwrap();
    }
    assert!(ledger.state().badges.len() > 3);

    ledger.reset_progress();
    assert_eq!(ledger.state(), &ProgressState::default());
    assert!(store.get("@gamification_state").unwrap().is_none());
    assert_eq!(open(&store).state(), &ProgressState::default());

    let mut fresh = open(MemoryStore::new());
    let now = tuesday(15, 0);
    let after_reset = ledger.complete_session_at("Focus", 1500, true, now).unwrap();
    let on_fresh = fresh.complete_session_at("Focus", 1500, true, now).unwrap();
    assert_eq!(after_reset, on_fresh);
    assert_eq!(ledger.state(), fresh.state());
}

#[test]
fn power_hour_granted_on_eighth_distinct_hour() {
    let mut ledger = open(MemoryStore::new());
    for hour in 9..16 {
        let granted = ledger
            .complete_session_at("Focus", 1500, true, tuesday(hour, 45))
            .unwrap();
        assert!(
            granted.iter().all(|b| b.id != BadgeId::PowerHour),
            "granted too early at {hour}:45"
        );
    }
    // A second session in an hour already covered does not help.
    let repeat = ledger
        .complete_session_at("Focus", 1500, true, tuesday(15, 55))
        .unwrap();
    assert!(repeat.iter().all(|b| b.id != BadgeId::PowerHour));

    let granted = ledger
        .complete_session_at("Focus", 1500, true, tuesday(16, 45))
        .unwrap();
    assert!(granted.iter().any(|b| b.id == BadgeId::PowerHour));
}

#[test]
fn persisted_json_round_trips() {
    let store = MemoryStore::new();
    let mut ledger = open(&store);
    ledger
        .complete_session_at("Focus", 1500, true, tuesday(7, 0))
        .unwrap();
    ledger
        .complete_session_at("Break", 900, true, tuesday(7, 30))
        .unwrap();
    ledger
        .complete_session_at("Focus", 200, false, tuesday(8, 0))
        .unwrap();

    let json = store.get("@gamification_state").unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    for key in ["coins", "level", "completedPomodoros", "totalFocusTime", "sessions", "badges"] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
    assert_eq!(value["sessions"][1]["duration"], 900);
    assert_eq!(
        value["sessions"][0]["timestamp"],
        tuesday(7, 0).timestamp_millis()
    );

    let reloaded = open(&store);
    assert_eq!(reloaded.state(), ledger.state());
    assert_eq!(ProgressState::from_json(&json).unwrap(), *ledger.state());
}

#[test]
fn stale_timer_fields_are_dropped_on_load() {
    let store = MemoryStore::new();
    store
        .set(
            "@gamification_state",
            r#"{"coins":30,"level":1,"completedPomodoros":3,"totalFocusTime":4500,
                "sessions":[],"badges":[{"name":"Focus sprout","earnedAt":1700000000000}],
                "isTimerRunning":true,"currentSessionStartTime":1700000000000,"remainingTime":99}"#,
        )
        .unwrap();
    let ledger = open(&store);
    assert_eq!(ledger.state().coins, 30);
    assert_eq!(ledger.state().badges[0].id, BadgeId::FocusSprout);

    let rewritten = ledger.state().to_json().unwrap();
    assert!(!rewritten.contains("isTimerRunning"));
    assert!(!rewritten.contains("remainingTime"));
}

#[test]
fn sqlite_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pomoquest.db");
    {
        let mut ledger = open(Database::open_at(&path).unwrap());
        ledger
            .complete_session_at("Focus", 3600, true, tuesday(22, 15))
            .unwrap();
    }
    let ledger = open(Database::open_at(&path).unwrap());
    let state = ledger.state();
    assert_eq!(state.completed_count, 1);
    assert_eq!(state.total_focus_seconds, 3600);
    let mut ids: Vec<_> = state.badges.iter().map(|b| b.id).collect();
    ids.sort();
    assert_eq!(
        ids,
        vec![BadgeId::ProductivityPioneer, BadgeId::HourHero, BadgeId::NightOwl]
    );
}

#[test]
fn weekend_and_break_badges_over_a_saturday() {
    let saturday = Utc.with_ymd_and_hms(2025, 3, 8, 11, 0, 0).unwrap();
    let mut ledger = open(MemoryStore::new());
    let first = ledger
        .complete_session_at("Focus", 1500, true, saturday)
        .unwrap();
    let ids: Vec<_> = first.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![BadgeId::ProductivityPioneer, BadgeId::WeekendWarrior]);

    let rest = ledger
        .complete_session_at("Long break", 1200, true, saturday + Duration::minutes(30))
        .unwrap();
    let ids: Vec<_> = rest.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![BadgeId::Afk]);
    assert_eq!(ledger.state().completed_count, 1);
}

#[test]
fn legacy_document_survives_restart_and_a_new_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pomoquest.db");
    Database::open_at(&path)
        .unwrap()
        .set(
            "@gamification_state",
            r#"{"coins":120,"level":2,"badges":["First Pomodoro","Pomodoro Novice"],"completedPomodoros":12}"#,
        )
        .unwrap();

    {
        let mut ledger = open(Database::open_at(&path).unwrap());
        ledger
            .complete_session_at("Focus", 1500, true, tuesday(15, 0))
            .unwrap();
    }
    let ledger = open(Database::open_at(&path).unwrap());
    assert_eq!(ledger.state().completed_count, 13);
    assert_eq!(ledger.state().coins, 130);
}
