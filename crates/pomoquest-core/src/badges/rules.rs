//! Badge rule engine.
//!
//! Every rule is a predicate over one immutable snapshot: the progress state
//! *after* the triggering session was applied, plus that session's record.
//! Evaluation is a single pass in two phases:
//!
//! 1. primary rules (counts, durations, clock and calendar rules);
//! 2. meta rules, which look at the badge set as it stands after phase 1.
//!
//! Meta grants are not fed back into phase 2 of the same pass; a badge that
//! depends on another meta badge fires on the next completed session.

use std::collections::BTreeSet;

use chrono::{Datelike, TimeZone, Timelike, Weekday};

use super::catalog::{BadgeId, CATALOG};
use crate::ledger::{ObjectiveKind, ObjectivePolicy, ProgressState, SessionRecord};

/// Rule families. Hour bounds are local wall-clock hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// `completed_count >= n`.
    CompletedAtLeast(u64),
    /// `total_focus_seconds >= n`.
    FocusSecondsAtLeast(u64),
    /// Triggering focus session finished in `from <= hour < until`.
    HourWindow { from: u32, until: u32 },
    /// Triggering focus session finished on Saturday or Sunday.
    Weekend,
    /// Completed focus sessions today cover every hour in `first..=last`.
    EveryHourOfDay { first: u32, last: u32 },
    /// Triggering completed break lasted at least `n` seconds.
    BreakAtLeast(u64),
    /// At least `n` badges held after the primary phase.
    BadgesAtLeast(usize),
    /// Every other badge in the catalog is held.
    AllOthers,
}

impl Rule {
    pub fn is_meta(&self) -> bool {
        matches!(self, Rule::BadgesAtLeast(_) | Rule::AllOthers)
    }
}

/// Everything a rule may look at.
pub struct RuleContext<'a, Tz: TimeZone> {
    pub state: &'a ProgressState,
    pub trigger: &'a SessionRecord,
    pub policy: &'a ObjectivePolicy,
    /// Zone used for hour, weekday and "today".
    pub tz: &'a Tz,
}

impl<Tz: TimeZone> RuleContext<'_, Tz> {
    fn trigger_kind(&self) -> ObjectiveKind {
        self.policy.kind(&self.trigger.objective)
    }

    /// Time-of-day and calendar rules only react to finished focus sessions.
    fn trigger_is_counted_focus(&self) -> bool {
        self.trigger.completed && self.trigger_kind() == ObjectiveKind::Focus
    }

    fn primary_holds(&self, rule: Rule) -> bool {
        let local = self.trigger.timestamp.with_timezone(self.tz);
        match rule {
            Rule::CompletedAtLeast(n) => self.state.completed_count >= n,
            Rule::FocusSecondsAtLeast(n) => self.state.total_focus_seconds >= n,
            Rule::HourWindow { from, until } => {
                self.trigger_is_counted_focus() && (from..until).contains(&local.hour())
            }
            Rule::Weekend => {
                self.trigger_is_counted_focus()
                    && matches!(local.weekday(), Weekday::Sat | Weekday::Sun)
            }
            Rule::EveryHourOfDay { first, last } => {
                if !self.trigger_is_counted_focus() {
                    return false;
                }
                let today = local.date_naive();
                let hours: BTreeSet<u32> = self
                    .state
                    .sessions
                    .iter()
                    .filter(|s| s.completed && self.policy.counts(&s.objective))
                    .map(|s| s.timestamp.with_timezone(self.tz))
                    .filter(|t| t.date_naive() == today)
                    .map(|t| t.hour())
                    .collect();
                (first..=last).all(|h| hours.contains(&h))
            }
            Rule::BreakAtLeast(n) => {
                self.trigger.completed
                    && self.trigger_kind() == ObjectiveKind::Break
                    && self.trigger.duration_secs >= n
            }
            Rule::BadgesAtLeast(_) | Rule::AllOthers => false,
        }
    }
}

fn meta_holds(rule: Rule, id: BadgeId, held: &BTreeSet<BadgeId>) -> bool {
    match rule {
        Rule::BadgesAtLeast(n) => held.len() >= n,
        Rule::AllOthers => BadgeId::ALL
            .iter()
            .filter(|other| **other != id)
            .all(|other| held.contains(other)),
        _ => false,
    }
}

/// Badges newly earned by the triggering session, in catalog order.
///
/// Ids already in `prior` are never returned.
pub fn evaluate<Tz: TimeZone>(prior: &BTreeSet<BadgeId>, ctx: &RuleContext<'_, Tz>) -> Vec<BadgeId> {
    let mut granted: Vec<BadgeId> = CATALOG
        .iter()
        .filter(|b| !b.rule.is_meta() && !prior.contains(&b.id))
        .filter(|b| ctx.primary_holds(b.rule))
        .map(|b| b.id)
        .collect();

    let held: BTreeSet<BadgeId> = prior.iter().copied().chain(granted.iter().copied()).collect();
    granted.extend(
        CATALOG
            .iter()
            .filter(|b| b.rule.is_meta() && !prior.contains(&b.id))
            .filter(|b| meta_holds(b.rule, b.id, &held))
            .map(|b| b.id),
    );

    granted.sort();
    granted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, FixedOffset, Utc};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn focus(at: DateTime<Utc>) -> SessionRecord {
        SessionRecord {
            timestamp: at,
            objective: "Focus".into(),
            duration_secs: 1500,
            completed: true,
        }
    }

    /// State after appending `trigger`, counted the way the ledger counts.
    fn state_with(mut sessions: Vec<SessionRecord>, trigger: &SessionRecord) -> ProgressState {
        sessions.push(trigger.clone());
        let policy = ObjectivePolicy::default();
        let counted: Vec<_> = sessions
            .iter()
            .filter(|s| s.completed && policy.counts(&s.objective))
            .collect();
        let mut state = ProgressState {
            completed_count: counted.len() as u64,
            total_focus_seconds: counted.iter().map(|s| s.duration_secs).sum(),
            sessions,
            ..Default::default()
        };
        state.recompute_level();
        state
    }

    fn eval(prior: &[BadgeId], state: &ProgressState, trigger: &SessionRecord) -> Vec<BadgeId> {
        let policy = ObjectivePolicy::default();
        let ctx = RuleContext {
            state,
            trigger,
            policy: &policy,
            tz: &Utc,
        };
        evaluate(&prior.iter().copied().collect(), &ctx)
    }

    #[test]
    fn first_completion_on_a_tuesday_afternoon() {
        let trigger = focus(utc(2025, 3, 4, 15, 0));
        let state = state_with(vec![], &trigger);
        assert_eq!(eval(&[], &state, &trigger), vec![BadgeId::ProductivityPioneer]);
    }

    #[test]
    fn milestones_are_not_regranted() {
        let trigger = focus(utc(2025, 3, 4, 15, 0));
        let state = state_with(vec![focus(utc(2025, 3, 4, 14, 0))], &trigger);
        let granted = eval(&[BadgeId::ProductivityPioneer], &state, &trigger);
        assert_eq!(granted, vec![BadgeId::FocusSprout]);

        let again = eval(
            &[BadgeId::ProductivityPioneer, BadgeId::FocusSprout],
            &state,
            &trigger,
        );
        assert!(again.is_empty());
    }

    #[test]
    fn time_of_day_windows() {
        let cases = [
            (5, vec![BadgeId::DawnWarrior, BadgeId::EarlyBird]),
            (9, vec![BadgeId::EarlyBird]),
            (10, vec![]),
            (12, vec![BadgeId::MiddayMaster]),
            (13, vec![BadgeId::MiddayMaster]),
            (14, vec![]),
            (18, vec![BadgeId::TwilightTactician]),
            (21, vec![]),
            (22, vec![BadgeId::NightOwl]),
            (23, vec![BadgeId::NightOwl]),
        ];
        for (hour, expected) in cases {
            let trigger = focus(utc(2025, 3, 4, hour, 30));
            let state = state_with(vec![], &trigger);
            let prior = [BadgeId::ProductivityPioneer];
            assert_eq!(eval(&prior, &state, &trigger), expected, "hour {hour}");
        }
    }

    #[test]
    fn hours_use_the_supplied_zone() {
        // 20:30 UTC is 05:30 the next morning at UTC+9.
        let trigger = focus(utc(2025, 3, 4, 20, 30));
        let state = state_with(vec![], &trigger);
        let policy = ObjectivePolicy::default();
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let ctx = RuleContext {
            state: &state,
            trigger: &trigger,
            policy: &policy,
            tz: &tokyo,
        };
        let granted = evaluate(&[BadgeId::ProductivityPioneer].into_iter().collect(), &ctx);
        assert_eq!(granted, vec![BadgeId::DawnWarrior, BadgeId::EarlyBird]);
    }

    #[test]
    fn clock_rules_ignore_breaks_and_abandoned_sessions() {
        let mut trigger = focus(utc(2025, 3, 8, 23, 0)); // Saturday night
        trigger.completed = false;
        let state = state_with(vec![], &trigger);
        assert!(eval(&[], &state, &trigger).is_empty());

        trigger.completed = true;
        trigger.objective = "Read".into();
        let state = state_with(vec![], &trigger);
        assert!(eval(&[], &state, &trigger).is_empty());
    }

    #[test]
    fn weekend_rule() {
        let saturday = focus(utc(2025, 3, 8, 15, 0));
        let state = state_with(vec![], &saturday);
        let granted = eval(&[BadgeId::ProductivityPioneer], &state, &saturday);
        assert_eq!(granted, vec![BadgeId::WeekendWarrior]);

        let monday = focus(utc(2025, 3, 10, 15, 0));
        let state = state_with(vec![], &monday);
        assert!(eval(&[BadgeId::ProductivityPioneer], &state, &monday).is_empty());
    }

    #[test]
    fn cumulative_focus_thresholds() {
        let mut trigger = focus(utc(2025, 3, 4, 15, 0));
        trigger.duration_secs = 3600;
        let state = state_with(vec![], &trigger);
        assert_eq!(
            eval(&[BadgeId::ProductivityPioneer], &state, &trigger),
            vec![BadgeId::HourHero]
        );

        let mut state = state.clone();
        state.total_focus_seconds = 36_000;
        assert_eq!(
            eval(&[BadgeId::ProductivityPioneer, BadgeId::HourHero], &state, &trigger),
            vec![BadgeId::MarathonMind]
        );
    }

    #[test]
    fn long_completed_break_grants_afk() {
        let brk = SessionRecord {
            timestamp: utc(2025, 3, 4, 15, 0),
            objective: "Break".into(),
            duration_secs: 900,
            completed: true,
        };
        let state = state_with(vec![], &brk);
        assert_eq!(eval(&[], &state, &brk), vec![BadgeId::Afk]);

        let short = SessionRecord {
            duration_secs: 899,
            ..brk.clone()
        };
        let state = state_with(vec![], &short);
        assert!(eval(&[], &state, &short).is_empty());

        let abandoned = SessionRecord {
            completed: false,
            ..brk
        };
        let state = state_with(vec![], &abandoned);
        assert!(eval(&[], &state, &abandoned).is_empty());
    }

    #[test]
    fn power_hour_needs_every_hour_nine_to_four() {
        let day: Vec<_> = (9..=16).map(|h| focus(utc(2025, 3, 4, h, 40))).collect();
        let prior = [BadgeId::ProductivityPioneer, BadgeId::FocusSprout];

        // Seven of eight hours: no grant.
        let (last, earlier) = day.split_last().unwrap();
        let state = state_with(earlier[..6].to_vec(), &earlier[6]);
        assert!(!eval(&prior, &state, &earlier[6]).contains(&BadgeId::PowerHour));

        // The eighth hour completes the set.
        let state = state_with(earlier.to_vec(), last);
        assert!(eval(&prior, &state, last).contains(&BadgeId::PowerHour));
    }

    #[test]
    fn power_hour_ignores_other_days() {
        let yesterday: Vec<_> = (9..=15)
            .map(|h| focus(utc(2025, 3, 3, h, 10)))
            .collect();
        let trigger = focus(utc(2025, 3, 4, 16, 10));
        let state = state_with(yesterday, &trigger);
        assert!(!eval(&[BadgeId::ProductivityPioneer], &state, &trigger)
            .contains(&BadgeId::PowerHour));
    }

    #[test]
    fn meta_rules_count_primary_grants_from_the_same_pass() {
        // Four badges held, the fifth arrives in this pass.
        let prior = [
            BadgeId::ProductivityPioneer,
            BadgeId::FocusSprout,
            BadgeId::DawnWarrior,
            BadgeId::HourHero,
        ];
        let trigger = focus(utc(2025, 3, 4, 22, 30));
        let history = vec![focus(utc(2025, 3, 3, 9, 0))];
        let state = state_with(history, &trigger);
        let granted = eval(&prior, &state, &trigger);
        assert_eq!(granted, vec![BadgeId::NightOwl, BadgeId::BadgeHunter]);
    }

    #[test]
    fn completionist_waits_for_every_other_badge() {
        let trigger = focus(utc(2025, 3, 4, 15, 0) + Duration::minutes(1));
        let state = state_with(vec![], &trigger);

        let all_but_two: Vec<_> = BadgeId::ALL
            .into_iter()
            .filter(|b| !matches!(b, BadgeId::Completionist | BadgeId::MiddayMaster))
            .collect();
        assert!(eval(&all_but_two, &state, &trigger).is_empty());

        let all_but_one: Vec<_> = BadgeId::ALL
            .into_iter()
            .filter(|b| *b != BadgeId::Completionist)
            .collect();
        assert_eq!(eval(&all_but_one, &state, &trigger), vec![BadgeId::Completionist]);
    }

    #[test]
    fn meta_grants_do_not_cascade_within_a_pass() {
        // Everything except Badge connoisseur and Completionist; this pass
        // grants Badge connoisseur but Completionist must wait.
        let prior: Vec<_> = BadgeId::ALL
            .into_iter()
            .filter(|b| !matches!(b, BadgeId::BadgeConnoisseur | BadgeId::Completionist))
            .collect();
        let trigger = focus(utc(2025, 3, 4, 15, 0));
        let state = state_with(vec![], &trigger);
        assert_eq!(eval(&prior, &state, &trigger), vec![BadgeId::BadgeConnoisseur]);
    }
}
