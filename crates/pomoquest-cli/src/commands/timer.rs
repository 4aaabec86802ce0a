use std::io::IsTerminal;
use std::time::Duration;

use chrono::Utc;
use clap::Subcommand;
use pomoquest_core::{
    Config, Event, FocusApp, NotificationKind, NotificationSink, SessionOutcome,
};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

use super::{open_ledger, print_json, CmdResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run a session in the foreground (p = pause, r = resume, q = abandon)
    Run {
        /// Objective label recorded in the session log
        #[arg(long, default_value = "Focus")]
        objective: String,
        /// Session length in minutes (defaults to timer.focus_minutes)
        #[arg(long, conflicts_with = "seconds")]
        minutes: Option<u64>,
        /// Session length in seconds
        #[arg(long)]
        seconds: Option<u64>,
    },
    /// Show the configured lengths of the next focus session and break
    Plan,
}

/// Prints notifications to stderr so stdout stays machine readable.
struct TerminalSink;

impl NotificationSink for TerminalSink {
    fn show(&self, title: &str, body: &str, kind: NotificationKind) {
        let marker = match kind {
            NotificationKind::Success => "*",
            NotificationKind::Info => "-",
            NotificationKind::Warning => "!",
        };
        eprintln!("{marker} {title}: {body}");
    }
}

#[derive(Serialize)]
struct Plan {
    focus_minutes: u32,
    completed_count: u64,
    next_break_minutes: u32,
    sessions_before_long_break: u32,
}

pub fn run(action: TimerAction) -> CmdResult {
    let config = Config::load()?;
    match action {
        TimerAction::Run {
            objective,
            minutes,
            seconds,
        } => {
            let duration_secs = match (minutes, seconds) {
                (_, Some(secs)) => secs,
                (Some(min), None) => min.saturating_mul(60),
                (None, None) => config.focus_secs(),
            };
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run_session(&config, &objective, duration_secs))
        }
        TimerAction::Plan => {
            let ledger = open_ledger(&config)?;
            let completed_count = ledger.state().completed_count;
            print_json(&Plan {
                focus_minutes: config.timer.focus_minutes,
                completed_count,
                next_break_minutes: config.break_minutes_after(completed_count),
                sessions_before_long_break: config.timer.sessions_before_long_break,
            })
        }
    }
}

fn emit(event: &Event) -> CmdResult {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

fn emit_outcome(outcome: &SessionOutcome) -> CmdResult {
    for event in outcome.events(Utc::now()) {
        emit(&event)?;
    }
    Ok(())
}

async fn run_session(config: &Config, objective: &str, duration_secs: u64) -> CmdResult {
    let ledger = open_ledger(config)?;
    let mut app = FocusApp::new(ledger, TerminalSink, &config.notifications);

    emit(&app.start(objective, duration_secs, Utc::now())?)?;

    let show_progress = std::io::stderr().is_terminal();
    let mut ticker = tokio::time::interval(Duration::from_millis(
        config.timer.tick_interval_ms.max(50),
    ));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !app.is_ticking() {
                    continue;
                }
                let now = Utc::now();
                if let Some(outcome) = app.tick(now) {
                    if show_progress {
                        eprintln!();
                    }
                    emit_outcome(&outcome)?;
                    break;
                }
                if show_progress {
                    let remaining = app.timer().remaining_at(now);
                    eprint!("\r{:02}:{:02} remaining ", remaining / 60, remaining % 60);
                }
            }
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    stdin_open = false;
                    continue;
                };
                let now = Utc::now();
                match line.trim() {
                    "p" => match app.pause(now) {
                        Ok(event) => emit(&event)?,
                        Err(e) => eprintln!("{e}"),
                    },
                    "r" => match app.resume(now) {
                        Ok(event) => emit(&event)?,
                        Err(e) => eprintln!("{e}"),
                    },
                    "q" => {
                        abandon(&mut app)?;
                        break;
                    }
                    "" => {}
                    other => eprintln!("unknown command '{other}' (p = pause, r = resume, q = abandon)"),
                }
            }
            _ = &mut ctrl_c => {
                if show_progress {
                    eprintln!();
                }
                abandon(&mut app)?;
                break;
            }
        }
    }

    super::ensure_saved(app.ledger())
}

fn abandon<S, N>(app: &mut FocusApp<S, N>) -> CmdResult
where
    S: pomoquest_core::PersistentStore,
    N: NotificationSink,
{
    let now = Utc::now();
    let objective = app.timer().objective().unwrap_or_default().to_string();
    let elapsed_secs = app.timer().elapsed_at(now);
    let outcome = app.abandon(now)?;
    emit(&Event::TimerAbandoned {
        objective,
        elapsed_secs,
        at: now,
    })?;
    if let Some(outcome) = outcome {
        emit_outcome(&outcome)?;
    }
    Ok(())
}
