use clap::Subcommand;
use pomoquest_core::{Config, EarnedBadge, SessionRecord};
use serde::Serialize;

use super::{ensure_saved, open_ledger, print_json, CmdResult};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Log a session ending now
    Record {
        /// Objective label, e.g. "Focus" or "Long break"
        #[arg(long)]
        objective: String,
        /// Session length in seconds
        #[arg(long)]
        seconds: u64,
        /// The session was cut short
        #[arg(long)]
        aborted: bool,
    },
}

#[derive(Serialize)]
struct Recorded {
    session: Option<SessionRecord>,
    new_badges: Vec<EarnedBadge>,
    coins: u64,
    level: u64,
}

pub fn run(action: SessionAction) -> CmdResult {
    let config = Config::load()?;
    let mut ledger = open_ledger(&config)?;

    match action {
        SessionAction::Record {
            objective,
            seconds,
            aborted,
        } => {
            let new_badges = ledger.complete_session(&objective, seconds, !aborted)?;
            ensure_saved(&ledger)?;
            let state = ledger.state();
            print_json(&Recorded {
                session: state.sessions.last().cloned(),
                new_badges,
                coins: state.coins,
                level: state.level,
            })
        }
    }
}
