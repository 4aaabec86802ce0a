use clap::Subcommand;
use pomoquest_core::Config;

use super::{ensure_saved, open_ledger, print_json, require_confirmation, CmdResult};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Recent sessions, newest first
    List {
        /// Maximum number of sessions to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Empty the session log; totals and badges are kept
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(action: HistoryAction) -> CmdResult {
    let config = Config::load()?;
    let mut ledger = open_ledger(&config)?;

    match action {
        HistoryAction::List { limit } => {
            let recent: Vec<_> = ledger.state().sessions.iter().rev().take(limit).collect();
            print_json(&recent)
        }
        HistoryAction::Clear { yes } => {
            require_confirmation(yes, "clear the session log")?;
            ledger.clear_session_log();
            ensure_saved(&ledger)?;
            println!("session log cleared");
            Ok(())
        }
    }
}
