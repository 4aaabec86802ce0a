use chrono::Utc;
use clap::Subcommand;
use pomoquest_core::Config;

use super::{open_ledger, print_json, CmdResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Totals plus today's focus figures
    Show,
}

pub fn run(action: StatsAction) -> CmdResult {
    let config = Config::load()?;
    let ledger = open_ledger(&config)?;

    match action {
        StatsAction::Show => print_json(&ledger.summary(Utc::now())),
    }
}
