use clap::Subcommand;
use pomoquest_core::Config;

use super::{ensure_saved, open_ledger, print_json, require_confirmation, CmdResult};

#[derive(Subcommand)]
pub enum ProgressAction {
    /// Print the stored progress record
    Show,
    /// Erase all progress, as on a fresh install
    Reset {
        #[arg(long)]
        yes: bool,
    },
    /// Revoke every earned badge; counters stay
    ResetBadges {
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(action: ProgressAction) -> CmdResult {
    let config = Config::load()?;
    let mut ledger = open_ledger(&config)?;

    match action {
        ProgressAction::Show => print_json(ledger.state()),
        ProgressAction::Reset { yes } => {
            require_confirmation(yes, "reset progress")?;
            ledger.reset_progress();
            ensure_saved(&ledger)?;
            println!("progress reset");
            Ok(())
        }
        ProgressAction::ResetBadges { yes } => {
            require_confirmation(yes, "reset badges")?;
            ledger.reset_badges();
            ensure_saved(&ledger)?;
            println!("badges reset");
            Ok(())
        }
    }
}
