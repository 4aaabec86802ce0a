pub mod badges;
pub mod config;
pub mod history;
pub mod progress;
pub mod session;
pub mod stats;
pub mod timer;

use pomoquest_core::{Config, Database, ProgressLedger};

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Open the ledger stored in the data directory.
pub fn open_ledger(config: &Config) -> Result<ProgressLedger<Database>, Box<dyn std::error::Error>> {
    let db = Database::open()?;
    Ok(ProgressLedger::load(db, &config.ledger))
}

/// Fail when the last write-through did not reach the store.
pub fn ensure_saved(ledger: &ProgressLedger<Database>) -> CmdResult {
    if ledger.has_unsaved_changes() {
        return Err("progress could not be saved; see log output".into());
    }
    Ok(())
}

pub fn require_confirmation(yes: bool, what: &str) -> CmdResult {
    if !yes {
        return Err(format!("refusing to {what} without --yes").into());
    }
    Ok(())
}

pub fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
