use chrono::{DateTime, Utc};
use clap::Subcommand;
use pomoquest_core::badges::{visible_tiers, CATALOG};
use pomoquest_core::{Config, Tier};
use serde::Serialize;

use super::{open_ledger, print_json, CmdResult};

#[derive(Subcommand)]
pub enum BadgesAction {
    /// List earned badges, or the whole catalog with --all
    List {
        /// Include badges not earned yet
        #[arg(long)]
        all: bool,
    },
}

#[derive(Serialize)]
struct BadgeRow {
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    tier: Tier,
    earned: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    earned_at: Option<DateTime<Utc>>,
    /// Whether the badge's tier is unlocked for display.
    visible: bool,
}

pub fn run(action: BadgesAction) -> CmdResult {
    let config = Config::load()?;
    let ledger = open_ledger(&config)?;
    let state = ledger.state();

    match action {
        BadgesAction::List { all } => {
            let tiers = visible_tiers(state.badges.len());
            let rows: Vec<BadgeRow> = CATALOG
                .iter()
                .map(|info| {
                    let earned_at = state
                        .badges
                        .iter()
                        .find(|b| b.id == info.id)
                        .map(|b| b.earned_at);
                    BadgeRow {
                        name: info.name,
                        description: info.description,
                        icon: info.icon,
                        tier: info.tier,
                        earned: earned_at.is_some(),
                        earned_at,
                        visible: tiers.contains(&info.tier),
                    }
                })
                .filter(|row| all || row.earned)
                .collect();
            print_json(&rows)
        }
    }
}
