//! Badge catalog and the rules that grant badges.

mod catalog;
mod rules;

pub use catalog::{visible_tiers, BadgeId, BadgeInfo, Tier, UnknownBadge, CATALOG};
pub use rules::{evaluate, Rule, RuleContext};
