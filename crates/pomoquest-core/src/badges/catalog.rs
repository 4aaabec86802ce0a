//! The fixed badge catalog.
//!
//! Each [`BadgeId`] maps to exactly one [`BadgeInfo`] row: display name,
//! description, icon key, tier and the rule that grants it. The display name
//! doubles as the persisted identifier, so renaming a badge is a data
//! migration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::rules::Rule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BadgeId {
    // Tier 1
    ProductivityPioneer,
    FocusSprout,
    FocusSeedling,
    FocusSapling,
    FocusHero,
    DawnWarrior,
    // Tier 2
    HourHero,
    EarlyBird,
    NightOwl,
    MarathonMind,
    WeekendWarrior,
    Afk,
    FocusLegend,
    MiddayMaster,
    TwilightTactician,
    // Tier 3
    BadgeHunter,
    BadgeCollector,
    PowerHour,
    BadgeConnoisseur,
    Completionist,
}

/// Unlock difficulty. Only affects what a UI shows, never what is granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Easy,
    Medium,
    Hard,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Easy, Tier::Medium, Tier::Hard];

    /// Earned badges needed before this tier is displayed.
    pub fn unlock_requirement(self) -> usize {
        match self {
            Tier::Easy => 0,
            Tier::Medium => 4,
            Tier::Hard => 10,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Tier::Easy => 1,
            Tier::Medium => 2,
            Tier::Hard => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeInfo {
    pub id: BadgeId,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub tier: Tier,
    pub rule: Rule,
}

const fn info(
    id: BadgeId,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    tier: Tier,
    rule: Rule,
) -> BadgeInfo {
    BadgeInfo {
        id,
        name,
        description,
        icon,
        tier,
        rule,
    }
}

/// Catalog in display order. Indexed by `BadgeId as usize`.
#[rustfmt::skip]
pub const CATALOG: [BadgeInfo; 20] = [
    info(BadgeId::ProductivityPioneer, "Productivity pioneer", "Complete your first focus session", "rocket", Tier::Easy, Rule::CompletedAtLeast(1)),
    info(BadgeId::FocusSprout, "Focus sprout", "Complete 2 focus sessions", "leaf", Tier::Easy, Rule::CompletedAtLeast(2)),
    info(BadgeId::FocusSeedling, "Focus seedling", "Complete 5 focus sessions", "flower", Tier::Easy, Rule::CompletedAtLeast(5)),
    info(BadgeId::FocusSapling, "Focus sapling", "Complete 10 focus sessions", "tree", Tier::Easy, Rule::CompletedAtLeast(10)),
    info(BadgeId::FocusHero, "Focus hero", "Complete 15 focus sessions", "shield", Tier::Easy, Rule::CompletedAtLeast(15)),
    info(BadgeId::DawnWarrior, "Dawn warrior", "Finish a focus session between 5 and 7 AM", "sunrise", Tier::Easy, Rule::HourWindow { from: 5, until: 7 }),
    info(BadgeId::HourHero, "Hour hero", "Accumulate one hour of focus", "hourglass", Tier::Medium, Rule::FocusSecondsAtLeast(3_600)),
    info(BadgeId::EarlyBird, "Early bird", "Finish a focus session before 10 AM", "sunny", Tier::Medium, Rule::HourWindow { from: 0, until: 10 }),
    info(BadgeId::NightOwl, "Night owl", "Finish a focus session after 10 PM", "moon", Tier::Medium, Rule::HourWindow { from: 22, until: 24 }),
    info(BadgeId::MarathonMind, "Marathon mind", "Accumulate ten hours of focus", "medal", Tier::Medium, Rule::FocusSecondsAtLeast(36_000)),
    info(BadgeId::WeekendWarrior, "Weekend warrior", "Finish a focus session on a weekend", "calendar", Tier::Medium, Rule::Weekend),
    info(BadgeId::Afk, "AFK", "Take a break of 15 minutes or more", "cafe", Tier::Medium, Rule::BreakAtLeast(900)),
    info(BadgeId::FocusLegend, "Focus legend", "Complete 20 focus sessions", "star", Tier::Medium, Rule::CompletedAtLeast(20)),
    info(BadgeId::MiddayMaster, "Midday master", "Finish a focus session between noon and 2 PM", "restaurant", Tier::Medium, Rule::HourWindow { from: 12, until: 14 }),
    info(BadgeId::TwilightTactician, "Twilight tactician", "Finish a focus session between 6 and 9 PM", "partly-sunny", Tier::Medium, Rule::HourWindow { from: 18, until: 21 }),
    info(BadgeId::BadgeHunter, "Badge hunter", "Earn 5 badges", "search", Tier::Hard, Rule::BadgesAtLeast(5)),
    info(BadgeId::BadgeCollector, "Badge collector", "Earn 10 badges", "albums", Tier::Hard, Rule::BadgesAtLeast(10)),
    info(BadgeId::PowerHour, "Power hour", "Finish focus sessions in every hour from 9 AM to 4 PM in one day", "flash", Tier::Hard, Rule::EveryHourOfDay { first: 9, last: 16 }),
    info(BadgeId::BadgeConnoisseur, "Badge connoisseur", "Earn 15 badges", "diamond", Tier::Hard, Rule::BadgesAtLeast(15)),
    info(BadgeId::Completionist, "Completionist", "Earn every other badge", "trophy", Tier::Hard, Rule::AllOthers),
];

impl BadgeId {
    pub const ALL: [BadgeId; 20] = [
        BadgeId::ProductivityPioneer,
        BadgeId::FocusSprout,
        BadgeId::FocusSeedling,
        BadgeId::FocusSapling,
        BadgeId::FocusHero,
        BadgeId::DawnWarrior,
        BadgeId::HourHero,
        BadgeId::EarlyBird,
        BadgeId::NightOwl,
        BadgeId::MarathonMind,
        BadgeId::WeekendWarrior,
        BadgeId::Afk,
        BadgeId::FocusLegend,
        BadgeId::MiddayMaster,
        BadgeId::TwilightTactician,
        BadgeId::BadgeHunter,
        BadgeId::BadgeCollector,
        BadgeId::PowerHour,
        BadgeId::BadgeConnoisseur,
        BadgeId::Completionist,
    ];

    pub fn info(self) -> &'static BadgeInfo {
        &CATALOG[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn tier(self) -> Tier {
        self.info().tier
    }

    pub fn rule(self) -> Rule {
        self.info().rule
    }

    /// Case-insensitive lookup by display name.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        CATALOG
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name))
            .map(|b| b.id)
    }
}

impl fmt::Display for BadgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown badge: {0}")]
pub struct UnknownBadge(pub String);

impl FromStr for BadgeId {
    type Err = UnknownBadge;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownBadge(s.to_string()))
    }
}

impl Serialize for BadgeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for BadgeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Tiers a UI should display once `earned` badges are held.
pub fn visible_tiers(earned: usize) -> Vec<Tier> {
    Tier::ALL
        .into_iter()
        .filter(|t| earned >= t.unlock_requirement())
        .collect()
}
