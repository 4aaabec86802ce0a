use serde::{Deserialize, Serialize};

/// How an objective label is treated by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectiveKind {
    /// Completed sessions earn coins, count toward level and badges.
    Focus,
    /// Never counted; eligible for break-length badges.
    Break,
    /// Logged, never counted.
    Other,
}

/// Maps objective labels to [`ObjectiveKind`].
///
/// Matching ignores ASCII case and surrounding whitespace. A label listed as
/// both counted and break is counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectivePolicy {
    counted: Vec<String>,
    breaks: Vec<String>,
}

impl ObjectivePolicy {
    pub fn new(
        counted: impl IntoIterator<Item = String>,
        breaks: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            counted: counted.into_iter().map(|s| normalize(&s)).collect(),
            breaks: breaks.into_iter().map(|s| normalize(&s)).collect(),
        }
    }

    pub fn kind(&self, objective: &str) -> ObjectiveKind {
        let objective = normalize(objective);
        if self.counted.contains(&objective) {
            ObjectiveKind::Focus
        } else if self.breaks.contains(&objective) {
            ObjectiveKind::Break
        } else {
            ObjectiveKind::Other
        }
    }

    pub fn counts(&self, objective: &str) -> bool {
        self.kind(objective) == ObjectiveKind::Focus
    }
}

impl Default for ObjectivePolicy {
    fn default() -> Self {
        Self::new(
            ["Focus".to_string()],
            [
                "Break".to_string(),
                "Short break".to_string(),
                "Long break".to_string(),
            ],
        )
    }
}

fn normalize(label: &str) -> String {
    label.trim().to_ascii_lowercase()
}
