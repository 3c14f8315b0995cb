// ── Drill definitions ──

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::alert::HazardKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// Nominal drill length. Only the two short labels are recognised; every
/// other label gets the long fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrillDuration {
    TenMinutes,
    FifteenMinutes,
    Extended,
}

impl DrillDuration {
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "10 min" => Self::TenMinutes,
            "15 min" => Self::FifteenMinutes,
            _ => Self::Extended,
        }
    }

    pub const fn seconds(self) -> u32 {
        match self {
            Self::TenMinutes => 600,
            Self::FifteenMinutes => 900,
            Self::Extended => 1200,
        }
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_secs(u64::from(self.seconds()))
    }
}

/// A fixed, author-defined sequence of safety steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drill {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub kind: HazardKind,
    pub difficulty: Difficulty,
    /// Display label such as `"10 min"`.
    pub duration_label: String,
    pub steps: Vec<String>,
    pub completed: bool,
    pub score: Option<u8>,
}

impl Drill {
    pub fn duration(&self) -> DrillDuration {
        DrillDuration::from_label(&self.duration_label)
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}
