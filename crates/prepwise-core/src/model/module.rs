// ── Learning modules ──

use serde::{Deserialize, Serialize};
use strum::EnumString;

use super::alert::HazardKind;

const BASE_POINTS: u32 = 50;
const POINTS_PER_LESSON: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LessonKind {
    Video,
    Reading,
    Quiz,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: u32,
    pub title: String,
    pub kind: LessonKind,
    pub duration_label: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum Badge {
    Champion,
    Advanced,
    Learner,
}

/// Catalogue tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, strum::Display)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ModuleTab {
    #[default]
    All,
    InProgress,
    Completed,
    Locked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningModule {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub kind: HazardKind,
    pub duration_label: String,
    /// Percent complete, 0..=100.
    pub progress: u8,
    pub completed: bool,
    pub locked: bool,
    pub lessons: Vec<Lesson>,
}

impl LearningModule {
    pub fn completed_lessons(&self) -> usize {
        self.lessons.iter().filter(|l| l.completed).count()
    }

    /// `50 + progress + 10 per completed lesson`.
    pub fn points(&self) -> u32 {
        let lessons = u32::try_from(self.completed_lessons()).unwrap_or(u32::MAX);
        BASE_POINTS + u32::from(self.progress) + lessons.saturating_mul(POINTS_PER_LESSON)
    }

    pub fn badge(&self) -> Option<Badge> {
        if self.completed {
            Some(Badge::Champion)
        } else if self.progress >= 75 {
            Some(Badge::Advanced)
        } else if self.progress >= 30 {
            Some(Badge::Learner)
        } else {
            None
        }
    }

    pub fn in_tab(&self, tab: ModuleTab) -> bool {
        match tab {
            ModuleTab::All => true,
            ModuleTab::InProgress => self.progress > 0 && self.progress < 100,
            ModuleTab::Completed => self.completed,
            ModuleTab::Locked => self.locked,
        }
    }
}
