// ── Drill session state machine ──
//
// Pure state: no clock, no channels. `DrillRunner` owns the timer and
// calls `tick` once per second while the session is running.

use std::sync::Arc;

use crate::error::CoreError;
use crate::model::Drill;

/// Score surfaced on completion. Drills are not graded on timing or
/// skipped steps.
pub const COMPLETION_SCORE: u8 = 92;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum DrillPhase {
    /// No drill selected.
    Idle,
    Ready,
    InProgress,
    Completed,
}

/// Result of an `advance` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced { index: usize },
    Completed { score: u8 },
    /// Already at the last position; nothing changed.
    Ignored,
}

/// One run through a drill.
///
/// `index` is in `0..=N` where `N` is the step count; `index == N` means
/// the drill is complete. `remaining` never goes below zero and reaching
/// zero does not complete the drill.
#[derive(Debug, Clone, PartialEq)]
pub struct DrillSession {
    drill: Arc<Drill>,
    index: usize,
    running: bool,
    started: bool,
    remaining: u32,
}

impl DrillSession {
    /// A fresh `Ready` session. A drill without steps is rejected.
    pub fn new(drill: Arc<Drill>) -> Result<Self, CoreError> {
        if drill.steps.is_empty() {
            return Err(CoreError::validation(format!(
                "drill '{}' has no steps",
                drill.title
            )));
        }
        let remaining = drill.duration().seconds();
        Ok(Self {
            drill,
            index: 0,
            running: false,
            started: false,
            remaining,
        })
    }

    pub fn drill(&self) -> &Drill {
        &self.drill
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining
    }

    pub fn step_count(&self) -> usize {
        self.drill.step_count()
    }

    /// The step at the current index, `None` once complete.
    pub fn current_step(&self) -> Option<&str> {
        self.drill.steps.get(self.index).map(String::as_str)
    }

    pub fn is_completed(&self) -> bool {
        self.index >= self.step_count()
    }

    pub fn phase(&self) -> DrillPhase {
        if self.is_completed() {
            DrillPhase::Completed
        } else if self.started {
            DrillPhase::InProgress
        } else {
            DrillPhase::Ready
        }
    }

    /// Percent of steps done.
    pub fn progress(&self) -> u8 {
        let total = self.step_count().max(1);
        u8::try_from(self.index.min(total) * 100 / total).unwrap_or(100)
    }

    /// Returns `true` if the session changed.
    pub fn start(&mut self) -> bool {
        if self.is_completed() || self.running {
            return false;
        }
        self.running = true;
        self.started = true;
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.is_completed() || !self.running {
            return false;
        }
        self.running = false;
        true
    }

    pub fn advance(&mut self) -> StepOutcome {
        let total = self.step_count();
        if self.index >= total {
            return StepOutcome::Ignored;
        }
        self.index += 1;
        self.started = true;
        if self.index == total {
            self.running = false;
            StepOutcome::Completed {
                score: COMPLETION_SCORE,
            }
        } else {
            StepOutcome::Advanced { index: self.index }
        }
    }

    /// Step back one. No-op at the first step and once complete.
    pub fn back(&mut self) -> bool {
        if self.index == 0 || self.is_completed() {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Back to `Ready` with the full nominal time.
    pub fn reset(&mut self) {
        self.index = 0;
        self.running = false;
        self.started = false;
        self.remaining = self.drill.duration().seconds();
    }

    /// One second of clock time. Only counts down while running.
    pub fn tick(&mut self) -> bool {
        if !self.running || self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }

    /// Score to show, `Some` only once complete.
    pub fn score(&self) -> Option<u8> {
        self.is_completed().then_some(COMPLETION_SCORE)
    }
}
