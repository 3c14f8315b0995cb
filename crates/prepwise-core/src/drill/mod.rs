// ── Drill simulations ──
//
// `DrillSession` is the pure step/countdown state machine; `DrillRunner`
// wraps it with a watch channel and the one-second clock task.

pub mod catalog;
mod runner;
mod session;

pub use catalog::{find_drill, stock_drills};
pub use runner::DrillRunner;
pub use session::{COMPLETION_SCORE, DrillPhase, DrillSession, StepOutcome};
