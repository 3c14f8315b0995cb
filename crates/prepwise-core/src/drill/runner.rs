// ── Drill runner ──
//
// Owns the optional `DrillSession` behind a `watch` channel and the
// one-second countdown task. At most one clock task exists per runner: it
// is spawned when the session starts running and cancelled when it stops
// running, is closed, or is replaced.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::session::{DrillPhase, DrillSession, StepOutcome};
use crate::error::CoreError;
use crate::model::Drill;

const TICK: Duration = Duration::from_secs(1);

type SessionCell = watch::Sender<Option<DrillSession>>;

struct Clock {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Clock {
    fn is_live(&self) -> bool {
        !self.cancel.is_cancelled() && !self.handle.is_finished()
    }
}

/// Runs one drill at a time.
///
/// Every operation runs to completion synchronously; only the countdown
/// is driven by a background task. Requires a tokio runtime once a
/// session is started.
pub struct DrillRunner {
    session: Arc<SessionCell>,
    clock: Mutex<Option<Clock>>,
}

impl Default for DrillRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl DrillRunner {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            session: Arc::new(tx),
            clock: Mutex::new(None),
        }
    }

    /// Snapshot of the current session.
    pub fn session(&self) -> Option<DrillSession> {
        self.session.borrow().clone()
    }

    pub fn phase(&self) -> DrillPhase {
        self.session
            .borrow()
            .as_ref()
            .map_or(DrillPhase::Idle, DrillSession::phase)
    }

    /// Receive every session change, including clock ticks.
    pub fn subscribe(&self) -> watch::Receiver<Option<DrillSession>> {
        self.session.subscribe()
    }

    /// Replace any session with a fresh one for `drill`. A drill without
    /// steps is rejected and the current session is left alone.
    pub fn select(&self, drill: Drill) -> Result<(), CoreError> {
        let session = DrillSession::new(Arc::new(drill))?;
        info!(drill = %session.drill().title, "drill selected");
        self.stop_clock();
        self.session.send_replace(Some(session));
        Ok(())
    }

    pub fn start(&self) -> bool {
        self.mutate(DrillSession::start)
    }

    pub fn pause(&self) -> bool {
        self.mutate(DrillSession::pause)
    }

    /// Move to the next step. `Ignored` when idle or already complete.
    pub fn advance(&self) -> StepOutcome {
        let mut outcome = StepOutcome::Ignored;
        self.mutate(|s| {
            outcome = s.advance();
            outcome != StepOutcome::Ignored
        });
        if let StepOutcome::Completed { score } = outcome {
            info!(score, "drill completed");
        }
        outcome
    }

    pub fn back(&self) -> bool {
        self.mutate(DrillSession::back)
    }

    pub fn reset(&self) -> bool {
        self.mutate(|s| {
            s.reset();
            true
        })
    }

    /// Apply one clock tick by hand. The background clock calls the same
    /// transition.
    pub fn tick(&self) -> bool {
        self.mutate(DrillSession::tick)
    }

    /// Discard the session and return to `Idle`.
    pub fn close(&self) {
        self.stop_clock();
        self.session.send_replace(None);
        debug!("drill session closed");
    }

    /// Whether a countdown task is currently live.
    pub fn has_clock(&self) -> bool {
        self.clock
            .lock()
            .expect("drill clock lock poisoned")
            .as_ref()
            .is_some_and(Clock::is_live)
    }

    // ── Internals ───────────────────────────────────────────────────

    fn mutate(&self, f: impl FnOnce(&mut DrillSession) -> bool) -> bool {
        let changed = self
            .session
            .send_if_modified(|slot| slot.as_mut().is_some_and(f));
        self.sync_clock();
        changed
    }

    /// Bring the clock task in line with the session's running flag.
    fn sync_clock(&self) {
        let running = self
            .session
            .borrow()
            .as_ref()
            .is_some_and(DrillSession::is_running);

        let mut slot = self.clock.lock().expect("drill clock lock poisoned");
        let live = slot.as_ref().is_some_and(Clock::is_live);

        if running && !live {
            let cancel = CancellationToken::new();
            let handle = tokio::spawn(run_clock(Arc::clone(&self.session), cancel.clone()));
            *slot = Some(Clock { cancel, handle });
            debug!("drill clock started");
        } else if !running {
            if let Some(clock) = slot.take() {
                clock.cancel.cancel();
                debug!("drill clock stopped");
            }
        }
    }

    fn stop_clock(&self) {
        if let Some(clock) = self.clock.lock().expect("drill clock lock poisoned").take() {
            clock.cancel.cancel();
        }
    }
}

impl Drop for DrillRunner {
    fn drop(&mut self) {
        self.stop_clock();
    }
}

async fn run_clock(session: Arc<SessionCell>, cancel: CancellationToken) {
    let mut interval = tokio::time::interval_at(Instant::now() + TICK, TICK);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let mut running = false;
                session.send_if_modified(|slot| match slot.as_mut() {
                    Some(s) => {
                        running = s.is_running();
                        s.tick()
                    }
                    None => false,
                });
                if !running {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::drill::catalog;

    fn runner_with(id: usize) -> DrillRunner {
        let runner = DrillRunner::new();
        runner.select(catalog::stock_drills().remove(id)).unwrap();
        runner
    }

    fn remaining(runner: &DrillRunner) -> u32 {
        runner.session().map_or(0, |s| s.remaining_secs())
    }

    #[tokio::test(start_paused = true)]
    async fn clock_counts_down_while_running() {
        let runner = runner_with(0);
        assert!(runner.start());
        assert!(runner.has_clock());

        tokio::time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(remaining(&runner), 597);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_then_start_does_not_skip_or_double_count() {
        let runner = runner_with(0);
        runner.start();
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(remaining(&runner), 598);

        runner.pause();
        assert!(!runner.has_clock());
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(remaining(&runner), 598);

        runner.start();
        runner.start();
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(remaining(&runner), 597);
    }

    #[tokio::test(start_paused = true)]
    async fn completion_stops_clock() {
        let runner = runner_with(0);
        runner.start();
        for _ in 0..5 {
            runner.advance();
        }
        assert_eq!(runner.phase(), DrillPhase::Completed);
        assert!(!runner.has_clock());
        let before = remaining(&runner);
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(remaining(&runner), before);
    }

    #[tokio::test(start_paused = true)]
    async fn selecting_another_drill_cancels_clock() {
        let runner = runner_with(0);
        runner.start();
        tokio::time::sleep(Duration::from_millis(1_500)).await;

        runner.select(catalog::stock_drills().remove(1)).unwrap();
        assert!(!runner.has_clock());
        assert_eq!(remaining(&runner), 900);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(remaining(&runner), 900);
        assert_eq!(runner.phase(), DrillPhase::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_drill_keeps_current_session() {
        let runner = runner_with(0);
        runner.start();
        runner.advance();

        let empty = Drill {
            steps: Vec::new(),
            ..catalog::stock_drills().remove(1)
        };
        assert!(runner.select(empty).is_err());
        assert_eq!(runner.phase(), DrillPhase::InProgress);
        assert_eq!(runner.session().unwrap().index(), 1);
        assert!(runner.has_clock());

        let fresh = DrillRunner::new();
        let empty = Drill {
            steps: Vec::new(),
            ..catalog::stock_drills().remove(0)
        };
        assert!(fresh.select(empty).is_err());
        assert_eq!(fresh.phase(), DrillPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn close_returns_to_idle() {
        let runner = runner_with(2);
        runner.start();
        runner.close();
        assert_eq!(runner.phase(), DrillPhase::Idle);
        assert!(!runner.has_clock());
        assert!(!runner.start());
        assert_eq!(runner.advance(), StepOutcome::Ignored);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_ticks() {
        let runner = runner_with(0);
        let mut rx = runner.subscribe();
        rx.borrow_and_update();
        runner.start();
        rx.changed().await.ok();
        tokio::time::sleep(Duration::from_millis(1_100)).await;
        assert!(rx.has_changed().unwrap_or(false));
        assert_eq!(
            rx.borrow_and_update().as_ref().map(DrillSession::remaining_secs),
            Some(599)
        );
    }
}
