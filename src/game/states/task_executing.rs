use crate::common::PoseSample;
use crate::game::context::{GameContext, TaskOutcome};
use crate::game::state::{GameState, GameStateKind, StateTransition};
use crate::task::ProgressTracker;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Feeds every sample to the task's validator and counts the valid reps.
///
/// Any phase change of the validator counts as activity, so a player who is
/// moving but not yet scoring is not timed out. A valid rep is always counted
/// before the inactivity window is checked in the same frame.
pub struct TaskExecutingState {
    inactivity: Duration,
    last_activity: Duration,
}

impl TaskExecutingState {
    pub fn new(inactivity: Duration) -> Self {
        Self {
            inactivity,
            last_activity: Duration::ZERO,
        }
    }
}

impl GameState for TaskExecutingState {
    fn kind(&self) -> GameStateKind {
        GameStateKind::TaskExecuting
    }

    fn enter(&mut self, ctx: &mut GameContext, now: Duration) {
        self.last_activity = now;
        let Some(task) = ctx.current_task.as_mut() else {
            warn!("task execution entered without a task");
            return;
        };
        task.validator_mut().reset();
        let tracker = ProgressTracker::new(task.reps_per_set(), task.total_sets());
        let status = format!("{} | {}", task.name(), tracker.display_text());
        ctx.tracker = Some(tracker);
        ctx.set_status(status);
    }

    fn update(
        &mut self,
        ctx: &mut GameContext,
        sample: Option<&PoseSample>,
        now: Duration,
    ) -> StateTransition {
        let (Some(task), Some(tracker)) = (ctx.current_task.as_mut(), ctx.tracker.as_mut()) else {
            return StateTransition::To(GameStateKind::Waiting);
        };

        if let Some(sample) = sample {
            let validator = task.validator_mut();
            let phase_before = validator.phase();
            let result = validator.validate(sample);
            let phase_after = validator.phase();
            if phase_after != phase_before {
                debug!(from = phase_before, to = phase_after, "validator phase changed");
                self.last_activity = now;
            }

            let mut finished_set = None;
            if result.valid {
                self.last_activity = now;
                if tracker.record_valid_rep(now) {
                    finished_set = Some(tracker.current_set());
                    if tracker.advance_set() {
                        info!(task = %task.description(), "all sets complete");
                        ctx.last_outcome = Some(TaskOutcome::Completed);
                        return StateTransition::To(GameStateKind::Completion);
                    }
                }
            }
            let status = match finished_set {
                Some(set) => format!("Set {set} done! {}", tracker.display_text()),
                None => format!("{} | {}", result.feedback, tracker.display_text()),
            };
            ctx.set_status(status);
        }

        if now.saturating_sub(self.last_activity) >= self.inactivity {
            info!(
                idle_ms = now.saturating_sub(self.last_activity).as_millis() as u64,
                "task timed out"
            );
            ctx.last_outcome = Some(TaskOutcome::TimedOut);
            return StateTransition::To(GameStateKind::Completion);
        }
        StateTransition::Stay
    }
}
