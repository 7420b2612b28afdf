use crate::common::PoseSample;
use crate::game::context::{GameContext, TaskOutcome};
use crate::game::state::{GameState, GameStateKind, StateTransition};
use std::time::Duration;
use tracing::info;

/// Scores the finished task and celebrates for a fixed window.
/// A timed out task scores nothing.
pub struct CompletionState {
    window: Duration,
    base_points: u32,
    entered_at: Duration,
}

impl CompletionState {
    pub fn new(window: Duration, base_points: u32) -> Self {
        Self {
            window,
            base_points,
            entered_at: Duration::ZERO,
        }
    }

    fn points_for(&self, ctx: &GameContext) -> u32 {
        match (ctx.last_outcome, &ctx.current_task) {
            (Some(TaskOutcome::Completed), Some(task)) => {
                self.base_points.saturating_add(task.reps_per_set())
            }
            _ => 0,
        }
    }
}

impl GameState for CompletionState {
    fn kind(&self) -> GameStateKind {
        GameStateKind::Completion
    }

    fn enter(&mut self, ctx: &mut GameContext, now: Duration) {
        self.entered_at = now;
        let points = self.points_for(ctx);
        ctx.last_points = points;
        ctx.score = ctx.score.saturating_add(points);

        let status = match ctx.last_outcome {
            Some(TaskOutcome::Completed) => {
                ctx.completed_tasks += 1;
                ctx.consecutive_timeouts = 0;
                format!("Task complete! +{points} points (total {})", ctx.score)
            }
            _ => {
                ctx.last_outcome = Some(TaskOutcome::TimedOut);
                ctx.consecutive_timeouts += 1;
                format!("Time's up! Total score {}", ctx.score)
            }
        };
        info!(
            points,
            score = ctx.score,
            outcome = ?ctx.last_outcome,
            "task finished"
        );
        ctx.set_status(status);
    }

    fn update(
        &mut self,
        _ctx: &mut GameContext,
        _sample: Option<&PoseSample>,
        now: Duration,
    ) -> StateTransition {
        if now.saturating_sub(self.entered_at) >= self.window {
            return StateTransition::To(GameStateKind::Waiting);
        }
        StateTransition::Stay
    }
}
