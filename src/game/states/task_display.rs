use crate::common::PoseSample;
use crate::game::context::GameContext;
use crate::game::state::{GameState, GameStateKind, StateTransition};
use std::time::Duration;
use tracing::warn;

pub struct TaskDisplayState {
    window: Duration,
    entered_at: Duration,
}

impl TaskDisplayState {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entered_at: Duration::ZERO,
        }
    }
}

impl GameState for TaskDisplayState {
    fn kind(&self) -> GameStateKind {
        GameStateKind::TaskDisplay
    }

    fn enter(&mut self, ctx: &mut GameContext, now: Duration) {
        self.entered_at = now;
        let status = match &ctx.current_task {
            Some(task) => format!("{} - get ready!", task.description()),
            None => "No task rolled".to_string(),
        };
        ctx.set_status(status);
    }

    fn update(
        &mut self,
        ctx: &mut GameContext,
        _sample: Option<&PoseSample>,
        now: Duration,
    ) -> StateTransition {
        if ctx.current_task.is_none() {
            warn!("task display entered without a task");
            return StateTransition::To(GameStateKind::Waiting);
        }
        if now.saturating_sub(self.entered_at) >= self.window {
            return StateTransition::To(GameStateKind::TaskExecuting);
        }
        StateTransition::Stay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{TaskDescriptor, TaskPick};
    use crate::validation::{ExerciseKind, ValidatorSettings};
    use chrono::{DateTime, Utc};

    #[test]
    fn shows_the_task_for_the_whole_window() {
        let mut ctx = GameContext::new();
        let pick = TaskPick {
            exercise: ExerciseKind::Squat,
            name: "Squat".to_string(),
            reps_per_set: 10,
            total_sets: 2,
        };
        ctx.current_task = Some(
            TaskDescriptor::new(pick, &ValidatorSettings::default(), DateTime::<Utc>::UNIX_EPOCH)
                .unwrap(),
        );

        let mut state = TaskDisplayState::new(Duration::from_secs(3));
        state.enter(&mut ctx, Duration::from_secs(10));
        assert_eq!(ctx.status, "Squat: 2 x 10 reps - get ready!");
        assert_eq!(
            state.update(&mut ctx, None, Duration::from_millis(12_999)),
            StateTransition::Stay
        );
        assert_eq!(
            state.update(&mut ctx, None, Duration::from_secs(13)),
            StateTransition::To(GameStateKind::TaskExecuting)
        );
    }

    #[test]
    fn without_a_task_falls_back_to_waiting() {
        let mut ctx = GameContext::new();
        let mut state = TaskDisplayState::new(Duration::from_secs(3));
        state.enter(&mut ctx, Duration::ZERO);
        assert_eq!(
            state.update(&mut ctx, None, Duration::ZERO),
            StateTransition::To(GameStateKind::Waiting)
        );
    }
}
