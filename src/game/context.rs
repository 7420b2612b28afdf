use super::state::GameStateKind;
use crate::task::{ProgressTracker, TaskDescriptor, TaskSummary};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOutcome {
    Completed,
    TimedOut,
}

/// The single mutable record of a game session. Owned by the state machine;
/// everyone else reads a [`GameSnapshot`].
#[derive(Debug)]
pub struct GameContext {
    pub state: GameStateKind,
    pub current_task: Option<TaskDescriptor>,
    pub tracker: Option<ProgressTracker>,
    pub score: u32,
    /// Status line for the player, rewritten by the active state
    pub status: String,
    /// Latest timeout or error notice
    pub last_message: Option<String>,
    /// Resting ankle height used by jump detection
    pub baseline_ankle_y: Option<f32>,
    pub completed_tasks: u32,
    pub consecutive_timeouts: u32,
    pub last_outcome: Option<TaskOutcome>,
    pub last_points: u32,
    /// Exercise name currently flashing during the roll
    pub rolling_display: Option<String>,
    pub frame: u64,
}

impl Default for GameContext {
    fn default() -> Self {
        Self::new()
    }
}

impl GameContext {
    pub fn new() -> Self {
        Self {
            state: GameStateKind::Waiting,
            current_task: None,
            tracker: None,
            score: 0,
            status: String::new(),
            last_message: None,
            baseline_ankle_y: None,
            completed_tasks: 0,
            consecutive_timeouts: 0,
            last_outcome: None,
            last_points: 0,
            rolling_display: None,
            frame: 0,
        }
    }

    /// Drops the task and everything scoped to it.
    pub fn reset_task(&mut self) {
        self.current_task = None;
        self.tracker = None;
        self.rolling_display = None;
        self.last_outcome = None;
        self.last_points = 0;
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            frame: self.frame,
            state: self.state,
            state_name: self.state.name(),
            status: self.status.clone(),
            task: self.current_task.as_ref().map(TaskDescriptor::summary),
            progress: self.tracker.as_ref().map(ProgressSnapshot::from),
            score: self.score,
            last_message: self.last_message.clone(),
            completed_tasks: self.completed_tasks,
            consecutive_timeouts: self.consecutive_timeouts,
            last_outcome: self.last_outcome,
            rolling_display: self.rolling_display.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub current_set: u32,
    pub total_sets: u32,
    pub current_reps: u32,
    pub reps_per_set: u32,
    pub percent_complete: f32,
    pub complete: bool,
    pub display_text: String,
}

impl From<&ProgressTracker> for ProgressSnapshot {
    fn from(tracker: &ProgressTracker) -> Self {
        Self {
            current_set: tracker.current_set(),
            total_sets: tracker.total_sets(),
            current_reps: tracker.current_reps(),
            reps_per_set: tracker.reps_per_set(),
            percent_complete: tracker.percent_complete(),
            complete: tracker.is_complete(),
            display_text: tracker.display_text(),
        }
    }
}

/// Immutable copy of the context, taken after a frame finished mutating it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub frame: u64,
    pub state: GameStateKind,
    pub state_name: &'static str,
    pub status: String,
    pub task: Option<TaskSummary>,
    pub progress: Option<ProgressSnapshot>,
    pub score: u32,
    pub last_message: Option<String>,
    pub completed_tasks: u32,
    pub consecutive_timeouts: u32,
    pub last_outcome: Option<TaskOutcome>,
    pub rolling_display: Option<String>,
}

impl Default for GameSnapshot {
    fn default() -> Self {
        GameContext::new().snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_progress() {
        let mut ctx = GameContext::new();
        let mut tracker = ProgressTracker::new(5, 2);
        tracker.record_valid_rep(std::time::Duration::ZERO);
        ctx.tracker = Some(tracker);
        ctx.score = 25;

        let snapshot = ctx.snapshot();
        assert_eq!(snapshot.state_name, "WAITING");
        assert_eq!(snapshot.score, 25);
        let progress = snapshot.progress.unwrap();
        assert_eq!(progress.display_text, "Set 1/2 | Reps 1/5");
        assert_eq!(progress.percent_complete, 0.1);
    }

    #[test]
    fn reset_task_keeps_session_totals() {
        let mut ctx = GameContext::new();
        ctx.score = 40;
        ctx.completed_tasks = 2;
        ctx.tracker = Some(ProgressTracker::new(5, 1));
        ctx.last_outcome = Some(TaskOutcome::Completed);
        ctx.reset_task();
        assert!(ctx.tracker.is_none());
        assert!(ctx.last_outcome.is_none());
        assert_eq!(ctx.score, 40);
        assert_eq!(ctx.completed_tasks, 2);
    }
}
