use serde::Serialize;
use std::time::Duration;

/// Rep and set counter for the active task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressTracker {
    reps_per_set: u32,
    total_sets: u32,
    /// 1-based, never past `total_sets`
    current_set: u32,
    current_reps: u32,
    completed_sets: u32,
    last_rep_at: Option<Duration>,
}

impl ProgressTracker {
    pub fn new(reps_per_set: u32, total_sets: u32) -> Self {
        Self {
            reps_per_set: reps_per_set.max(1),
            total_sets: total_sets.max(1),
            current_set: 1,
            current_reps: 0,
            completed_sets: 0,
            last_rep_at: None,
        }
    }

    pub fn reset(&mut self) {
        self.current_set = 1;
        self.current_reps = 0;
        self.completed_sets = 0;
        self.last_rep_at = None;
    }

    /// Counts one rep. True only on the rep that fills the current set; reps
    /// beyond the target are ignored.
    pub fn record_valid_rep(&mut self, at: Duration) -> bool {
        if self.is_complete() || self.current_reps >= self.reps_per_set {
            return false;
        }
        self.current_reps += 1;
        self.last_rep_at = Some(at);
        self.current_reps == self.reps_per_set
    }

    /// Closes a finished set and opens the next one. True once every set is done.
    pub fn advance_set(&mut self) -> bool {
        if self.is_complete() || self.current_reps < self.reps_per_set {
            return self.is_complete();
        }
        self.completed_sets += 1;
        if self.completed_sets < self.total_sets {
            self.current_set += 1;
            self.current_reps = 0;
        }
        self.is_complete()
    }

    pub fn is_complete(&self) -> bool {
        self.completed_sets >= self.total_sets
    }

    pub fn percent_complete(&self) -> f32 {
        let target = self.reps_per_set * self.total_sets;
        let done = if self.is_complete() {
            target
        } else {
            self.completed_sets * self.reps_per_set + self.current_reps
        };
        (done as f32 / target as f32).clamp(0.0, 1.0)
    }

    pub fn display_text(&self) -> String {
        format!(
            "Set {}/{} | Reps {}/{}",
            self.current_set, self.total_sets, self.current_reps, self.reps_per_set
        )
    }

    pub fn reps_per_set(&self) -> u32 {
        self.reps_per_set
    }

    pub fn total_sets(&self) -> u32 {
        self.total_sets
    }

    pub fn current_set(&self) -> u32 {
        self.current_set
    }

    pub fn current_reps(&self) -> u32 {
        self.current_reps
    }

    pub fn completed_sets(&self) -> u32 {
        self.completed_sets
    }

    pub fn last_rep_at(&self) -> Option<Duration> {
        self.last_rep_at
    }
}
