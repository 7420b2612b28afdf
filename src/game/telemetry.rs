use super::state::GameStateKind;
use indexmap::IndexMap;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

const ALPHA: f32 = 0.1; // EWMA smoothing factor
const RECENT_TRANSITIONS: usize = 10;
const SLOW_FRAME_WARNINGS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionEvent {
    pub frame: u64,
    pub from: GameStateKind,
    pub to: GameStateKind,
    /// Machine clock time of the transition
    pub at: Duration,
    /// Status line left by the new state's `enter`
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTiming {
    pub frame: u64,
    pub state: GameStateKind,
    pub update: Duration,
    /// Time spent in exit + enter when the frame transitioned
    pub hooks: Option<Duration>,
    pub update_over_budget: bool,
    pub hooks_over_budget: bool,
}

/// Observers run on the frame loop and must return quickly. They have no
/// way to fail the frame.
pub trait GameObserver: Send {
    fn on_transition(&mut self, event: &TransitionEvent);
    fn on_frame(&mut self, timing: &FrameTiming);
}

#[derive(Default)]
pub struct ObserverSet {
    observers: Vec<Box<dyn GameObserver>>,
}

impl ObserverSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_observer(mut self, observer: Box<dyn GameObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn push(&mut self, observer: Box<dyn GameObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn notify_transition(&mut self, event: &TransitionEvent) {
        for observer in &mut self.observers {
            observer.on_transition(event);
        }
    }

    pub fn notify_frame(&mut self, timing: &FrameTiming) {
        for observer in &mut self.observers {
            observer.on_frame(timing);
        }
    }
}

fn lock<T>(shared: &Mutex<T>) -> MutexGuard<'_, T> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Update timing stats. Clones share the same numbers, so keep one clone
/// and hand the other to the machine.
#[derive(Clone, Default)]
pub struct PerformanceMonitor {
    stats: Arc<Mutex<PerformanceStats>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceStats {
    pub total_frames: u64,
    pub total_transitions: u64,
    pub average_update_us: f32,
    pub max_update_us: u64,
    pub max_hooks_us: u64,
    pub update_overruns: u64,
    pub hook_overruns: u64,
    pub per_state: IndexMap<GameStateKind, StateStats>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateStats {
    pub frames: u64,
    pub average_update_us: f32,
    pub max_update_us: u64,
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_stats(&self) -> PerformanceStats {
        lock(&self.stats).clone()
    }

    pub fn get_stats_shared(&self) -> Arc<Mutex<PerformanceStats>> {
        Arc::clone(&self.stats)
    }

    fn update_ewma(current: f32, new_value: u64, alpha: f32) -> f32 {
        current * (1.0 - alpha) + new_value as f32 * alpha
    }
}

impl GameObserver for PerformanceMonitor {
    fn on_transition(&mut self, _event: &TransitionEvent) {
        lock(&self.stats).total_transitions += 1;
    }

    fn on_frame(&mut self, timing: &FrameTiming) {
        let mut stats = lock(&self.stats);
        let update_us = timing.update.as_micros() as u64;

        stats.total_frames += 1;
        stats.average_update_us = if stats.total_frames == 1 {
            update_us as f32
        } else {
            Self::update_ewma(stats.average_update_us, update_us, ALPHA)
        };
        stats.max_update_us = stats.max_update_us.max(update_us);
        if timing.update_over_budget {
            stats.update_overruns += 1;
        }
        if let Some(hooks) = timing.hooks {
            stats.max_hooks_us = stats.max_hooks_us.max(hooks.as_micros() as u64);
        }
        if timing.hooks_over_budget {
            stats.hook_overruns += 1;
        }

        let state = stats.per_state.entry(timing.state).or_default();
        state.frames += 1;
        state.average_update_us = if state.frames == 1 {
            update_us as f32
        } else {
            Self::update_ewma(state.average_update_us, update_us, ALPHA)
        };
        state.max_update_us = state.max_update_us.max(update_us);
    }
}

/// Bounded history of transitions and slow frames, for debugging a session
#[derive(Clone, Default)]
pub struct TransitionLog {
    history: Arc<Mutex<TransitionHistory>>,
}

#[derive(Debug, Clone, Default)]
pub struct TransitionHistory {
    pub recent_transitions: VecDeque<TransitionEvent>,
    pub slow_frame_warnings: VecDeque<String>,
}

impl TransitionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_history(&self) -> TransitionHistory {
        lock(&self.history).clone()
    }

    pub fn get_history_shared(&self) -> Arc<Mutex<TransitionHistory>> {
        Arc::clone(&self.history)
    }
}

impl GameObserver for TransitionLog {
    fn on_transition(&mut self, event: &TransitionEvent) {
        let mut history = lock(&self.history);
        history.recent_transitions.push_back(event.clone());
        if history.recent_transitions.len() > RECENT_TRANSITIONS {
            history.recent_transitions.pop_front();
        }
    }

    fn on_frame(&mut self, timing: &FrameTiming) {
        if !timing.update_over_budget && !timing.hooks_over_budget {
            return;
        }
        let mut history = lock(&self.history);
        let warning = match timing.hooks {
            Some(hooks) if timing.hooks_over_budget => format!(
                "Slow transition hooks in {}: {}us (frame {})",
                timing.state,
                hooks.as_micros(),
                timing.frame
            ),
            _ => format!(
                "Slow update in {}: {}us (frame {})",
                timing.state,
                timing.update.as_micros(),
                timing.frame
            ),
        };
        history.slow_frame_warnings.push_back(warning);
        if history.slow_frame_warnings.len() > SLOW_FRAME_WARNINGS {
            history.slow_frame_warnings.pop_front();
        }
    }
}
