use super::context::{GameContext, GameSnapshot};
use super::state::{GameState, GameStateKind, StateTransition};
use super::states::{
    CompletionState, DiceRollState, RollingState, TaskDisplayState, TaskExecutingState,
    WaitingState,
};
use super::telemetry::{FrameTiming, GameObserver, ObserverSet, TransitionEvent};
use crate::common::{Clock, PoseSample, SystemClock, VisibilityPolicy};
use crate::config::{
    validate_visibility, Configuration, FrameLoopConfig, GestureConfig, ScoringConfig,
    TimingConfig,
};
use crate::error::{AppError, CatalogError};
use crate::task::TaskCatalog;
use crate::validation::{ExerciseKind, ValidatorSettings};
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Runs one state per frame against the single [`GameContext`].
///
/// Every call to [`update`](Self::update) finishes its state change before it
/// returns, so the next frame always sees the context the previous one left.
pub struct GameStateMachine {
    context: GameContext,
    states: IndexMap<GameStateKind, Box<dyn GameState>>,
    clock: Arc<dyn Clock>,
    observers: ObserverSet,
    visibility: VisibilityPolicy,
    frame_budget: Duration,
    hook_budget: Duration,
    shut_down: bool,
}

impl GameStateMachine {
    pub fn builder() -> GameStateMachineBuilder {
        GameStateMachineBuilder::new()
    }

    pub fn state(&self) -> GameStateKind {
        self.context.state
    }

    pub fn context(&self) -> &GameContext {
        &self.context
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.context.snapshot()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Runs one frame. Samples are judged with the machine's visibility
    /// policy, and unusable ones are handed to the state as `None`.
    /// Returns the transition taken this frame, if any.
    pub fn update(&mut self, sample: Option<&PoseSample>) -> Option<TransitionEvent> {
        if self.shut_down {
            return None;
        }
        self.context.frame += 1;
        let frame = self.context.frame;
        let current = self.context.state;
        let restamped;
        let sample = match sample {
            Some(sample) if sample.policy() != self.visibility => {
                restamped = sample.clone().with_policy(self.visibility);
                Some(&restamped)
            }
            other => other,
        };
        let sample = sample.filter(|sample| sample.is_usable());
        let now = self.clock.now();

        let Some(state) = self.states.get_mut(&current) else {
            error!("No state registered for {}", current);
            return None;
        };
        let started = Instant::now();
        let transition = state.update(&mut self.context, sample, now);
        let update = started.elapsed();

        let mut event = None;
        let mut hooks = None;
        if let StateTransition::To(next) = transition {
            if next != current {
                let started = Instant::now();
                self.switch(current, next, now);
                hooks = Some(started.elapsed());
                event = Some(TransitionEvent {
                    frame,
                    from: current,
                    to: next,
                    at: now,
                    message: self.context.status.clone(),
                });
            }
        }

        let timing = FrameTiming {
            frame,
            state: current,
            update,
            hooks,
            update_over_budget: update > self.frame_budget,
            hooks_over_budget: hooks.is_some_and(|hooks| hooks > self.hook_budget),
        };
        if timing.update_over_budget {
            warn!(
                "Frame {} update in {} took {}us (budget {}us)",
                frame,
                current,
                update.as_micros(),
                self.frame_budget.as_micros()
            );
        }
        if timing.hooks_over_budget {
            warn!(
                "Frame {} transition {} -> {} hooks took {}us (budget {}us)",
                frame,
                current,
                self.context.state,
                hooks.unwrap_or_default().as_micros(),
                self.hook_budget.as_micros()
            );
        }

        if let Some(event) = &event {
            info!(
                "Transition {} -> {} at frame {}: {}",
                event.from, event.to, event.frame, event.message
            );
            self.observers.notify_transition(event);
        }
        self.observers.notify_frame(&timing);
        event
    }

    fn switch(&mut self, from: GameStateKind, to: GameStateKind, now: Duration) {
        if let Some(state) = self.states.get_mut(&from) {
            state.exit(&mut self.context, now);
        }
        self.context.state = to;
        match self.states.get_mut(&to) {
            Some(state) => state.enter(&mut self.context, now),
            None => error!("No state registered for {}", to),
        }
    }

    /// Stops between frames. The active state's `exit` runs exactly once no
    /// matter how often this is called.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        let now = self.clock.now();
        let current = self.context.state;
        if let Some(state) = self.states.get_mut(&current) {
            state.exit(&mut self.context, now);
        }
        info!(
            "Game stopped in {} after {} frames, score {}",
            current, self.context.frame, self.context.score
        );
    }
}

impl Drop for GameStateMachine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

pub struct GameStateMachineBuilder {
    catalog: Option<Arc<TaskCatalog>>,
    timings: TimingConfig,
    gestures: GestureConfig,
    visibility: VisibilityPolicy,
    validator: ValidatorSettings,
    scoring: ScoringConfig,
    frame_loop: FrameLoopConfig,
    seed: Option<u64>,
    clock: Option<Arc<dyn Clock>>,
    observers: ObserverSet,
    overrides: Vec<Box<dyn GameState>>,
}

impl Default for GameStateMachineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStateMachineBuilder {
    pub fn new() -> Self {
        Self {
            catalog: None,
            timings: TimingConfig::default(),
            gestures: GestureConfig::default(),
            visibility: VisibilityPolicy::default(),
            validator: ValidatorSettings::default(),
            scoring: ScoringConfig::default(),
            frame_loop: FrameLoopConfig::default(),
            seed: None,
            clock: None,
            observers: ObserverSet::new(),
            overrides: Vec::new(),
        }
    }

    /// Takes every game setting from `configuration`. The catalog is loaded
    /// separately.
    pub fn from_config(configuration: &Configuration) -> Self {
        Self::new()
            .timings(configuration.timings.clone())
            .gestures(configuration.gestures.clone())
            .visibility(configuration.pose)
            .validator_settings(configuration.validator.clone())
            .scoring(configuration.scoring.clone())
            .frame_loop(configuration.frame_loop.clone())
            .seed(configuration.seed)
    }

    pub fn catalog(mut self, catalog: Arc<TaskCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn timings(mut self, timings: TimingConfig) -> Self {
        self.timings = timings;
        self
    }

    pub fn gestures(mut self, gestures: GestureConfig) -> Self {
        self.gestures = gestures;
        self
    }

    /// Visibility rules every incoming sample is judged by
    pub fn visibility(mut self, policy: VisibilityPolicy) -> Self {
        self.visibility = policy;
        self
    }

    pub fn validator_settings(mut self, settings: ValidatorSettings) -> Self {
        self.validator = settings;
        self
    }

    pub fn scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn frame_loop(mut self, frame_loop: FrameLoopConfig) -> Self {
        self.frame_loop = frame_loop;
        self
    }

    // Fixes the task pick, otherwise the OS seeds it.
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn observer(mut self, observer: Box<dyn GameObserver>) -> Self {
        self.observers = self.observers.add_observer(observer);
        self
    }

    /// Replaces the built-in state of the same kind.
    pub fn with_state(mut self, state: Box<dyn GameState>) -> Self {
        self.overrides.push(state);
        self
    }

    pub fn build(self) -> Result<GameStateMachine, AppError> {
        self.timings.validate()?;
        validate_visibility(&self.visibility)?;
        self.validator.validate()?;
        ExerciseKind::verify_all(&self.validator)?;

        let catalog = self
            .catalog
            .unwrap_or_else(|| Arc::new(TaskCatalog::builtin()));
        for definition in catalog.definitions() {
            let kind = definition
                .kind()
                .ok_or_else(|| CatalogError::UnknownExercise(definition.id.clone()))?;
            kind.create_validator(&self.validator)?;
        }

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock::new()));
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let timings = &self.timings;
        let defaults: [Box<dyn GameState>; 6] = [
            Box::new(WaitingState::new(
                self.gestures.jump_offset_px,
                self.gestures.baseline_smoothing,
            )),
            Box::new(DiceRollState::new(timings.countdown(), timings.hands_up_hold())),
            Box::new(RollingState::new(
                timings.rolling(),
                timings.shuffle_interval(),
                Arc::clone(&catalog),
                rng,
                self.validator.clone(),
                Arc::clone(&clock),
            )),
            Box::new(TaskDisplayState::new(timings.task_display())),
            Box::new(TaskExecutingState::new(timings.inactivity())),
            Box::new(CompletionState::new(
                timings.celebration(),
                self.scoring.base_points,
            )),
        ];
        let mut states: IndexMap<GameStateKind, Box<dyn GameState>> = defaults
            .into_iter()
            .map(|state| (state.kind(), state))
            .collect();
        for state in self.overrides {
            debug!("Overriding state {}", state.kind());
            states.insert(state.kind(), state);
        }

        let mut machine = GameStateMachine {
            context: GameContext::new(),
            states,
            clock,
            observers: self.observers,
            visibility: self.visibility,
            frame_budget: self.frame_loop.frame_budget(),
            hook_budget: self.frame_loop.hook_budget(),
            shut_down: false,
        };
        let now = machine.clock.now();
        if let Some(waiting) = machine.states.get_mut(&GameStateKind::Waiting) {
            waiting.enter(&mut machine.context, now);
        }
        info!(
            "Game ready with {} exercises, {} observers",
            catalog.len(),
            machine.observers.len()
        );
        Ok(machine)
    }
}
