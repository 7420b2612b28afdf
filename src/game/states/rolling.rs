use crate::common::{Clock, PoseSample};
use crate::game::context::GameContext;
use crate::game::state::{GameState, GameStateKind, StateTransition};
use crate::task::{TaskCatalog, TaskDescriptor};
use crate::validation::ValidatorSettings;
use rand::rngs::StdRng;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Each name in the shuffle stays up 10% longer than the one before.
const SHUFFLE_SLOWDOWN: f32 = 1.1;

pub const ROLL_FAILED_MESSAGE: &str = "The dice slipped, no task could be picked";

/// The task is decided the moment the roll starts. The shuffle only cycles
/// names on screen until the window closes.
pub struct RollingState {
    window: Duration,
    shuffle_interval: Duration,
    catalog: Arc<TaskCatalog>,
    rng: StdRng,
    settings: ValidatorSettings,
    clock: Arc<dyn Clock>,
    entered_at: Duration,
    pending: Option<TaskDescriptor>,
    shuffle_index: usize,
    current_interval: Duration,
    next_switch_at: Duration,
}

impl RollingState {
    pub fn new(
        window: Duration,
        shuffle_interval: Duration,
        catalog: Arc<TaskCatalog>,
        rng: StdRng,
        settings: ValidatorSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            window,
            shuffle_interval,
            catalog,
            rng,
            settings,
            clock,
            entered_at: Duration::ZERO,
            pending: None,
            shuffle_index: 0,
            current_interval: shuffle_interval,
            next_switch_at: Duration::ZERO,
        }
    }

    fn roll(&mut self) -> Option<TaskDescriptor> {
        let pick = self.catalog.pick(&mut self.rng)?;
        // Drawn from the pick generator so a seeded game replays its ids too
        let id = uuid::Builder::from_random_bytes(self.rng.random()).into_uuid();
        match TaskDescriptor::new(pick, &self.settings, self.clock.wall_time()) {
            Ok(task) => Some(task.with_id(id)),
            Err(e) => {
                error!("Failed to create task: {}", e);
                None
            }
        }
    }
}

impl GameState for RollingState {
    fn kind(&self) -> GameStateKind {
        GameStateKind::Rolling
    }

    fn enter(&mut self, ctx: &mut GameContext, now: Duration) {
        self.entered_at = now;
        self.pending = self.roll();
        self.shuffle_index = 0;
        self.current_interval = self.shuffle_interval;
        self.next_switch_at = now + self.shuffle_interval;

        match &self.pending {
            Some(task) => info!(task = %task.description(), id = %task.id(), "dice rolled"),
            None => error!("dice roll produced no task"),
        }
        ctx.rolling_display = Some(self.catalog.name_at(0).to_string());
        ctx.set_status("Rolling...");
    }

    fn update(
        &mut self,
        ctx: &mut GameContext,
        _sample: Option<&PoseSample>,
        now: Duration,
    ) -> StateTransition {
        if self.pending.is_none() {
            ctx.last_message = Some(ROLL_FAILED_MESSAGE.to_string());
            return StateTransition::To(GameStateKind::Waiting);
        }

        if now.saturating_sub(self.entered_at) >= self.window {
            ctx.current_task = self.pending.take();
            return StateTransition::To(GameStateKind::TaskDisplay);
        }

        let mut switched = false;
        while now >= self.next_switch_at && !self.current_interval.is_zero() {
            self.shuffle_index += 1;
            self.current_interval = self.current_interval.mul_f32(SHUFFLE_SLOWDOWN);
            self.next_switch_at += self.current_interval;
            switched = true;
        }
        if switched {
            ctx.rolling_display = Some(self.catalog.name_at(self.shuffle_index).to_string());
        }
        StateTransition::Stay
    }

    fn exit(&mut self, ctx: &mut GameContext, _now: Duration) {
        ctx.rolling_display = None;
        self.pending = None;
    }
}
