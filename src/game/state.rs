use super::context::GameContext;
use crate::common::PoseSample;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStateKind {
    Waiting,
    DiceRollDetecting,
    Rolling,
    TaskDisplay,
    TaskExecuting,
    Completion,
}

impl GameStateKind {
    pub const ALL: [GameStateKind; 6] = [
        GameStateKind::Waiting,
        GameStateKind::DiceRollDetecting,
        GameStateKind::Rolling,
        GameStateKind::TaskDisplay,
        GameStateKind::TaskExecuting,
        GameStateKind::Completion,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GameStateKind::Waiting => "WAITING",
            GameStateKind::DiceRollDetecting => "DICE_ROLL_DETECTING",
            GameStateKind::Rolling => "ROLLING",
            GameStateKind::TaskDisplay => "TASK_DISPLAY",
            GameStateKind::TaskExecuting => "TASK_EXECUTING",
            GameStateKind::Completion => "COMPLETION",
        }
    }
}

impl fmt::Display for GameStateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateTransition {
    Stay,
    To(GameStateKind),
}

/// One node of the game flow. States only talk to each other through the
/// [`GameContext`] and their [`GameStateKind`].
///
/// `sample` is `None` whenever no usable pose arrived this frame. `now` comes
/// from the machine's clock. None of the hooks can fail.
pub trait GameState: Send {
    fn kind(&self) -> GameStateKind;

    fn enter(&mut self, ctx: &mut GameContext, now: Duration);

    fn update(
        &mut self,
        ctx: &mut GameContext,
        sample: Option<&PoseSample>,
        now: Duration,
    ) -> StateTransition;

    fn exit(&mut self, _ctx: &mut GameContext, _now: Duration) {}
}
