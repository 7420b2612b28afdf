use crate::common::{Joint, PoseSample};
use crate::game::context::GameContext;
use crate::game::state::{GameState, GameStateKind, StateTransition};
use std::time::Duration;
use tracing::debug;

const ANKLES: [Joint; 2] = [Joint::LeftAnkle, Joint::RightAnkle];

pub const WAITING_STATUS: &str = "Jump to roll the dice!";

/// Idle until the player jumps. The resting ankle height is learned from the
/// samples themselves, so the first usable frame only sets the baseline.
pub struct WaitingState {
    jump_offset: f32,
    smoothing: f32,
}

impl WaitingState {
    pub fn new(jump_offset: f32, smoothing: f32) -> Self {
        Self {
            jump_offset,
            smoothing: smoothing.clamp(f32::EPSILON, 1.0),
        }
    }
}

impl GameState for WaitingState {
    fn kind(&self) -> GameStateKind {
        GameStateKind::Waiting
    }

    fn enter(&mut self, ctx: &mut GameContext, _now: Duration) {
        ctx.reset_task();
        ctx.baseline_ankle_y = None;
        let status = match &ctx.last_message {
            Some(message) => format!("{message}. {WAITING_STATUS}"),
            None => WAITING_STATUS.to_string(),
        };
        ctx.set_status(status);
    }

    fn update(
        &mut self,
        ctx: &mut GameContext,
        sample: Option<&PoseSample>,
        _now: Duration,
    ) -> StateTransition {
        let Some(ankle_y) = sample.and_then(|sample| sample.mean_y(&ANKLES)) else {
            return StateTransition::Stay;
        };

        let Some(baseline) = ctx.baseline_ankle_y else {
            ctx.baseline_ankle_y = Some(ankle_y);
            return StateTransition::Stay;
        };

        // Image y grows downward, so a jump makes the ankles' y smaller.
        let rise = baseline - ankle_y;
        if rise > self.jump_offset {
            debug!(baseline, ankle_y, rise, "jump detected");
            return StateTransition::To(GameStateKind::DiceRollDetecting);
        }

        ctx.baseline_ankle_y = Some(baseline + (ankle_y - baseline) * self.smoothing);
        StateTransition::Stay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::PosePreset;

    fn frame(preset: PosePreset) -> PoseSample {
        preset.sample(0, Duration::ZERO)
    }

    #[test]
    fn jump_after_baseline_leaves_waiting() {
        let mut state = WaitingState::new(40.0, 0.1);
        let mut ctx = GameContext::new();
        state.enter(&mut ctx, Duration::ZERO);
        assert_eq!(ctx.status, WAITING_STATUS);

        let standing = frame(PosePreset::Standing);
        assert_eq!(state.update(&mut ctx, Some(&standing), Duration::ZERO), StateTransition::Stay);
        assert!(ctx.baseline_ankle_y.is_some());

        let jumping = frame(PosePreset::Jumping);
        assert_eq!(
            state.update(&mut ctx, Some(&jumping), Duration::from_millis(33)),
            StateTransition::To(GameStateKind::DiceRollDetecting)
        );
    }

    #[test]
    fn first_sample_never_counts_as_a_jump() {
        let mut state = WaitingState::new(40.0, 0.1);
        let mut ctx = GameContext::new();
        state.enter(&mut ctx, Duration::ZERO);
        let jumping = frame(PosePreset::Jumping);
        assert_eq!(state.update(&mut ctx, Some(&jumping), Duration::ZERO), StateTransition::Stay);
    }

    #[test]
    fn missing_sample_keeps_waiting() {
        let mut state = WaitingState::new(40.0, 0.1);
        let mut ctx = GameContext::new();
        state.enter(&mut ctx, Duration::ZERO);
        assert_eq!(state.update(&mut ctx, None, Duration::ZERO), StateTransition::Stay);
        assert!(ctx.baseline_ankle_y.is_none());
    }

    #[test]
    fn timeout_message_is_shown_on_entry() {
        let mut state = WaitingState::new(40.0, 0.1);
        let mut ctx = GameContext::new();
        ctx.last_message = Some("Too slow".to_string());
        state.enter(&mut ctx, Duration::ZERO);
        assert!(ctx.status.starts_with("Too slow"));
    }
}
