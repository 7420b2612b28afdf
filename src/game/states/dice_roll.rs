use crate::common::{Joint, PoseSample};
use crate::game::context::GameContext;
use crate::game::state::{GameState, GameStateKind, StateTransition};
use std::time::Duration;
use tracing::{debug, info};

const SHOULDERS: [Joint; 2] = [Joint::LeftShoulder, Joint::RightShoulder];

pub const DICE_ROLL_TIMEOUT_MESSAGE: &str = "Too slow! The dice roll timed out";

/// Both wrists above the highest visible face joint. Falls back to the
/// shoulders when the face is hidden, e.g. behind the raised arms.
pub fn hands_above_head(sample: &PoseSample) -> bool {
    if !sample.all_visible(&[Joint::LeftWrist, Joint::RightWrist]) {
        return false;
    }
    let Some(reference) = sample
        .highest_y(&Joint::HEAD)
        .or_else(|| sample.highest_y(&SHOULDERS))
    else {
        return false;
    };
    sample.get(Joint::LeftWrist).y < reference && sample.get(Joint::RightWrist).y < reference
}

pub struct DiceRollState {
    countdown: Duration,
    hold: Duration,
    entered_at: Duration,
    hands_up_since: Option<Duration>,
}

impl DiceRollState {
    pub fn new(countdown: Duration, hold: Duration) -> Self {
        Self {
            countdown,
            hold,
            entered_at: Duration::ZERO,
            hands_up_since: None,
        }
    }
}

impl GameState for DiceRollState {
    fn kind(&self) -> GameStateKind {
        GameStateKind::DiceRollDetecting
    }

    fn enter(&mut self, ctx: &mut GameContext, now: Duration) {
        self.entered_at = now;
        self.hands_up_since = None;
        ctx.last_message = None;
        ctx.set_status("Raise both hands above your head to roll!");
    }

    fn update(
        &mut self,
        ctx: &mut GameContext,
        sample: Option<&PoseSample>,
        now: Duration,
    ) -> StateTransition {
        if sample.is_some_and(hands_above_head) {
            let since = *self.hands_up_since.get_or_insert(now);
            let held = now.saturating_sub(since);
            if held >= self.hold {
                info!(held_ms = held.as_millis() as u64, "hands-up gesture confirmed");
                return StateTransition::To(GameStateKind::Rolling);
            }
            ctx.set_status(format!(
                "Hold it... {:.1}s",
                self.hold.saturating_sub(held).as_secs_f32()
            ));
        } else if self.hands_up_since.take().is_some() {
            debug!("hands dropped before the hold finished");
            ctx.set_status("Keep both hands up!");
        }

        if now.saturating_sub(self.entered_at) >= self.countdown {
            ctx.last_message = Some(DICE_ROLL_TIMEOUT_MESSAGE.to_string());
            return StateTransition::To(GameStateKind::Waiting);
        }
        StateTransition::Stay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::PosePreset;
    use crate::validation::test_support::hiding;

    fn frame(preset: PosePreset, at_ms: u64) -> (PoseSample, Duration) {
        let at = Duration::from_millis(at_ms);
        (preset.sample(at_ms / 33, at), at)
    }

    #[test]
    fn hands_up_preset_is_above_head() {
        assert!(hands_above_head(&PosePreset::HandsUp.sample(0, Duration::ZERO)));
        assert!(!hands_above_head(&PosePreset::Standing.sample(0, Duration::ZERO)));
    }

    #[test]
    fn shoulders_stand_in_for_a_hidden_face() {
        let sample = hiding(PosePreset::HandsUp, &Joint::HEAD);
        assert!(hands_above_head(&sample));
    }

    #[test]
    fn holding_hands_up_for_a_second_rolls() {
        let mut state = DiceRollState::new(Duration::from_secs(2), Duration::from_secs(1));
        let mut ctx = GameContext::new();
        state.enter(&mut ctx, Duration::ZERO);

        let mut last = StateTransition::Stay;
        for at_ms in (0..=1000).step_by(100) {
            let (sample, at) = frame(PosePreset::HandsUp, at_ms);
            last = state.update(&mut ctx, Some(&sample), at);
            if at_ms < 1000 {
                assert_eq!(last, StateTransition::Stay, "rolled early at {at_ms}ms");
            }
        }
        assert_eq!(last, StateTransition::To(GameStateKind::Rolling));
    }

    #[test]
    fn hands_down_until_the_countdown_ends_times_out() {
        let mut state = DiceRollState::new(Duration::from_secs(2), Duration::from_secs(1));
        let mut ctx = GameContext::new();
        state.enter(&mut ctx, Duration::ZERO);

        for at_ms in (0..2000).step_by(100) {
            let (sample, at) = frame(PosePreset::Standing, at_ms);
            assert_eq!(state.update(&mut ctx, Some(&sample), at), StateTransition::Stay);
        }
        let (sample, at) = frame(PosePreset::Standing, 2100);
        assert_eq!(
            state.update(&mut ctx, Some(&sample), at),
            StateTransition::To(GameStateKind::Waiting)
        );
        assert_eq!(ctx.last_message.as_deref(), Some(DICE_ROLL_TIMEOUT_MESSAGE));
    }

    #[test]
    fn dropping_the_hands_restarts_the_hold() {
        let mut state = DiceRollState::new(Duration::from_secs(2), Duration::from_secs(1));
        let mut ctx = GameContext::new();
        state.enter(&mut ctx, Duration::ZERO);

        let (up, at) = frame(PosePreset::HandsUp, 0);
        state.update(&mut ctx, Some(&up), at);
        let (down, at) = frame(PosePreset::Standing, 600);
        state.update(&mut ctx, Some(&down), at);
        let (up, at) = frame(PosePreset::HandsUp, 700);
        state.update(&mut ctx, Some(&up), at);
        let (up, at) = frame(PosePreset::HandsUp, 1200);
        assert_eq!(state.update(&mut ctx, Some(&up), at), StateTransition::Stay);
        let (up, at) = frame(PosePreset::HandsUp, 1700);
        assert_eq!(
            state.update(&mut ctx, Some(&up), at),
            StateTransition::To(GameStateKind::Rolling)
        );
    }

    #[test]
    fn missing_samples_break_the_hold() {
        let mut state = DiceRollState::new(Duration::from_secs(2), Duration::from_secs(1));
        let mut ctx = GameContext::new();
        state.enter(&mut ctx, Duration::ZERO);
        let (up, at) = frame(PosePreset::HandsUp, 0);
        state.update(&mut ctx, Some(&up), at);
        state.update(&mut ctx, None, Duration::from_millis(500));
        let (up, at) = frame(PosePreset::HandsUp, 1000);
        assert_eq!(state.update(&mut ctx, Some(&up), at), StateTransition::Stay);
    }
}
