use super::{ActionValidator, ExerciseKind, ValidationResult, ValidatorSettings};
use crate::common::geometry::horizontal_distance;
use crate::common::{Joint, PoseSample};

/// Hands must travel this fraction of hip width past the hip center
const TWIST_RATIO: f32 = 0.5;
/// Floor for hip width when the player sits side-on
const MIN_HIP_WIDTH_PX: f32 = 20.0;

const REQUIRED: [Joint; 4] = [
    Joint::LeftHip,
    Joint::RightHip,
    Joint::LeftWrist,
    Joint::RightWrist,
];

/// Side the hands are on, in image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TwistPhase {
    Center,
    Left,
    Right,
}

/// Every switch from one side to the other is a repetition.
pub struct RussianTwistValidator {
    settings: ValidatorSettings,
    phase: TwistPhase,
}

impl RussianTwistValidator {
    pub fn new(settings: ValidatorSettings) -> Self {
        Self {
            settings,
            phase: TwistPhase::Center,
        }
    }

    fn hand_side(&self, sample: &PoseSample) -> (TwistPhase, f32) {
        let left_hip = sample.get(Joint::LeftHip);
        let right_hip = sample.get(Joint::RightHip);
        let hip_center = (left_hip.x + right_hip.x) / 2.0;
        let hands_center = (sample.get(Joint::LeftWrist).x + sample.get(Joint::RightWrist).x) / 2.0;
        let hip_width = horizontal_distance(left_hip, right_hip).abs().max(MIN_HIP_WIDTH_PX);

        let offset = hands_center - hip_center;
        let reach = hip_width * TWIST_RATIO * (1.0 - self.settings.distance_tolerance);
        let side = if offset <= -reach {
            TwistPhase::Left
        } else if offset >= reach {
            TwistPhase::Right
        } else {
            TwistPhase::Center
        };
        (side, offset.abs() / hip_width)
    }
}

impl ActionValidator for RussianTwistValidator {
    fn exercise(&self) -> ExerciseKind {
        ExerciseKind::RussianTwist
    }

    fn required_joints(&self) -> &'static [Joint] {
        &REQUIRED
    }

    fn settings(&self) -> &ValidatorSettings {
        &self.settings
    }

    fn validate(&mut self, sample: &PoseSample) -> ValidationResult {
        if !self.can_validate(sample) {
            return self.unavailable(sample);
        }

        let (side, reach) = self.hand_side(sample);
        match (self.phase, side) {
            (TwistPhase::Left, TwistPhase::Right) | (TwistPhase::Right, TwistPhase::Left) => {
                self.phase = side;
                // a full hip width of rotation is ideal
                let confidence = 0.7 + 0.3 * reach.min(1.0);
                ValidationResult::valid(confidence, "Good twist!")
            }
            (TwistPhase::Center, TwistPhase::Left | TwistPhase::Right) => {
                self.phase = side;
                ValidationResult::invalid(0.9, "Now twist to the other side")
            }
            (_, TwistPhase::Center) => {
                ValidationResult::invalid(0.8, "Rotate your torso, hands past your hip")
            }
            _ => ValidationResult::invalid(0.8, "Twist to the other side"),
        }
    }

    fn phase(&self) -> &'static str {
        match self.phase {
            TwistPhase::Center => "center",
            TwistPhase::Left => "left",
            TwistPhase::Right => "right",
        }
    }

    fn reset(&mut self) {
        self.phase = TwistPhase::Center;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::PosePreset;
    use crate::validation::test_support::*;

    #[test]
    fn each_side_switch_counts() {
        let mut validator = RussianTwistValidator::new(ValidatorSettings::default());
        let valid: Vec<bool> = [
            PosePreset::Seated,
            PosePreset::TwistLeft,
            PosePreset::Seated,
            PosePreset::TwistRight,
            PosePreset::TwistLeft,
            PosePreset::TwistLeft,
        ]
        .into_iter()
        .map(|preset| validator.validate(&sample(preset)).valid)
        .collect();
        assert_eq!(valid, vec![false, false, false, true, true, false]);
    }

    #[test]
    fn small_rotation_stays_centered() {
        let mut validator = RussianTwistValidator::new(ValidatorSettings::default());
        let nudge = with_joints(
            PosePreset::Seated,
            &[(Joint::LeftWrist, 295.0, 420.0), (Joint::RightWrist, 315.0, 420.0)],
        );
        validator.validate(&nudge);
        assert_eq!(validator.phase(), "center");
    }
}
