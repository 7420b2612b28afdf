use super::{form_confidence, ActionValidator, ExerciseKind, ValidationResult, ValidatorSettings};
use crate::common::geometry::angle;
use crate::common::{Joint, PoseSample};

/// Shoulder-hip-knee angle at the top of the crunch
const TARGET_UP_ANGLE: f32 = 45.0;
/// Shoulder-hip-knee angle once lying back
const TARGET_DOWN_ANGLE: f32 = 120.0;

const REQUIRED: [Joint; 6] = [
    Joint::LeftShoulder,
    Joint::RightShoulder,
    Joint::LeftHip,
    Joint::RightHip,
    Joint::LeftKnee,
    Joint::RightKnee,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitupPhase {
    Down,
    Up,
}

pub struct SitupValidator {
    settings: ValidatorSettings,
    phase: SitupPhase,
    /// Smallest hip angle reached since sitting up
    best_up_angle: f32,
}

impl SitupValidator {
    pub fn new(settings: ValidatorSettings) -> Self {
        Self {
            settings,
            phase: SitupPhase::Down,
            best_up_angle: f32::MAX,
        }
    }

    fn hip_angle(sample: &PoseSample) -> f32 {
        let left = angle(
            sample.get(Joint::LeftShoulder),
            sample.get(Joint::LeftHip),
            sample.get(Joint::LeftKnee),
        );
        let right = angle(
            sample.get(Joint::RightShoulder),
            sample.get(Joint::RightHip),
            sample.get(Joint::RightKnee),
        );
        (left + right) / 2.0
    }
}

impl ActionValidator for SitupValidator {
    fn exercise(&self) -> ExerciseKind {
        ExerciseKind::Situp
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

        let tolerance = self.settings.angle_tolerance;
        let hip_angle = Self::hip_angle(sample);
        let is_up = hip_angle <= TARGET_UP_ANGLE + tolerance;
        let is_down = hip_angle >= TARGET_DOWN_ANGLE - tolerance;

        match self.phase {
            SitupPhase::Down if is_up => {
                self.phase = SitupPhase::Up;
                self.best_up_angle = hip_angle;
                ValidationResult::invalid(0.9, "Top reached, lower back down")
            }
            SitupPhase::Down if is_down => {
                ValidationResult::invalid(0.8, "Curl up toward your knees")
            }
            SitupPhase::Down => ValidationResult::invalid(0.7, "Keep going, all the way up"),
            SitupPhase::Up if is_down => {
                self.phase = SitupPhase::Down;
                let deviation = (self.best_up_angle - TARGET_UP_ANGLE).max(0.0);
                self.best_up_angle = f32::MAX;
                ValidationResult::valid(form_confidence(deviation, tolerance), "Nice sit-up!")
            }
            SitupPhase::Up => {
                self.best_up_angle = self.best_up_angle.min(hip_angle);
                ValidationResult::invalid(0.8, "Lie back down to finish")
            }
        }
    }

    fn phase(&self) -> &'static str {
        match self.phase {
            SitupPhase::Down => "down",
            SitupPhase::Up => "up",
        }
    }

    fn reset(&mut self) {
        self.phase = SitupPhase::Down;
        self.best_up_angle = f32::MAX;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::PosePreset;
    use crate::validation::test_support::*;

    #[test]
    fn up_then_down_counts() {
        let mut validator = SitupValidator::new(ValidatorSettings::default());
        assert!(!validator.validate(&sample(PosePreset::LyingDown)).valid);
        assert!(!validator.validate(&sample(PosePreset::SitupUp)).valid);
        assert_eq!(validator.phase(), "up");
        let result = validator.validate(&sample(PosePreset::LyingDown));
        assert!(result.valid);
        assert!(result.confidence >= 0.7);
        assert!(!validator.validate(&sample(PosePreset::LyingDown)).valid);
    }

    #[test]
    fn partial_crunch_does_not_arm() {
        let mut validator = SitupValidator::new(ValidatorSettings::default());
        // shoulders lifted only part way
        let partial = with_joints(
            PosePreset::LyingDown,
            &[
                (Joint::LeftShoulder, 280.0, 400.0),
                (Joint::RightShoulder, 285.0, 400.0),
            ],
        );
        let result = validator.validate(&partial);
        assert_eq!(result.feedback, "Keep going, all the way up");
        assert_eq!(validator.phase(), "down");
    }
}
