use super::{form_confidence, ActionValidator, ExerciseKind, ValidationResult, ValidatorSettings};
use crate::common::geometry::{angle, in_tolerance};
use crate::common::{Joint, PoseSample};
use tracing::debug;

const TARGET_ELBOW_ANGLE: f32 = 90.0;
const EXTENDED_ANGLE: f32 = 180.0;

const REQUIRED: [Joint; 6] = [
    Joint::LeftShoulder,
    Joint::LeftElbow,
    Joint::LeftWrist,
    Joint::RightShoulder,
    Joint::RightElbow,
    Joint::RightWrist,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushupPhase {
    Up,
    Down,
}

/// Up -> down -> up; the rep is counted when the arms lock out again.
pub struct PushupValidator {
    settings: ValidatorSettings,
    phase: PushupPhase,
    /// Closest the elbows came to 90° during the current descent
    best_deviation: f32,
}

impl PushupValidator {
    pub fn new(settings: ValidatorSettings) -> Self {
        Self {
            settings,
            phase: PushupPhase::Up,
            best_deviation: f32::MAX,
        }
    }

    fn elbow_angles(sample: &PoseSample) -> (f32, f32) {
        let left = angle(
            sample.get(Joint::LeftShoulder),
            sample.get(Joint::LeftElbow),
            sample.get(Joint::LeftWrist),
        );
        let right = angle(
            sample.get(Joint::RightShoulder),
            sample.get(Joint::RightElbow),
            sample.get(Joint::RightWrist),
        );
        (left, right)
    }
}

impl ActionValidator for PushupValidator {
    fn exercise(&self) -> ExerciseKind {
        ExerciseKind::Pushup
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
        let (left, right) = Self::elbow_angles(sample);
        let average = (left + right) / 2.0;
        let even = (left - right).abs() <= tolerance;
        let lowered = in_tolerance(average, TARGET_ELBOW_ANGLE, tolerance) && even;
        let extended = left.min(right) >= EXTENDED_ANGLE - tolerance;

        debug!(left, right, phase = self.phase(), "pushup sample");

        match self.phase {
            PushupPhase::Up => {
                if lowered {
                    self.phase = PushupPhase::Down;
                    self.best_deviation = (average - TARGET_ELBOW_ANGLE).abs();
                    ValidationResult::invalid(0.9, "Good depth, now push up")
                } else if !even {
                    ValidationResult::invalid(0.5, "Keep both arms even")
                } else if average < TARGET_ELBOW_ANGLE - tolerance {
                    ValidationResult::invalid(0.5, "Too low, keep your chest off the floor")
                } else {
                    ValidationResult::invalid(0.7, "Lower your chest, elbows to 90 degrees")
                }
            }
            PushupPhase::Down => {
                if extended {
                    self.phase = PushupPhase::Up;
                    let confidence = form_confidence(self.best_deviation, tolerance);
                    self.best_deviation = f32::MAX;
                    ValidationResult::valid(confidence, "Nice push-up!")
                } else {
                    if lowered {
                        self.best_deviation = self
                            .best_deviation
                            .min((average - TARGET_ELBOW_ANGLE).abs());
                    }
                    ValidationResult::invalid(0.8, "Push all the way up")
                }
            }
        }
    }

    fn phase(&self) -> &'static str {
        match self.phase {
            PushupPhase::Up => "up",
            PushupPhase::Down => "down",
        }
    }

    fn reset(&mut self) {
        self.phase = PushupPhase::Up;
        self.best_deviation = f32::MAX;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::PosePreset;
    use crate::validation::test_support::*;

    #[test]
    fn up_down_up_counts_on_lockout() {
        let mut validator = PushupValidator::new(ValidatorSettings::default());
        assert!(!validator.validate(&sample(PosePreset::PushupUp)).valid);
        assert!(!validator.validate(&sample(PosePreset::PushupDown)).valid);
        assert_eq!(validator.phase(), "down");

        let result = validator.validate(&sample(PosePreset::PushupUp));
        assert!(result.valid, "{}", result.feedback);
        assert!(result.confidence >= 0.9);
        assert!(!validator.validate(&sample(PosePreset::PushupUp)).valid);
    }

    #[test]
    fn static_plank_never_counts() {
        let mut validator = PushupValidator::new(ValidatorSettings::default());
        for _ in 0..10 {
            assert!(!validator.validate(&sample(PosePreset::PushupUp)).valid);
        }
        assert_eq!(validator.phase(), "up");
    }

    #[test]
    fn uneven_arms_do_not_arm_the_rep() {
        let mut validator = PushupValidator::new(ValidatorSettings::default());
        // left arm bent to 90, right arm straight
        let sample = with_joints(
            PosePreset::PushupUp,
            &[
                (Joint::LeftElbow, 270.0, 400.0),
                (Joint::LeftWrist, 270.0, 460.0),
            ],
        );
        let result = validator.validate(&sample);
        assert!(!result.valid);
        assert_eq!(result.feedback, "Keep both arms even");
        assert_eq!(validator.phase(), "up");
    }
}
