use super::{form_confidence, ActionValidator, ExerciseKind, ValidationResult, ValidatorSettings};
use crate::common::geometry::{angle, distance, in_tolerance};
use crate::common::{Joint, PoseSample};
use tracing::debug;

const TARGET_KNEE_ANGLE: f32 = 90.0;
const STRAIGHT_ANGLE: f32 = 180.0;

const REQUIRED: [Joint; 6] = [
    Joint::LeftHip,
    Joint::LeftKnee,
    Joint::LeftAnkle,
    Joint::RightHip,
    Joint::RightKnee,
    Joint::RightAnkle,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquatPhase {
    Standing,
    Bottom,
}

/// Counts a squat on reaching depth; the next one is armed by standing back up.
pub struct SquatValidator {
    settings: ValidatorSettings,
    phase: SquatPhase,
}

struct LegMeasure {
    left_knee: f32,
    right_knee: f32,
    hips_low_enough: bool,
}

impl SquatValidator {
    pub fn new(settings: ValidatorSettings) -> Self {
        Self {
            settings,
            phase: SquatPhase::Standing,
        }
    }

    fn measure(&self, sample: &PoseSample) -> LegMeasure {
        let left_knee = angle(
            sample.get(Joint::LeftHip),
            sample.get(Joint::LeftKnee),
            sample.get(Joint::LeftAnkle),
        );
        let right_knee = angle(
            sample.get(Joint::RightHip),
            sample.get(Joint::RightKnee),
            sample.get(Joint::RightAnkle),
        );

        let hip_y = (sample.get(Joint::LeftHip).y + sample.get(Joint::RightHip).y) / 2.0;
        let knee_y = (sample.get(Joint::LeftKnee).y + sample.get(Joint::RightKnee).y) / 2.0;
        let thigh = (distance(sample.get(Joint::LeftHip), sample.get(Joint::LeftKnee))
            + distance(sample.get(Joint::RightHip), sample.get(Joint::RightKnee)))
            / 2.0;

        LegMeasure {
            left_knee,
            right_knee,
            hips_low_enough: hip_y >= knee_y - self.settings.distance_tolerance * thigh,
        }
    }

    fn depth_feedback(&self, legs: &LegMeasure) -> &'static str {
        let tolerance = self.settings.angle_tolerance;
        let shallowest = legs.left_knee.max(legs.right_knee);
        let deepest = legs.left_knee.min(legs.right_knee);
        if shallowest >= STRAIGHT_ANGLE - tolerance {
            "Squat down, thighs parallel to the floor"
        } else if shallowest > TARGET_KNEE_ANGLE + tolerance {
            "Go lower"
        } else if deepest < TARGET_KNEE_ANGLE - tolerance {
            "Too deep, come up a little"
        } else if !legs.hips_low_enough {
            "Drop your hips to knee level"
        } else {
            "Bend both knees evenly"
        }
    }
}

impl ActionValidator for SquatValidator {
    fn exercise(&self) -> ExerciseKind {
        ExerciseKind::Squat
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
        let legs = self.measure(sample);
        let at_depth = in_tolerance(legs.left_knee, TARGET_KNEE_ANGLE, tolerance)
            && in_tolerance(legs.right_knee, TARGET_KNEE_ANGLE, tolerance)
            && legs.hips_low_enough;

        debug!(
            left_knee = legs.left_knee,
            right_knee = legs.right_knee,
            phase = self.phase(),
            "squat sample"
        );

        match self.phase {
            SquatPhase::Standing if at_depth => {
                self.phase = SquatPhase::Bottom;
                let deviation = (legs.left_knee - TARGET_KNEE_ANGLE)
                    .abs()
                    .max((legs.right_knee - TARGET_KNEE_ANGLE).abs());
                ValidationResult::valid(form_confidence(deviation, tolerance), "Good squat!")
            }
            SquatPhase::Standing => {
                ValidationResult::invalid(0.5, self.depth_feedback(&legs))
            }
            SquatPhase::Bottom => {
                if legs.left_knee.min(legs.right_knee) >= STRAIGHT_ANGLE - tolerance {
                    self.phase = SquatPhase::Standing;
                    ValidationResult::invalid(0.9, "Ready for the next squat")
                } else {
                    ValidationResult::invalid(0.8, "Stand all the way up")
                }
            }
        }
    }

    fn phase(&self) -> &'static str {
        match self.phase {
            SquatPhase::Standing => "standing",
            SquatPhase::Bottom => "bottom",
        }
    }

    fn reset(&mut self) {
        self.phase = SquatPhase::Standing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::PosePreset;
    use crate::validation::test_support::*;

    const KNEE: (f32, f32) = (300.0, 400.0);
    const HIP: (f32, f32) = (200.0, 410.0);

    /// Both legs bent to `degrees` at the knee, hips just below the knees
    fn squat_with_knee_angle(degrees: f32) -> PoseSample {
        let ankle = point_at_angle(HIP, KNEE, degrees);
        let shift = 20.0;
        with_joints(
            PosePreset::Standing,
            &[
                (Joint::LeftHip, HIP.0, HIP.1),
                (Joint::LeftKnee, KNEE.0, KNEE.1),
                (Joint::LeftAnkle, ankle.0, ankle.1),
                (Joint::RightHip, HIP.0 + shift, HIP.1),
                (Joint::RightKnee, KNEE.0 + shift, KNEE.1),
                (Joint::RightAnkle, ankle.0 + shift, ankle.1),
            ],
        )
    }

    #[test]
    fn right_angle_knees_with_low_hips_are_valid() {
        let mut validator = SquatValidator::new(ValidatorSettings::default());
        let result = validator.validate(&squat_with_knee_angle(90.0));
        assert!(result.valid, "{}", result.feedback);
        assert!(result.confidence >= 0.8);
    }

    #[test]
    fn shallow_knees_are_invalid() {
        let mut validator = SquatValidator::new(ValidatorSettings::default());
        let result = validator.validate(&squat_with_knee_angle(150.0));
        assert!(!result.valid);
        assert_eq!(result.feedback, "Go lower");
    }

    #[test]
    fn hips_above_knees_are_invalid() {
        let mut validator = SquatValidator::new(ValidatorSettings::default());
        let sample = with_joints(
            PosePreset::Squatting,
            &[
                (Joint::LeftHip, 180.0, 400.0),
                (Joint::RightHip, 200.0, 400.0),
                (Joint::LeftKnee, 260.0, 480.0),
                (Joint::RightKnee, 280.0, 480.0),
            ],
        );
        assert!(!validator.validate(&sample).valid);
    }

    #[test]
    fn holding_the_bottom_counts_once() {
        let mut validator = SquatValidator::new(ValidatorSettings::default());
        assert!(!validator.validate(&sample(PosePreset::Standing)).valid);
        assert!(validator.validate(&sample(PosePreset::Squatting)).valid);
        assert_eq!(validator.phase(), "bottom");
        assert!(!validator.validate(&sample(PosePreset::Squatting)).valid);
        assert!(!validator.validate(&sample(PosePreset::Standing)).valid);
        assert_eq!(validator.phase(), "standing");
        assert!(validator.validate(&sample(PosePreset::Squatting)).valid);
    }

    #[test]
    fn reset_rearms_the_counter() {
        let mut validator = SquatValidator::new(ValidatorSettings::default());
        validator.validate(&sample(PosePreset::Squatting));
        validator.reset();
        assert!(validator.validate(&sample(PosePreset::Squatting)).valid);
    }
}
