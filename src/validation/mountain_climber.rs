use super::alternation::{AlternationEvent, AlternationTracker};
use super::{
    form_confidence, ActionValidator, ExerciseKind, ValidationResult, ValidatorSettings,
    FLAT_BODY_MAX_INCLINE,
};
use crate::common::geometry::{distance, incline, midpoint, ratio};
use crate::common::{Joint, PoseSample};

/// Knee-to-shoulder distance, in torso lengths, for a driven knee
const KNEE_DRIVE_RATIO: f32 = 1.2;

const REQUIRED: [Joint; 6] = [
    Joint::LeftShoulder,
    Joint::RightShoulder,
    Joint::LeftHip,
    Joint::RightHip,
    Joint::LeftKnee,
    Joint::RightKnee,
];

/// Alternating knee drives from a plank; a left and a right drive make one rep.
pub struct MountainClimberValidator {
    settings: ValidatorSettings,
    tracker: AlternationTracker,
}

impl MountainClimberValidator {
    pub fn new(settings: ValidatorSettings) -> Self {
        Self {
            settings,
            tracker: AlternationTracker::new(),
        }
    }
}

impl ActionValidator for MountainClimberValidator {
    fn exercise(&self) -> ExerciseKind {
        ExerciseKind::MountainClimber
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

        let shoulders = midpoint(
            sample.get(Joint::LeftShoulder),
            sample.get(Joint::RightShoulder),
        );
        let hips = midpoint(sample.get(Joint::LeftHip), sample.get(Joint::RightHip));
        if incline(&shoulders, &hips) > FLAT_BODY_MAX_INCLINE {
            return ValidationResult::invalid(0.5, "Get into a plank position first");
        }

        let torso = distance(&shoulders, &hips);
        let reach = |knee: Joint, shoulder: Joint| {
            ratio(distance(sample.get(knee), sample.get(shoulder)), torso)
        };
        let (Some(left), Some(right)) = (
            reach(Joint::LeftKnee, Joint::LeftShoulder),
            reach(Joint::RightKnee, Joint::RightShoulder),
        ) else {
            return ValidationResult::invalid(0.0, "Turn sideways to the camera");
        };

        let threshold = KNEE_DRIVE_RATIO * (1.0 + self.settings.distance_tolerance);
        match self.tracker.observe(left <= threshold, right <= threshold) {
            AlternationEvent::Completed => ValidationResult::valid(
                form_confidence(left.min(right), threshold),
                "Great climbers!",
            ),
            AlternationEvent::Raised(side) | AlternationEvent::Holding(side) => {
                ValidationResult::invalid(0.8, format!("Switch, drive the {} knee", side.other().as_str()))
            }
            AlternationEvent::SameSide(side) => ValidationResult::invalid(
                0.6,
                format!("Alternate legs, the {} knee is next", side.other().as_str()),
            ),
            AlternationEvent::Lowered(_) => ValidationResult::invalid(0.8, "Faster, keep alternating"),
            AlternationEvent::BothRaised => {
                ValidationResult::invalid(0.3, "Keep one leg back at a time")
            }
            AlternationEvent::Waiting => {
                ValidationResult::invalid(0.7, "Drive a knee toward your chest")
            }
        }
    }

    fn phase(&self) -> &'static str {
        self.tracker.phase().as_str()
    }

    fn reset(&mut self) {
        self.tracker.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::PosePreset;
    use crate::validation::test_support::*;

    #[test]
    fn alternating_drives_count() {
        let mut validator = MountainClimberValidator::new(ValidatorSettings::default());
        let valid: Vec<bool> = [
            PosePreset::PushupUp,
            PosePreset::ClimberLeftDrive,
            PosePreset::ClimberRightDrive,
            PosePreset::ClimberLeftDrive,
            PosePreset::ClimberRightDrive,
        ]
        .into_iter()
        .map(|preset| validator.validate(&sample(preset)).valid)
        .collect();
        assert_eq!(valid, vec![false, false, true, false, true]);
    }

    #[test]
    fn upright_body_is_rejected() {
        let mut validator = MountainClimberValidator::new(ValidatorSettings::default());
        let result = validator.validate(&sample(PosePreset::KneeLeftUp));
        assert!(!result.valid);
        assert_eq!(result.feedback, "Get into a plank position first");
        assert_eq!(validator.phase(), "ready");
    }
}
