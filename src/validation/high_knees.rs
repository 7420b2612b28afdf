use super::alternation::{AlternationEvent, AlternationTracker};
use super::{form_confidence, ActionValidator, ExerciseKind, ValidationResult, ValidatorSettings};
use crate::common::geometry::{distance, midpoint, ratio};
use crate::common::{Joint, PoseSample};

/// Knee-below-hip offset, as a fraction of torso length, that still counts as raised
const KNEE_RAISE_RATIO: f32 = 0.15;

const REQUIRED: [Joint; 6] = [
    Joint::LeftShoulder,
    Joint::RightShoulder,
    Joint::LeftHip,
    Joint::RightHip,
    Joint::LeftKnee,
    Joint::RightKnee,
];

pub struct HighKneesValidator {
    settings: ValidatorSettings,
    tracker: AlternationTracker,
}

impl HighKneesValidator {
    pub fn new(settings: ValidatorSettings) -> Self {
        Self {
            settings,
            tracker: AlternationTracker::new(),
        }
    }

    /// Knee height below the hip, relative to torso length (smaller is higher)
    fn knee_drop(sample: &PoseSample, hip: Joint, knee: Joint, torso: f32) -> Option<f32> {
        ratio(sample.get(knee).y - sample.get(hip).y, torso)
    }
}

impl ActionValidator for HighKneesValidator {
    fn exercise(&self) -> ExerciseKind {
        ExerciseKind::HighKnees
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
        let torso = distance(&shoulders, &hips);
        let (Some(left), Some(right)) = (
            Self::knee_drop(sample, Joint::LeftHip, Joint::LeftKnee, torso),
            Self::knee_drop(sample, Joint::RightHip, Joint::RightKnee, torso),
        ) else {
            return ValidationResult::invalid(0.0, "Stand tall facing the camera");
        };

        let threshold = KNEE_RAISE_RATIO + self.settings.distance_tolerance;
        match self.tracker.observe(left <= threshold, right <= threshold) {
            AlternationEvent::Completed => {
                let height = left.min(right).max(0.0);
                ValidationResult::valid(form_confidence(height, threshold), "Great high knees!")
            }
            AlternationEvent::Raised(side) | AlternationEvent::Holding(side) => {
                ValidationResult::invalid(0.8, format!("Good, now the {} knee", side.other().as_str()))
            }
            AlternationEvent::Lowered(_) => ValidationResult::invalid(0.8, "Keep the rhythm going"),
            AlternationEvent::SameSide(side) => {
                ValidationResult::invalid(0.6, format!("Switch to the {} knee", side.other().as_str()))
            }
            AlternationEvent::BothRaised => ValidationResult::invalid(0.3, "One knee at a time"),
            AlternationEvent::Waiting => {
                ValidationResult::invalid(0.7, "Run in place, knees up to hip height")
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
    fn left_then_right_counts_one_rep() {
        let mut validator = HighKneesValidator::new(ValidatorSettings::default());
        let sequence = [
            PosePreset::Standing,
            PosePreset::KneeLeftUp,
            PosePreset::Standing,
            PosePreset::KneeRightUp,
            PosePreset::Standing,
        ];
        let valid: Vec<bool> = sequence
            .into_iter()
            .map(|preset| validator.validate(&sample(preset)).valid)
            .collect();
        assert_eq!(valid, vec![false, false, false, true, false]);
    }

    #[test]
    fn same_knee_twice_is_not_a_rep() {
        let mut validator = HighKneesValidator::new(ValidatorSettings::default());
        for preset in [
            PosePreset::KneeLeftUp,
            PosePreset::Standing,
            PosePreset::KneeLeftUp,
        ] {
            assert!(!validator.validate(&sample(preset)).valid);
        }
        let result = validator.validate(&sample(PosePreset::KneeLeftUp));
        assert_eq!(result.feedback, "Good, now the right knee");
    }

    #[test]
    fn low_knee_lift_is_ignored() {
        let mut validator = HighKneesValidator::new(ValidatorSettings::default());
        let half_lift = with_joints(PosePreset::Standing, &[(Joint::LeftKnee, 285.0, 420.0)]);
        validator.validate(&half_lift);
        assert_eq!(validator.phase(), "ready");
    }
}
