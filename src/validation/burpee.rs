use super::{
    form_confidence, ActionValidator, ExerciseKind, ValidationResult, ValidatorSettings,
    FLAT_BODY_MAX_INCLINE,
};
use crate::common::geometry::{incline, is_above, midpoint};
use crate::common::{Joint, PoseSample};

const UPRIGHT_ANGLE: f32 = 90.0;

const REQUIRED: [Joint; 6] = [
    Joint::LeftShoulder,
    Joint::RightShoulder,
    Joint::LeftHip,
    Joint::RightHip,
    Joint::LeftAnkle,
    Joint::RightAnkle,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurpeePhase {
    Standing,
    Ground,
}

/// Standing -> plank on the ground -> standing again.
pub struct BurpeeValidator {
    settings: ValidatorSettings,
    phase: BurpeePhase,
}

impl BurpeeValidator {
    pub fn new(settings: ValidatorSettings) -> Self {
        Self {
            settings,
            phase: BurpeePhase::Standing,
        }
    }
}

impl ActionValidator for BurpeeValidator {
    fn exercise(&self) -> ExerciseKind {
        ExerciseKind::Burpee
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
        let ankles = midpoint(sample.get(Joint::LeftAnkle), sample.get(Joint::RightAnkle));

        let body_incline = incline(&shoulders, &ankles);
        let tolerance = self.settings.angle_tolerance;
        let upright = body_incline >= UPRIGHT_ANGLE - tolerance
            && is_above(&shoulders, &hips, 0.0)
            && is_above(&hips, &ankles, 0.0);
        let on_ground = body_incline <= FLAT_BODY_MAX_INCLINE;

        match self.phase {
            BurpeePhase::Standing if on_ground => {
                self.phase = BurpeePhase::Ground;
                ValidationResult::invalid(0.9, "Good plank, now jump back up")
            }
            BurpeePhase::Standing if upright => {
                ValidationResult::invalid(0.8, "Drop down into a plank")
            }
            BurpeePhase::Standing => ValidationResult::invalid(0.7, "All the way to the floor"),
            BurpeePhase::Ground if upright => {
                self.phase = BurpeePhase::Standing;
                ValidationResult::valid(
                    form_confidence(UPRIGHT_ANGLE - body_incline, tolerance),
                    "Great burpee!",
                )
            }
            BurpeePhase::Ground => ValidationResult::invalid(0.8, "Stand up tall to finish"),
        }
    }

    fn phase(&self) -> &'static str {
        match self.phase {
            BurpeePhase::Standing => "standing",
            BurpeePhase::Ground => "ground",
        }
    }

    fn reset(&mut self) {
        self.phase = BurpeePhase::Standing;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::PosePreset;
    use crate::validation::test_support::*;

    #[test]
    fn ground_then_standing_counts() {
        let mut validator = BurpeeValidator::new(ValidatorSettings::default());
        let valid: Vec<bool> = [
            PosePreset::Standing,
            PosePreset::Squatting,
            PosePreset::PushupUp,
            PosePreset::PushupDown,
            PosePreset::Standing,
            PosePreset::Standing,
        ]
        .into_iter()
        .map(|preset| validator.validate(&sample(preset)).valid)
        .collect();
        assert_eq!(valid, vec![false, false, false, false, true, false]);
    }

    #[test]
    fn standing_alone_never_counts() {
        let mut validator = BurpeeValidator::new(ValidatorSettings::default());
        for _ in 0..3 {
            let result = validator.validate(&sample(PosePreset::Standing));
            assert!(!result.valid);
            assert_eq!(result.feedback, "Drop down into a plank");
        }
    }
}
