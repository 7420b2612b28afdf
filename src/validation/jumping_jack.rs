use super::{ActionValidator, ExerciseKind, ValidationResult, ValidatorSettings};
use crate::common::geometry::{distance, ratio};
use crate::common::{Joint, PoseSample};
use tracing::debug;

/// Feet spread relative to shoulder width
const OPEN_FEET_RATIO: f32 = 1.5;
const CLOSED_FEET_RATIO: f32 = 1.0;
const REP_CONFIDENCE: f32 = 0.95;

const REQUIRED: [Joint; 8] = [
    Joint::LeftShoulder,
    Joint::RightShoulder,
    Joint::LeftWrist,
    Joint::RightWrist,
    Joint::LeftHip,
    Joint::RightHip,
    Joint::LeftAnkle,
    Joint::RightAnkle,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpingJackPhase {
    Closed,
    Opening,
    Open,
    Closing,
}

/// A rep is a full closed -> open -> closed cycle, reported on the closing sample.
pub struct JumpingJackValidator {
    settings: ValidatorSettings,
    phase: JumpingJackPhase,
}

#[derive(Debug, Clone, Copy)]
enum Stance {
    Open,
    Closed,
    Between,
}

impl JumpingJackValidator {
    pub fn new(settings: ValidatorSettings) -> Self {
        Self {
            settings,
            phase: JumpingJackPhase::Closed,
        }
    }

    fn stance(&self, sample: &PoseSample) -> Option<Stance> {
        let left_shoulder = sample.get(Joint::LeftShoulder);
        let right_shoulder = sample.get(Joint::RightShoulder);
        let shoulder_width = distance(left_shoulder, right_shoulder);
        let feet = distance(sample.get(Joint::LeftAnkle), sample.get(Joint::RightAnkle));
        let feet_ratio = ratio(feet, shoulder_width)?;

        let left_wrist = sample.get(Joint::LeftWrist);
        let right_wrist = sample.get(Joint::RightWrist);
        let arms_up = left_wrist.y < left_shoulder.y && right_wrist.y < right_shoulder.y;
        let arms_down = left_wrist.y > left_shoulder.y && right_wrist.y > right_shoulder.y;

        let tolerance = self.settings.distance_tolerance;
        let feet_open = feet_ratio >= OPEN_FEET_RATIO * (1.0 - tolerance);
        let feet_closed = feet_ratio <= CLOSED_FEET_RATIO * (1.0 + tolerance);

        debug!(feet_ratio, arms_up, arms_down, "jumping jack sample");

        Some(if feet_open && arms_up {
            Stance::Open
        } else if feet_closed && arms_down {
            Stance::Closed
        } else {
            Stance::Between
        })
    }
}

impl ActionValidator for JumpingJackValidator {
    fn exercise(&self) -> ExerciseKind {
        ExerciseKind::JumpingJack
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
        let Some(stance) = self.stance(sample) else {
            return ValidationResult::invalid(0.0, "Face the camera so both shoulders show");
        };

        use JumpingJackPhase::*;
        let (next, result) = match (self.phase, stance) {
            (Closed, Stance::Closed) => (
                Closed,
                ValidationResult::invalid(0.8, "Jump your feet out and raise your arms"),
            ),
            (Closed | Opening, Stance::Open) => {
                (Open, ValidationResult::invalid(0.9, "Now jump back together"))
            }
            (Closed | Opening, Stance::Between) => {
                (Opening, ValidationResult::invalid(0.7, "Wider, arms over your head"))
            }
            (Opening, Stance::Closed) => {
                (Closed, ValidationResult::invalid(0.5, "Open all the way before closing"))
            }
            (Open | Closing, Stance::Closed) => {
                (Closed, ValidationResult::valid(REP_CONFIDENCE, "Nice jumping jack!"))
            }
            (Open, Stance::Open) => (Open, ValidationResult::invalid(0.9, "Close to finish the rep")),
            (Open | Closing, Stance::Between) => {
                (Closing, ValidationResult::invalid(0.8, "Feet together, arms down"))
            }
            (Closing, Stance::Open) => (Open, ValidationResult::invalid(0.5, "Close to finish the rep")),
        };
        self.phase = next;
        result
    }

    fn phase(&self) -> &'static str {
        match self.phase {
            JumpingJackPhase::Closed => "closed",
            JumpingJackPhase::Opening => "opening",
            JumpingJackPhase::Open => "open",
            JumpingJackPhase::Closing => "closing",
        }
    }

    fn reset(&mut self) {
        self.phase = JumpingJackPhase::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::PosePreset;
    use crate::validation::test_support::*;

    #[test]
    fn closed_open_closed_yields_exactly_one_rep_on_closing() {
        let mut validator = JumpingJackValidator::new(ValidatorSettings::default());
        let results: Vec<bool> = [
            PosePreset::Standing,
            PosePreset::JumpingJackOpen,
            PosePreset::Standing,
        ]
        .into_iter()
        .map(|preset| validator.validate(&sample(preset)).valid)
        .collect();
        assert_eq!(results, vec![false, false, true]);
    }

    #[test]
    fn staying_open_or_closed_never_counts() {
        let mut validator = JumpingJackValidator::new(ValidatorSettings::default());
        for _ in 0..5 {
            assert!(!validator.validate(&sample(PosePreset::Standing)).valid);
        }
        for _ in 0..5 {
            assert!(!validator.validate(&sample(PosePreset::JumpingJackOpen)).valid);
        }
        assert_eq!(validator.phase(), "open");
    }

    #[test]
    fn half_open_then_closed_does_not_count() {
        let mut validator = JumpingJackValidator::new(ValidatorSettings::default());
        // arms up with feet still together
        let arms_only = with_joints(
            PosePreset::Standing,
            &[(Joint::LeftWrist, 240.0, 60.0), (Joint::RightWrist, 400.0, 60.0)],
        );
        assert!(!validator.validate(&arms_only).valid);
        assert_eq!(validator.phase(), "opening");
        assert!(!validator.validate(&sample(PosePreset::Standing)).valid);
        assert_eq!(validator.phase(), "closed");
    }

    #[test]
    fn passing_through_closing_still_counts_once() {
        let mut validator = JumpingJackValidator::new(ValidatorSettings::default());
        validator.validate(&sample(PosePreset::JumpingJackOpen));
        let arms_down_feet_wide = with_joints(
            PosePreset::JumpingJackOpen,
            &[(Joint::LeftWrist, 240.0, 350.0), (Joint::RightWrist, 400.0, 350.0)],
        );
        assert!(!validator.validate(&arms_down_feet_wide).valid);
        assert_eq!(validator.phase(), "closing");
        assert!(validator.validate(&sample(PosePreset::Standing)).valid);
        assert!(!validator.validate(&sample(PosePreset::Standing)).valid);
    }
}
