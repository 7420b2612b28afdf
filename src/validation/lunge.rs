use super::{form_confidence, ActionValidator, ExerciseKind, ValidationResult, ValidatorSettings};
use crate::common::geometry::{angle, in_tolerance};
use crate::common::{Joint, PoseSample};

const TARGET_FRONT_KNEE: f32 = 90.0;
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
pub enum LungePhase {
    Standing,
    Bottom,
}

pub struct LungeValidator {
    settings: ValidatorSettings,
    phase: LungePhase,
    best_deviation: f32,
}

impl LungeValidator {
    pub fn new(settings: ValidatorSettings) -> Self {
        Self {
            settings,
            phase: LungePhase::Standing,
            best_deviation: f32::MAX,
        }
    }
}

impl ActionValidator for LungeValidator {
    fn exercise(&self) -> ExerciseKind {
        ExerciseKind::Lunge
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
        let left = angle(
            sample.get(Joint::LeftHip),
            sample.get(Joint::LeftKnee),
            sample.get(Joint::LeftAnkle),
        );
        let right = angle(
            sample.get(Joint::RightHip),
            sample.get(Joint::RightKnee),
            sample.get(Joint::RightAnkle),
        );
        let front = left.min(right);
        let back = left.max(right);

        // front knee near 90 and the back knee bent too
        let at_depth =
            in_tolerance(front, TARGET_FRONT_KNEE, tolerance) && back <= STRAIGHT_ANGLE - tolerance;
        let standing = front >= STRAIGHT_ANGLE - tolerance;

        match self.phase {
            LungePhase::Standing => {
                if at_depth {
                    self.phase = LungePhase::Bottom;
                    self.best_deviation = (front - TARGET_FRONT_KNEE).abs();
                    ValidationResult::invalid(0.9, "Good depth, now step back up")
                } else if front < TARGET_FRONT_KNEE - tolerance {
                    ValidationResult::invalid(0.5, "Front knee is too bent")
                } else if in_tolerance(front, TARGET_FRONT_KNEE, tolerance) {
                    ValidationResult::invalid(0.6, "Bend the back knee too")
                } else {
                    ValidationResult::invalid(0.7, "Step forward and lower your hips")
                }
            }
            LungePhase::Bottom => {
                if standing {
                    self.phase = LungePhase::Standing;
                    let confidence = form_confidence(self.best_deviation, tolerance);
                    self.best_deviation = f32::MAX;
                    ValidationResult::valid(confidence, "Great lunge!")
                } else {
                    if at_depth {
                        self.best_deviation =
                            self.best_deviation.min((front - TARGET_FRONT_KNEE).abs());
                    }
                    ValidationResult::invalid(0.8, "Push back up to standing")
                }
            }
        }
    }

    fn phase(&self) -> &'static str {
        match self.phase {
            LungePhase::Standing => "standing",
            LungePhase::Bottom => "bottom",
        }
    }

    fn reset(&mut self) {
        self.phase = LungePhase::Standing;
        self.best_deviation = f32::MAX;
    }
}
