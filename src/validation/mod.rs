//! Exercise validators. Each one is a small stateful classifier that judges
//! one exercise from a stream of pose samples.

pub mod alternation;
pub mod burpee;
pub mod exercise;
pub mod high_knees;
pub mod jumping_jack;
pub mod lunge;
pub mod mountain_climber;
pub mod plank;
pub mod pushup;
pub mod russian_twist;
pub mod settings;
pub mod situp;
pub mod squat;

pub use exercise::ExerciseKind;
pub use settings::ValidatorSettings;

use crate::common::{Joint, PoseSample};
use serde::Serialize;

/// A valid verdict never reports less than this confidence.
pub const MIN_VALID_CONFIDENCE: f32 = 0.7;

/// Maximum incline (degrees from horizontal) for a body to count as lying flat.
pub(crate) const FLAT_BODY_MAX_INCLINE: f32 = 30.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub confidence: f32,
    pub feedback: String,
}

impl ValidationResult {
    pub fn valid(confidence: f32, feedback: impl Into<String>) -> Self {
        Self {
            valid: true,
            confidence: confidence.clamp(MIN_VALID_CONFIDENCE, 1.0),
            feedback: non_empty(feedback.into()),
        }
    }

    pub fn invalid(confidence: f32, feedback: impl Into<String>) -> Self {
        Self {
            valid: false,
            confidence: confidence.clamp(0.0, 1.0),
            feedback: non_empty(feedback.into()),
        }
    }
}

fn non_empty(feedback: String) -> String {
    if feedback.trim().is_empty() {
        "Keep going".to_string()
    } else {
        feedback
    }
}

/// Maps how far a measurement sits from its target onto [0.7, 1.0].
pub fn form_confidence(deviation: f32, tolerance: f32) -> f32 {
    if tolerance <= 0.0 {
        return MIN_VALID_CONFIDENCE;
    }
    let normalized = (deviation.abs() / tolerance).clamp(0.0, 1.0);
    1.0 - (1.0 - MIN_VALID_CONFIDENCE) * normalized
}

/// Capability shared by every exercise validator.
pub trait ActionValidator: Send {
    fn exercise(&self) -> ExerciseKind;

    /// Joints that must be visible before validation is attempted
    fn required_joints(&self) -> &'static [Joint];

    fn settings(&self) -> &ValidatorSettings;

    /// Judge one sample. Cyclic validators advance their internal phase here.
    fn validate(&mut self, sample: &PoseSample) -> ValidationResult;

    /// Name of the current internal phase
    fn phase(&self) -> &'static str;

    /// Return to the initial phase
    fn reset(&mut self);

    fn can_validate(&self, sample: &PoseSample) -> bool {
        sample.is_usable() && self.missing_joints(sample).is_empty()
    }

    fn missing_joints(&self, sample: &PoseSample) -> Vec<Joint> {
        let min_confidence = self.settings().min_confidence;
        self.required_joints()
            .iter()
            .copied()
            .filter(|&joint| {
                !sample.is_visible(joint) || sample.get(joint).confidence < min_confidence
            })
            .collect()
    }

    /// Well-formed invalid result explaining what cannot be seen.
    fn unavailable(&self, sample: &PoseSample) -> ValidationResult {
        if !sample.is_usable() {
            return ValidationResult::invalid(0.0, "No player detected, step into view");
        }
        let missing: Vec<String> = self
            .missing_joints(sample)
            .iter()
            .map(|joint| joint.to_string())
            .collect();
        ValidationResult::invalid(0.0, format!("Cannot see: {}", missing.join(", ")))
    }
}
