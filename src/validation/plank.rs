use super::{
    form_confidence, ActionValidator, ExerciseKind, ValidationResult, ValidatorSettings,
    FLAT_BODY_MAX_INCLINE,
};
use crate::common::geometry::{angle, in_tolerance, incline};
use crate::common::{Joint, Keypoint, PoseSample};
use std::time::Duration;

const STRAIGHT_ANGLE: f32 = 180.0;

const REQUIRED: [Joint; 6] = [
    Joint::LeftShoulder,
    Joint::LeftHip,
    Joint::LeftAnkle,
    Joint::RightShoulder,
    Joint::RightHip,
    Joint::RightAnkle,
];

/// Hold-based: one repetition per `hold_interval` of continuous straight form.
/// Timing uses the samples' capture timestamps, so it follows the injected clock.
pub struct PlankValidator {
    settings: ValidatorSettings,
    hold_since: Option<Duration>,
}

impl PlankValidator {
    pub fn new(settings: ValidatorSettings) -> Self {
        Self {
            settings,
            hold_since: None,
        }
    }

    /// Shoulder, hip and ankle of whichever side the camera sees better
    fn body_line(sample: &PoseSample) -> (&Keypoint, &Keypoint, &Keypoint) {
        let left = [Joint::LeftShoulder, Joint::LeftHip, Joint::LeftAnkle];
        let right = [Joint::RightShoulder, Joint::RightHip, Joint::RightAnkle];
        let score = |joints: &[Joint; 3]| -> f32 {
            joints.iter().map(|&joint| sample.get(joint).confidence).sum()
        };
        let side = if score(&left) >= score(&right) { left } else { right };
        (sample.get(side[0]), sample.get(side[1]), sample.get(side[2]))
    }

    fn hips_sagging(shoulder: &Keypoint, hip: &Keypoint, ankle: &Keypoint) -> bool {
        let dx = ankle.x - shoulder.x;
        if dx.abs() < f32::EPSILON {
            return false;
        }
        let t = (hip.x - shoulder.x) / dx;
        let line_y = shoulder.y + t * (ankle.y - shoulder.y);
        hip.y > line_y
    }
}

impl ActionValidator for PlankValidator {
    fn exercise(&self) -> ExerciseKind {
        ExerciseKind::Plank
    }

    fn required_joints(&self) -> &'static [Joint] {
        &REQUIRED
    }

    fn settings(&self) -> &ValidatorSettings {
        &self.settings
    }

    fn validate(&mut self, sample: &PoseSample) -> ValidationResult {
        if !self.can_validate(sample) {
            self.hold_since = None;
            return self.unavailable(sample);
        }

        let tolerance = self.settings.angle_tolerance;
        let (shoulder, hip, ankle) = Self::body_line(sample);
        let body_angle = angle(shoulder, hip, ankle);
        let flat = incline(shoulder, ankle) <= FLAT_BODY_MAX_INCLINE;

        if !flat {
            self.hold_since = None;
            return ValidationResult::invalid(0.5, "Get down into a plank");
        }
        if !in_tolerance(body_angle, STRAIGHT_ANGLE, tolerance) {
            self.hold_since = None;
            let feedback = if Self::hips_sagging(shoulder, hip, ankle) {
                "Lift your hips, keep a straight line"
            } else {
                "Lower your hips, keep a straight line"
            };
            return ValidationResult::invalid(0.6, feedback);
        }

        let now = sample.captured_at();
        let since = *self.hold_since.get_or_insert(now);
        let held = now.saturating_sub(since);
        let interval = self.settings.hold_interval();
        if held >= interval {
            self.hold_since = Some(now);
            ValidationResult::valid(
                form_confidence(STRAIGHT_ANGLE - body_angle, tolerance),
                format!("Hold it! +{}s", interval.as_secs_f32()),
            )
        } else {
            ValidationResult::invalid(0.9, format!("Holding... {:.1}s", held.as_secs_f32()))
        }
    }

    fn phase(&self) -> &'static str {
        if self.hold_since.is_some() {
            "holding"
        } else {
            "idle"
        }
    }

    fn reset(&mut self) {
        self.hold_since = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::PosePreset;
    use crate::validation::test_support::*;

    fn plank_at(ms: u64) -> PoseSample {
        sample_at(PosePreset::PushupUp, Duration::from_millis(ms))
    }

    #[test]
    fn one_repetition_per_second_held() {
        let mut validator = PlankValidator::new(ValidatorSettings::default());
        let valid: Vec<bool> = (0..=25)
            .map(|i| validator.validate(&plank_at(i * 100)).valid)
            .collect();
        // counted at 1.0s and 2.0s
        assert_eq!(valid.iter().filter(|&&v| v).count(), 2);
        assert!(valid[10]);
        assert!(valid[20]);
        assert_eq!(validator.phase(), "holding");
    }

    #[test]
    fn broken_form_restarts_the_hold() {
        let mut validator = PlankValidator::new(ValidatorSettings::default());
        validator.validate(&plank_at(0));
        validator.validate(&plank_at(900));

        let mut sagging = with_joints(
            PosePreset::PushupUp,
            &[(Joint::LeftHip, 360.0, 500.0), (Joint::RightHip, 365.0, 500.0)],
        );
        sagging = PoseSample::new(*sagging.keypoints(), 0, Duration::from_millis(950));
        let result = validator.validate(&sagging);
        assert!(!result.valid);
        assert!(result.feedback.starts_with("Lift your hips"), "{}", result.feedback);
        assert_eq!(validator.phase(), "idle");

        assert!(!validator.validate(&plank_at(1000)).valid);
        assert!(!validator.validate(&plank_at(1900)).valid);
        assert!(validator.validate(&plank_at(2000)).valid);
    }

    #[test]
    fn standing_is_not_a_plank() {
        let mut validator = PlankValidator::new(ValidatorSettings::default());
        let result = validator.validate(&sample(PosePreset::Standing));
        assert!(!result.valid);
        assert_eq!(result.feedback, "Get down into a plank");
    }

    #[test]
    fn custom_hold_interval_is_respected() {
        let settings = ValidatorSettings::default().with_hold_interval(Duration::from_secs(2));
        let mut validator = PlankValidator::new(settings);
        validator.validate(&plank_at(0));
        assert!(!validator.validate(&plank_at(1500)).valid);
        let result = validator.validate(&plank_at(2000));
        assert!(result.valid);
        assert_eq!(result.feedback, "Hold it! +2s");
    }
}
