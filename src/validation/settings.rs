use crate::error::ValidatorError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tolerances shared by all validators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorSettings {
    /// Allowed deviation from a target angle, in degrees (±)
    pub angle_tolerance: f32,
    /// Allowed deviation from a target distance ratio (±)
    pub distance_tolerance: f32,
    /// Required joints below this confidence block validation
    pub min_confidence: f32,
    /// Continuous correct form needed per counted hold repetition
    pub hold_interval_ms: u64,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self {
            angle_tolerance: 17.5,
            distance_tolerance: 0.10,
            min_confidence: 0.5,
            hold_interval_ms: 1000,
        }
    }
}

impl ValidatorSettings {
    pub fn new(
        angle_tolerance: f32,
        distance_tolerance: f32,
        min_confidence: f32,
    ) -> Result<Self, ValidatorError> {
        let settings = Self {
            angle_tolerance,
            distance_tolerance,
            min_confidence,
            ..Self::default()
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn with_hold_interval(mut self, interval: Duration) -> Self {
        self.hold_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn hold_interval(&self) -> Duration {
        Duration::from_millis(self.hold_interval_ms)
    }

    pub fn validate(&self) -> Result<(), ValidatorError> {
        check_range("angle_tolerance", self.angle_tolerance, 5.0, 30.0)?;
        check_range("distance_tolerance", self.distance_tolerance, 0.05, 0.20)?;
        check_range("min_confidence", self.min_confidence, 0.3, 0.7)?;
        if self.hold_interval_ms == 0 {
            return Err(ValidatorError::InvalidSettings {
                field: "hold_interval_ms",
                value: 0.0,
            });
        }
        Ok(())
    }
}

fn check_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ValidatorError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidatorError::InvalidSettings { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ValidatorSettings::default().validate().is_ok());
        assert_eq!(ValidatorSettings::default().hold_interval(), Duration::from_secs(1));
    }

    #[test]
    fn out_of_range_values_fail_fast() {
        assert!(matches!(
            ValidatorSettings::new(45.0, 0.1, 0.5),
            Err(ValidatorError::InvalidSettings {
                field: "angle_tolerance",
                ..
            })
        ));
        assert!(ValidatorSettings::new(17.5, 0.5, 0.5).is_err());
        assert!(ValidatorSettings::new(17.5, 0.1, 0.9).is_err());
        assert!(ValidatorSettings::new(10.0, 0.05, 0.3).is_ok());
    }
}
