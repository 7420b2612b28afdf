use crate::common::{Joint, VisibilityPolicy};
use crate::error::ConfigError;
use crate::validation::ValidatorSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// Environment variables override file values, e.g.
/// `FITNESS_DICE__TIMINGS__COUNTDOWN_MS=3000`.
pub const ENV_PREFIX: &str = "FITNESS_DICE";

const ROLLING_WINDOW_MS: std::ops::RangeInclusive<u64> = 1500..=3000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub timings: TimingConfig,
    pub gestures: GestureConfig,
    pub pose: VisibilityPolicy,
    pub validator: ValidatorSettings,
    pub scoring: ScoringConfig,
    pub frame_loop: FrameLoopConfig,
    /// Seed for the task pick; random when unset
    pub seed: Option<u64>,
    /// Exercise catalog file; the built-in catalog is used when unset
    pub catalog_path: Option<PathBuf>,
    pub log_level: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            timings: TimingConfig::default(),
            gestures: GestureConfig::default(),
            pose: VisibilityPolicy::default(),
            validator: ValidatorSettings::default(),
            scoring: ScoringConfig::default(),
            frame_loop: FrameLoopConfig::default(),
            seed: None,
            catalog_path: None,
            log_level: "info".to_string(),
        }
    }
}

/// State machine windows, all in milliseconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub countdown_ms: u64,
    pub hands_up_hold_ms: u64,
    pub rolling_ms: u64,
    pub task_display_ms: u64,
    pub inactivity_ms: u64,
    pub celebration_ms: u64,
    /// First interval of the rolling name shuffle; grows by 10% per switch
    pub shuffle_interval_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            countdown_ms: 2000,
            hands_up_hold_ms: 1000,
            rolling_ms: 2500,
            task_display_ms: 3000,
            inactivity_ms: 60_000,
            celebration_ms: 3000,
            shuffle_interval_ms: 100,
        }
    }
}

impl TimingConfig {
    pub fn countdown(&self) -> Duration {
        Duration::from_millis(self.countdown_ms)
    }

    pub fn hands_up_hold(&self) -> Duration {
        Duration::from_millis(self.hands_up_hold_ms)
    }

    pub fn rolling(&self) -> Duration {
        Duration::from_millis(self.rolling_ms)
    }

    pub fn task_display(&self) -> Duration {
        Duration::from_millis(self.task_display_ms)
    }

    pub fn inactivity(&self) -> Duration {
        Duration::from_millis(self.inactivity_ms)
    }

    pub fn celebration(&self) -> Duration {
        Duration::from_millis(self.celebration_ms)
    }

    pub fn shuffle_interval(&self) -> Duration {
        Duration::from_millis(self.shuffle_interval_ms)
    }

    /// Rolling window within 1.5..=3 s, every other window non-zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !ROLLING_WINDOW_MS.contains(&self.rolling_ms) {
            return Err(invalid(
                "timings.rolling_ms",
                format!("{} is outside {:?}", self.rolling_ms, ROLLING_WINDOW_MS),
            ));
        }
        for (field, value) in [
            ("timings.countdown_ms", self.countdown_ms),
            ("timings.hands_up_hold_ms", self.hands_up_hold_ms),
            ("timings.task_display_ms", self.task_display_ms),
            ("timings.inactivity_ms", self.inactivity_ms),
            ("timings.celebration_ms", self.celebration_ms),
            ("timings.shuffle_interval_ms", self.shuffle_interval_ms),
        ] {
            if value == 0 {
                return Err(invalid(field, "must be greater than zero".to_string()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Ankle rise over the resting baseline that counts as a jump
    pub jump_offset_px: f32,
    /// EWMA factor for the resting ankle baseline
    pub baseline_smoothing: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            jump_offset_px: 40.0,
            baseline_smoothing: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Awarded for every completed task, on top of the per-set rep target
    pub base_points: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self { base_points: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameLoopConfig {
    pub fps: u32,
    pub frame_budget_ms: u64,
    pub hook_budget_ms: u64,
}

impl Default for FrameLoopConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            frame_budget_ms: 10,
            hook_budget_ms: 5,
        }
    }
}

impl FrameLoopConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }

    pub fn frame_budget(&self) -> Duration {
        Duration::from_millis(self.frame_budget_ms)
    }

    pub fn hook_budget(&self) -> Duration {
        Duration::from_millis(self.hook_budget_ms)
    }
}

impl Configuration {
    /// Defaults, then the optional file, then `FITNESS_DICE__*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let configuration: Configuration = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        configuration.validate()?;
        Ok(configuration)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timings.validate()?;

        if !(self.gestures.jump_offset_px > 0.0) {
            return Err(invalid(
                "gestures.jump_offset_px",
                format!("{} must be positive", self.gestures.jump_offset_px),
            ));
        }
        if !(self.gestures.baseline_smoothing > 0.0 && self.gestures.baseline_smoothing <= 1.0) {
            return Err(invalid(
                "gestures.baseline_smoothing",
                format!("{} is outside (0, 1]", self.gestures.baseline_smoothing),
            ));
        }

        validate_visibility(&self.pose)?;

        self.validator
            .validate()
            .map_err(|e| invalid("validator", e.to_string()))?;

        if self.frame_loop.fps == 0 {
            return Err(invalid("frame_loop.fps", "must be greater than zero".to_string()));
        }

        self.level()?;
        Ok(())
    }

    pub fn level(&self) -> Result<Level, ConfigError> {
        Level::from_str(&self.log_level)
            .map_err(|_| invalid("log_level", format!("unknown level '{}'", self.log_level)))
    }
}

pub fn validate_visibility(policy: &VisibilityPolicy) -> Result<(), ConfigError> {
    if !(0.0..1.0).contains(&policy.threshold) {
        return Err(invalid(
            "pose.threshold",
            format!("{} is outside [0, 1)", policy.threshold),
        ));
    }
    if !(1..=Joint::COUNT).contains(&policy.min_visible_joints) {
        return Err(invalid(
            "pose.min_visible_joints",
            format!("{} is outside 1..={}", policy.min_visible_joints, Joint::COUNT),
        ));
    }
    Ok(())
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::InvalidValue { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let configuration = Configuration::default();
        configuration.validate().unwrap();
        assert_eq!(configuration.timings.countdown(), Duration::from_secs(2));
        assert_eq!(configuration.frame_loop.frame_interval(), Duration::from_secs(1) / 30);
        assert_eq!(configuration.level().unwrap(), Level::INFO);
    }

    #[test]
    fn rolling_window_must_stay_in_range() {
        let mut configuration = Configuration::default();
        configuration.timings.rolling_ms = 4000;
        assert!(matches!(
            configuration.validate(),
            Err(ConfigError::InvalidValue {
                field: "timings.rolling_ms",
                ..
            })
        ));
        configuration.timings.rolling_ms = 1500;
        assert!(configuration.validate().is_ok());
    }

    #[test]
    fn bad_validator_tolerance_is_a_config_error() {
        let mut configuration = Configuration::default();
        configuration.validator.angle_tolerance = 45.0;
        assert!(matches!(
            configuration.validate(),
            Err(ConfigError::InvalidValue {
                field: "validator",
                ..
            })
        ));
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let configuration = Configuration {
            log_level: "chatty".to_string(),
            ..Configuration::default()
        };
        assert!(configuration.validate().is_err());
    }

    #[test]
    fn file_values_override_defaults() {
        let path = std::env::temp_dir().join(format!("fitness-dice-{}.json", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{ "seed": 7, "timings": {{ "countdown_ms": 3000 }}, "scoring": {{ "base_points": 20 }} }}"#
        )
        .unwrap();
        drop(file);

        let configuration = Configuration::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(configuration.seed, Some(7));
        assert_eq!(configuration.timings.countdown_ms, 3000);
        assert_eq!(configuration.timings.rolling_ms, 2500);
        assert_eq!(configuration.scoring.base_points, 20);
    }
}
