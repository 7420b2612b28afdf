use super::burpee::BurpeeValidator;
use super::high_knees::HighKneesValidator;
use super::jumping_jack::JumpingJackValidator;
use super::lunge::LungeValidator;
use super::mountain_climber::MountainClimberValidator;
use super::plank::PlankValidator;
use super::pushup::PushupValidator;
use super::russian_twist::RussianTwistValidator;
use super::situp::SitupValidator;
use super::squat::SquatValidator;
use super::{ActionValidator, ValidatorSettings};
use crate::error::ValidatorError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every exercise the game knows how to judge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseKind {
    Squat,
    Pushup,
    Lunge,
    JumpingJack,
    Plank,
    HighKnees,
    Situp,
    MountainClimber,
    RussianTwist,
    Burpee,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 10] = [
        ExerciseKind::Squat,
        ExerciseKind::Pushup,
        ExerciseKind::Lunge,
        ExerciseKind::JumpingJack,
        ExerciseKind::Plank,
        ExerciseKind::HighKnees,
        ExerciseKind::Situp,
        ExerciseKind::MountainClimber,
        ExerciseKind::RussianTwist,
        ExerciseKind::Burpee,
    ];

    /// Stable identifier used by the task catalog
    pub fn id(self) -> &'static str {
        match self {
            ExerciseKind::Squat => "squat",
            ExerciseKind::Pushup => "pushup",
            ExerciseKind::Lunge => "lunge",
            ExerciseKind::JumpingJack => "jumping_jack",
            ExerciseKind::Plank => "plank",
            ExerciseKind::HighKnees => "high_knees",
            ExerciseKind::Situp => "situp",
            ExerciseKind::MountainClimber => "mountain_climber",
            ExerciseKind::RussianTwist => "russian_twist",
            ExerciseKind::Burpee => "burpee",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ExerciseKind::Squat => "Squat",
            ExerciseKind::Pushup => "Push-up",
            ExerciseKind::Lunge => "Lunge",
            ExerciseKind::JumpingJack => "Jumping Jack",
            ExerciseKind::Plank => "Plank",
            ExerciseKind::HighKnees => "High Knees",
            ExerciseKind::Situp => "Sit-up",
            ExerciseKind::MountainClimber => "Mountain Climber",
            ExerciseKind::RussianTwist => "Russian Twist",
            ExerciseKind::Burpee => "Burpee",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.id() == id)
    }

    /// Builds a fresh validator and checks that it declares its joints.
    pub fn create_validator(
        self,
        settings: &ValidatorSettings,
    ) -> Result<Box<dyn ActionValidator>, ValidatorError> {
        settings.validate()?;
        let settings = settings.clone();
        let validator: Box<dyn ActionValidator> = match self {
            ExerciseKind::Squat => Box::new(SquatValidator::new(settings)),
            ExerciseKind::Pushup => Box::new(PushupValidator::new(settings)),
            ExerciseKind::Lunge => Box::new(LungeValidator::new(settings)),
            ExerciseKind::JumpingJack => Box::new(JumpingJackValidator::new(settings)),
            ExerciseKind::Plank => Box::new(PlankValidator::new(settings)),
            ExerciseKind::HighKnees => Box::new(HighKneesValidator::new(settings)),
            ExerciseKind::Situp => Box::new(SitupValidator::new(settings)),
            ExerciseKind::MountainClimber => Box::new(MountainClimberValidator::new(settings)),
            ExerciseKind::RussianTwist => Box::new(RussianTwistValidator::new(settings)),
            ExerciseKind::Burpee => Box::new(BurpeeValidator::new(settings)),
        };
        if validator.required_joints().is_empty() {
            return Err(ValidatorError::NoRequiredJoints(self));
        }
        Ok(validator)
    }

    /// Startup check that every exercise can be bound to a validator.
    pub fn verify_all(settings: &ValidatorSettings) -> Result<(), ValidatorError> {
        for kind in Self::ALL {
            kind.create_validator(settings)?;
        }
        Ok(())
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique_and_resolve() {
        let ids: HashSet<&str> = ExerciseKind::ALL.iter().map(|k| k.id()).collect();
        assert_eq!(ids.len(), ExerciseKind::ALL.len());
        for kind in ExerciseKind::ALL {
            assert_eq!(ExerciseKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(ExerciseKind::from_id("yoga"), None);
    }

    #[test]
    fn every_kind_binds_a_validator() {
        let settings = ValidatorSettings::default();
        ExerciseKind::verify_all(&settings).unwrap();
        for kind in ExerciseKind::ALL {
            let validator = kind.create_validator(&settings).unwrap();
            assert_eq!(validator.exercise(), kind);
        }
    }

    #[test]
    fn invalid_settings_block_construction() {
        let settings = ValidatorSettings {
            angle_tolerance: 2.0,
            ..ValidatorSettings::default()
        };
        assert!(ExerciseKind::Squat.create_validator(&settings).is_err());
    }
}
