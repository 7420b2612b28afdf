use super::catalog::TaskPick;
use crate::error::ValidatorError;
use crate::validation::{ActionValidator, ExerciseKind, ValidatorSettings};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// An assigned exercise with its targets and a validator of its own.
/// Targets never change after creation; only the validator's phase moves.
pub struct TaskDescriptor {
    id: Uuid,
    exercise: ExerciseKind,
    name: String,
    reps_per_set: u32,
    total_sets: u32,
    validator: Box<dyn ActionValidator>,
    created_at: DateTime<Utc>,
    description: String,
}

/// Read-only view of a task for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSummary {
    pub id: Uuid,
    pub exercise: ExerciseKind,
    pub name: String,
    pub reps_per_set: u32,
    pub total_sets: u32,
    pub created_at: DateTime<Utc>,
    pub description: String,
}

impl TaskDescriptor {
    pub fn new(
        pick: TaskPick,
        settings: &ValidatorSettings,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidatorError> {
        let mut validator = pick.exercise.create_validator(settings)?;
        validator.reset();
        let description = format!(
            "{}: {} x {} reps",
            pick.name, pick.total_sets, pick.reps_per_set
        );
        Ok(Self {
            id: Uuid::new_v4(),
            exercise: pick.exercise,
            name: pick.name,
            reps_per_set: pick.reps_per_set,
            total_sets: pick.total_sets,
            validator,
            created_at,
            description,
        })
    }

    /// Replaces the random id, e.g. with one drawn from a seeded generator.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn exercise(&self) -> ExerciseKind {
        self.exercise
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reps_per_set(&self) -> u32 {
        self.reps_per_set
    }

    pub fn total_sets(&self) -> u32 {
        self.total_sets
    }

    pub fn target_reps(&self) -> u32 {
        self.reps_per_set * self.total_sets
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn validator(&self) -> &dyn ActionValidator {
        self.validator.as_ref()
    }

    pub fn validator_mut(&mut self) -> &mut dyn ActionValidator {
        self.validator.as_mut()
    }

    pub fn summary(&self) -> TaskSummary {
        TaskSummary {
            id: self.id,
            exercise: self.exercise,
            name: self.name.clone(),
            reps_per_set: self.reps_per_set,
            total_sets: self.total_sets,
            created_at: self.created_at,
            description: self.description.clone(),
        }
    }
}

impl fmt::Debug for TaskDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskDescriptor")
            .field("id", &self.id)
            .field("exercise", &self.exercise)
            .field("reps_per_set", &self.reps_per_set)
            .field("total_sets", &self.total_sets)
            .field("phase", &self.validator.phase())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pick() -> TaskPick {
        TaskPick {
            exercise: ExerciseKind::JumpingJack,
            name: "Jumping Jack".to_string(),
            reps_per_set: 12,
            total_sets: 2,
        }
    }

    #[test]
    fn descriptor_binds_a_fresh_validator() {
        let settings = ValidatorSettings::default();
        let task = TaskDescriptor::new(pick(), &settings, DateTime::<Utc>::UNIX_EPOCH).unwrap();
        assert_eq!(task.validator().exercise(), ExerciseKind::JumpingJack);
        assert_eq!(task.validator().phase(), "closed");
        assert_eq!(task.description(), "Jumping Jack: 2 x 12 reps");
        assert_eq!(task.target_reps(), 24);
    }

    #[test]
    fn every_task_gets_its_own_id() {
        let settings = ValidatorSettings::default();
        let a = TaskDescriptor::new(pick(), &settings, Utc::now()).unwrap();
        let b = TaskDescriptor::new(pick(), &settings, Utc::now()).unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.summary().exercise, b.summary().exercise);
    }
}
