use crate::error::CatalogError;
use crate::validation::ExerciseKind;
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;
use tracing::info;

pub const MIN_CATALOG_SIZE: usize = 10;
pub const REPS_RANGE: RangeInclusive<u32> = 5..=20;
pub const SETS_RANGE: RangeInclusive<u32> = 1..=3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// One catalog entry as it appears in the exercise file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDefinition {
    pub id: String,
    pub name: String,
    pub min_reps: u32,
    pub max_reps: u32,
    pub min_sets: u32,
    pub max_sets: u32,
    pub difficulty: Difficulty,
}

impl ExerciseDefinition {
    pub fn new(
        kind: ExerciseKind,
        reps: RangeInclusive<u32>,
        sets: RangeInclusive<u32>,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            id: kind.id().to_string(),
            name: kind.display_name().to_string(),
            min_reps: *reps.start(),
            max_reps: *reps.end(),
            min_sets: *sets.start(),
            max_sets: *sets.end(),
            difficulty,
        }
    }

    pub fn kind(&self) -> Option<ExerciseKind> {
        ExerciseKind::from_id(&self.id)
    }

    fn validate(&self) -> Result<ExerciseKind, CatalogError> {
        let kind = self
            .kind()
            .ok_or_else(|| CatalogError::UnknownExercise(self.id.clone()))?;
        let invalid = |reason: String| CatalogError::InvalidRange {
            exercise: self.id.clone(),
            reason,
        };
        if self.name.trim().is_empty() {
            return Err(invalid("name is empty".to_string()));
        }
        if self.min_reps > self.max_reps {
            return Err(invalid(format!("reps {}-{} are reversed", self.min_reps, self.max_reps)));
        }
        if !REPS_RANGE.contains(&self.min_reps) || !REPS_RANGE.contains(&self.max_reps) {
            return Err(invalid(format!(
                "reps {}-{} outside {:?}",
                self.min_reps, self.max_reps, REPS_RANGE
            )));
        }
        if self.min_sets > self.max_sets {
            return Err(invalid(format!("sets {}-{} are reversed", self.min_sets, self.max_sets)));
        }
        if !SETS_RANGE.contains(&self.min_sets) || !SETS_RANGE.contains(&self.max_sets) {
            return Err(invalid(format!(
                "sets {}-{} outside {:?}",
                self.min_sets, self.max_sets, SETS_RANGE
            )));
        }
        Ok(kind)
    }
}

/// A random draw from the catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskPick {
    pub exercise: ExerciseKind,
    pub name: String,
    pub reps_per_set: u32,
    pub total_sets: u32,
}

/// Validated set of exercises the dice can land on. Insertion order is kept so
/// seeded picks are reproducible.
#[derive(Debug, Clone)]
pub struct TaskCatalog {
    exercises: IndexMap<String, ExerciseDefinition>,
}

impl TaskCatalog {
    pub fn new(definitions: Vec<ExerciseDefinition>) -> Result<Self, CatalogError> {
        let mut exercises = IndexMap::with_capacity(definitions.len());
        for definition in definitions {
            definition.validate()?;
            if exercises.contains_key(&definition.id) {
                return Err(CatalogError::DuplicateExercise(definition.id));
            }
            exercises.insert(definition.id.clone(), definition);
        }
        if exercises.len() < MIN_CATALOG_SIZE {
            return Err(CatalogError::TooFewExercises {
                found: exercises.len(),
                required: MIN_CATALOG_SIZE,
            });
        }
        Ok(Self { exercises })
    }

    /// The ten exercises with their default ranges
    pub fn builtin() -> Self {
        use Difficulty::*;
        use ExerciseKind::*;
        let definitions = [
            ExerciseDefinition::new(Squat, 8..=15, 1..=3, Medium),
            ExerciseDefinition::new(Pushup, 5..=12, 1..=3, Hard),
            ExerciseDefinition::new(Lunge, 6..=12, 1..=2, Medium),
            ExerciseDefinition::new(JumpingJack, 10..=20, 1..=3, Easy),
            ExerciseDefinition::new(Plank, 10..=20, 1..=2, Medium),
            ExerciseDefinition::new(HighKnees, 10..=20, 1..=3, Easy),
            ExerciseDefinition::new(Situp, 5..=15, 1..=3, Medium),
            ExerciseDefinition::new(MountainClimber, 8..=16, 1..=2, Hard),
            ExerciseDefinition::new(RussianTwist, 8..=16, 1..=3, Medium),
            ExerciseDefinition::new(Burpee, 5..=10, 1..=2, Hard),
        ];
        Self {
            exercises: definitions
                .into_iter()
                .map(|definition| (definition.id.clone(), definition))
                .collect(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let definitions: Vec<ExerciseDefinition> = serde_json::from_str(json)?;
        Self::new(definitions)
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&contents)?;
        info!("Loaded {} exercises from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// File catalog when a path is configured, built-in otherwise
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => Self::load_json(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ExerciseDefinition> {
        self.exercises.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.exercises.keys().map(String::as_str)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &ExerciseDefinition> {
        self.exercises.values()
    }

    pub fn by_difficulty(&self, difficulty: Difficulty) -> Vec<&ExerciseDefinition> {
        self.exercises
            .values()
            .filter(|definition| definition.difficulty == difficulty)
            .collect()
    }

    /// Display name at `index`, wrapping around the catalog
    pub fn name_at(&self, index: usize) -> &str {
        self.exercises
            .get_index(index % self.exercises.len().max(1))
            .map(|(_, definition)| definition.name.as_str())
            .unwrap_or_default()
    }

    /// Uniform exercise, then uniform reps and sets within its ranges.
    pub fn pick(&self, rng: &mut StdRng) -> Option<TaskPick> {
        if self.exercises.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.exercises.len());
        let (_, definition) = self.exercises.get_index(index)?;
        Some(TaskPick {
            exercise: definition.kind()?,
            name: definition.name.clone(),
            reps_per_set: rng.random_range(definition.min_reps..=definition.max_reps),
            total_sets: rng.random_range(definition.min_sets..=definition.max_sets),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn builtin_definitions() -> Vec<ExerciseDefinition> {
        TaskCatalog::builtin().definitions().cloned().collect()
    }

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = TaskCatalog::new(builtin_definitions()).unwrap();
        assert_eq!(catalog.len(), 10);
        for kind in ExerciseKind::ALL {
            assert!(catalog.get(kind.id()).is_some(), "{kind} missing");
        }
        assert_eq!(catalog.by_difficulty(Difficulty::Hard).len(), 3);
    }

    #[test]
    fn too_few_exercises_is_rejected() {
        let mut definitions = builtin_definitions();
        definitions.truncate(9);
        assert!(matches!(
            TaskCatalog::new(definitions),
            Err(CatalogError::TooFewExercises { found: 9, required: 10 })
        ));
    }

    #[test]
    fn unbound_and_duplicate_ids_are_rejected() {
        let mut definitions = builtin_definitions();
        definitions[0].id = "yoga".to_string();
        assert!(matches!(
            TaskCatalog::new(definitions),
            Err(CatalogError::UnknownExercise(id)) if id == "yoga"
        ));

        let mut definitions = builtin_definitions();
        definitions.push(definitions[0].clone());
        assert!(matches!(
            TaskCatalog::new(definitions),
            Err(CatalogError::DuplicateExercise(_))
        ));
    }

    #[test]
    fn out_of_range_targets_are_rejected() {
        let mut definitions = builtin_definitions();
        definitions[1].max_reps = 25;
        assert!(matches!(
            TaskCatalog::new(definitions),
            Err(CatalogError::InvalidRange { .. })
        ));

        let mut definitions = builtin_definitions();
        definitions[2].min_sets = 3;
        definitions[2].max_sets = 2;
        assert!(TaskCatalog::new(definitions).is_err());
    }

    #[test]
    fn json_catalog_round_trips_through_serde() {
        let json = serde_json::to_string(&builtin_definitions()).unwrap();
        let catalog = TaskCatalog::from_json_str(&json).unwrap();
        let builtin = TaskCatalog::builtin();
        assert!(catalog.ids().eq(builtin.ids()));
        assert!(matches!(
            TaskCatalog::from_json_str("{\"id\": 1}"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn seeded_picks_are_reproducible_and_in_range() {
        let catalog = TaskCatalog::builtin();
        let mut first = StdRng::seed_from_u64(42);
        let mut second = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let pick = catalog.pick(&mut first).unwrap();
            assert_eq!(Some(&pick), catalog.pick(&mut second).as_ref());
            let definition = catalog.get(pick.exercise.id()).unwrap();
            assert!((definition.min_reps..=definition.max_reps).contains(&pick.reps_per_set));
            assert!((definition.min_sets..=definition.max_sets).contains(&pick.total_sets));
        }
    }

    #[test]
    fn names_wrap_around() {
        let catalog = TaskCatalog::builtin();
        assert_eq!(catalog.name_at(0), "Squat");
        assert_eq!(catalog.name_at(10), "Squat");
        assert_eq!(catalog.name_at(1), "Push-up");
    }
}
