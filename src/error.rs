use thiserror::Error;

use crate::validation::ExerciseKind;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),
    #[error("Catalog Error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("Validator Error: {0}")]
    Validator(#[from] ValidatorError),
    #[error("Coordinator Error: {0}")]
    Coordinator(String),
    #[error("Failed to shut down the frame loop: {0}")]
    Shutdown(String),
}

// Configuration Error Type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog has {found} exercises, at least {required} are required")]
    TooFewExercises { found: usize, required: usize },
    #[error("Exercise '{0}' has no bound validator")]
    UnknownExercise(String),
    #[error("Exercise '{0}' is defined more than once")]
    DuplicateExercise(String),
    #[error("Exercise '{exercise}' has an invalid range: {reason}")]
    InvalidRange { exercise: String, reason: String },
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ValidatorError {
    #[error("Validator setting '{field}' out of range: {value}")]
    InvalidSettings { field: &'static str, value: f32 },
    #[error("Validator for {0} declares no required joints")]
    NoRequiredJoints(ExerciseKind),
}
