pub mod common;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod game;
pub mod source;
pub mod task;
pub mod validation;

pub use config::Configuration;
pub use coordinator::{Coordinator, CoordinatorBuilder};
pub use error::{AppError, CatalogError, ConfigError, ValidatorError};
pub use game::{GameSnapshot, GameStateKind, GameStateMachine};
