pub mod catalog;
pub mod descriptor;
pub mod progress;

pub use catalog::{Difficulty, ExerciseDefinition, TaskCatalog, TaskPick};
pub use descriptor::{TaskDescriptor, TaskSummary};
pub use progress::ProgressTracker;
