mod completion;
mod dice_roll;
mod rolling;
mod task_display;
mod task_executing;
mod waiting;

pub use completion::CompletionState;
pub use dice_roll::{hands_above_head, DiceRollState, DICE_ROLL_TIMEOUT_MESSAGE};
pub use rolling::{RollingState, ROLL_FAILED_MESSAGE};
pub use task_display::TaskDisplayState;
pub use task_executing::TaskExecutingState;
pub use waiting::{WaitingState, WAITING_STATUS};
