//! The game flow: six states driven one frame at a time by
//! [`GameStateMachine`], all sharing one [`GameContext`].

pub mod context;
pub mod machine;
pub mod state;
pub mod states;
pub mod telemetry;

pub use context::{GameContext, GameSnapshot, ProgressSnapshot, TaskOutcome};
pub use machine::{GameStateMachine, GameStateMachineBuilder};
pub use state::{GameState, GameStateKind, StateTransition};
pub use telemetry::{
    FrameTiming, GameObserver, ObserverSet, PerformanceMonitor, PerformanceStats, StateStats,
    TransitionEvent, TransitionHistory, TransitionLog,
};
