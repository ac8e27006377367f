//! Headless Snake simulation
//!
//! This module holds the grid, the snake and the engine that advances them.
//! It has no I/O or rendering dependencies; the play loop drives it one tick
//! at a time and feeds its state to the decision pipeline in [`crate::anton`].

pub mod action;
pub mod config;
pub mod engine;
pub mod state;

// Re-export commonly used types
pub use action::{Heading, RelativeDirection};
pub use config::GameConfig;
pub use engine::{GameEngine, Outcome, StepResult, Termination};
pub use state::{AgentState, GameState, Grid, GridNode, Occupant, Position, Snake};
