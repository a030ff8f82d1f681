//! TerraNav planning engine.
//!
//! Drives an exploration avatar across a partially observable elevation grid
//! under energy constraints, using one of four pluggable search strategies
//! (greedy, adjacency-constrained A*, heuristic DFS, tabular Q-learning).
//! Each run produces an ordered trail of per-step observations plus a
//! success flag; terrain loading, persistence of avatar definitions, and all
//! rendering live in external collaborators.

pub mod brain;
pub mod context;
pub mod error;
pub mod qtable;
pub mod simulator;
pub mod trail;

pub use brain::{Brain, BrainKind, RunOutcome};
pub use context::{Battery, SearchContext};
pub use error::ConfigError;
pub use simulator::Simulator;
pub use trail::TrailEntry;
