//! Pure planning logic for TerraNav.
//!
//! This crate contains everything the exploration planner needs that is
//! independent of any strategy or run loop. Functions take plain data and
//! return results, making them unit-testable and portable.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`avatar`] | Rover descriptor, climbing capability, sensor binding |
//! | [`environment`] | Terrain friction, gravity, light intensity |
//! | [`grid`] | True elevation grid and the agent's partial working copy |
//! | [`physics`] | Movability predicate and slope-scaled step cost |
//! | [`sensor`] | Sensor descriptors and the cached detection mask |
//! | [`task`] | Start/destination assignment for a single run |

pub mod avatar;
pub mod environment;
pub mod grid;
pub mod physics;
pub mod sensor;
pub mod task;

pub use avatar::Avatar;
pub use environment::Environment;
pub use grid::{DetectMap, TerrainGrid, UNDETECTED};
pub use sensor::{DetectionMask, Sensor};
pub use task::Task;
