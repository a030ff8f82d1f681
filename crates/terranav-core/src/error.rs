//! Configuration errors surfaced before a run starts.
//!
//! In-domain search failures (unreachable destination, exhausted frontier)
//! are never errors — they come back as unsuccessful [`crate::RunOutcome`]s
//! with the partial trail preserved.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("task coordinate ({row}, {col}) outside grid bounds {rows}x{cols}")]
    TaskOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("unknown brain name {name:?}")]
    UnknownBrain { name: String },
}
