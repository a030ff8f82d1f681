//! Versioned persistence for the Q-learning value table.
//!
//! Uses bincode for compact binary serialization, with an explicit format
//! version checked on load. A missing or corrupt file surfaces as a typed
//! error — callers decide whether to start fresh, never this module.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;

/// Number of discrete actions the RL strategy can take (the four
/// axis-aligned moves); fixes the width of each table row.
pub const ACTION_COUNT: usize = 4;

/// Version number for the table file format (increment when it changes).
const QTABLE_VERSION: u32 = 1;

/// Hashed learning state: position, offset to the goal, and coarse energy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QState {
    pub x: i64,
    pub y: i64,
    pub dx_to_goal: i64,
    pub dy_to_goal: i64,
    /// Energy quantized to tens, so similar charge levels share estimates.
    pub energy_decile: i64,
}

/// Action-value table for the RL strategy. Persists across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QTable {
    entries: HashMap<QState, [f64; ACTION_COUNT]>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Action values for a state; unseen states read as all zeros.
    pub fn values(&self, state: &QState) -> [f64; ACTION_COUNT] {
        self.entries.get(state).copied().unwrap_or_default()
    }

    pub fn values_mut(&mut self, state: QState) -> &mut [f64; ACTION_COUNT] {
        self.entries.entry(state).or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn save_to<W: Write>(&self, writer: W) -> Result<(), QTableError> {
        let file = QTableFile {
            version: QTABLE_VERSION,
            entries: self.entries.iter().map(|(k, v)| (*k, *v)).collect(),
        };
        bincode::serialize_into(writer, &file)?;
        Ok(())
    }

    pub fn load_from<R: Read>(reader: R) -> Result<Self, QTableError> {
        let file: QTableFile = bincode::deserialize_from(reader)?;
        if file.version != QTABLE_VERSION {
            return Err(QTableError::VersionMismatch {
                expected: QTABLE_VERSION,
                found: file.version,
            });
        }
        Ok(Self {
            entries: file.entries.into_iter().collect(),
        })
    }

    pub fn save_path(&self, path: &Path) -> Result<(), QTableError> {
        self.save_to(BufWriter::new(File::create(path)?))
    }

    pub fn load_path(path: &Path) -> Result<Self, QTableError> {
        Self::load_from(BufReader::new(File::open(path)?))
    }
}

/// On-disk shape of the table.
#[derive(Serialize, Deserialize)]
struct QTableFile {
    version: u32,
    entries: Vec<(QState, [f64; ACTION_COUNT])>,
}

#[derive(Error, Debug)]
pub enum QTableError {
    #[error("q-table I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("q-table serialization error: {0}")]
    Serialization(#[from] bincode::Error),
    #[error("unsupported q-table version: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> QState {
        QState {
            x: 3,
            y: 4,
            dx_to_goal: 2,
            dy_to_goal: -1,
            energy_decile: 15,
        }
    }

    #[test]
    fn test_unseen_state_reads_zero() {
        let table = QTable::new();
        assert_eq!(table.values(&sample_state()), [0.0; ACTION_COUNT]);
    }

    #[test]
    fn test_round_trip_through_bytes() {
        let mut table = QTable::new();
        table.values_mut(sample_state())[2] = 7.5;

        let mut buf = Vec::new();
        table.save_to(&mut buf).unwrap();
        let loaded = QTable::load_from(buf.as_slice()).unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.qt");

        let mut table = QTable::new();
        table.values_mut(sample_state())[0] = -2.0;
        table.save_path(&path).unwrap();

        let loaded = QTable::load_path(&path).unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn test_missing_file_is_a_typed_error() {
        let err = QTable::load_path(Path::new("/nonexistent/model.qt")).unwrap_err();
        assert!(matches!(err, QTableError::Io(_)));
    }

    #[test]
    fn test_corrupt_file_is_a_typed_error() {
        let garbage = [0xde, 0xad, 0xbe, 0xef];
        assert!(QTable::load_from(&garbage[..]).is_err());
    }

    #[test]
    fn test_version_mismatch_is_rejected() {
        let file = QTableFile {
            version: QTABLE_VERSION + 1,
            entries: vec![],
        };
        let bytes = bincode::serialize(&file).unwrap();
        let err = QTable::load_from(bytes.as_slice()).unwrap_err();
        assert!(matches!(err, QTableError::VersionMismatch { .. }));
    }
}
