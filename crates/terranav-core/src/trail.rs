//! Per-step observation records — the sole artifact a run hands back.

use serde::{Deserialize, Serialize};
use terranav_logic::DetectMap;

/// One visited or considered cell: position, what the agent knew at that
/// moment, and the clock/energy readings. Entries are appended in strict
/// temporal order and the revealed set only ever grows within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailEntry {
    pub x: i64,
    pub y: i64,
    pub snapshot: DetectMap,
    pub time: u64,
    pub energy: f64,
}

impl TrailEntry {
    /// Pretty 3x3 neighbourhood of the entry position, for quick inspection.
    pub fn local_grid(&self) -> String {
        self.snapshot.local_window(self.x, self.y, 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_grid_centres_on_entry() {
        let mut snapshot = DetectMap::new(3, 3);
        snapshot.reveal(1, 1, 5.0);
        let entry = TrailEntry {
            x: 1,
            y: 1,
            snapshot,
            time: 0,
            energy: 10.0,
        };
        assert!(entry.local_grid().contains('x'));
    }
}
