//! Elevation grids — the true terrain and the agent's partial working copy.
//!
//! `TerrainGrid` is the ground truth and never changes during a run.
//! `DetectMap` is what the agent actually knows: every cell starts out
//! undetected (`None`) and is filled in as sensors reveal terrain. The
//! numeric [`UNDETECTED`] sentinel exists only at the export edge, for
//! consumers that want a plain matrix.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Placeholder written into exported snapshots for cells the avatar has not
/// yet revealed. Far below any plausible elevation.
pub const UNDETECTED: f64 = -1.0e9;

/// Immutable rows × cols elevation matrix, row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainGrid {
    rows: usize,
    cols: usize,
    cells: Vec<f64>,
}

impl TerrainGrid {
    /// Build a grid from nested rows. Ragged input is truncated to the
    /// shortest row so the row-major indexing stays sound; no elevations are
    /// ever invented to pad a short row.
    pub fn from_rows(data: Vec<Vec<f64>>) -> Self {
        let rows = data.len();
        let cols = data.iter().map(Vec::len).min().unwrap_or(0);
        let cells = data
            .into_iter()
            .flat_map(|mut row| {
                row.truncate(cols);
                row
            })
            .collect();
        Self { rows, cols, cells }
    }

    /// A uniform grid, useful for tests and synthetic scenarios.
    pub fn flat(rows: usize, cols: usize, elevation: f64) -> Self {
        Self {
            rows,
            cols,
            cells: vec![elevation; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.rows && (y as usize) < self.cols
    }

    /// Elevation at `(x, y)`. Caller must ensure the cell is in bounds.
    pub fn get(&self, x: i64, y: i64) -> f64 {
        self.cells[x as usize * self.cols + y as usize]
    }
}

/// The agent's progressively revealed copy of the terrain.
///
/// `None` means the cell has never been inside the detection mask. Reveals
/// are monotonic: a revealed cell is never cleared except by [`DetectMap::clear`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectMap {
    rows: usize,
    cols: usize,
    cells: Vec<Option<f64>>,
}

impl DetectMap {
    /// An all-undetected map matching the given dimensions.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.rows && (y as usize) < self.cols
    }

    /// Known elevation at `(x, y)`, or `None` if out of bounds or undetected.
    pub fn get(&self, x: i64, y: i64) -> Option<f64> {
        if !self.in_bounds(x, y) {
            return None;
        }
        self.cells[x as usize * self.cols + y as usize]
    }

    /// Record the true elevation of a cell. Out-of-bounds reveals are ignored.
    pub fn reveal(&mut self, x: i64, y: i64, elevation: f64) {
        if self.in_bounds(x, y) {
            self.cells[x as usize * self.cols + y as usize] = Some(elevation);
        }
    }

    pub fn is_revealed(&self, x: i64, y: i64) -> bool {
        self.get(x, y).is_some()
    }

    pub fn revealed_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Coordinates of every revealed cell, row-major order.
    pub fn revealed_cells(&self) -> Vec<(i64, i64)> {
        let mut out = Vec::new();
        for x in 0..self.rows {
            for y in 0..self.cols {
                if self.cells[x * self.cols + y].is_some() {
                    out.push((x as i64, y as i64));
                }
            }
        }
        out
    }

    /// Reset every cell to undetected.
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Export as a plain matrix with [`UNDETECTED`] standing in for unknown
    /// cells. This is the only place the numeric sentinel leaks out.
    pub fn to_matrix(&self) -> Vec<Vec<f64>> {
        (0..self.rows)
            .map(|x| {
                (0..self.cols)
                    .map(|y| self.cells[x * self.cols + y].unwrap_or(UNDETECTED))
                    .collect()
            })
            .collect()
    }

    /// Render a `size` × `size` window centred on `(x, y)`: `x` marks the
    /// centre, `?` an undetected cell, blanks for out-of-bounds.
    pub fn local_window(&self, x: i64, y: i64, size: usize) -> String {
        let half = (size / 2) as i64;
        let mut out = String::new();
        for i in (x - half)..=(x + half) {
            for j in (y - half)..=(y + half) {
                let cell = if (i, j) == (x, y) {
                    "x".to_string()
                } else if !self.in_bounds(i, j) {
                    String::new()
                } else {
                    match self.get(i, j) {
                        Some(v) => format!("{}", v as i64),
                        None => "?".to_string(),
                    }
                };
                let _ = write!(out, "{cell:^5}");
            }
            out.push('\n');
        }
        out
    }
}
