//! Shared run state for every strategy: configuration, the working detect
//! map, the clock, and the trail.
//!
//! A `SearchContext` moves through four states: unconfigured → ready (map,
//! avatar and task all set) → running → terminal. `begin_run` gates entry to
//! running and hands the strategy a flattened bundle of the scalars it needs
//! so the borrow of `self` stays free for reveal/record calls.

use log::warn;

use terranav_logic::physics;
use terranav_logic::{Avatar, DetectMap, DetectionMask, Environment, Task, TerrainGrid};

use crate::error::ConfigError;
use crate::trail::TrailEntry;

/// The four axis-aligned step directions, in the canonical probe order.
pub const DIRECTIONS: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Manhattan distance between two cells.
pub fn manhattan(a: (i64, i64), b: (i64, i64)) -> i64 {
    (a.0 - b.0).abs() + (a.1 - b.1).abs()
}

/// Scalars a strategy needs for one run, copied out of the configuration.
#[derive(Debug, Clone, Copy)]
pub struct RunParams {
    pub start: (i64, i64),
    pub goal: (i64, i64),
    pub battery_capacity: f64,
    pub consumption_rate: f64,
    /// Recharge per tick, already scaled by light intensity.
    pub recharge_rate: f64,
    pub base_time: u64,
}

/// Energy store with the synchronous recharge-wait loop.
///
/// Recharging is a wait on the simulation clock, not wall-clock time: each
/// tick restores `recharge_rate` until the battery is full.
#[derive(Debug, Clone, Copy)]
pub struct Battery {
    pub energy: f64,
    pub capacity: f64,
}

impl Battery {
    pub fn full(capacity: f64) -> Self {
        Self {
            energy: capacity,
            capacity,
        }
    }

    /// Charge to capacity, returning the number of clock ticks spent waiting.
    pub fn recharge_to_full(&mut self, recharge_rate: f64) -> u64 {
        if recharge_rate <= 0.0 {
            // A non-positive rate would spin forever.
            warn!("recharge rate {recharge_rate} is not positive; forcing full charge");
            self.energy = self.capacity;
            return 0;
        }
        let mut ticks = 0;
        while self.energy < self.capacity {
            self.energy += recharge_rate;
            ticks += 1;
        }
        self.energy = self.capacity;
        ticks
    }
}

/// Run context shared by all strategies.
#[derive(Debug, Clone, Default)]
pub struct SearchContext {
    original_map: Option<TerrainGrid>,
    avatar: Option<Avatar>,
    task: Option<Task>,
    environment: Environment,
    mask: Option<DetectionMask>,
    max_slope: f64,
    detect_map: Option<DetectMap>,
    trail: Vec<TrailEntry>,
    pub clock: u64,
}

impl SearchContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_original_map(&mut self, grid: TerrainGrid) {
        self.detect_map = Some(DetectMap::new(grid.rows(), grid.cols()));
        self.original_map = Some(grid);
    }

    /// Store the avatar and regenerate the cached detection mask. The mask
    /// is rebuilt wholesale — it is never patched incrementally.
    pub fn set_avatar(&mut self, avatar: Avatar) {
        self.mask = Some(DetectionMask::generate(&avatar.sensors));
        self.avatar = Some(avatar);
    }

    /// Set the assignment, failing fast if either endpoint lies outside the
    /// configured grid.
    pub fn set_task(&mut self, task: Task) -> Result<(), ConfigError> {
        if let Some(grid) = &self.original_map {
            for (row, col) in [
                (task.start_row, task.start_col),
                (task.des_row, task.des_col),
            ] {
                if row >= grid.rows() || col >= grid.cols() {
                    return Err(ConfigError::TaskOutOfBounds {
                        row,
                        col,
                        rows: grid.rows(),
                        cols: grid.cols(),
                    });
                }
            }
        }
        self.task = Some(task);
        Ok(())
    }

    pub fn set_environment(&mut self, environment: Environment) {
        self.environment = environment;
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn task(&self) -> Option<&Task> {
        self.task.as_ref()
    }

    pub fn avatar(&self) -> Option<&Avatar> {
        self.avatar.as_ref()
    }

    pub fn is_ready_to_run(&self) -> bool {
        self.original_map.is_some() && self.avatar.is_some() && self.task.is_some()
    }

    /// Clear the trail, clock, and working detect map for reuse. The
    /// configuration (map, avatar, task, environment) is kept.
    pub fn reset(&mut self) {
        self.trail.clear();
        self.clock = 0;
        if let Some(map) = &mut self.detect_map {
            map.clear();
        }
    }

    /// Gate into the running state: `None` while not ready, otherwise reset
    /// working state, derive the climbing capability for the current
    /// environment, and hand back the per-run scalars.
    pub fn begin_run(&mut self) -> Option<RunParams> {
        if !self.is_ready_to_run() {
            return None;
        }
        self.reset();
        let avatar = self.avatar.as_ref()?;
        let task = self.task.as_ref()?;
        self.max_slope = avatar.max_slope(&self.environment);
        Some(RunParams {
            start: task.start(),
            goal: task.destination(),
            battery_capacity: avatar.battery_capacity,
            consumption_rate: avatar.battery_consumption_rate,
            recharge_rate: avatar.energy_recharge_rate * self.environment.light_intensity,
            base_time: avatar.base_time_per_grid(),
        })
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        self.original_map
            .as_ref()
            .is_some_and(|g| g.in_bounds(x, y))
    }

    /// Apply the detection mask at `(x, y)`, copying true elevations into
    /// the working map. No-op before configuration is complete.
    pub fn reveal(&mut self, x: i64, y: i64) {
        if let (Some(mask), Some(grid), Some(map)) =
            (&self.mask, &self.original_map, &mut self.detect_map)
        {
            mask.apply(map, grid, x, y);
        }
    }

    /// Append a trail entry snapshotting the current detect map.
    pub fn record(&mut self, x: i64, y: i64, energy: f64) {
        let snapshot = match &self.detect_map {
            Some(map) => map.clone(),
            None => DetectMap::new(0, 0),
        };
        self.trail.push(TrailEntry {
            x,
            y,
            snapshot,
            time: self.clock,
            energy,
        });
    }

    pub fn trail(&self) -> &[TrailEntry] {
        &self.trail
    }

    pub fn detect_map(&self) -> Option<&DetectMap> {
        self.detect_map.as_ref()
    }

    fn known(&self, pos: (i64, i64)) -> Option<f64> {
        self.detect_map.as_ref()?.get(pos.0, pos.1)
    }

    /// Movability on the *detect map*: a cell the agent has not revealed is
    /// never movable, matching the physical rule that the avatar cannot
    /// commit to terrain it has not seen.
    pub fn movable(&self, from: (i64, i64), to: (i64, i64)) -> bool {
        match (self.known(from), self.known(to)) {
            (Some(a), Some(b)) => physics::movable(a, b, self.max_slope),
            _ => false,
        }
    }

    /// Slope-scaled step time between two revealed cells.
    pub fn slope_cost(&self, from: (i64, i64), to: (i64, i64)) -> u64 {
        let base = self
            .avatar
            .as_ref()
            .map(|a| a.base_time_per_grid())
            .unwrap_or(1);
        let a = self.known(from).unwrap_or(0.0);
        let b = self.known(to).unwrap_or(a);
        physics::slope_scaled_cost(base, a, b)
    }

    /// Raw elevation delta between two revealed cells — the A* strategy's
    /// own edge cost.
    pub fn elevation_delta_cost(&self, from: (i64, i64), to: (i64, i64)) -> f64 {
        let a = self.known(from).unwrap_or(0.0);
        let b = self.known(to).unwrap_or(a);
        (a - b).abs()
    }
}
