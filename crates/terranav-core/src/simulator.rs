//! Simulation façade: owns the configuration, builds and swaps strategies,
//! and replays results.
//!
//! The simulator is the one type external callers need. Configuration set
//! before a strategy is chosen is carried into the new brain on
//! [`Simulator::set_brain`], so the order of setup calls does not matter.

use log::warn;
use std::fmt::Write as _;

use terranav_logic::{Avatar, Environment, Task, TerrainGrid};

use crate::brain::{Brain, BrainKind, RunOutcome};
use crate::error::ConfigError;
use crate::trail::TrailEntry;

pub struct Simulator {
    map: Option<TerrainGrid>,
    avatar: Option<Avatar>,
    environment: Environment,
    task: Option<Task>,
    brain: Option<Box<dyn Brain>>,
    result: Option<RunOutcome>,
}

impl Simulator {
    pub fn new() -> Self {
        Self {
            map: None,
            avatar: None,
            environment: Environment::default(),
            task: None,
            brain: None,
            result: None,
        }
    }

    /// Names accepted by [`Simulator::set_brain_by_name`].
    pub fn brain_names() -> Vec<&'static str> {
        BrainKind::ALL.iter().map(|k| k.name()).collect()
    }

    pub fn set_map(&mut self, map: TerrainGrid) {
        if let Some(brain) = &mut self.brain {
            brain.set_original_map(map.clone());
        }
        self.map = Some(map);
    }

    pub fn set_avatar(&mut self, avatar: Avatar) {
        if let Some(brain) = &mut self.brain {
            brain.set_avatar(avatar.clone());
        }
        self.avatar = Some(avatar);
    }

    pub fn set_environment(&mut self, environment: Environment) {
        if let Some(brain) = &mut self.brain {
            brain.set_environment(environment);
        }
        self.environment = environment;
    }

    /// Set the assignment by its four coordinates, validating both endpoints
    /// against the configured map.
    pub fn set_task(
        &mut self,
        start_row: usize,
        start_col: usize,
        des_row: usize,
        des_col: usize,
    ) -> Result<(), ConfigError> {
        let task = Task::new(start_row, start_col, des_row, des_col);
        if let Some(map) = &self.map {
            for (row, col) in [(start_row, start_col), (des_row, des_col)] {
                if row >= map.rows() || col >= map.cols() {
                    return Err(ConfigError::TaskOutOfBounds {
                        row,
                        col,
                        rows: map.rows(),
                        cols: map.cols(),
                    });
                }
            }
        }
        if let Some(brain) = &mut self.brain {
            brain.set_task(task)?;
        }
        self.task = Some(task);
        Ok(())
    }

    /// Install a strategy, carrying every piece of configuration set so far
    /// into it. Replaces any previous brain and clears the last result.
    pub fn set_brain(&mut self, kind: BrainKind) -> Result<(), ConfigError> {
        let mut brain = kind.build();
        if let Some(map) = &self.map {
            brain.set_original_map(map.clone());
        }
        if let Some(avatar) = &self.avatar {
            brain.set_avatar(avatar.clone());
        }
        brain.set_environment(self.environment);
        if let Some(task) = self.task {
            brain.set_task(task)?;
        }
        self.brain = Some(brain);
        self.result = None;
        Ok(())
    }

    pub fn set_brain_by_name(&mut self, name: &str) -> Result<(), ConfigError> {
        let kind = BrainKind::from_name(name).ok_or_else(|| ConfigError::UnknownBrain {
            name: name.to_string(),
        })?;
        self.set_brain(kind)
    }

    pub fn is_ready_to_run(&self) -> bool {
        self.brain.as_ref().is_some_and(|b| b.is_ready_to_run())
    }

    /// Execute one run with the installed strategy. `None` when no brain is
    /// installed or the configuration is incomplete.
    pub fn run(&mut self) -> Option<&RunOutcome> {
        let Some(brain) = &mut self.brain else {
            warn!("run requested with no strategy installed");
            return None;
        };
        if !brain.is_ready_to_run() {
            warn!("run requested before map, avatar, and task were all set");
            return None;
        }
        self.result = Some(brain.run());
        self.result.as_ref()
    }

    pub fn result(&self) -> Option<&RunOutcome> {
        self.result.as_ref()
    }

    pub fn trail(&self) -> &[TrailEntry] {
        self.brain.as_ref().map(|b| b.get_trail()).unwrap_or(&[])
    }

    /// Render the full trail as text: one block per entry with position,
    /// clock, and energy readings followed by the known-terrain matrix.
    /// Undetected cells print as `*` and the current position is wrapped in
    /// parentheses.
    pub fn render_trail_text(&self) -> String {
        let mut out = String::new();
        for entry in self.trail() {
            let _ = writeln!(
                out,
                "Avatar Position: ({}, {}) | Time: {} | Energy: {}",
                entry.x, entry.y, entry.time, entry.energy
            );
            for i in 0..entry.snapshot.rows() {
                for j in 0..entry.snapshot.cols() {
                    let cell = match entry.snapshot.get(i as i64, j as i64) {
                        Some(v) if (i as i64, j as i64) == (entry.x, entry.y) => {
                            format!("({v})")
                        }
                        Some(v) => format!("{v}"),
                        None if (i as i64, j as i64) == (entry.x, entry.y) => "(*)".to_string(),
                        None => "*".to_string(),
                    };
                    let _ = write!(out, "{cell:>8}");
                }
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(kind: BrainKind) -> Simulator {
        let mut sim = Simulator::new();
        sim.set_map(TerrainGrid::flat(6, 6, 2.0));
        sim.set_avatar(Avatar::default_rover("r1"));
        sim.set_task(0, 0, 5, 5).unwrap();
        sim.set_brain(kind).unwrap();
        sim
    }

    #[test]
    fn test_run_without_brain_returns_none() {
        let mut sim = Simulator::new();
        sim.set_map(TerrainGrid::flat(4, 4, 0.0));
        assert!(sim.run().is_none());
    }

    #[test]
    fn test_run_without_task_returns_none() {
        let mut sim = Simulator::new();
        sim.set_map(TerrainGrid::flat(4, 4, 0.0));
        sim.set_avatar(Avatar::default_rover("r1"));
        sim.set_brain(BrainKind::Greedy).unwrap();
        assert!(sim.run().is_none());
    }

    #[test]
    fn test_configuration_set_before_brain_carries_over() {
        let mut sim = configured(BrainKind::Greedy);
        assert!(sim.is_ready_to_run());
        let outcome = sim.run().unwrap();
        assert!(outcome.success);
        assert!(!sim.trail().is_empty());
    }

    #[test]
    fn test_configuration_set_after_brain_reaches_it() {
        let mut sim = Simulator::new();
        sim.set_brain(BrainKind::Greedy).unwrap();
        sim.set_map(TerrainGrid::flat(5, 5, 0.0));
        sim.set_avatar(Avatar::default_rover("r1"));
        sim.set_task(0, 0, 4, 4).unwrap();
        assert!(sim.run().unwrap().success);
    }

    #[test]
    fn test_swapping_brain_keeps_configuration() {
        let mut sim = configured(BrainKind::Greedy);
        assert!(sim.run().unwrap().success);
        sim.set_brain(BrainKind::Dfs).unwrap();
        assert!(sim.result().is_none());
        assert!(sim.run().unwrap().success);
    }

    #[test]
    fn test_task_out_of_bounds_is_rejected() {
        let mut sim = Simulator::new();
        sim.set_map(TerrainGrid::flat(4, 4, 0.0));
        let err = sim.set_task(0, 0, 4, 0).unwrap_err();
        assert!(matches!(err, ConfigError::TaskOutOfBounds { row: 4, .. }));
    }

    #[test]
    fn test_unknown_brain_name_is_rejected() {
        let mut sim = Simulator::new();
        let err = sim.set_brain_by_name("dijkstra").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownBrain { .. }));
        assert!(sim.set_brain_by_name("astar").is_ok());
    }

    #[test]
    fn test_brain_names_cover_all_kinds() {
        assert_eq!(Simulator::brain_names(), vec!["greedy", "astar", "dfs", "rl"]);
    }

    #[test]
    fn test_render_trail_text_marks_position_and_unknowns() {
        let mut sim = configured(BrainKind::Greedy);
        sim.run();
        let text = sim.render_trail_text();
        assert!(text.contains("Avatar Position: (0, 0)"));
        assert!(text.contains('*'));
        assert!(text.contains("(2)"));
    }
}
