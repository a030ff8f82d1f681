//! Tabular Q-learning strategy.
//!
//! Learns action values over a hashed state of position, offset to the
//! goal, and quantized energy. Selection is ε-greedy with multiplicative
//! decay per accepted step; illegal or blocked moves are punished in place
//! without advancing the state. The value table outlives individual runs
//! and can be persisted through [`crate::qtable`].
//!
//! Correctness here is about the learning mechanics — well-formed updates
//! and monotone ε decay — not about path quality.

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::brain::{Brain, RunOutcome};
use crate::context::{manhattan, Battery, SearchContext};
use crate::qtable::{QState, QTable, QTableError, ACTION_COUNT};

/// Hard ceiling on accepted-or-rejected steps per run. The strategy has no
/// termination guarantee of its own, so the ceiling is mandatory.
pub const DEFAULT_STEP_CEILING: u32 = 10_000;

/// Steps at the start of a run that force movement toward the goal when
/// legal, to avoid cold-start randomness.
const BOOTSTRAP_STEPS: u32 = 5;

const LEARNING_RATE: f64 = 0.1;
const DISCOUNT_FACTOR: f64 = 0.9;
const INITIAL_EPSILON: f64 = 0.5;
const EPSILON_FLOOR: f64 = 0.05;
const EPSILON_DECAY: f64 = 0.995;
const BLOCKED_PENALTY: f64 = -20.0;
const GOAL_BONUS: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
}

impl Action {
    pub const ALL: [Action; ACTION_COUNT] = [Action::Up, Action::Down, Action::Left, Action::Right];

    pub fn delta(self) -> (i64, i64) {
        match self {
            Action::Up => (-1, 0),
            Action::Down => (1, 0),
            Action::Left => (0, -1),
            Action::Right => (0, 1),
        }
    }

    pub fn index(self) -> usize {
        match self {
            Action::Up => 0,
            Action::Down => 1,
            Action::Left => 2,
            Action::Right => 3,
        }
    }
}

/// ε-greedy tabular Q-learner.
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    table: QTable,
    alpha: f64,
    gamma: f64,
    pub epsilon: f64,
}

impl QLearningAgent {
    pub fn new() -> Self {
        Self {
            table: QTable::new(),
            alpha: LEARNING_RATE,
            gamma: DISCOUNT_FACTOR,
            epsilon: INITIAL_EPSILON,
        }
    }

    pub fn with_table(table: QTable) -> Self {
        Self {
            table,
            ..Self::new()
        }
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    /// ε-greedy: explore uniformly with probability ε, otherwise take the
    /// highest-valued action (first index wins ties).
    pub fn choose_action(&self, state: &QState, rng: &mut impl Rng) -> Action {
        if rng.gen::<f64>() < self.epsilon {
            return Action::ALL[rng.gen_range(0..ACTION_COUNT)];
        }
        let values = self.table.values(state);
        let mut best = 0;
        for i in 1..ACTION_COUNT {
            if values[i] > values[best] {
                best = i;
            }
        }
        Action::ALL[best]
    }

    /// One-step temporal-difference update:
    /// `Q(s,a) += α * (r + γ * max_a' Q(s',a') − Q(s,a))`.
    pub fn learn(&mut self, state: QState, action: Action, reward: f64, next_state: QState) {
        let next_max = self
            .table
            .values(&next_state)
            .into_iter()
            .fold(f64::NEG_INFINITY, f64::max);
        let values = self.table.values_mut(state);
        let old = values[action.index()];
        values[action.index()] = old + self.alpha * (reward + self.gamma * next_max - old);
    }

    /// Multiplicative decay down to the exploration floor. Monotone.
    pub fn decay_epsilon(&mut self) {
        self.epsilon = (self.epsilon * EPSILON_DECAY).max(EPSILON_FLOOR);
    }
}

impl Default for QLearningAgent {
    fn default() -> Self {
        Self::new()
    }
}

pub struct RlBrain {
    ctx: SearchContext,
    agent: QLearningAgent,
    rng: StdRng,
    model_path: Option<PathBuf>,
    pub max_steps: u32,
}

impl RlBrain {
    pub fn new() -> Self {
        Self {
            ctx: SearchContext::new(),
            agent: QLearningAgent::new(),
            rng: StdRng::from_entropy(),
            model_path: None,
            max_steps: DEFAULT_STEP_CEILING,
        }
    }

    /// Deterministic exploration for training sweeps and tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ..Self::new()
        }
    }

    pub fn agent(&self) -> &QLearningAgent {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut QLearningAgent {
        &mut self.agent
    }

    /// Persist the value table here at the end of every run.
    pub fn set_model_path(&mut self, path: impl Into<PathBuf>) {
        self.model_path = Some(path.into());
    }

    /// Replace the value table from a saved model.
    pub fn load_table(&mut self, path: &Path) -> Result<(), QTableError> {
        self.agent.table = QTable::load_path(path)?;
        Ok(())
    }

    fn state_for(&self, pos: (i64, i64), goal: (i64, i64), energy: f64) -> QState {
        QState {
            x: pos.0,
            y: pos.1,
            dx_to_goal: goal.0 - pos.0,
            dy_to_goal: goal.1 - pos.1,
            energy_decile: (energy / 10.0).round() as i64,
        }
    }

    fn persist_table(&self) {
        if let Some(path) = &self.model_path {
            if let Err(err) = self.agent.table.save_path(path) {
                warn!("failed to persist q-table to {}: {err}", path.display());
            }
        }
    }
}

impl Default for RlBrain {
    fn default() -> Self {
        Self::new()
    }
}

impl Brain for RlBrain {
    fn context(&self) -> &SearchContext {
        &self.ctx
    }

    fn context_mut(&mut self) -> &mut SearchContext {
        &mut self.ctx
    }

    fn run(&mut self) -> RunOutcome {
        let Some(params) = self.ctx.begin_run() else {
            return RunOutcome::not_ready();
        };

        let (mut x, mut y) = params.start;
        let goal = params.goal;
        let mut battery = Battery::full(params.battery_capacity);
        let mut visited: HashSet<(i64, i64)> = HashSet::new();

        for step in 0..self.max_steps {
            self.ctx.reveal(x, y);
            visited.insert((x, y));

            if (x, y) == goal {
                self.persist_table();
                return RunOutcome::success("destination reached");
            }

            // Bootstrap: head straight for the goal while the table is
            // still cold. These forced moves are free and unlogged.
            if step < BOOTSTRAP_STEPS {
                if goal.0 > x && self.ctx.in_bounds(x + 1, y) && self.ctx.movable((x, y), (x + 1, y))
                {
                    x += 1;
                    continue;
                } else if goal.1 > y
                    && self.ctx.in_bounds(x, y + 1)
                    && self.ctx.movable((x, y), (x, y + 1))
                {
                    y += 1;
                    continue;
                }
            }

            let state = self.state_for((x, y), goal, battery.energy);
            let action = self.agent.choose_action(&state, &mut self.rng);
            let (dx, dy) = action.delta();
            let next = (x + dx, y + dy);

            if !self.ctx.in_bounds(next.0, next.1)
                || visited.contains(&next)
                || !self.ctx.movable((x, y), next)
            {
                // Punish in place; the state does not advance.
                self.agent.learn(state, action, BLOCKED_PENALTY, state);
                continue;
            }

            let cost = self.ctx.slope_cost((x, y), next);
            if battery.energy < cost as f64 {
                self.ctx.clock += battery.recharge_to_full(params.recharge_rate);
            }
            battery.energy -= cost as f64;
            self.ctx.clock += cost;

            let next_state = self.state_for(next, goal, battery.energy);

            let dist_before = manhattan((x, y), goal);
            let dist_after = manhattan(next, goal);
            let dot = dx * (goal.0 - x) + dy * (goal.1 - y);
            let mut reward = 10.0 * (dist_before - dist_after) as f64 + 10.0 * dot as f64
                - cost as f64
                + (100 - dist_after) as f64;
            if next == goal {
                reward += GOAL_BONUS;
            }

            self.agent.learn(state, action, reward, next_state);
            self.ctx.record(next.0, next.1, battery.energy);
            (x, y) = next;
            self.agent.decay_epsilon();
        }

        debug!("step ceiling {} reached without finding {goal:?}", self.max_steps);
        self.persist_table();
        RunOutcome::failure("destination not reached within the step ceiling")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terranav_logic::{Avatar, Task, TerrainGrid};

    #[test]
    fn test_learn_moves_value_toward_target() {
        let mut agent = QLearningAgent::new();
        let s = QState {
            x: 0,
            y: 0,
            dx_to_goal: 2,
            dy_to_goal: 2,
            energy_decile: 10,
        };
        agent.learn(s, Action::Down, 50.0, s);
        let q1 = agent.table().values(&s)[Action::Down.index()];
        assert!((q1 - 5.0).abs() < 1e-9); // α * reward on a zero table

        agent.learn(s, Action::Down, 50.0, s);
        let q2 = agent.table().values(&s)[Action::Down.index()];
        assert!(q2 > q1);
    }

    #[test]
    fn test_epsilon_decay_is_monotone_with_floor() {
        let mut agent = QLearningAgent::new();
        let mut last = agent.epsilon;
        for _ in 0..2000 {
            agent.decay_epsilon();
            assert!(agent.epsilon <= last);
            last = agent.epsilon;
        }
        assert!((agent.epsilon - EPSILON_FLOOR).abs() < 1e-12);
    }

    #[test]
    fn test_greedy_choice_picks_highest_value() {
        let mut agent = QLearningAgent::new();
        agent.epsilon = 0.0;
        let s = QState {
            x: 1,
            y: 1,
            dx_to_goal: 0,
            dy_to_goal: 3,
            energy_decile: 20,
        };
        agent.table.values_mut(s)[Action::Right.index()] = 9.0;
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(agent.choose_action(&s, &mut rng), Action::Right);
    }

    #[test]
    fn test_step_ceiling_bounds_failure() {
        // Start boxed in by impassable walls: every move is punished and
        // the run must stop at the ceiling rather than spin forever.
        let wall = 1000.0;
        let grid = TerrainGrid::from_rows(vec![
            vec![wall, wall, wall],
            vec![wall, 0.0, wall],
            vec![wall, wall, wall],
        ]);
        let mut brain = RlBrain::with_seed(1);
        brain.max_steps = 50;
        brain.set_original_map(grid);
        brain.set_avatar(Avatar::default_rover("r1"));
        brain.set_task(Task::new(1, 1, 0, 0)).unwrap();
        let outcome = brain.run();
        assert!(!outcome.success);
    }

    #[test]
    fn test_bootstrap_reaches_nearby_goal() {
        // Goal within bootstrap range: forced moves alone get there, with
        // no dependence on the (seeded) exploration policy.
        let mut brain = RlBrain::with_seed(42);
        brain.set_original_map(TerrainGrid::flat(6, 6, 0.0));
        brain.set_avatar(Avatar::default_rover("r1"));
        brain.set_task(Task::new(0, 0, 3, 0)).unwrap();
        let outcome = brain.run();
        assert!(outcome.success);
    }

    #[test]
    fn test_persists_table_on_completion() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.qt");

        let mut brain = RlBrain::with_seed(3);
        brain.set_model_path(&path);
        brain.set_original_map(TerrainGrid::flat(5, 5, 0.0));
        brain.set_avatar(Avatar::default_rover("r1"));
        brain.set_task(Task::new(0, 0, 2, 0)).unwrap();
        assert!(brain.run().success);
        assert!(path.exists());

        let mut fresh = RlBrain::new();
        fresh.load_table(&path).unwrap();
    }
}
