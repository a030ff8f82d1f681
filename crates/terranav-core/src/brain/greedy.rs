//! Greedy strategy: always press toward the goal, backtrack via a parent
//! stack when boxed in. Fast and frugal, not optimal.

use std::collections::HashSet;

use crate::brain::{Brain, RunOutcome};
use crate::context::{Battery, SearchContext, DIRECTIONS};

pub struct GreedyBrain {
    ctx: SearchContext,
}

impl GreedyBrain {
    pub fn new() -> Self {
        Self {
            ctx: SearchContext::new(),
        }
    }

    /// Pick the next cell from `(x, y)`:
    /// 1. the cheaper of the axis-aligned main directions toward the goal,
    ///    if any is in bounds, unvisited, and movable;
    /// 2. otherwise any other unvisited movable neighbour that is not the
    ///    parent;
    /// 3. otherwise pop the parent stack (backtrack).
    ///
    /// Returns the current position when there is nowhere left to go.
    fn choose_step(
        &self,
        x: i64,
        y: i64,
        goal: (i64, i64),
        visited: &HashSet<(i64, i64)>,
        parents: &mut Vec<(i64, i64)>,
    ) -> (i64, i64) {
        let parent = parents.last().copied().unwrap_or((x, y));

        let main_dx = (goal.0 - x).signum();
        let main_dy = (goal.1 - y).signum();
        let mut best: Option<((i64, i64), u64)> = None;
        for (dx, dy) in [(main_dx, 0), (0, main_dy)] {
            if (dx, dy) == (0, 0) {
                continue;
            }
            let next = (x + dx, y + dy);
            if self.ctx.in_bounds(next.0, next.1)
                && !visited.contains(&next)
                && self.ctx.movable((x, y), next)
            {
                let cost = self.ctx.slope_cost((x, y), next);
                if best.map_or(true, |(_, c)| cost < c) {
                    best = Some((next, cost));
                }
            }
        }
        if let Some((next, _)) = best {
            return next;
        }

        for (dx, dy) in DIRECTIONS {
            let next = (x + dx, y + dy);
            if next != parent
                && self.ctx.in_bounds(next.0, next.1)
                && !visited.contains(&next)
                && self.ctx.movable((x, y), next)
            {
                return next;
            }
        }

        parents.pop().unwrap_or(parent)
    }
}

impl Default for GreedyBrain {
    fn default() -> Self {
        Self::new()
    }
}

impl Brain for GreedyBrain {
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
        // Flat drain per accepted move, regardless of slope.
        let drain = params.consumption_rate * 10.0;

        let mut parents: Vec<(i64, i64)> = Vec::new();
        let mut visited: HashSet<(i64, i64)> = HashSet::new();

        while (x, y) != goal {
            self.ctx.reveal(x, y);
            visited.insert((x, y));
            self.ctx.record(x, y, battery.energy);

            let parent = parents.last().copied().unwrap_or((x, y));
            let next = self.choose_step(x, y, goal, &visited, &mut parents);
            if next == (x, y) {
                // Nowhere to go and nothing left to unwind.
                break;
            }

            if drain > battery.energy {
                self.ctx.clock += battery.recharge_to_full(params.recharge_rate);
            }
            battery.energy -= drain;
            self.ctx.clock += self.ctx.slope_cost((x, y), next);

            // Backtracking pops the stack in choose_step; only forward moves
            // push the position we are leaving.
            if next != parent {
                parents.push((x, y));
            }
            (x, y) = next;
        }

        if (x, y) == goal {
            self.ctx.record(x, y, battery.energy);
            RunOutcome::success("destination reached")
        } else {
            RunOutcome::failure("destination unreachable: no moves left and parent stack empty")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terranav_logic::{Avatar, Task, TerrainGrid};

    fn flat_brain(rows: usize, cols: usize, task: Task) -> GreedyBrain {
        let mut brain = GreedyBrain::new();
        brain.set_original_map(TerrainGrid::flat(rows, cols, 5.0));
        brain.set_avatar(Avatar::default_rover("r1"));
        brain.set_task(task).unwrap();
        brain
    }

    #[test]
    fn test_flat_grid_direct_path() {
        let mut brain = flat_brain(10, 10, Task::new(0, 0, 9, 9));
        let outcome = brain.run();
        assert!(outcome.success);
        // 18 steps logged en route plus the terminal entry.
        assert_eq!(brain.get_trail().len(), 19);
    }

    #[test]
    fn test_start_equals_destination() {
        let mut brain = flat_brain(5, 5, Task::new(2, 2, 2, 2));
        let outcome = brain.run();
        assert!(outcome.success);
        assert_eq!(brain.get_trail().len(), 1);
    }

    #[test]
    fn test_prefers_cheaper_main_direction() {
        // Moving down (+x) climbs, moving right (+y) stays level; the first
        // step from (0,0) should be to (0,1).
        let grid = TerrainGrid::from_rows(vec![
            vec![0.0, 0.0, 0.0],
            vec![3.0, 3.0, 3.0],
            vec![3.0, 3.0, 3.0],
        ]);
        let mut brain = GreedyBrain::new();
        brain.set_original_map(grid);
        brain.set_avatar(Avatar::default_rover("r1"));
        brain.set_task(Task::new(0, 0, 2, 2)).unwrap();
        let outcome = brain.run();
        assert!(outcome.success);
        let trail = brain.get_trail();
        assert_eq!((trail[1].x, trail[1].y), (0, 1));
    }

    #[test]
    fn test_backtracks_out_of_pocket() {
        // A cul-de-sac: the goal column is walled off except around the top.
        let wall = 1000.0;
        let mut rows = vec![vec![0.0; 5]; 5];
        for r in 1..5 {
            rows[r][2] = wall;
        }
        let mut brain = GreedyBrain::new();
        brain.set_original_map(TerrainGrid::from_rows(rows));
        brain.set_avatar(Avatar::default_rover("r1"));
        brain.set_task(Task::new(4, 0, 4, 4)).unwrap();
        let outcome = brain.run();
        assert!(outcome.success);
    }

    #[test]
    fn test_reset_allows_reuse() {
        let mut brain = flat_brain(6, 6, Task::new(0, 0, 5, 5));
        assert!(brain.run().success);
        let first_len = brain.get_trail().len();
        brain.reset();
        assert!(brain.get_trail().is_empty());
        assert!(brain.run().success);
        assert_eq!(brain.get_trail().len(), first_len);
    }
}
