//! Adjacency-constrained A*.
//!
//! A binary heap orders candidates by `(f = g + h, g)` with a Manhattan
//! heuristic and an edge cost equal to the raw elevation delta, but a popped
//! candidate is only accepted when it is 4-adjacent to the position the
//! search is currently tracking; anything else is discarded and the
//! next-best candidate tried. Dead ends unwind the candidate's recorded
//! path explicitly, logging every step. The result behaves closer to a
//! constrained DFS with heuristic ordering than to textbook A*; that is the
//! intended, canonical behavior of this strategy.

use log::debug;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

use crate::brain::{Brain, RunOutcome};
use crate::context::{manhattan, Battery, SearchContext, DIRECTIONS};

#[derive(Debug, Clone, PartialEq)]
struct Candidate {
    f: f64,
    g: f64,
    pos: (i64, i64),
    /// Positions expanded before this candidate was pushed.
    path: Vec<(i64, i64)>,
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f
            .total_cmp(&other.f)
            .then(self.g.total_cmp(&other.g))
            .then(self.pos.cmp(&other.pos))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub struct AStarBrain {
    ctx: SearchContext,
}

impl AStarBrain {
    pub fn new() -> Self {
        Self {
            ctx: SearchContext::new(),
        }
    }

    /// A neighbour is expandable when it is in bounds, neither visited nor
    /// marked backtracked, and movable from `from`.
    fn expandable(
        &self,
        from: (i64, i64),
        to: (i64, i64),
        visited: &HashSet<(i64, i64)>,
        backtracked: &HashSet<(i64, i64)>,
    ) -> bool {
        self.ctx.in_bounds(to.0, to.1)
            && !visited.contains(&to)
            && !backtracked.contains(&to)
            && self.ctx.movable(from, to)
    }

    fn has_open_neighbour(
        &self,
        pos: (i64, i64),
        visited: &HashSet<(i64, i64)>,
        backtracked: &HashSet<(i64, i64)>,
    ) -> bool {
        DIRECTIONS
            .iter()
            .any(|&(dx, dy)| self.expandable(pos, (pos.0 + dx, pos.1 + dy), visited, backtracked))
    }
}

impl Default for AStarBrain {
    fn default() -> Self {
        Self::new()
    }
}

impl Brain for AStarBrain {
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

        let goal = params.goal;
        let mut battery = Battery::full(params.battery_capacity);

        let mut open: BinaryHeap<Reverse<Candidate>> = BinaryHeap::new();
        open.push(Reverse(Candidate {
            f: 0.0,
            g: 0.0,
            pos: params.start,
            path: Vec::new(),
        }));

        let mut visited: HashSet<(i64, i64)> = HashSet::new();
        let mut backtracked: HashSet<(i64, i64)> = HashSet::new();
        let mut tracked = params.start;

        loop {
            // Pop until a candidate adjacent to the tracked position comes
            // up; the start (empty path) is always accepted. Discarded
            // candidates are gone for good.
            let candidate = loop {
                let Some(Reverse(c)) = open.pop() else {
                    debug!("open set exhausted without reaching {goal:?}");
                    return RunOutcome::failure(
                        "destination unreachable: no valid adjacent candidates",
                    );
                };
                if c.path.is_empty() || manhattan(c.pos, tracked) == 1 {
                    break c;
                }
            };

            if candidate.pos == goal {
                self.ctx.record(goal.0, goal.1, battery.energy);
                return RunOutcome::success("destination reached");
            }

            if !visited.insert(candidate.pos) {
                continue;
            }

            let (x, y) = candidate.pos;
            self.ctx.reveal(x, y);
            self.ctx.record(x, y, battery.energy);

            if !self.has_open_neighbour((x, y), &visited, &backtracked) {
                debug!("dead end at ({x}, {y}), backtracking");
                backtracked.insert((x, y));

                // Unwind the recorded path one cell at a time until a cell
                // with an unexplored option turns up, logging each step.
                let mut path = candidate.path;
                let (mut bx, mut by) = (x, y);
                while let Some(&(lx, ly)) = path.last() {
                    if self.has_open_neighbour((lx, ly), &visited, &backtracked) {
                        break;
                    }
                    backtracked.insert((lx, ly));
                    path.pop();
                    (bx, by) = (lx, ly);
                    self.ctx.record(bx, by, battery.energy);
                }
                if let Some(&(lx, ly)) = path.last() {
                    (bx, by) = (lx, ly);
                }
                self.ctx.record(bx, by, battery.energy);
                tracked = (bx, by);
                continue;
            }

            tracked = (x, y);

            for (dx, dy) in DIRECTIONS {
                let next = (x + dx, y + dy);
                if !self.expandable((x, y), next, &visited, &backtracked) {
                    continue;
                }
                let edge = self.ctx.elevation_delta_cost((x, y), next);
                let g = candidate.g + edge;
                let h = manhattan(next, goal) as f64;
                let mut path = candidate.path.clone();
                path.push((x, y));
                open.push(Reverse(Candidate {
                    f: g + h,
                    g,
                    pos: next,
                    path,
                }));

                battery.energy -= edge + 1.0;
                self.ctx.clock += (edge + 1.0).ceil() as u64;
                if battery.energy <= 0.0 {
                    self.ctx.clock += battery.recharge_to_full(params.recharge_rate);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terranav_logic::{Avatar, Task, TerrainGrid};

    fn configured(grid: TerrainGrid, task: Task) -> AStarBrain {
        let mut brain = AStarBrain::new();
        brain.set_original_map(grid);
        brain.set_avatar(Avatar::default_rover("r1"));
        brain.set_task(task).unwrap();
        brain
    }

    #[test]
    fn test_flat_grid_expands_straight_to_goal() {
        let mut brain = configured(TerrainGrid::flat(10, 10, 5.0), Task::new(0, 0, 9, 9));
        let outcome = brain.run();
        assert!(outcome.success);
        // One expansion per heuristic level: h runs 18 down to 0.
        assert_eq!(brain.get_trail().len(), 19);
    }

    #[test]
    fn test_connected_movable_region_always_succeeds() {
        // Gentle slopes, everything movable, several start/goal pairs.
        let rows = (0..8)
            .map(|r| (0..8).map(|c| ((r + c) % 3) as f64).collect())
            .collect();
        let grid = TerrainGrid::from_rows(rows);
        for (task, label) in [
            (Task::new(0, 0, 7, 7), "corner to corner"),
            (Task::new(7, 0, 0, 7), "anti-diagonal"),
            (Task::new(3, 3, 0, 0), "centre out"),
        ] {
            let mut brain = configured(grid.clone(), task);
            let outcome = brain.run();
            assert!(outcome.success, "failed on {label}: {}", outcome.message);
        }
    }

    #[test]
    fn test_impassable_ridge_fails_without_panic() {
        let rows = (0..6)
            .map(|_| {
                (0..6)
                    .map(|c| if c >= 3 { 1000.0 } else { 0.0 })
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        let mut brain = configured(TerrainGrid::from_rows(rows), Task::new(0, 0, 5, 5));
        let outcome = brain.run();
        assert!(!outcome.success);
        assert!(!brain.get_trail().is_empty());
    }

    #[test]
    fn test_logged_energy_never_negative_after_recharges() {
        let mut avatar = Avatar::default_rover("r1");
        avatar.battery_capacity = 8.0;
        let mut brain = AStarBrain::new();
        brain.set_original_map(TerrainGrid::flat(6, 6, 5.0));
        brain.set_avatar(avatar);
        brain.set_task(Task::new(0, 0, 5, 5)).unwrap();
        let outcome = brain.run();
        assert!(outcome.success);
        for entry in brain.get_trail() {
            assert!(entry.energy >= 0.0, "negative energy logged");
        }
    }
}
