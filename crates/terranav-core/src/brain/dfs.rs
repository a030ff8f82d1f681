//! Depth-first strategy with heuristic neighbour ordering.
//!
//! Not pure DFS: at every expansion the four directions are sorted by
//! Manhattan distance to the goal, so the stack is biased toward the
//! destination. Dead ends unwind the path one cell at a time — each unwound
//! cell is logged and costs one time/energy unit — until a cell with an
//! unexplored option is found, which is then re-pushed.

use log::debug;
use std::collections::HashSet;

use crate::brain::{Brain, RunOutcome};
use crate::context::{manhattan, Battery, SearchContext, DIRECTIONS};

pub struct DfsBrain {
    ctx: SearchContext,
}

impl DfsBrain {
    pub fn new() -> Self {
        Self {
            ctx: SearchContext::new(),
        }
    }

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
}

impl Default for DfsBrain {
    fn default() -> Self {
        Self::new()
    }
}

impl Brain for DfsBrain {
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

        let mut stack: Vec<((i64, i64), Vec<(i64, i64)>)> = vec![(params.start, Vec::new())];
        let mut visited: HashSet<(i64, i64)> = HashSet::new();
        let mut backtracked: HashSet<(i64, i64)> = HashSet::new();

        while let Some(((x, y), path)) = stack.pop() {
            if !visited.insert((x, y)) {
                continue;
            }

            self.ctx.reveal(x, y);
            self.ctx.record(x, y, battery.energy);

            if (x, y) == goal {
                return RunOutcome::success("destination reached");
            }

            // Closest-to-goal first; stable sort keeps the canonical probe
            // order on ties.
            let mut directions = DIRECTIONS;
            directions.sort_by_key(|&(dx, dy)| manhattan((x + dx, y + dy), goal));

            let neighbours: Vec<(i64, i64)> = directions
                .iter()
                .map(|&(dx, dy)| (x + dx, y + dy))
                .filter(|&n| self.expandable((x, y), n, &visited, &backtracked))
                .collect();

            if !neighbours.is_empty() {
                // Reverse push so the most promising neighbour pops first.
                for &n in neighbours.iter().rev() {
                    let mut next_path = path.clone();
                    next_path.push((x, y));
                    stack.push((n, next_path));
                }

                let cost = self.ctx.slope_cost((x, y), neighbours[0]) + 1;
                if battery.energy < cost as f64 {
                    self.ctx.clock += battery.recharge_to_full(params.recharge_rate);
                }
                battery.energy -= cost as f64;
                self.ctx.clock += cost;
            } else {
                debug!("dead end at ({x}, {y}), backtracking");
                backtracked.insert((x, y));

                let mut path = path;
                while let Some((lx, ly)) = path.pop() {
                    backtracked.insert((lx, ly));

                    // Each unwound step costs one time/energy unit.
                    if battery.energy < 1.0 {
                        self.ctx.clock += battery.recharge_to_full(params.recharge_rate);
                    }
                    battery.energy -= 1.0;
                    self.ctx.clock += 1;

                    self.ctx.reveal(lx, ly);
                    self.ctx.record(lx, ly, battery.energy);

                    let resumable = DIRECTIONS.iter().any(|&(dx, dy)| {
                        self.expandable((lx, ly), (lx + dx, ly + dy), &visited, &backtracked)
                    });
                    if resumable {
                        stack.push(((lx, ly), path.clone()));
                        break;
                    }
                }
            }
        }

        RunOutcome::failure("destination unreachable: search stack exhausted")
    }
}
