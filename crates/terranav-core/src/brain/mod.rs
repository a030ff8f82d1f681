//! Strategy abstraction — the "brain" driving one run of the search loop.
//!
//! Every brain owns a [`SearchContext`] and implements `run`/`reset` over
//! it. The four shipped strategies make different optimality/exploration
//! trade-offs:
//!
//! | Strategy | Character |
//! |----------|-----------|
//! | [`GreedyBrain`] | goal-directed local choice with parent-stack backtracking |
//! | [`AStarBrain`] | heap-ordered expansion constrained to adjacent candidates |
//! | [`DfsBrain`] | depth-first with heuristic neighbour ordering and unwinding |
//! | [`RlBrain`] | tabular Q-learning with ε-greedy exploration |
//!
//! None of them raise for in-domain failures: an unreachable destination is
//! reported through the [`RunOutcome`] with the partial trail preserved.

mod astar;
mod dfs;
mod greedy;
mod rl;

pub use astar::AStarBrain;
pub use dfs::DfsBrain;
pub use greedy::GreedyBrain;
pub use rl::{QLearningAgent, RlBrain};

use terranav_logic::{Avatar, Environment, Task, TerrainGrid};

use crate::context::SearchContext;
use crate::error::ConfigError;
use crate::trail::TrailEntry;

/// Result of one run: a success flag plus a human-readable message. The
/// trail is read separately via [`Brain::get_trail`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub success: bool,
    pub message: String,
}

impl RunOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }

    pub fn not_ready() -> Self {
        Self::failure("brain is not ready to run: map, avatar, and task must all be set")
    }
}

/// A pluggable search strategy over a shared [`SearchContext`].
pub trait Brain {
    fn context(&self) -> &SearchContext;
    fn context_mut(&mut self) -> &mut SearchContext;

    /// Execute the search loop. Running while not ready performs no search
    /// and reports a not-ready outcome; it never panics.
    fn run(&mut self) -> RunOutcome;

    /// Clear trail, clock, and working detect map for reuse. Mandatory
    /// before re-running the same brain instance.
    fn reset(&mut self) {
        self.context_mut().reset();
    }

    fn set_original_map(&mut self, grid: TerrainGrid) {
        self.context_mut().set_original_map(grid);
    }

    fn set_avatar(&mut self, avatar: Avatar) {
        self.context_mut().set_avatar(avatar);
    }

    fn set_task(&mut self, task: Task) -> Result<(), ConfigError> {
        self.context_mut().set_task(task)
    }

    fn set_environment(&mut self, environment: Environment) {
        self.context_mut().set_environment(environment);
    }

    fn is_ready_to_run(&self) -> bool {
        self.context().is_ready_to_run()
    }

    fn get_trail(&self) -> &[TrailEntry] {
        self.context().trail()
    }
}

/// Tag for brain construction and name-based dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrainKind {
    Greedy,
    AStar,
    Dfs,
    Rl,
}

impl BrainKind {
    pub const ALL: [BrainKind; 4] = [
        BrainKind::Greedy,
        BrainKind::AStar,
        BrainKind::Dfs,
        BrainKind::Rl,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BrainKind::Greedy => "greedy",
            BrainKind::AStar => "astar",
            BrainKind::Dfs => "dfs",
            BrainKind::Rl => "rl",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }

    pub fn build(&self) -> Box<dyn Brain> {
        match self {
            BrainKind::Greedy => Box::new(GreedyBrain::new()),
            BrainKind::AStar => Box::new(AStarBrain::new()),
            BrainKind::Dfs => Box::new(DfsBrain::new()),
            BrainKind::Rl => Box::new(RlBrain::new()),
        }
    }
}
