//! TerraNav Headless Planning Harness
//!
//! Sweeps every search strategy over synthetic terrain entirely in-process —
//! no terrain files, no rendering.
//!
//! Usage:
//!   cargo run -p terranav-simtest
//!   cargo run -p terranav-simtest -- --verbose
//!   cargo run -p terranav-simtest -- --episodes 500
//!   cargo run -p terranav-simtest -- --json

use serde::Serialize;
use terranav_core::brain::{Brain, BrainKind, RlBrain};
use terranav_core::Simulator;
use terranav_logic::{Avatar, DetectionMask, Environment, Sensor, Task, TerrainGrid};

// ── Test harness ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let json = args.iter().any(|a| a == "--json");
    let episodes = args
        .iter()
        .position(|a| a == "--episodes")
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
        .unwrap_or(200);

    if !json {
        println!("=== TerraNav Planning Harness ===\n");
    }

    let mut results = Vec::new();

    // 1. Physics & avatar model
    results.extend(validate_physics(verbose, json));

    // 2. Sensor detection masks
    results.extend(validate_detection(verbose, json));

    // 3. Strategy sweep over synthetic terrain
    results.extend(validate_strategies(verbose, json));

    // 4. Trail invariants
    results.extend(validate_trail_invariants(json));

    // 5. Q-learning training sweep
    results.extend(validate_rl_training(episodes, verbose, json));

    // 6. Simulator configuration surface
    results.extend(validate_simulator(json));

    // ── Summary ──
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    if json {
        match serde_json::to_string_pretty(&results) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("summary serialization failed: {e}"),
        }
    } else {
        println!();
        for r in &results {
            let icon = if r.passed { "✓" } else { "✗" };
            if !r.passed || verbose {
                println!("  {} {}: {}", icon, r.name, r.detail);
            }
        }
        println!(
            "\n=== RESULT: {}/{} passed, {} failed ===",
            passed, total, failed
        );
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

fn section(json: bool, title: &str) {
    if !json {
        println!("--- {title} ---");
    }
}

// ── 1. Physics & Avatar ─────────────────────────────────────────────────

fn validate_physics(verbose: bool, json: bool) -> Vec<TestResult> {
    section(json, "Physics & Avatar");
    let mut results = Vec::new();

    let env = Environment::default();
    let rover = Avatar::default_rover("harness");

    let slope = rover.max_slope(&env);
    results.push(TestResult {
        name: "physics_stock_rover_climbs".into(),
        passed: slope > 0.0,
        detail: format!("stock rover max slope {:.3} elevation units", slope),
    });

    // Heavier rover climbs less under the same force.
    let mut heavy = Avatar::default_rover("heavy");
    heavy.weight = rover.weight * 3.0;
    results.push(TestResult {
        name: "physics_weight_reduces_slope".into(),
        passed: heavy.max_slope(&env) < slope,
        detail: format!(
            "3x weight: {:.3} < {:.3}",
            heavy.max_slope(&env),
            slope
        ),
    });

    // Degenerate physics degrades to zero, never panics.
    let mut broken = Avatar::default_rover("broken");
    broken.driving_force = -10.0;
    results.push(TestResult {
        name: "physics_degenerate_zero".into(),
        passed: broken.max_slope(&env) == 0.0,
        detail: "negative driving force → zero climbing capability".into(),
    });

    // Higher friction drags the climb limit down.
    let icy = Environment {
        friction: 0.1,
        ..env
    };
    results.push(TestResult {
        name: "physics_friction_ordering".into(),
        passed: rover.max_slope(&icy) > slope,
        detail: format!("μ=0.1: {:.3} > μ=0.5: {:.3}", rover.max_slope(&icy), slope),
    });

    if verbose && !json {
        println!("  Base time per grid at speed 1: {}", rover.base_time_per_grid());
    }

    results
}

// ── 2. Detection Masks ──────────────────────────────────────────────────

fn validate_detection(verbose: bool, json: bool) -> Vec<TestResult> {
    section(json, "Detection Masks");
    let mut results = Vec::new();

    // A 360-degree radar of range r covers the full disc, origin included.
    let full = DetectionMask::generate(&[Sensor::radar_360("radar", 3)]);
    let expected: usize = {
        let mut count = 0;
        for dx in -3i32..=3 {
            for dy in -3i32..=3 {
                if ((dx * dx + dy * dy) as f64).sqrt() <= 3.0 {
                    count += 1;
                }
            }
        }
        count
    };
    results.push(TestResult {
        name: "detect_full_disc".into(),
        passed: full.offsets().len() == expected,
        detail: format!("range-3 radar covers {} cells", full.offsets().len()),
    });

    // A narrow forward sensor sees strictly less than the full radar.
    let narrow = DetectionMask::generate(&[Sensor {
        name: "cone".into(),
        range: 3,
        field_of_view: 90.0,
        direction: 0.0,
        battery_consumption: 1.0,
        description: String::new(),
    }]);
    results.push(TestResult {
        name: "detect_cone_is_subset".into(),
        passed: !narrow.is_empty() && narrow.offsets().len() < full.offsets().len(),
        detail: format!(
            "90° cone {} < 360° disc {}",
            narrow.offsets().len(),
            full.offsets().len()
        ),
    });

    // No sensors means no perception at all.
    let blind = DetectionMask::generate(&[]);
    results.push(TestResult {
        name: "detect_no_sensors_blind".into(),
        passed: blind.is_empty(),
        detail: "empty sensor suite → empty mask".into(),
    });

    if verbose && !json {
        println!("  Disc/cone cell counts: {}/{}", full.offsets().len(), narrow.offsets().len());
    }

    results
}

// ── 3. Strategy Sweep ───────────────────────────────────────────────────

/// Gentle rolling terrain, fully connected for the stock rover.
fn rolling_grid(rows: usize, cols: usize) -> TerrainGrid {
    let data = (0..rows)
        .map(|r| (0..cols).map(|c| ((r + c) % 3) as f64).collect())
        .collect();
    TerrainGrid::from_rows(data)
}

/// An impassable north-south ridge splitting the grid in two.
fn ridge_grid(rows: usize, cols: usize) -> TerrainGrid {
    let data = (0..rows)
        .map(|r| {
            (0..cols)
                .map(|c| if c == cols / 2 { 1000.0 } else { (r % 2) as f64 })
                .collect()
        })
        .collect();
    TerrainGrid::from_rows(data)
}

fn run_once(kind: BrainKind, grid: TerrainGrid, task: Task) -> (bool, usize) {
    let mut brain = match kind {
        // Bound and seeded so a hopeless RL run terminates quickly.
        BrainKind::Rl => {
            let mut rl = RlBrain::with_seed(7);
            rl.max_steps = 2_000;
            Box::new(rl) as Box<dyn Brain>
        }
        other => other.build(),
    };
    brain.set_original_map(grid);
    brain.set_avatar(Avatar::default_rover("sweep"));
    if brain.set_task(task).is_err() {
        return (false, 0);
    }
    let outcome = brain.run();
    (outcome.success, brain.get_trail().len())
}

fn validate_strategies(verbose: bool, json: bool) -> Vec<TestResult> {
    section(json, "Strategy Sweep");
    let mut results = Vec::new();

    for kind in BrainKind::ALL {
        // Flat terrain: every strategy must reach the far corner.
        let (ok, steps) = run_once(kind, TerrainGrid::flat(10, 10, 5.0), Task::new(0, 0, 9, 9));
        results.push(TestResult {
            name: format!("sweep_{}_flat", kind.name()),
            passed: ok,
            detail: format!("flat 10x10 corner-to-corner, {} trail entries", steps),
        });

        // Rolling terrain stays connected for the stock rover.
        let (ok, steps) = run_once(kind, rolling_grid(8, 8), Task::new(7, 0, 0, 7));
        results.push(TestResult {
            name: format!("sweep_{}_rolling", kind.name()),
            passed: ok,
            detail: format!("rolling 8x8 anti-diagonal, {} trail entries", steps),
        });

        // The ridge is impassable: the run must fail, not hang or panic.
        let (ok, steps) = run_once(kind, ridge_grid(8, 8), Task::new(0, 0, 7, 7));
        results.push(TestResult {
            name: format!("sweep_{}_ridge_fails", kind.name()),
            passed: !ok,
            detail: format!("impassable ridge reported failure after {} entries", steps),
        });

        if verbose && !json {
            println!("  {} sweep complete", kind.name());
        }
    }

    results
}

// ── 4. Trail Invariants ─────────────────────────────────────────────────

fn validate_trail_invariants(json: bool) -> Vec<TestResult> {
    section(json, "Trail Invariants");
    let mut results = Vec::new();

    for kind in [BrainKind::Greedy, BrainKind::AStar, BrainKind::Dfs] {
        let mut brain = kind.build();
        brain.set_original_map(rolling_grid(8, 8));
        // A tight battery forces mid-run recharges.
        let mut avatar = Avatar::default_rover("invariants");
        avatar.battery_capacity = 60.0;
        avatar.battery_consumption_rate = 1.0;
        brain.set_avatar(avatar);
        if brain.set_task(Task::new(0, 0, 7, 7)).is_err() {
            continue;
        }
        let outcome = brain.run();
        let trail = brain.get_trail();

        let times_ordered = trail.windows(2).all(|w| w[0].time <= w[1].time);
        let reveal_monotone = trail
            .windows(2)
            .all(|w| w[0].snapshot.revealed_count() <= w[1].snapshot.revealed_count());
        let energy_in_range = trail.iter().all(|e| e.energy >= 0.0 && e.energy <= 60.0);

        results.push(TestResult {
            name: format!("trail_{}_ordered", kind.name()),
            passed: outcome.success && times_ordered && reveal_monotone && energy_in_range,
            detail: format!(
                "{} entries, times ordered={}, reveal monotone={}, energy in range={}",
                trail.len(),
                times_ordered,
                reveal_monotone,
                energy_in_range
            ),
        });
    }

    results
}

// ── 5. Q-Learning Training ──────────────────────────────────────────────

fn validate_rl_training(episodes: u32, verbose: bool, json: bool) -> Vec<TestResult> {
    section(json, "Q-Learning Training");
    let mut results = Vec::new();

    let grid = TerrainGrid::flat(5, 5, 0.0);
    let mut brain = RlBrain::with_seed(42);
    brain.max_steps = 2_000;
    brain.set_original_map(grid.clone());
    brain.set_avatar(Avatar::default_rover("trainee"));
    if let Err(e) = brain.set_task(Task::new(0, 0, 4, 4)) {
        results.push(TestResult {
            name: "rl_training_setup".into(),
            passed: false,
            detail: format!("task rejected: {e}"),
        });
        return results;
    }

    // Untrained baseline: repeated single runs of a fresh fully-exploring
    // agent, so nothing learned carries over between trials.
    let baseline_trials = 30u64;
    let mut baseline_successes = 0u32;
    for trial in 0..baseline_trials {
        let mut fresh = RlBrain::with_seed(1_000 + trial);
        fresh.max_steps = 2_000;
        fresh.agent_mut().epsilon = 1.0;
        fresh.set_original_map(grid.clone());
        fresh.set_avatar(Avatar::default_rover("baseline"));
        if fresh.set_task(Task::new(0, 0, 4, 4)).is_err() {
            continue;
        }
        if fresh.run().success {
            baseline_successes += 1;
        }
    }
    let baseline_rate = baseline_successes as f64 / baseline_trials as f64;

    let mut successes = 0u32;
    let tail_start = episodes.saturating_sub(baseline_trials as u32);
    let mut tail_successes = 0u32;
    for episode in 0..episodes {
        let outcome = brain.run();
        if outcome.success {
            successes += 1;
            if episode >= tail_start {
                tail_successes += 1;
            }
        }
        if verbose && !json && episode % 50 == 0 {
            println!(
                "  episode {episode}: ε={:.3}, table={} states",
                brain.agent().epsilon,
                brain.agent().table().len()
            );
        }
    }
    let tail_window = (episodes - tail_start).max(1);
    let trained_rate = tail_successes as f64 / tail_window as f64;

    results.push(TestResult {
        name: "rl_training_reaches_goal".into(),
        passed: successes > 0,
        detail: format!("{successes}/{episodes} episodes succeeded"),
    });

    results.push(TestResult {
        name: "rl_training_beats_untrained_baseline".into(),
        passed: trained_rate > baseline_rate,
        detail: format!(
            "trained {tail_successes}/{tail_window} ({:.0}%) vs untrained ε=1 {baseline_successes}/{baseline_trials} ({:.0}%)",
            trained_rate * 100.0,
            baseline_rate * 100.0
        ),
    });

    results.push(TestResult {
        name: "rl_training_populates_table".into(),
        passed: !brain.agent().table().is_empty(),
        detail: format!("{} states valued after training", brain.agent().table().len()),
    });

    results.push(TestResult {
        name: "rl_training_decays_epsilon".into(),
        passed: brain.agent().epsilon < 0.5,
        detail: format!("ε decayed to {:.3}", brain.agent().epsilon),
    });

    results
}

// ── 6. Simulator ────────────────────────────────────────────────────────

fn validate_simulator(json: bool) -> Vec<TestResult> {
    section(json, "Simulator");
    let mut results = Vec::new();

    results.push(TestResult {
        name: "sim_brain_names".into(),
        passed: Simulator::brain_names() == vec!["greedy", "astar", "dfs", "rl"],
        detail: format!("{:?}", Simulator::brain_names()),
    });

    // Configuration set before the brain is installed must carry over.
    let mut sim = Simulator::new();
    sim.set_map(TerrainGrid::flat(6, 6, 2.0));
    sim.set_avatar(Avatar::default_rover("sim"));
    let task_ok = sim.set_task(0, 0, 5, 5).is_ok();
    let brain_ok = sim.set_brain_by_name("greedy").is_ok();
    let ran = sim.run().map(|o| o.success).unwrap_or(false);
    results.push(TestResult {
        name: "sim_config_carry_over".into(),
        passed: task_ok && brain_ok && ran,
        detail: format!("task={task_ok} brain={brain_ok} run={ran}"),
    });

    let text = sim.render_trail_text();
    results.push(TestResult {
        name: "sim_trail_rendering".into(),
        passed: text.contains("Avatar Position") && text.contains('*'),
        detail: format!("{} rendered characters", text.len()),
    });

    // Out-of-bounds task is rejected up front.
    let mut sim2 = Simulator::new();
    sim2.set_map(TerrainGrid::flat(4, 4, 0.0));
    results.push(TestResult {
        name: "sim_rejects_bad_task".into(),
        passed: sim2.set_task(0, 0, 9, 9).is_err(),
        detail: "destination outside the grid is a configuration error".into(),
    });

    results
}
