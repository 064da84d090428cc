//! A crowd of agents steering across a walled map.
//!
//! Demonstrates: build map → orchestrator → request fields → drain each
//! frame → step agents along their fields → pick new goals on arrival.
//!
//! Run with `RUST_LOG=eddy_engine=debug` to watch requests and installs.

use std::sync::Arc;

use eddy_bench::{agent_goals, reference_map};
use eddy_core::{Cell, GridOracle};
use eddy_engine::{FieldOrchestrator, OrchestratorConfig, UpdateOutcome, WorkerPoolConfig};
use tracing::info;

const AGENTS: u64 = 24;
const FRAMES: usize = 400;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Eddy Crowd Example ===\n");

    let map = Arc::new(reference_map(42));
    let dims = map.dims();
    let mut orchestrator = FieldOrchestrator::spawn(
        Arc::clone(&map),
        WorkerPoolConfig::default(),
        OrchestratorConfig::new(dims),
    )
    .unwrap();

    let starts = agent_goals(&*map, dims.width(), dims.height(), AGENTS, 1);
    let mut goals = agent_goals(&*map, dims.width(), dims.height(), AGENTS, 2);
    let mut positions: Vec<Cell> = starts.iter().map(|&(_, cell)| cell).collect();
    let mut arrivals = 0usize;
    let mut stranded = 0usize;

    for &(agent, goal) in &goals {
        orchestrator.request_field(agent, goal).unwrap();
    }

    for frame in 0..FRAMES {
        for update in orchestrator.drain_completed().unwrap() {
            if let UpdateOutcome::Failed(fault) = &update.outcome {
                println!("  agent {} failed: {fault}", update.agent);
            }
        }

        for i in 0..goals.len() {
            let (agent, goal) = goals[i];
            let Some(field) = orchestrator.field(agent) else {
                continue;
            };
            if field.goal() != Some(goal) {
                continue;
            }
            let here = positions[i];
            if here == goal {
                arrivals += 1;
                let next = agent_goals(&*map, dims.width(), dims.height(), 1, (frame * 31 + i) as u64)[0].1;
                goals[i] = (agent, next);
                orchestrator.request_field(agent, next).unwrap();
                continue;
            }
            let v = field.flow_at(here);
            if v.is_zero() {
                // Unreachable goal or a sealed diagonal gap; give up on it.
                stranded += 1;
                let next = agent_goals(&*map, dims.width(), dims.height(), 1, (frame * 17 + i) as u64)[0].1;
                goals[i] = (agent, next);
                orchestrator.request_field(agent, next).unwrap();
                continue;
            }
            let (dx, dy) = v.offset();
            let next = here.offset(dx, dy);
            if !map.is_cell_solid(next) {
                positions[i] = next;
            }
        }

        if frame % 100 == 0 || frame == FRAMES - 1 {
            let m = orchestrator.metrics();
            println!(
                "  frame {:>3}: arrivals={:>4}, stranded={:>3}, requested={:>4}, installed={:>4}, in_flight={:>2}",
                frame, arrivals, stranded, m.requested, m.installed, m.in_flight,
            );
        }
    }

    let report = orchestrator.shutdown().unwrap();
    info!(?report, "crowd finished");

    let small = Arc::new(eddy_test_utils::serpentine_grid());
    let mut demo = FieldOrchestrator::spawn(
        Arc::clone(&small),
        WorkerPoolConfig::with_workers(1),
        OrchestratorConfig::new(small.dims()),
    )
    .unwrap();
    let field = demo
        .request_field_blocking(eddy_core::AgentId(0), Cell::new(0, 0))
        .unwrap()
        .unwrap();
    println!("\nSerpentine field toward (0, 0):\n{}", field.render_arrows());
}
