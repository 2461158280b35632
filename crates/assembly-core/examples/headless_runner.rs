//! Headless runner: builds a small refinery line, runs it on the clock and
//! prints what the presentation layer would receive.
//!
//! Run with: `RUST_LOG=debug cargo run --package assembly-core --example headless_runner`

use assembly_core::catalog::keys;
use assembly_core::event::ProductionEvent;
use assembly_core::fixed::f64_to_fixed64;
use assembly_core::overlay::OverlayTile;
use assembly_core::position::Position;
use assembly_core::simulation::{Presenter, Simulation};
use assembly_core::snapshot::TileMap;
use assembly_core::test_utils::*;

const FRAMES: usize = 30;
const FRAME_SECONDS: f64 = 1.0 / 15.0;

struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn on_production(&mut self, events: &[ProductionEvent]) {
        for event in events {
            let materials: Vec<&str> = event.produced.iter().map(|p| p.material.as_str()).collect();
            println!(
                "  tick {:>3}  {:<16} at {}  -> {:?}  effect={:?}",
                event.tick, event.key, event.position, materials, event.effect
            );
        }
    }

    fn refresh_overlay(&mut self, tiles: &[OverlayTile]) {
        if !tiles.is_empty() {
            let cells: Vec<String> = tiles
                .iter()
                .map(|t| format!("{}={}", t.position, t.tile))
                .collect();
            println!("  overlay: {}", cells.join(" "));
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut map = TileMap::new();
    map.set_tile(Position::new(-3, 0), keys::DRILL)
        .set_terrain(Position::new(-3, 0), IRON_TERRAIN)
        .set_tile(Position::new(-2, 0), SW_NE)
        .set_tile(Position::new(-1, 0), keys::REFINERY)
        .set_tile(Position::new(-1, 1), "Decor_Grass")
        .set_tile(Position::new(-1, -1), "conveyors_anim_nwne")
        .set_tile(Position::ORIGIN, keys::ROCKET);

    let mut sim = Simulation::new(standard_catalog(), standard_icons(), test_config())
        .unwrap_or_else(|e| panic!("failed to set up simulation: {e}"));
    let summary = sim
        .rebuild(&map)
        .unwrap_or_else(|e| panic!("failed to build layout: {e}"));
    println!(
        "generation {}: {} machines, {} unresolved ports, unmapped {:?}",
        summary.generation, summary.machines, summary.unresolved_ports, summary.unmapped
    );

    let mut presenter = ConsolePresenter;
    for _ in 0..FRAMES {
        sim.advance(f64_to_fixed64(FRAME_SECONDS), &mut presenter);
    }

    let delivered = sim.rocket().map(|r| r.input.len()).unwrap_or(0);
    println!("after {} ticks the rocket holds {delivered} packages", sim.current_tick());
}
