//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::catalog::{CatalogBuilder, MachineCatalog, MachineType, Recipe, ResourceNode, keys};
use crate::config::SimulationConfig;
use crate::graph::MachineGraph;
use crate::orientation::CONVEYOR_ORIENTATIONS;
use crate::overlay::OverlayIcons;
use crate::position::{GridBounds, Position};
use crate::snapshot::{GridSnapshot, TileMap};
use crate::topology::TopologyBuilder;

// ===========================================================================
// Tile keys
// ===========================================================================

pub const SW_NE: &str = "conveyors_anim_swne";
pub const SE_NW: &str = "conveyors_anim_senw";
pub const NE_SW: &str = "conveyors_anim_nesw";

pub const IRON_DRILL: &str = "drill_iron";
pub const COAL_DRILL: &str = "drill_coal";

pub const IRON_TERRAIN: &str = "iron_node";
pub const RICH_IRON_TERRAIN: &str = "iron_node_rich";
pub const COAL_TERRAIN: &str = "coal_node";

/// Decoration tile the catalog ignores.
pub const IGNORED_DECOR: &str = "decor_grass";

pub const CONVEYOR_CAPACITY: u32 = 4;
pub const MACHINE_CAPACITY: u32 = 4;
pub const ROCKET_CAPACITY: u32 = 64;

// ===========================================================================
// Catalog
// ===========================================================================

/// Drill, refinery, smelter, armory, all twelve conveyors and the rocket,
/// with iron and coal resource nodes.
pub fn standard_builder() -> CatalogBuilder {
    let mut b = CatalogBuilder::new();
    b.register_machine(
        MachineType::new(keys::DRILL, MACHINE_CAPACITY)
            .with_recipe(Recipe::source("stone", 1))
            .with_effect("drill_dust"),
    )
    .register_machine(
        MachineType::new(IRON_DRILL, MACHINE_CAPACITY)
            .with_recipe(Recipe::source("iron_ore", 1))
            .with_effect("drill_dust"),
    )
    .register_machine(
        MachineType::new(COAL_DRILL, MACHINE_CAPACITY)
            .with_recipe(Recipe::source("coal", 1))
            .with_effect("drill_dust"),
    )
    .register_machine(
        MachineType::new(keys::REFINERY, MACHINE_CAPACITY)
            .with_recipe(Recipe::convert(&[("iron_ore", 2)], &[("iron_plate", 1)]))
            .with_effect("refinery_smoke"),
    )
    .register_machine(
        MachineType::new(keys::SMELTER, MACHINE_CAPACITY)
            .with_recipe(Recipe::convert(&[("iron_plate", 1), ("coal", 1)], &[("steel", 1)])),
    )
    .register_machine(
        MachineType::new(keys::ARMORY, MACHINE_CAPACITY)
            .with_recipe(Recipe::convert(&[("steel", 2)], &[("ammo", 1)])),
    )
    .register_machine(MachineType::new(keys::ROCKET, ROCKET_CAPACITY));

    for (key, _) in CONVEYOR_ORIENTATIONS.iter() {
        b.register_machine(MachineType::new(key, CONVEYOR_CAPACITY));
    }

    b.ignore_key(IGNORED_DECOR)
        .register_resource_node(ResourceNode::new(
            "iron",
            &[IRON_TERRAIN, RICH_IRON_TERRAIN],
            IRON_DRILL,
        ))
        .register_resource_node(ResourceNode::new("coal", &[COAL_TERRAIN], COAL_DRILL));
    b
}

pub fn standard_catalog() -> MachineCatalog {
    standard_builder()
        .build()
        .expect("standard catalog is valid")
}

pub fn standard_icons() -> OverlayIcons {
    let mut icons = OverlayIcons::new();
    icons
        .insert("stone", "icon_stone")
        .insert("iron_ore", "icon_iron_ore")
        .insert("coal", "icon_coal")
        .insert("iron_plate", "icon_iron_plate")
        .insert("steel", "icon_steel");
    icons
}

// ===========================================================================
// Grid helpers
// ===========================================================================

pub fn test_bounds() -> GridBounds {
    GridBounds::new(Position::new(-16, -16), Position::new(16, 16))
}

pub fn test_config() -> SimulationConfig {
    SimulationConfig {
        bounds: test_bounds(),
        tick_interval: 0.2,
    }
}

/// Build a graph from `map` with the standard catalog, inside `test_bounds`.
pub fn build_graph(map: &TileMap) -> MachineGraph {
    let catalog = standard_catalog();
    let snapshot = GridSnapshot::capture(map, test_bounds());
    TopologyBuilder::new(&catalog)
        .build(&snapshot)
        .expect("test layout builds")
        .graph
}

/// Drill at (0,5) feeding two SW->NE conveyors into a rocket at (3,5).
pub fn drill_chain_map() -> TileMap {
    let mut map = TileMap::new();
    map.set_tile(Position::new(0, 5), keys::DRILL)
        .set_tile(Position::new(1, 5), SW_NE)
        .set_tile(Position::new(2, 5), SW_NE)
        .set_tile(Position::new(3, 5), keys::ROCKET);
    map
}

/// Drill (0,-2), SW->NE conveyors at (-1,-1) and (0,-1), rocket on the
/// origin.
pub fn diagonal_scenario_map() -> TileMap {
    let mut map = TileMap::new();
    map.set_tile(Position::new(0, -2), keys::DRILL)
        .set_tile(Position::new(-1, -1), SW_NE)
        .set_tile(Position::new(0, -1), SW_NE)
        .set_tile(Position::ORIGIN, keys::ROCKET);
    map
}

/// Drill (0,-3) feeding an SE->NW conveyor at (0,-2) whose output search
/// cell (0,-1) is empty, so it attaches to the rocket on the origin.
pub fn rocket_scenario_map() -> TileMap {
    let mut map = TileMap::new();
    map.set_tile(Position::new(0, -3), keys::DRILL)
        .set_tile(Position::new(0, -2), SE_NW)
        .set_tile(Position::ORIGIN, keys::ROCKET);
    map
}

/// Every package held by every machine, across all three storages.
pub fn total_packages(graph: &MachineGraph) -> usize {
    graph
        .iter()
        .map(|(_, m)| m.input.len() + m.output.len() + m.temp.len())
        .sum()
}
