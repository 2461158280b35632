//! The driver that owns the live graph and runs rebuilds and ticks.
//!
//! Rebuilds happen only when the caller asks for one. Ticks happen when the
//! clock says they are due. Both need `&mut Simulation`, so a rebuild can
//! never interleave with a tick.

use crate::catalog::MachineCatalog;
use crate::clock::{ClockError, SimulationClock};
use crate::config::SimulationConfig;
use crate::engine::ProductionEngine;
use crate::event::ProductionEvent;
use crate::fixed::{Seconds, Ticks};
use crate::graph::{GraphError, Machine, MachineGraph};
use crate::migration::{MigrationReport, migrate};
use crate::overlay::{OverlayIcons, OverlayTile, overlay_tiles};
use crate::snapshot::{GridSnapshot, TileSource};
use crate::topology::TopologyBuilder;
use std::collections::BTreeSet;

/// Receives the results of every tick.
pub trait Presenter {
    /// Machines that produced this tick. Called every tick, possibly empty.
    fn on_production(&mut self, events: &[ProductionEvent]);

    /// Current overlay, after the tick's transport has settled.
    fn refresh_overlay(&mut self, tiles: &[OverlayTile]);
}

/// A presenter that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn on_production(&mut self, _events: &[ProductionEvent]) {}
    fn refresh_overlay(&mut self, _tiles: &[OverlayTile]) {}
}

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error(transparent)]
    Clock(#[from] ClockError),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// What one rebuild did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebuildSummary {
    pub generation: u64,
    pub machines: usize,
    pub unmapped: BTreeSet<String>,
    pub unresolved_ports: usize,
    pub migration: MigrationReport,
}

pub struct Simulation {
    catalog: MachineCatalog,
    icons: OverlayIcons,
    config: SimulationConfig,
    graph: MachineGraph,
    engine: ProductionEngine,
    clock: SimulationClock,
    generation: u64,
}

impl Simulation {
    /// A simulation with an empty graph. Call [`rebuild`](Self::rebuild)
    /// before ticking anything useful.
    pub fn new(
        catalog: MachineCatalog,
        icons: OverlayIcons,
        config: SimulationConfig,
    ) -> Result<Self, SimulationError> {
        let clock = config.clock()?;
        Ok(Self {
            catalog,
            icons,
            config,
            graph: MachineGraph::new(),
            engine: ProductionEngine::new(),
            clock,
            generation: 0,
        })
    }

    /// Rescan `tiles`, rebuild the graph and carry state over from the
    /// previous generation.
    pub fn rebuild<S: TileSource + ?Sized>(
        &mut self,
        tiles: &S,
    ) -> Result<RebuildSummary, SimulationError> {
        let snapshot = GridSnapshot::capture(tiles, self.config.bounds);
        let report = TopologyBuilder::new(&self.catalog).build(&snapshot)?;

        let mut graph = report.graph;
        let mut previous = std::mem::take(&mut self.graph);
        let migration = migrate(&mut graph, &mut previous);
        self.graph = graph;
        self.generation += 1;

        tracing::info!(
            target: "assembly::simulation",
            generation = self.generation,
            machines = self.graph.len(),
            transplanted = migration.transplanted,
            fresh = migration.fresh,
            "graph.rebuilt"
        );

        Ok(RebuildSummary {
            generation: self.generation,
            machines: self.graph.len(),
            unmapped: report.unmapped,
            unresolved_ports: report.unresolved.len(),
            migration,
        })
    }

    /// Feed elapsed time to the clock and run every tick that became due.
    /// Returns the number of ticks run.
    pub fn advance(&mut self, dt: Seconds, presenter: &mut dyn Presenter) -> u32 {
        let due = self.clock.advance(dt);
        for _ in 0..due {
            self.step(presenter);
        }
        due
    }

    /// Run exactly one tick, ignoring the clock.
    pub fn step(&mut self, presenter: &mut dyn Presenter) {
        let events = self.engine.tick(&mut self.graph);
        presenter.on_production(&events);
        let tiles = overlay_tiles(&self.graph, &self.icons);
        presenter.refresh_overlay(&tiles);
    }

    /// The terminal rocket, if the current layout has one.
    pub fn rocket(&self) -> Option<&Machine> {
        self.graph
            .find_by_key(&self.catalog.roles().rocket)
            .map(|(_, m)| m)
    }

    pub fn graph(&self) -> &MachineGraph {
        &self.graph
    }

    pub fn catalog(&self) -> &MachineCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn current_tick(&self) -> Ticks {
        self.engine.current_tick()
    }

    /// Number of rebuilds performed.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("generation", &self.generation)
            .field("tick", &self.engine.current_tick())
            .field("machines", &self.graph.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::keys;
    use crate::fixed::f64_to_fixed64;
    use crate::position::Position;
    use crate::snapshot::TileMap;
    use crate::test_utils::*;

    #[derive(Default)]
    struct Recorder {
        production_calls: usize,
        events: Vec<ProductionEvent>,
        overlays: Vec<Vec<OverlayTile>>,
    }

    impl Presenter for Recorder {
        fn on_production(&mut self, events: &[ProductionEvent]) {
            self.production_calls += 1;
            self.events.extend_from_slice(events);
        }

        fn refresh_overlay(&mut self, tiles: &[OverlayTile]) {
            self.overlays.push(tiles.to_vec());
        }
    }

    fn sim() -> Simulation {
        Simulation::new(standard_catalog(), standard_icons(), test_config()).unwrap()
    }

    /// A drill feeding one conveyor whose output leads nowhere.
    fn dead_end_map() -> TileMap {
        let mut map = TileMap::new();
        map.set_tile(Position::new(0, 5), keys::DRILL)
            .set_tile(Position::new(1, 5), SW_NE);
        map
    }

    #[test]
    fn zero_interval_rejected_at_construction() {
        let config = SimulationConfig {
            tick_interval: 0.0,
            ..test_config()
        };
        let err = Simulation::new(standard_catalog(), OverlayIcons::new(), config).unwrap_err();
        assert!(matches!(err, SimulationError::Clock(_)));
    }

    #[test]
    fn advance_runs_due_ticks_and_notifies() {
        let mut sim = sim();
        sim.rebuild(&drill_chain_map()).unwrap();
        let mut rec = Recorder::default();

        let ran = sim.advance(f64_to_fixed64(0.5), &mut rec);

        assert_eq!(ran, 2);
        assert_eq!(sim.current_tick(), 2);
        assert_eq!(rec.production_calls, 2);
        assert_eq!(rec.overlays.len(), 2);
        assert!(rec.events.iter().all(|e| e.key == keys::DRILL));
    }

    #[test]
    fn overlay_follows_conveyor_output() {
        let mut sim = sim();
        sim.rebuild(&dead_end_map()).unwrap();
        let mut rec = Recorder::default();
        sim.step(&mut rec);
        assert!(rec.overlays[0].is_empty());
        sim.step(&mut rec);
        assert_eq!(
            rec.overlays[1],
            vec![OverlayTile {
                position: Position::new(1, 5),
                tile: "icon_stone".to_string()
            }]
        );
    }

    #[test]
    fn rebuild_preserves_state_of_unchanged_machines() {
        let mut sim = sim();
        let map = dead_end_map();
        sim.rebuild(&map).unwrap();
        for _ in 0..2 {
            sim.step(&mut NullPresenter);
        }
        let before = sim.graph().machine_at(Position::new(1, 5)).unwrap().output.len();
        assert_eq!(before, 1);

        let summary = sim.rebuild(&map).unwrap();

        assert_eq!(summary.generation, 2);
        assert_eq!(summary.migration.fresh, 0);
        assert_eq!(
            sim.graph().machine_at(Position::new(1, 5)).unwrap().output.len(),
            before
        );
    }

    #[test]
    fn rocket_lookup_uses_role_key() {
        let mut sim = sim();
        assert!(sim.rocket().is_none());
        let mut map = TileMap::new();
        map.set_tile(Position::ORIGIN, "BaseAnimTile");
        sim.rebuild(&map).unwrap();
        assert_eq!(sim.rocket().unwrap().position, Position::ORIGIN);
    }

    #[test]
    fn rebuild_reports_unmapped_keys() {
        let mut sim = sim();
        let mut map = TileMap::new();
        map.set_tile(Position::new(1, 1), "broken_tile");
        let summary = sim.rebuild(&map).unwrap();
        assert!(summary.unmapped.contains("broken_tile"));
        assert_eq!(summary.machines, 0);
    }
}
