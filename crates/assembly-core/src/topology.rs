//! Topology inference: turns a tile scan into a wired machine graph.
//!
//! # Passes
//!
//! 1. **Classify** -- every scanned tile whose key is in the catalog becomes
//!    a [`Machine`]. Unknown keys are reported unless ignore-listed.
//! 2. **Wire** -- every conveyor resolves its input and output neighbor from
//!    the orientation table. Source-class neighbors (drill, refinery,
//!    smelter, armory) are wired in both directions so they can push into or
//!    receive from the conveyor. Any other neighbor gets a one-directional
//!    port on the conveyor only.
//! 3. **Fallback** -- an empty search cell is retried at `(x-1, y)`,
//!    `(x, y-1)` and `(x-1, y-1)`, which is where the anchor of a multi-cell
//!    machine sits. Only source-class machines are accepted there.
//! 4. **Rocket** -- an output whose search cell is next to the origin and
//!    resolved nowhere else is wired to whatever stands on the origin.
//! 5. **Specialize** -- drills take the machine type of the resource under
//!    them. This runs after wiring, so source-class checks always see the
//!    catalog-assigned key.

use crate::catalog::MachineCatalog;
use crate::graph::{GraphError, Machine, MachineGraph, PortDirection};
use crate::id::MachineId;
use crate::orientation::conveyor_orientation;
use crate::position::{Offset, Position};
use crate::snapshot::GridSnapshot;
use crate::storage::Storage;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Cells tried, relative to the original search cell, when it is empty.
const FALLBACK_OFFSETS: [Offset; 3] = [Offset::new(-1, 0), Offset::new(0, -1), Offset::new(-1, -1)];

/// How one conveyor port was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wiring {
    /// Neighbor at the search cell, one-directional.
    Direct(Position),
    /// Source-class neighbor at the search cell, wired both ways.
    Source(Position),
    /// Source-class neighbor found at a fallback cell, wired both ways.
    Fallback(Position),
    /// Output wired both ways to the machine on the origin.
    Rocket,
    /// Nothing found.
    Unresolved,
}

/// A conveyor port that could not be wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnresolvedPort {
    pub position: Position,
    pub direction: PortDirection,
    /// `None` when the search cell lies past the edge of the coordinate range.
    pub search: Option<Position>,
}

/// Everything a rebuild produced.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub graph: MachineGraph,
    /// Scanned keys that are neither in the catalog nor ignore-listed.
    pub unmapped: BTreeSet<String>,
    /// Every distinct key seen in the scan.
    pub detected: BTreeSet<String>,
    pub unresolved: Vec<UnresolvedPort>,
    /// Number of drills whose type was replaced by the terrain beneath them.
    pub specialized: usize,
}

/// Builds a [`MachineGraph`] from a [`GridSnapshot`].
#[derive(Debug, Clone, Copy)]
pub struct TopologyBuilder<'a> {
    catalog: &'a MachineCatalog,
}

impl<'a> TopologyBuilder<'a> {
    pub fn new(catalog: &'a MachineCatalog) -> Self {
        Self { catalog }
    }

    pub fn build(&self, snapshot: &GridSnapshot) -> Result<BuildReport, GraphError> {
        let mut report = BuildReport::default();

        // Classify.
        for tile in snapshot.tiles() {
            report.detected.insert(tile.key.clone());
            match self.catalog.get(&tile.key) {
                Some(machine_type) => {
                    report
                        .graph
                        .insert(Machine::new(tile.position, Arc::clone(machine_type)))?;
                }
                None => {
                    if !self.catalog.is_ignored(&tile.key) {
                        report.unmapped.insert(tile.key.clone());
                    }
                }
            }
        }

        // Wire conveyors.
        for id in report.graph.ids() {
            let Some(machine) = report.graph.get(id) else {
                continue;
            };
            let Some(orientation) = conveyor_orientation(&machine.base_key) else {
                continue;
            };
            let position = machine.position;

            for (direction, offset) in [
                (PortDirection::Input, orientation.input_offset()),
                (PortDirection::Output, orientation.output_offset()),
            ] {
                let search = position.checked_add(offset);
                let wiring = match search {
                    Some(search) => self.wire_port(&mut report.graph, id, search, direction)?,
                    None => Wiring::Unresolved,
                };
                if wiring == Wiring::Unresolved {
                    tracing::debug!(
                        target: "assembly::topology",
                        position = %position,
                        search = ?search,
                        direction = ?direction,
                        "port.unresolved"
                    );
                    report.unresolved.push(UnresolvedPort {
                        position,
                        direction,
                        search,
                    });
                }
            }
        }

        report.specialized = self.specialize_drills(&mut report.graph, snapshot);

        tracing::info!(
            target: "assembly::topology",
            machines = report.graph.len(),
            ports = report.graph.port_count(),
            types = %join(&report.detected),
            "tile_types.detected"
        );
        if !report.unmapped.is_empty() {
            tracing::warn!(
                target: "assembly::topology",
                types = %join(&report.unmapped),
                "tile_types.unmapped"
            );
        }

        Ok(report)
    }

    /// Resolve one conveyor port at `search`, falling back as described in
    /// the module docs.
    pub fn wire_port(
        &self,
        graph: &mut MachineGraph,
        owner: MachineId,
        search: Position,
        direction: PortDirection,
    ) -> Result<Wiring, GraphError> {
        if let Some(neighbor) = graph.id_at(search) {
            if self.link_source(graph, owner, neighbor, direction)? {
                return Ok(Wiring::Source(search));
            }
            match direction {
                PortDirection::Input => graph.add_input_port(owner, neighbor)?,
                PortDirection::Output => graph.add_output_port(owner, neighbor)?,
            }
            return Ok(Wiring::Direct(search));
        }

        for offset in FALLBACK_OFFSETS {
            let Some(candidate) = search.checked_add(offset) else {
                continue;
            };
            if let Some(neighbor) = graph.id_at(candidate) {
                if self.link_source(graph, owner, neighbor, direction)? {
                    return Ok(Wiring::Fallback(candidate));
                }
            }
        }

        if direction == PortDirection::Output && search.chebyshev_distance(&Position::ORIGIN) <= 1 {
            match graph.id_at(Position::ORIGIN) {
                Some(rocket) => {
                    graph.add_output_port(owner, rocket)?;
                    graph.add_input_port(rocket, owner)?;
                    return Ok(Wiring::Rocket);
                }
                None => {
                    tracing::info!(
                        target: "assembly::topology",
                        position = %Position::ORIGIN,
                        "rocket.not_found"
                    );
                }
            }
        }

        Ok(Wiring::Unresolved)
    }

    /// Wire `owner` and `neighbor` both ways if the neighbor is source-class.
    fn link_source(
        &self,
        graph: &mut MachineGraph,
        owner: MachineId,
        neighbor: MachineId,
        direction: PortDirection,
    ) -> Result<bool, GraphError> {
        let is_source = graph
            .get(neighbor)
            .is_some_and(|m| self.catalog.is_source_class(&m.base_key));
        if !is_source {
            return Ok(false);
        }
        match direction {
            PortDirection::Input => {
                graph.add_input_port(owner, neighbor)?;
                graph.add_output_port(neighbor, owner)?;
            }
            PortDirection::Output => {
                graph.add_output_port(owner, neighbor)?;
                graph.add_input_port(neighbor, owner)?;
            }
        }
        Ok(true)
    }

    /// Replace every drill's type with the one its terrain selects. Storages
    /// are still empty here, so they are resized to the new capacity.
    fn specialize_drills(&self, graph: &mut MachineGraph, snapshot: &GridSnapshot) -> usize {
        let mut count = 0;
        for id in graph.ids() {
            let Some(machine) = graph.get_mut(id) else {
                continue;
            };
            if !self.catalog.is_drill(&machine.base_key) {
                continue;
            }
            let Some(terrain) = snapshot.terrain_at(machine.position) else {
                continue;
            };
            if let Some(effective) = self.catalog.specialize(&machine.machine_type, terrain) {
                let capacity = effective.capacity;
                machine.machine_type = effective;
                machine.input = Storage::new(capacity);
                machine.output = Storage::new(capacity);
                machine.temp = Storage::new(capacity);
                count += 1;
            }
        }
        count
    }
}

fn join(keys: &BTreeSet<String>) -> String {
    keys.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::keys;
    use crate::position::GridBounds;
    use crate::snapshot::TileMap;
    use crate::test_utils::*;

    fn build(map: &TileMap) -> BuildReport {
        let catalog = standard_catalog();
        let snapshot = GridSnapshot::capture(map, test_bounds());
        TopologyBuilder::new(&catalog).build(&snapshot).unwrap()
    }

    fn outputs_of(report: &BuildReport, pos: Position) -> Vec<Position> {
        let m = report.graph.machine_at(pos).unwrap();
        m.output_ports
            .iter()
            .map(|p| report.graph.get(p.target).unwrap().position)
            .collect()
    }

    fn inputs_of(report: &BuildReport, pos: Position) -> Vec<Position> {
        let m = report.graph.machine_at(pos).unwrap();
        m.input_ports
            .iter()
            .map(|p| report.graph.get(p.target).unwrap().position)
            .collect()
    }

    #[test]
    fn unmapped_key_is_reported_and_omitted() {
        let mut map = TileMap::new();
        map.set_tile(Position::new(0, 0), "Mystery_Tile")
            .set_tile(Position::new(1, 0), keys::ROCKET);
        let report = build(&map);
        assert!(report.unmapped.contains("mystery_tile"));
        assert!(report.graph.machine_at(Position::new(0, 0)).is_none());
        assert_eq!(report.graph.len(), 1);
        assert!(report.detected.contains("mystery_tile"));
    }

    #[test]
    fn ignored_key_is_omitted_silently() {
        let mut map = TileMap::new();
        map.set_tile(Position::new(0, 0), IGNORED_DECOR);
        let report = build(&map);
        assert!(report.unmapped.is_empty());
        assert!(report.graph.is_empty());
    }

    #[test]
    fn drill_feeding_conveyor_is_wired_both_ways() {
        let mut map = TileMap::new();
        map.set_tile(Position::new(-1, 0), keys::DRILL)
            .set_tile(Position::new(0, 0), SW_NE);
        let report = build(&map);
        assert_eq!(inputs_of(&report, Position::new(0, 0)), vec![Position::new(-1, 0)]);
        assert_eq!(outputs_of(&report, Position::new(-1, 0)), vec![Position::new(0, 0)]);
    }

    #[test]
    fn conveyor_to_conveyor_is_one_directional_per_side() {
        let mut map = TileMap::new();
        map.set_tile(Position::new(0, 5), SW_NE)
            .set_tile(Position::new(1, 5), SW_NE);
        let report = build(&map);
        // First conveyor's output and second conveyor's input each come from
        // their own resolution, not a reciprocal link.
        assert_eq!(outputs_of(&report, Position::new(0, 5)), vec![Position::new(1, 5)]);
        assert_eq!(inputs_of(&report, Position::new(1, 5)), vec![Position::new(0, 5)]);
        assert!(inputs_of(&report, Position::new(0, 5)).is_empty());
        assert!(outputs_of(&report, Position::new(1, 5)).is_empty());
    }

    #[test]
    fn non_source_neighbor_gets_no_reciprocal_port() {
        let mut map = TileMap::new();
        map.set_tile(Position::new(4, 4), SW_NE)
            .set_tile(Position::new(5, 4), keys::ROCKET);
        let report = build(&map);
        assert_eq!(outputs_of(&report, Position::new(4, 4)), vec![Position::new(5, 4)]);
        assert!(inputs_of(&report, Position::new(5, 4)).is_empty());
    }

    #[test]
    fn fallback_finds_multi_cell_source_anchor() {
        // Conveyor at (5,5) outputs NE to (6,5), which is empty. (x-1, y) is
        // the conveyor itself and is skipped; the refinery anchored at (6,4)
        // is found by the (x, y-1) fallback.
        let mut map = TileMap::new();
        map.set_tile(Position::new(5, 5), SW_NE)
            .set_tile(Position::new(6, 4), keys::REFINERY);
        let report = build(&map);
        assert_eq!(outputs_of(&report, Position::new(5, 5)), vec![Position::new(6, 4)]);
        assert_eq!(inputs_of(&report, Position::new(6, 4)), vec![Position::new(5, 5)]);
    }

    #[test]
    fn fallback_order_prefers_left_cell() {
        // Input search (4,5) is empty. Both (3,5) and (4,4) hold sources;
        // (x-1, y) is tried first.
        let mut map = TileMap::new();
        map.set_tile(Position::new(5, 5), SW_NE)
            .set_tile(Position::new(3, 5), keys::SMELTER)
            .set_tile(Position::new(4, 4), keys::ARMORY);
        let report = build(&map);
        assert_eq!(inputs_of(&report, Position::new(5, 5)), vec![Position::new(3, 5)]);
        assert!(outputs_of(&report, Position::new(4, 4)).is_empty());
    }

    #[test]
    fn fallback_ignores_non_source_machines() {
        let mut map = TileMap::new();
        map.set_tile(Position::new(5, 5), SW_NE)
            .set_tile(Position::new(3, 5), keys::ROCKET);
        let report = build(&map);
        assert!(inputs_of(&report, Position::new(5, 5)).is_empty());
        assert!(report.unresolved.iter().any(|u| u.position == Position::new(5, 5)
            && u.direction == PortDirection::Input
            && u.search == Some(Position::new(4, 5))));
    }

    #[test]
    fn conveyor_on_the_coordinate_edge_wires_what_it_can() {
        let edge = Position::new(i32::MIN, 0);
        let mut map = TileMap::new();
        map.set_tile(edge, SW_NE)
            .set_tile(Position::new(i32::MIN, -1), keys::DRILL);
        let bounds = GridBounds::new(Position::new(i32::MIN, -2), Position::new(i32::MIN + 3, 2));
        let catalog = standard_catalog();
        let report = TopologyBuilder::new(&catalog)
            .build(&GridSnapshot::capture(&map, bounds))
            .unwrap();

        assert_eq!(outputs_of(&report, edge), vec![Position::new(i32::MIN, -1)]);
        assert!(inputs_of(&report, edge).is_empty());
        assert_eq!(
            report.unresolved,
            vec![UnresolvedPort {
                position: edge,
                direction: PortDirection::Input,
                search: None,
            }]
        );
    }

    #[test]
    fn literal_scenario_second_conveyor_falls_back_to_drill() {
        let mut map = TileMap::new();
        map.set_tile(Position::new(0, -2), keys::DRILL)
            .set_tile(Position::new(-1, -1), SW_NE)
            .set_tile(Position::new(0, -1), SW_NE)
            .set_tile(Position::new(0, 0), keys::ROCKET);
        let report = build(&map);

        let first = Position::new(-1, -1);
        let second = Position::new(0, -1);
        let drill = Position::new(0, -2);

        assert!(inputs_of(&report, first).is_empty());
        assert_eq!(outputs_of(&report, first), vec![second]);
        assert_eq!(inputs_of(&report, second), vec![first]);
        // (1,-1) empty; fallback (0,-1) is the conveyor itself; (1,-2)
        // empty; (0,-2) is the drill.
        assert_eq!(outputs_of(&report, second), vec![drill]);
        assert_eq!(inputs_of(&report, drill), vec![second]);
        assert!(inputs_of(&report, Position::ORIGIN).is_empty());
    }

    #[test]
    fn terminal_check_wires_rocket_on_origin() {
        let mut map = TileMap::new();
        map.set_tile(Position::new(0, -3), keys::DRILL)
            .set_tile(Position::new(0, -2), SE_NW)
            .set_tile(Position::new(0, 0), keys::ROCKET);
        let report = build(&map);

        let conveyor = Position::new(0, -2);
        assert_eq!(inputs_of(&report, conveyor), vec![Position::new(0, -3)]);
        assert_eq!(outputs_of(&report, Position::new(0, -3)), vec![conveyor]);
        assert_eq!(outputs_of(&report, conveyor), vec![Position::ORIGIN]);
        assert_eq!(inputs_of(&report, Position::ORIGIN), vec![conveyor]);
        assert!(report.unresolved.is_empty());
    }

    #[test]
    fn terminal_check_needs_search_next_to_origin() {
        // Search cell (0,-2) is at Chebyshev distance 2: no rocket link.
        let mut map = TileMap::new();
        map.set_tile(Position::new(0, -3), SE_NW)
            .set_tile(Position::new(0, 0), keys::ROCKET);
        let report = build(&map);
        assert!(outputs_of(&report, Position::new(0, -3)).is_empty());
        assert!(inputs_of(&report, Position::ORIGIN).is_empty());
    }

    #[test]
    fn terminal_check_without_rocket_leaves_output_unwired() {
        let mut map = TileMap::new();
        map.set_tile(Position::new(0, -2), SE_NW);
        let report = build(&map);
        assert!(outputs_of(&report, Position::new(0, -2)).is_empty());
        assert!(report.unresolved.iter().any(|u| u.direction == PortDirection::Output));
    }

    #[test]
    fn non_conveyors_get_no_automatic_ports() {
        let mut map = TileMap::new();
        map.set_tile(Position::new(0, 0), keys::ROCKET)
            .set_tile(Position::new(1, 0), keys::DRILL)
            .set_tile(Position::new(2, 0), keys::REFINERY);
        let report = build(&map);
        assert_eq!(report.graph.port_count(), 0);
        assert!(report.unresolved.is_empty());
    }

    #[test]
    fn drill_on_resource_terrain_is_specialized() {
        let mut map = TileMap::new();
        map.set_tile(Position::new(2, 2), keys::DRILL)
            .set_terrain(Position::new(2, 2), IRON_TERRAIN);
        let report = build(&map);
        let drill = report.graph.machine_at(Position::new(2, 2)).unwrap();
        assert_eq!(drill.key(), IRON_DRILL);
        assert_eq!(drill.base_key, keys::DRILL);
        assert_eq!(report.specialized, 1);
    }

    #[test]
    fn drill_on_plain_terrain_keeps_default_type() {
        let mut map = TileMap::new();
        map.set_tile(Position::new(2, 2), keys::DRILL)
            .set_terrain(Position::new(2, 2), "grass");
        let report = build(&map);
        let drill = report.graph.machine_at(Position::new(2, 2)).unwrap();
        assert_eq!(drill.key(), keys::DRILL);
        assert_eq!(report.specialized, 0);
    }

    #[test]
    fn specialized_drill_still_wires_as_source() {
        let mut map = TileMap::new();
        map.set_tile(Position::new(-1, 3), keys::DRILL)
            .set_terrain(Position::new(-1, 3), IRON_TERRAIN)
            .set_tile(Position::new(0, 3), SW_NE);
        let report = build(&map);
        assert_eq!(outputs_of(&report, Position::new(-1, 3)), vec![Position::new(0, 3)]);
    }
}
