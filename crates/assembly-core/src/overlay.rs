//! Overlay refresh: which icon to draw over each conveyor.

use crate::graph::MachineGraph;
use crate::orientation::is_conveyor;
use crate::position::Position;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Material name -> overlay tile key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverlayIcons {
    icons: BTreeMap<String, String>,
}

impl OverlayIcons {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, material: &str, tile: &str) -> &mut Self {
        self.icons.insert(material.to_string(), tile.to_string());
        self
    }

    pub fn get(&self, material: &str) -> Option<&str> {
        self.icons.get(material).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

/// One overlay cell to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayTile {
    pub position: Position,
    pub tile: String,
}

/// Overlay tiles for the current output contents of every conveyor.
///
/// The newest mapped package decides the icon for its conveyor. Materials
/// without an icon are skipped and reported once per call.
pub fn overlay_tiles(graph: &MachineGraph, icons: &OverlayIcons) -> Vec<OverlayTile> {
    let mut tiles = Vec::new();
    let mut unmapped = BTreeSet::new();

    for (_, machine) in graph.iter() {
        if !is_conveyor(machine.key()) {
            continue;
        }
        let mut newest = None;
        for package in machine.output.iter() {
            match icons.get(&package.material) {
                Some(tile) => newest = Some(tile),
                None => {
                    unmapped.insert(package.material.as_str());
                }
            }
        }
        if let Some(tile) = newest {
            tiles.push(OverlayTile {
                position: machine.position,
                tile: tile.to_string(),
            });
        }
    }

    if !unmapped.is_empty() {
        let materials = unmapped.into_iter().collect::<Vec<_>>().join(", ");
        tracing::error!(
            target: "assembly::overlay",
            materials = %materials,
            "overlay.unmapped_materials"
        );
    }

    tiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MachineType;
    use crate::graph::Machine;
    use crate::storage::MaterialPackage;
    use std::sync::Arc;

    const BELT: &str = "conveyors_anim_nesw";

    fn graph_with_outputs(entries: &[(i32, &str, &[&str])]) -> MachineGraph {
        let mut graph = MachineGraph::new();
        for &(x, key, materials) in entries {
            let pos = Position::new(x, 0);
            let id = graph
                .insert(Machine::new(pos, Arc::new(MachineType::new(key, 8))))
                .unwrap();
            let m = graph.get_mut(id).unwrap();
            for material in materials {
                m.output.push(MaterialPackage::new(*material, pos)).unwrap();
            }
        }
        graph
    }

    fn icons() -> OverlayIcons {
        let mut icons = OverlayIcons::new();
        icons.insert("ore", "icon_ore").insert("plate", "icon_plate");
        icons
    }

    #[test]
    fn only_conveyor_outputs_are_shown() {
        let graph = graph_with_outputs(&[(0, BELT, &["ore"]), (1, "factory_0", &["plate"])]);
        let tiles = overlay_tiles(&graph, &icons());
        assert_eq!(
            tiles,
            vec![OverlayTile {
                position: Position::new(0, 0),
                tile: "icon_ore".to_string()
            }]
        );
    }

    #[test]
    fn newest_package_wins() {
        let graph = graph_with_outputs(&[(0, BELT, &["ore", "plate"])]);
        let tiles = overlay_tiles(&graph, &icons());
        assert_eq!(tiles[0].tile, "icon_plate");
    }

    #[test]
    fn unmapped_material_is_skipped() {
        let graph = graph_with_outputs(&[(0, BELT, &["ore", "mystery"]), (1, BELT, &["mystery"])]);
        let tiles = overlay_tiles(&graph, &icons());
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].tile, "icon_ore");
    }

    #[test]
    fn empty_conveyor_draws_nothing() {
        let graph = graph_with_outputs(&[(0, BELT, &[])]);
        assert!(overlay_tiles(&graph, &icons()).is_empty());
    }
}
