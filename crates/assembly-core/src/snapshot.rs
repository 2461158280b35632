//! Tile sources and the immutable scan taken at the start of a rebuild.

use crate::catalog::normalize_key;
use crate::position::{GridBounds, Position};
use std::collections::HashMap;

/// Read access to the placed-tile layer and the terrain layer beneath it.
///
/// Implemented by whatever owns the tile grid; the simulation only reads.
pub trait TileSource {
    fn has_tile(&self, position: Position) -> bool;

    /// Raw tile key at `position`, as authored. `None` for empty cells.
    fn tile_key_at(&self, position: Position) -> Option<&str>;

    /// Terrain tile key beneath `position`, if any.
    fn terrain_key_at(&self, position: Position) -> Option<&str>;
}

/// An in-memory tile grid with a terrain layer.
#[derive(Debug, Clone, Default)]
pub struct TileMap {
    tiles: HashMap<Position, String>,
    terrain: HashMap<Position, String>,
}

impl TileMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a tile, replacing whatever was there.
    pub fn set_tile(&mut self, position: Position, key: &str) -> &mut Self {
        self.tiles.insert(position, key.to_string());
        self
    }

    pub fn remove_tile(&mut self, position: Position) -> Option<String> {
        self.tiles.remove(&position)
    }

    pub fn set_terrain(&mut self, position: Position, key: &str) -> &mut Self {
        self.terrain.insert(position, key.to_string());
        self
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }
}

impl TileSource for TileMap {
    fn has_tile(&self, position: Position) -> bool {
        self.tiles.contains_key(&position)
    }

    fn tile_key_at(&self, position: Position) -> Option<&str> {
        self.tiles.get(&position).map(String::as_str)
    }

    fn terrain_key_at(&self, position: Position) -> Option<&str> {
        self.terrain.get(&position).map(String::as_str)
    }
}

/// One occupied cell of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedTile {
    pub position: Position,
    /// Normalized (lowercase) tile key.
    pub key: String,
    /// Normalized terrain key beneath the tile.
    pub terrain: Option<String>,
}

/// An immutable read of the tile grid for one rebuild.
#[derive(Debug, Clone, Default)]
pub struct GridSnapshot {
    bounds: GridBounds,
    tiles: Vec<ScannedTile>,
    terrain: HashMap<Position, String>,
}

impl GridSnapshot {
    /// Scan every cell of `bounds` in x-outer, y-inner order.
    pub fn capture<S: TileSource + ?Sized>(source: &S, bounds: GridBounds) -> Self {
        let mut tiles = Vec::new();
        let mut terrain = HashMap::new();
        for position in bounds.cells() {
            if !source.has_tile(position) {
                continue;
            }
            let Some(key) = source.tile_key_at(position) else {
                continue;
            };
            let under = source.terrain_key_at(position).map(normalize_key);
            if let Some(t) = &under {
                terrain.insert(position, t.clone());
            }
            tiles.push(ScannedTile {
                position,
                key: normalize_key(key),
                terrain: under,
            });
        }
        Self {
            bounds,
            tiles,
            terrain,
        }
    }

    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Occupied cells in scan order.
    pub fn tiles(&self) -> &[ScannedTile] {
        &self.tiles
    }

    pub fn terrain_at(&self, position: Position) -> Option<&str> {
        self.terrain.get(&position).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
