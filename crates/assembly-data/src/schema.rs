//! Serde data file structs for catalog definitions.
//!
//! These structs define the on-disk format for machine types, role keys,
//! resource nodes and the ignore list. They are deserialized from RON, JSON,
//! or TOML data files and then resolved into catalog types by the loader.

use serde::Deserialize;
use std::collections::BTreeMap;

// ===========================================================================
// Machines
// ===========================================================================

/// Contents of the `machines` file.
#[derive(Debug, Clone, Deserialize)]
pub struct MachinesFile {
    pub machines: Vec<MachineData>,
    /// When set, every conveyor orientation not listed in `machines` is
    /// registered with this capacity.
    #[serde(default)]
    pub conveyor_capacity: Option<u32>,
    /// Tile keys skipped without being reported as unmapped.
    #[serde(default)]
    pub ignore: Vec<String>,
    #[serde(default)]
    pub roles: RolesData,
}

/// A machine type definition.
#[derive(Debug, Clone, Deserialize)]
pub struct MachineData {
    pub key: String,
    pub capacity: u32,
    #[serde(default)]
    pub recipe: Option<RecipeData>,
    #[serde(default)]
    pub effect: Option<String>,
    /// Terrain tile key -> machine key. Only consulted for drills.
    #[serde(default)]
    pub terrain_overrides: BTreeMap<String, String>,
}

/// A recipe definition. An empty `inputs` list makes a source.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeData {
    #[serde(default)]
    pub inputs: Vec<(String, u32)>,
    pub outputs: Vec<(String, u32)>,
}

/// Role key overrides. Anything left out keeps the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RolesData {
    #[serde(default)]
    pub drill: Option<String>,
    #[serde(default)]
    pub source_class: Option<Vec<String>>,
    #[serde(default)]
    pub rocket: Option<String>,
}

// ===========================================================================
// Resource nodes
// ===========================================================================

/// A resource node: terrain tiles that turn a drill into `machine`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceNodeData {
    pub name: String,
    pub tiles: Vec<String>,
    pub machine: String,
}
