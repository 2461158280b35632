//! Resolution pipeline: reads data files, resolves cross-references, builds
//! the machine catalog.
//!
//! A data directory holds up to four files, each in RON, TOML or JSON:
//!
//! | base name        | required | contents                                   |
//! |------------------|----------|--------------------------------------------|
//! | `machines`       | yes      | machine types, ignore list, role keys      |
//! | `resource_nodes` | no       | terrain tiles that specialize drills       |
//! | `icons`          | no       | material -> overlay tile                   |
//! | `config`         | no       | grid bounds and tick interval              |

use crate::schema::{MachineData, MachinesFile, ResourceNodeData};
use assembly_core::catalog::{
    CatalogBuilder, CatalogError, MachineCatalog, MachineRoles, MachineType, Recipe, ResourceNode,
    normalize_key,
};
use assembly_core::config::SimulationConfig;
use assembly_core::orientation::CONVEYOR_ORIENTATIONS;
use assembly_core::overlay::OverlayIcons;
use assembly_core::simulation::{Simulation, SimulationError};
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during data loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: String, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A name reference could not be resolved.
    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    /// A duplicate name was found.
    #[error("duplicate name '{name}' in {file}")]
    DuplicateName { file: PathBuf, name: String },

    /// The resolved definitions did not form a valid catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Formats and files
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

impl Format {
    /// Every format, in the order files are probed.
    pub const ALL: [Format; 3] = [Format::Ron, Format::Toml, Format::Json];

    pub fn extension(self) -> &'static str {
        match self {
            Format::Ron => "ron",
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }

    /// The format named by `path`'s extension.
    pub fn of(path: &Path) -> Result<Self, DataLoadError> {
        let ext = path.extension().and_then(|e| e.to_str());
        Self::ALL
            .into_iter()
            .find(|f| Some(f.extension()) == ext)
            .ok_or_else(|| DataLoadError::UnsupportedFormat {
                file: path.to_path_buf(),
            })
    }

    fn parse<T: DeserializeOwned>(self, content: &str) -> Result<T, String> {
        match self {
            Format::Ron => ron::from_str(content).map_err(|e| e.to_string()),
            Format::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

/// The `{base_name}.<ext>` file in `dir`, if there is one. Two files with
/// the same base name are a [`DataLoadError::ConflictingFormats`].
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut present = Format::ALL
        .iter()
        .map(|f| dir.join(format!("{base_name}.{}", f.extension())))
        .filter(|path| path.is_file());
    match (present.next(), present.next()) {
        (Some(a), Some(b)) => Err(DataLoadError::ConflictingFormats { a, b }),
        (found, _) => Ok(found),
    }
}

pub fn require_data_file(dir: &Path, base_name: &str) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name.to_string(),
        dir: dir.to_path_buf(),
    })
}

fn parse_error(path: &Path, detail: impl ToString) -> DataLoadError {
    DataLoadError::Parse {
        file: path.to_path_buf(),
        detail: detail.to_string(),
    }
}

pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = Format::of(path)?;
    let content = std::fs::read_to_string(path)?;
    format.parse(&content).map_err(|detail| parse_error(path, detail))
}

/// Read a list file. TOML has no top-level arrays, so there the list sits
/// under `toml_key`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    if Format::of(path)? != Format::Toml {
        return deserialize_file(path);
    }
    let mut table: toml::Table = deserialize_file(path)?;
    let list = table
        .remove(toml_key)
        .ok_or_else(|| parse_error(path, format!("no `{toml_key}` array")))?;
    list.try_into()
        .map_err(|e: toml::de::Error| parse_error(path, e))
}

// ---------------------------------------------------------------------------
// Names
// ---------------------------------------------------------------------------

fn insert_unique(seen: &mut HashSet<String>, name: &str, file: &Path) -> Result<(), DataLoadError> {
    if seen.insert(name.to_string()) {
        Ok(())
    } else {
        Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            name: name.to_string(),
        })
    }
}

fn require_known(
    known: &HashSet<String>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<(), DataLoadError> {
    if known.contains(name) {
        Ok(())
    } else {
        Err(DataLoadError::UnresolvedRef {
            file: file.to_path_buf(),
            name: name.to_string(),
            expected_kind,
        })
    }
}

// ===========================================================================
// Loading pipeline
// ===========================================================================

/// Everything a data directory defines.
#[derive(Debug)]
pub struct GameData {
    pub catalog: MachineCatalog,
    pub icons: OverlayIcons,
    pub config: SimulationConfig,
}

impl GameData {
    /// Hand the loaded data to a fresh [`Simulation`].
    pub fn into_simulation(self) -> Result<Simulation, SimulationError> {
        Simulation::new(self.catalog, self.icons, self.config)
    }
}

/// Load and resolve every data file in `dir`.
pub fn load_game_data(dir: &Path) -> Result<GameData, DataLoadError> {
    let machines_path = require_data_file(dir, "machines")?;
    let machines: MachinesFile = deserialize_file(&machines_path)?;

    let mut builder = CatalogBuilder::new();
    let mut known = HashSet::new();

    for data in &machines.machines {
        insert_unique(&mut known, &normalize_key(&data.key), &machines_path)?;
    }
    for data in &machines.machines {
        for target in data.terrain_overrides.values() {
            require_known(&known, &normalize_key(target), &machines_path, "machine")?;
        }
        builder.register_machine(machine_type(data));
    }

    if let Some(capacity) = machines.conveyor_capacity {
        for (key, _) in CONVEYOR_ORIENTATIONS.iter() {
            if !known.contains(*key) {
                builder.register_machine(MachineType::new(key, capacity));
            }
        }
    }

    for key in &machines.ignore {
        builder.ignore_key(key);
    }

    let defaults = MachineRoles::default();
    builder.set_roles(MachineRoles {
        drill: machines.roles.drill.clone().unwrap_or(defaults.drill),
        source_class: machines
            .roles
            .source_class
            .clone()
            .unwrap_or(defaults.source_class),
        rocket: machines.roles.rocket.clone().unwrap_or(defaults.rocket),
    });

    let mut node_count = 0;
    if let Some(path) = find_data_file(dir, "resource_nodes")? {
        let nodes: Vec<ResourceNodeData> = deserialize_list(&path, "resource_nodes")?;
        let mut seen = HashSet::new();
        for node in &nodes {
            insert_unique(&mut seen, &node.name, &path)?;
            require_known(&known, &normalize_key(&node.machine), &path, "machine")?;
            let tiles: Vec<&str> = node.tiles.iter().map(String::as_str).collect();
            builder.register_resource_node(ResourceNode::new(&node.name, &tiles, &node.machine));
        }
        node_count = nodes.len();
    }

    let catalog = builder.build()?;

    let icons = match find_data_file(dir, "icons")? {
        Some(path) => deserialize_file(&path)?,
        None => OverlayIcons::new(),
    };

    let config = match find_data_file(dir, "config")? {
        Some(path) => deserialize_file(&path)?,
        None => SimulationConfig::default(),
    };

    tracing::info!(
        target: "assembly::data",
        dir = %dir.display(),
        machines = catalog.len(),
        resource_nodes = node_count,
        icons = icons.len(),
        tick_interval = config.tick_interval,
        "game_data.loaded"
    );

    Ok(GameData {
        catalog,
        icons,
        config,
    })
}

fn machine_type(data: &MachineData) -> MachineType {
    let mut machine = MachineType::new(&data.key, data.capacity);
    if let Some(recipe) = &data.recipe {
        let inputs: Vec<(&str, u32)> = recipe.inputs.iter().map(|(m, c)| (m.as_str(), *c)).collect();
        let outputs: Vec<(&str, u32)> = recipe.outputs.iter().map(|(m, c)| (m.as_str(), *c)).collect();
        machine = machine.with_recipe(Recipe::convert(&inputs, &outputs));
    }
    if let Some(effect) = &data.effect {
        machine = machine.with_effect(effect);
    }
    for (terrain, target) in &data.terrain_overrides {
        machine = machine.with_terrain_override(terrain, target);
    }
    machine
}

// ===========================================================================
// Tests
// ===========================================================================
