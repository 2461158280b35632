//! Machine templates keyed by normalized tile key.
//!
//! A [`MachineCatalog`] is assembled through a [`CatalogBuilder`] and frozen
//! by [`CatalogBuilder::build`], which validates every cross reference. After
//! that it is only read: the topology builder looks templates up by tile
//! key, and drill specialization consults the resource-node list.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

/// Default tile keys for the machine roles the topology builder cares about.
pub mod keys {
    pub const ROCKET: &str = "baseanimtile";
    pub const DRILL: &str = "drillanimtile";
    pub const REFINERY: &str = "factory_0";
    pub const SMELTER: &str = "factory_armory";
    pub const ARMORY: &str = "factory_smelter";
}

/// Lowercase a tile key so lookups are case-insensitive.
pub fn normalize_key(key: &str) -> String {
    key.to_lowercase()
}

// ---------------------------------------------------------------------------
// Recipes and machine types
// ---------------------------------------------------------------------------

/// What a machine consumes and produces per production cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default)]
    pub consumes: BTreeMap<String, u32>,
    #[serde(default)]
    pub produces: BTreeMap<String, u32>,
}

impl Recipe {
    /// A recipe that produces from nothing.
    pub fn source(material: &str, count: u32) -> Self {
        Self {
            consumes: BTreeMap::new(),
            produces: BTreeMap::from([(material.to_string(), count)]),
        }
    }

    /// A recipe that turns `inputs` into `outputs`.
    pub fn convert(inputs: &[(&str, u32)], outputs: &[(&str, u32)]) -> Self {
        Self {
            consumes: inputs.iter().map(|(m, c)| (m.to_string(), *c)).collect(),
            produces: outputs.iter().map(|(m, c)| (m.to_string(), *c)).collect(),
        }
    }

    /// True when the recipe needs no inputs.
    pub fn is_source(&self) -> bool {
        self.consumes.values().all(|&c| c == 0)
    }

    pub fn input_count(&self) -> u32 {
        self.consumes.values().sum()
    }

    pub fn output_count(&self) -> u32 {
        self.produces.values().sum()
    }
}

/// A machine template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineType {
    pub key: String,
    /// `None` for conveyors and terminal sinks.
    #[serde(default)]
    pub recipe: Option<Recipe>,
    /// Capacity of each of the machine's three storages.
    pub capacity: u32,
    /// Identifier handed to the presentation layer when this type produces.
    #[serde(default)]
    pub production_effect: Option<String>,
    /// Terrain tile key -> alternate machine type key. Drills only.
    #[serde(default)]
    pub terrain_overrides: BTreeMap<String, String>,
}

impl MachineType {
    pub fn new(key: &str, capacity: u32) -> Self {
        Self {
            key: key.to_string(),
            recipe: None,
            capacity,
            production_effect: None,
            terrain_overrides: BTreeMap::new(),
        }
    }

    pub fn with_recipe(mut self, recipe: Recipe) -> Self {
        self.recipe = Some(recipe);
        self
    }

    pub fn with_effect(mut self, effect: &str) -> Self {
        self.production_effect = Some(effect.to_string());
        self
    }

    pub fn with_terrain_override(mut self, terrain: &str, key: &str) -> Self {
        self.terrain_overrides
            .insert(normalize_key(terrain), normalize_key(key));
        self
    }

    /// Whether a package of `material` may be pushed into this type's input.
    ///
    /// Recipe-less machines take anything; recipe machines only what they consume.
    pub fn accepts(&self, material: &str) -> bool {
        match &self.recipe {
            None => true,
            Some(recipe) => recipe.consumes.get(material).is_some_and(|&c| c > 0),
        }
    }
}

/// Terrain tiles that turn a drill into a resource-specific machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNode {
    pub name: String,
    pub tiles: BTreeSet<String>,
    /// Key of the machine type a drill on one of `tiles` becomes.
    pub machine_type: String,
}

impl ResourceNode {
    pub fn new(name: &str, tiles: &[&str], machine_type: &str) -> Self {
        Self {
            name: name.to_string(),
            tiles: tiles.iter().map(|t| normalize_key(t)).collect(),
            machine_type: normalize_key(machine_type),
        }
    }
}

/// Keys that play a structural role during topology inference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineRoles {
    /// Drills are specialized by the terrain beneath them.
    pub drill: String,
    /// Source-class keys get bidirectional wiring to adjacent conveyors.
    pub source_class: Vec<String>,
    /// The terminal sink. Located at the grid origin by convention.
    pub rocket: String,
}

impl Default for MachineRoles {
    fn default() -> Self {
        Self {
            drill: keys::DRILL.to_string(),
            source_class: vec![
                keys::DRILL.to_string(),
                keys::REFINERY.to_string(),
                keys::SMELTER.to_string(),
                keys::ARMORY.to_string(),
            ],
            rocket: keys::ROCKET.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate machine type: {0}")]
    DuplicateKey(String),
    #[error("machine type {0} has zero capacity")]
    ZeroCapacity(String),
    #[error("recipe of {key} needs {needed} slots but capacity is {capacity}")]
    RecipeExceedsCapacity {
        key: String,
        needed: u32,
        capacity: u32,
    },
    #[error("resource node {node} references unknown machine type {key}")]
    UnknownResourceType { node: String, key: String },
    #[error("terrain override on {owner} references unknown machine type {key}")]
    UnknownOverrideType { owner: String, key: String },
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Collects machine types, ignore keys and resource nodes, then validates
/// them into an immutable [`MachineCatalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    types: Vec<MachineType>,
    ignored: BTreeSet<String>,
    resource_nodes: Vec<ResourceNode>,
    roles: MachineRoles,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_machine(&mut self, mut machine: MachineType) -> &mut Self {
        machine.key = normalize_key(&machine.key);
        machine.terrain_overrides = std::mem::take(&mut machine.terrain_overrides)
            .into_iter()
            .map(|(terrain, key)| (normalize_key(&terrain), normalize_key(&key)))
            .collect();
        self.types.push(machine);
        self
    }

    /// Tiles with this key are skipped without being reported as unmapped.
    pub fn ignore_key(&mut self, key: &str) -> &mut Self {
        self.ignored.insert(normalize_key(key));
        self
    }

    /// Resource nodes are consulted in registration order.
    pub fn register_resource_node(&mut self, node: ResourceNode) -> &mut Self {
        self.resource_nodes.push(node);
        self
    }

    pub fn set_roles(&mut self, roles: MachineRoles) -> &mut Self {
        self.roles = MachineRoles {
            drill: normalize_key(&roles.drill),
            source_class: roles.source_class.iter().map(|k| normalize_key(k)).collect(),
            rocket: normalize_key(&roles.rocket),
        };
        self
    }

    pub fn build(self) -> Result<MachineCatalog, CatalogError> {
        let mut types: HashMap<String, Arc<MachineType>> = HashMap::new();
        for machine in self.types {
            if machine.capacity == 0 {
                return Err(CatalogError::ZeroCapacity(machine.key));
            }
            if let Some(recipe) = &machine.recipe {
                let needed = recipe.input_count().max(recipe.output_count());
                if needed > machine.capacity {
                    return Err(CatalogError::RecipeExceedsCapacity {
                        key: machine.key.clone(),
                        needed,
                        capacity: machine.capacity,
                    });
                }
            }
            if types.contains_key(&machine.key) {
                return Err(CatalogError::DuplicateKey(machine.key));
            }
            types.insert(machine.key.clone(), Arc::new(machine));
        }

        for machine in types.values() {
            for target in machine.terrain_overrides.values() {
                if !types.contains_key(target) {
                    return Err(CatalogError::UnknownOverrideType {
                        owner: machine.key.clone(),
                        key: target.clone(),
                    });
                }
            }
        }

        let mut resource_nodes = Vec::with_capacity(self.resource_nodes.len());
        for node in self.resource_nodes {
            let key = normalize_key(&node.machine_type);
            let Some(machine) = types.get(&key) else {
                return Err(CatalogError::UnknownResourceType {
                    node: node.name,
                    key,
                });
            };
            let tiles = node.tiles.iter().map(|t| normalize_key(t)).collect();
            resource_nodes.push(CompiledResourceNode {
                name: node.name,
                tiles,
                machine: Arc::clone(machine),
            });
        }

        Ok(MachineCatalog {
            types,
            ignored: self.ignored.into_iter().collect(),
            resource_nodes,
            roles: self.roles,
        })
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct CompiledResourceNode {
    name: String,
    tiles: HashSet<String>,
    machine: Arc<MachineType>,
}

/// Immutable catalog. Frozen after [`CatalogBuilder::build`].
#[derive(Debug)]
pub struct MachineCatalog {
    types: HashMap<String, Arc<MachineType>>,
    ignored: HashSet<String>,
    resource_nodes: Vec<CompiledResourceNode>,
    roles: MachineRoles,
}

impl MachineCatalog {
    /// Look up a template by normalized key.
    pub fn get(&self, key: &str) -> Option<&Arc<MachineType>> {
        self.types.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.types.contains_key(key)
    }

    pub fn is_ignored(&self, key: &str) -> bool {
        self.ignored.contains(key)
    }

    pub fn is_source_class(&self, key: &str) -> bool {
        self.roles.source_class.iter().any(|k| k == key)
    }

    pub fn is_drill(&self, key: &str) -> bool {
        self.roles.drill == key
    }

    pub fn roles(&self) -> &MachineRoles {
        &self.roles
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Names of the resource nodes, in consultation order.
    pub fn resource_node_names(&self) -> impl Iterator<Item = &str> {
        self.resource_nodes.iter().map(|n| n.name.as_str())
    }

    /// The effective type of a drill standing on `terrain`, if it differs
    /// from the drill's base type.
    ///
    /// The first resource node containing the tile wins. When none does, the
    /// base type's own override table is consulted.
    pub fn specialize(&self, base: &MachineType, terrain: &str) -> Option<Arc<MachineType>> {
        let terrain = normalize_key(terrain);
        if let Some(node) = self
            .resource_nodes
            .iter()
            .find(|n| n.tiles.contains(&terrain))
        {
            return Some(Arc::clone(&node.machine));
        }
        base.terrain_overrides
            .get(&terrain)
            .and_then(|key| self.types.get(key))
            .map(Arc::clone)
    }
}
