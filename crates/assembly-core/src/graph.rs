use crate::catalog::MachineType;
use crate::id::MachineId;
use crate::position::Position;
use crate::storage::Storage;
use slotmap::SlotMap;
use std::collections::HashMap;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("position {0} is already occupied")]
    PositionOccupied(Position),
    #[error("machine not found: {0:?}")]
    MachineNotFound(MachineId),
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Which way material flows across a port, seen from its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortDirection {
    Input,
    Output,
}

/// A directed, non-owning link from a machine to a neighbor in the same
/// graph generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Port {
    pub target: MachineId,
    pub direction: PortDirection,
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

/// One simulated unit occupying one grid cell.
#[derive(Debug, Clone)]
pub struct Machine {
    pub position: Position,
    /// Key the catalog assigned when the tile was scanned.
    pub base_key: String,
    /// Current type. Differs from the base type after drill specialization.
    pub machine_type: Arc<MachineType>,
    pub input_ports: Vec<Port>,
    pub output_ports: Vec<Port>,
    pub input: Storage,
    pub output: Storage,
    /// Processing buffer for staged recipe ingredients.
    pub temp: Storage,
}

impl Machine {
    /// A machine with empty storages sized by its type's capacity.
    pub fn new(position: Position, machine_type: Arc<MachineType>) -> Self {
        let capacity = machine_type.capacity;
        Self {
            position,
            base_key: machine_type.key.clone(),
            machine_type,
            input_ports: Vec::new(),
            output_ports: Vec::new(),
            input: Storage::new(capacity),
            output: Storage::new(capacity),
            temp: Storage::new(capacity),
        }
    }

    /// Effective type key.
    pub fn key(&self) -> &str {
        &self.machine_type.key
    }
}

// ---------------------------------------------------------------------------
// MachineGraph
// ---------------------------------------------------------------------------

/// All machines of one rebuild generation, with O(1) lookup by position.
///
/// Iteration follows slot order, which is insertion order as long as no
/// machine has been removed. The topology builder inserts in scan order, so
/// a freshly built graph iterates deterministically.
#[derive(Debug, Clone, Default)]
pub struct MachineGraph {
    machines: SlotMap<MachineId, Machine>,
    by_position: HashMap<Position, MachineId>,
}

impl MachineGraph {
    /// Create a new, empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a machine. Two machines never share a position.
    pub fn insert(&mut self, machine: Machine) -> Result<MachineId, GraphError> {
        if self.by_position.contains_key(&machine.position) {
            return Err(GraphError::PositionOccupied(machine.position));
        }
        let position = machine.position;
        let id = self.machines.insert(machine);
        self.by_position.insert(position, id);
        Ok(id)
    }

    /// Remove the machine at `position`. Ports on other machines that point
    /// at it are left dangling; only the state migrator removes machines,
    /// and it does so from a generation that is about to be discarded.
    pub fn remove_at(&mut self, position: Position) -> Option<Machine> {
        let id = self.by_position.remove(&position)?;
        self.machines.remove(id)
    }

    pub fn get(&self, id: MachineId) -> Option<&Machine> {
        self.machines.get(id)
    }

    pub fn get_mut(&mut self, id: MachineId) -> Option<&mut Machine> {
        self.machines.get_mut(id)
    }

    pub fn id_at(&self, position: Position) -> Option<MachineId> {
        self.by_position.get(&position).copied()
    }

    pub fn machine_at(&self, position: Position) -> Option<&Machine> {
        self.id_at(position).and_then(|id| self.machines.get(id))
    }

    pub fn contains(&self, id: MachineId) -> bool {
        self.machines.contains_key(id)
    }

    /// Total number of machines in the graph.
    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    /// Iterate over all machine IDs and their data in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (MachineId, &Machine)> {
        self.machines.iter()
    }

    /// Machine IDs in slot order.
    pub fn ids(&self) -> Vec<MachineId> {
        self.machines.keys().collect()
    }

    /// First machine whose effective key equals `key`.
    pub fn find_by_key(&self, key: &str) -> Option<(MachineId, &Machine)> {
        self.machines.iter().find(|(_, m)| m.key() == key)
    }

    /// Give `owner` an input port from `target`.
    pub fn add_input_port(&mut self, owner: MachineId, target: MachineId) -> Result<(), GraphError> {
        self.ensure(target)?;
        let machine = self
            .machines
            .get_mut(owner)
            .ok_or(GraphError::MachineNotFound(owner))?;
        machine.input_ports.push(Port {
            target,
            direction: PortDirection::Input,
        });
        Ok(())
    }

    /// Give `owner` an output port to `target`.
    pub fn add_output_port(&mut self, owner: MachineId, target: MachineId) -> Result<(), GraphError> {
        self.ensure(target)?;
        let machine = self
            .machines
            .get_mut(owner)
            .ok_or(GraphError::MachineNotFound(owner))?;
        machine.output_ports.push(Port {
            target,
            direction: PortDirection::Output,
        });
        Ok(())
    }

    /// Number of ports across all machines, inputs and outputs.
    pub fn port_count(&self) -> usize {
        self.machines
            .values()
            .map(|m| m.input_ports.len() + m.output_ports.len())
            .sum()
    }

    fn ensure(&self, id: MachineId) -> Result<(), GraphError> {
        if self.machines.contains_key(id) {
            Ok(())
        } else {
            Err(GraphError::MachineNotFound(id))
        }
    }
}
