//! The tick: production inside machines, then transport across ports.
//!
//! # Phases
//!
//! 1. **Process** -- every machine works on its own storages. Conveyors move
//!    one package from input to output; source recipes produce into output;
//!    other recipes stage ingredients from input into temp and craft once
//!    temp holds the full requirement; recipe-less machines just accumulate.
//! 2. **Transport** -- every output port moves at most one package into the
//!    neighbor's input.
//!
//! Transport only takes from output storages and process only takes from
//! input storages, so a package makes at most one hop per tick regardless of
//! the order machines are visited in.

use crate::event::ProductionEvent;
use crate::fixed::Ticks;
use crate::graph::{Machine, MachineGraph};
use crate::id::MachineId;
use crate::orientation::is_conveyor;
use crate::storage::{MaterialPackage, Storage};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ProductionEngine {
    tick: Ticks,
}

impl ProductionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ticks run so far.
    pub fn current_tick(&self) -> Ticks {
        self.tick
    }

    /// Advance `graph` by one tick.
    pub fn tick(&mut self, graph: &mut MachineGraph) -> Vec<ProductionEvent> {
        self.tick += 1;
        let ids = graph.ids();

        let mut events = Vec::new();
        for &id in &ids {
            if let Some(machine) = graph.get_mut(id) {
                events.extend(process(machine, self.tick));
            }
        }

        for &id in &ids {
            transport(graph, id);
        }

        tracing::trace!(
            target: "assembly::engine",
            tick = self.tick,
            produced = events.len(),
            "tick.completed"
        );
        events
    }
}

// ---------------------------------------------------------------------------
// Phase 1: process
// ---------------------------------------------------------------------------

fn process(machine: &mut Machine, tick: Ticks) -> Option<ProductionEvent> {
    let machine_type = Arc::clone(&machine.machine_type);
    let position = machine.position;
    let Machine {
        input,
        output,
        temp,
        ..
    } = machine;

    if is_conveyor(&machine_type.key) {
        shift(input, output);
        return None;
    }

    let recipe = machine_type.recipe.as_ref()?;

    if !recipe.is_source() {
        // Stage what the recipe still lacks, oldest first.
        while temp.has_space_for(1) {
            let staged = input.take_oldest_where(|p| {
                recipe
                    .consumes
                    .get(&p.material)
                    .is_some_and(|&need| temp.count(&p.material) < need)
            });
            let Some(package) = staged else {
                break;
            };
            if let Err(package) = temp.push(package) {
                restore(input, package);
                break;
            }
        }

        let ready = recipe
            .consumes
            .iter()
            .all(|(material, &need)| temp.count(material) >= need);
        if !ready {
            return None;
        }
    }

    if !output.has_space_for(recipe.output_count()) {
        return None;
    }

    for (material, &need) in &recipe.consumes {
        temp.remove_material(material, need);
    }

    let mut produced = Vec::with_capacity(recipe.output_count() as usize);
    for (material, &count) in &recipe.produces {
        for _ in 0..count {
            let package = MaterialPackage::new(material.clone(), position);
            if output.push(package.clone()).is_ok() {
                produced.push(package);
            }
        }
    }

    Some(ProductionEvent {
        tick,
        position,
        key: machine_type.key.clone(),
        produced,
        effect: machine_type.production_effect.clone(),
    })
}

/// Move the oldest package of `from` to the back of `to`.
fn shift(from: &mut Storage, to: &mut Storage) -> bool {
    if !to.has_space_for(1) {
        return false;
    }
    let Some(package) = from.pop_oldest() else {
        return false;
    };
    match to.push(package) {
        Ok(()) => true,
        Err(package) => {
            restore(from, package);
            false
        }
    }
}

/// Return a package to the storage it was just taken from.
fn restore(storage: &mut Storage, package: MaterialPackage) {
    if let Err(package) = storage.push_front(package) {
        tracing::error!(
            target: "assembly::engine",
            material = %package.material,
            position = %package.last_position,
            "package.lost"
        );
    }
}

// ---------------------------------------------------------------------------
// Phase 2: transport
// ---------------------------------------------------------------------------

fn transport(graph: &mut MachineGraph, id: MachineId) {
    let Some(machine) = graph.get(id) else {
        return;
    };
    let targets: Vec<MachineId> = machine.output_ports.iter().map(|p| p.target).collect();

    for target in targets {
        let Some(neighbor) = graph.get(target) else {
            continue;
        };
        if !neighbor.input.has_space_for(1) {
            continue;
        }
        let neighbor_type = Arc::clone(&neighbor.machine_type);
        let neighbor_position = neighbor.position;

        let Some(source) = graph.get_mut(id) else {
            return;
        };
        let Some(mut package) = source
            .output
            .take_oldest_where(|p| neighbor_type.accepts(&p.material))
        else {
            continue;
        };
        let source_position = source.position;
        package.last_position = neighbor_position;

        let rejected = match graph.get_mut(target) {
            Some(neighbor) => neighbor.input.push(package).err(),
            None => Some(package),
        };
        if let Some(mut package) = rejected {
            package.last_position = source_position;
            if let Some(source) = graph.get_mut(id) {
                restore(&mut source.output, package);
            }
        }
    }
}
