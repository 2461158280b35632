//! Carries machine state from the previous graph generation into a freshly
//! built one.
//!
//! A machine keeps its storages across a rebuild when a machine of the same
//! effective type stood at the same position before. Anything else starts
//! empty. Ports are never carried; they belong to the generation that
//! created them.

use crate::graph::MachineGraph;

/// Counts from one migration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Machines that received storages from the previous generation.
    pub transplanted: usize,
    /// Machines that start with empty storages.
    pub fresh: usize,
}

/// Move storages from `previous` into matching machines of `new`.
///
/// Matching machines are removed from `previous`, so a machine's state is
/// transplanted at most once and whatever remains in `previous` afterwards
/// was demolished or replaced.
pub fn migrate(new: &mut MachineGraph, previous: &mut MachineGraph) -> MigrationReport {
    let mut report = MigrationReport::default();

    for id in new.ids() {
        let Some(machine) = new.get_mut(id) else {
            continue;
        };
        let matches = previous
            .machine_at(machine.position)
            .is_some_and(|old| old.key() == machine.key());
        if !matches {
            report.fresh += 1;
            continue;
        }
        let Some(old) = previous.remove_at(machine.position) else {
            report.fresh += 1;
            continue;
        };
        machine.input = old.input;
        machine.output = old.output;
        machine.temp = old.temp;
        machine.machine_type = old.machine_type;
        report.transplanted += 1;
    }

    tracing::debug!(
        target: "assembly::migration",
        transplanted = report.transplanted,
        fresh = report.fresh,
        dropped = previous.len(),
        "state.migrated"
    );

    report
}
