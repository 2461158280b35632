//! Production events returned from each tick.
//!
//! The engine never calls out to the presentation layer. It returns one
//! [`ProductionEvent`] per machine that produced during the tick, and the
//! caller hands the batch to whatever plays effects.

use crate::fixed::Ticks;
use crate::position::Position;
use crate::storage::MaterialPackage;

/// One machine produced during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionEvent {
    pub tick: Ticks,
    pub position: Position,
    /// Effective type key of the producing machine.
    pub key: String,
    /// Copies of the packages pushed into the machine's output storage.
    pub produced: Vec<MaterialPackage>,
    /// Effect identifier from the machine type, if it has one.
    pub effect: Option<String>,
}

impl ProductionEvent {
    /// Number of packages of `material` produced.
    pub fn count(&self, material: &str) -> usize {
        self.produced
            .iter()
            .filter(|p| p.material == material)
            .count()
    }
}
