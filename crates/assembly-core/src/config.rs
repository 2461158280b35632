use crate::clock::{ClockError, SimulationClock};
use crate::position::GridBounds;
use serde::{Deserialize, Serialize};

/// Seconds between ticks when nothing else is configured.
pub const DEFAULT_TICK_INTERVAL: f64 = 0.2;

/// Runtime parameters consulted at rebuild and clock setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Area scanned on every rebuild.
    pub bounds: GridBounds,
    /// Seconds between ticks.
    pub tick_interval: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            bounds: GridBounds::default(),
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

impl SimulationConfig {
    pub fn clock(&self) -> Result<SimulationClock, ClockError> {
        SimulationClock::from_secs_f64(self.tick_interval)
    }
}
