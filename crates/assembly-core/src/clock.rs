//! Fixed-interval tick scheduling.
//!
//! Elapsed wall-clock time is fed in as it arrives and accumulated in
//! fixed point, so the number of ticks due after any sequence of
//! `advance` calls depends only on the total elapsed time.

use crate::fixed::{Fixed64, Seconds, checked_f64_to_fixed64};

/// Shortest accepted tick interval: 1/1024 of a second.
pub const MIN_TICK_INTERVAL: Seconds = Fixed64::from_bits(1 << 22);

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClockError {
    #[error("tick interval must be positive, got {0}")]
    NonPositiveInterval(Seconds),
    #[error("tick interval {0} is shorter than the minimum of 1/1024 s")]
    IntervalTooShort(Seconds),
    #[error("tick interval {0} is not representable in fixed point")]
    InvalidInterval(f64),
}

/// Turns elapsed time into a count of due ticks.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    interval: Seconds,
    /// Time carried over from previous calls. Below `interval` unless more
    /// than `u32::MAX` ticks came due in one call.
    accumulator: Seconds,
}

impl SimulationClock {
    pub fn new(interval: Seconds) -> Result<Self, ClockError> {
        if interval <= Fixed64::ZERO {
            return Err(ClockError::NonPositiveInterval(interval));
        }
        if interval < MIN_TICK_INTERVAL {
            return Err(ClockError::IntervalTooShort(interval));
        }
        Ok(Self {
            interval,
            accumulator: Fixed64::ZERO,
        })
    }

    pub fn from_secs_f64(interval: f64) -> Result<Self, ClockError> {
        let interval =
            checked_f64_to_fixed64(interval).ok_or(ClockError::InvalidInterval(interval))?;
        Self::new(interval)
    }

    pub fn interval(&self) -> Seconds {
        self.interval
    }

    pub fn accumulator(&self) -> Seconds {
        self.accumulator
    }

    /// Accumulate `dt` and return how many ticks are now due. Negative
    /// `dt` is treated as zero. Ticks past `u32::MAX` stay in the
    /// accumulator for the next call.
    pub fn advance(&mut self, dt: Seconds) -> u32 {
        if dt > Fixed64::ZERO {
            self.accumulator = self.accumulator.saturating_add(dt);
        }
        // Both are non-negative and the interval is at least MIN_TICK_INTERVAL,
        // so integer division on the raw bits is exact and cannot overflow.
        let held = self.accumulator.to_bits();
        let interval = self.interval.to_bits();
        let due = u32::try_from(held / interval).unwrap_or(u32::MAX);
        self.accumulator = Fixed64::from_bits(held - i64::from(due) * interval);
        due
    }

    /// Drop any carried-over time.
    pub fn reset(&mut self) {
        self.accumulator = Fixed64::ZERO;
    }
}
