//! Master clock configuration.

use crate::Ticks;

/// Master clock configuration for a modeled system.
///
/// Each system has one crystal that drives all timing. Components may run at
/// divided rates, but everything derives from this frequency.
#[derive(Debug, Clone, Copy)]
pub struct MasterClock {
    /// Crystal frequency in Hz (e.g. `25_000_000` for a 25 MHz pixel clock).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Ticks per frame at the given frame rate (integer division).
    #[must_use]
    pub const fn ticks_per_frame(&self, frames_per_second: u64) -> Ticks {
        Ticks::new(self.frequency_hz / frames_per_second)
    }

    /// Wall-clock microseconds covered by `ticks` at this frequency
    /// (integer division).
    #[must_use]
    pub const fn micros_for(&self, ticks: Ticks) -> u64 {
        ticks.get() * 1_000_000 / self.frequency_hz
    }
}
