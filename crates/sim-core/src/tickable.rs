//! Trait for components that can be advanced by clock ticks.

use crate::Ticks;

/// A component that can be advanced by clock ticks.
///
/// This is the core abstraction for cycle-accurate modeling. The top-level
/// machine implements this trait and fans one master-clock tick out to every
/// clocked element it contains; there is no implicit global clock.
pub trait Tickable {
    /// Advance the component by one master clock tick.
    ///
    /// All registered state visible after this call reflects exactly one
    /// clock edge. Combinational outputs for the elapsed cycle are computed
    /// from the state as it was *before* the edge.
    fn tick(&mut self);

    /// Advance the component by multiple ticks.
    ///
    /// Default implementation calls `tick()` in a loop. Components may
    /// override for efficiency, but must produce identical results.
    fn tick_n(&mut self, count: Ticks) {
        for _ in 0..count.get() {
            self.tick();
        }
    }
}
