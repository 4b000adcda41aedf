//! Wrapping progress counters.

/// A modulo counter with a terminal flag, modeling a hardware progress
/// register.
///
/// Counts `0..modulus`, wrapping to 0 on the advance that would reach
/// `modulus`. `at_terminal()` is true on the cycle the counter is about to
/// wrap. `modulus` must be nonzero.
#[derive(Debug, Clone, Copy)]
pub struct ProgressCounter {
    value: u32,
    modulus: u32,
}

impl ProgressCounter {
    #[must_use]
    pub const fn new(modulus: u32) -> Self {
        Self { value: 0, modulus }
    }

    #[must_use]
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// True when the next advance wraps back to zero.
    #[must_use]
    pub const fn at_terminal(&self) -> bool {
        self.value + 1 == self.modulus
    }

    pub const fn advance(&mut self) {
        self.value = if self.at_terminal() { 0 } else { self.value + 1 };
    }

    pub const fn reset(&mut self) {
        self.value = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_up_and_wraps_at_modulus() {
        let mut counter = ProgressCounter::new(4);
        for expected in 0..4 {
            assert_eq!(counter.value(), expected);
            counter.advance();
        }
        assert_eq!(counter.value(), 0, "counter should wrap to zero");
    }

    #[test]
    fn terminal_flag_only_on_last_value() {
        let mut counter = ProgressCounter::new(3);
        assert!(!counter.at_terminal());
        counter.advance();
        assert!(!counter.at_terminal());
        counter.advance();
        assert!(counter.at_terminal(), "value 2 of modulus 3 is terminal");
        counter.advance();
        assert!(!counter.at_terminal());
    }

    #[test]
    fn reset_returns_to_zero_from_any_value() {
        let mut counter = ProgressCounter::new(8);
        counter.advance();
        counter.advance();
        counter.advance();
        counter.reset();
        assert_eq!(counter.value(), 0);
    }

    #[test]
    fn modulus_one_is_always_terminal() {
        let mut counter = ProgressCounter::new(1);
        assert!(counter.at_terminal());
        counter.advance();
        assert_eq!(counter.value(), 0);
    }
}
