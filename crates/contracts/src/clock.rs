//! Contract time source.

/// Supplies "now" to a contract.
///
/// Contracts read the block timestamp unless a test has pinned the clock
/// with [`Clock::set_current`], mirroring the `setCurrent` hook the test
/// builds of the contracts expose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Clock {
    current: Option<u64>,
}

impl Clock {
    /// Returns the contract's notion of the current time.
    pub const fn now(&self, block_timestamp: u64) -> u64 {
        match self.current {
            Some(current) => current,
            None => block_timestamp,
        }
    }

    /// Pins the clock to `timestamp`.
    pub const fn set_current(&mut self, timestamp: u64) {
        self.current = Some(timestamp);
    }

    /// Returns to following block timestamps.
    pub const fn reset(&mut self) {
        self.current = None;
    }

    /// Whether the clock is pinned.
    pub const fn is_pinned(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_block_time_by_default() {
        let clock = Clock::default();
        assert!(!clock.is_pinned());
        assert_eq!(clock.now(1_000), 1_000);
    }

    #[test]
    fn pinned_clock_ignores_block_time() {
        let mut clock = Clock::default();
        clock.set_current(42);
        assert_eq!(clock.now(1_000), 42);

        clock.reset();
        assert_eq!(clock.now(1_000), 1_000);
    }
}
