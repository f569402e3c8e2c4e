//! Foreground pacing.

use core::time::Duration;

use crate::hal::Delay;

/// How long the blocking key wait sleeps between two polls.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Core cycles one spin of [`BusyWait`] takes: the loop body, the compare and
/// the branch back. Measured on a Cortex-M0 running from flash with one wait
/// state.
pub const CYCLES_PER_ITERATION: u64 = 4;

/// A calibrated spin loop.
///
/// Accuracy depends on nothing else running; interrupt time is added on top
/// of the requested duration, so waits only ever run long.
#[derive(Copy, Clone, Debug)]
pub struct BusyWait {
    core_clock_hz: u32,
}

impl BusyWait {
    pub const fn new(core_clock_hz: u32) -> Self {
        Self { core_clock_hz }
    }

    /// Loop iterations that cover `duration` at this core clock.
    pub const fn iterations(&self, duration: Duration) -> u64 {
        let nanos = duration.as_nanos();
        let cycles = nanos * self.core_clock_hz as u128 / 1_000_000_000;
        let iterations = cycles / CYCLES_PER_ITERATION as u128;
        if iterations > u64::MAX as u128 {
            u64::MAX
        } else {
            iterations as u64
        }
    }
}

impl Delay for BusyWait {
    fn wait(&mut self, duration: Duration) {
        for _ in 0..self.iterations(duration) {
            core::hint::spin_loop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterations_follow_core_clock() {
        let wait = BusyWait::new(48_000_000);
        assert_eq!(wait.iterations(Duration::from_millis(1)), 12_000);
        assert_eq!(wait.iterations(Duration::from_micros(1)), 12);
        assert_eq!(wait.iterations(Duration::ZERO), 0);
        assert_eq!(BusyWait::new(8_000_000).iterations(Duration::from_secs(1)), 2_000_000);
    }

    #[test]
    fn iterations_cap_at_u64_max() {
        let wait = BusyWait::new(48_000_000);
        assert_eq!(wait.iterations(Duration::MAX), u64::MAX);
    }

    #[test]
    fn zero_wait_returns() {
        let mut wait = BusyWait::new(48_000_000);
        wait.wait(Duration::ZERO);
        wait.wait(Duration::from_micros(10));
    }
}
