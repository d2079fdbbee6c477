// SPDX-License-Identifier: MIT OR Apache-2.0
//! Time sources sampled once per frame.

use std::time::Instant;

/// Source of the current time in seconds
pub trait Clock {
    /// Current time in seconds
    fn now_seconds(&self) -> f32;
}

impl<F: Fn() -> f32> Clock for F {
    fn now_seconds(&self) -> f32 {
        self()
    }
}

/// Wall-clock seconds elapsed since the clock was created
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    /// Start a clock at zero
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_seconds(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_clock() {
        let clock = || 4.5_f32;
        assert_eq!(clock.now_seconds(), 4.5);
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let first = clock.now_seconds();
        let second = clock.now_seconds();
        assert!(first >= 0.0);
        assert!(second >= first);
    }
}
