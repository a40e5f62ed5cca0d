//! Linear backoff delay generator

use std::time::Duration;

/// Stateful generator producing a strictly increasing delay sequence.
///
/// The n-th call to [`next_delay`](Self::next_delay) returns `n * increment`
/// (1000 ms, 2000 ms, 3000 ms, ... with the default increment). One instance
/// serves exactly one retry sequence; a new sequence gets a fresh generator
/// so the delays restart from the increment.
#[derive(Debug)]
pub struct LinearBackoff {
    increment: Duration,
    calls: u32,
}

impl LinearBackoff {
    pub fn new() -> Self {
        Self::with_increment(Duration::from_millis(1000))
    }

    pub fn with_increment(increment: Duration) -> Self {
        Self { increment, calls: 0 }
    }

    /// Next delay in the sequence.
    pub fn next_delay(&mut self) -> Duration {
        self.calls += 1;
        self.increment.saturating_mul(self.calls)
    }
}

impl Default for LinearBackoff {
    fn default() -> Self {
        Self::new()
    }
}
