//! Retry policies

use mapvault_domain::MapVaultError;

/// Decides, given a failure and the remaining budget, whether another
/// attempt should be made.
pub trait RetryPolicy: Send {
    fn should_retry(&mut self, error: &MapVaultError) -> bool;
}

/// Budgeted policy that retries transient network failures only.
///
/// The budget is consumed once per retry actually granted: the failure kind
/// is checked first, so a non-transient failure returns false immediately
/// without touching the remaining budget.
#[derive(Debug)]
pub struct TransientRetry {
    remaining: u32,
}

impl TransientRetry {
    pub fn new(budget: u32) -> Self {
        Self { remaining: budget }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

impl RetryPolicy for TransientRetry {
    fn should_retry(&mut self, error: &MapVaultError) -> bool {
        if !error.is_transient() || self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}
