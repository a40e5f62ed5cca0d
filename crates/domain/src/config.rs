//! Configuration management

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Storage orchestration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Retry budget for transient network failures per operation.
    pub max_retry_attempts: u32,
    /// Increment of the linear backoff sequence, in milliseconds.
    pub backoff_increment_ms: u64,
}

impl RepositoryConfig {
    pub fn backoff_increment(&self) -> Duration {
        Duration::from_millis(self.backoff_increment_ms)
    }
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            max_retry_attempts: 5,
            backoff_increment_ms: 1000,
        }
    }
}
