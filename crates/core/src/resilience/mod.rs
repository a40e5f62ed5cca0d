//! Retry/backoff resilience primitives
//!
//! A deliberately small toolkit: a stateful linear backoff generator, a
//! budgeted transient-only retry policy, and a generic executor that repeats
//! an asynchronous operation until it succeeds or the policy says stop.
//! The executor is reused identically by the load and save orchestrators.

mod backoff;
mod executor;
mod policy;

pub use backoff::LinearBackoff;
pub use executor::RetryExecutor;
pub use policy::{RetryPolicy, TransientRetry};
