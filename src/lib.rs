//! `sturdy-http` is a resilient async wrapper for outbound JSON API calls.
//!
//! One logical call may span several network attempts. The crate keeps the
//! moving parts separate so each is testable on its own:
//! - [`RequestSpec`] — immutable description of the call
//! - [`RetryPolicy`] — attempt budget, backoff curve, retryable status set
//! - [`CallClient`] — entry point that drives attempts and decodes the result
//!
//! Failures are values: a call always returns a [`CallResult`] the caller
//! branches on. Nothing here panics for ordinary network trouble.

mod client;
mod error;
mod executor;
mod normalize;
mod orchestrator;
mod outcome;
mod policy;
mod request;

pub use client::CallClient;
pub use error::CallError;
pub use outcome::AttemptOutcome;
pub use policy::RetryPolicy;
pub use request::{RequestSpec, RequestSpecBuilder};

pub use reqwest::Method;
pub use tokio_util::sync::CancellationToken;

pub type CallResult<T> = std::result::Result<T, CallError>;
