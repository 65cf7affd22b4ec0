use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::executor::HttpExecutor;
use crate::normalize::{normalize, normalize_raw};
use crate::orchestrator::{self, RunTerminal};
use crate::{CallError, CallResult, RequestSpec, RetryPolicy};

/// Entry point for resilient remote calls.
///
/// Wraps a shared `reqwest` connection pool and a default [`RetryPolicy`].
/// Cloning is cheap and clones share the pool; each call owns its own attempt
/// counter, so any number of calls may run concurrently.
///
/// # Example
///
/// ```no_run
/// use sturdy_http::{CallClient, RequestSpec};
/// use serde_json::Value;
///
/// # async fn demo() -> Result<(), sturdy_http::CallError> {
/// let client = CallClient::new();
/// let spec = RequestSpec::get("https://api.example.com/insights/index.json")
///     .bearer_auth("my-token")
///     .build()?;
/// let index: Value = client.call(&spec).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct CallClient {
    http: reqwest::Client,
    policy: RetryPolicy,
}

impl CallClient {
    /// Creates a client with the default retry policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the default retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Issues a logical call and decodes the 2xx body as `T`.
    pub async fn call<T: DeserializeOwned>(&self, spec: &RequestSpec) -> CallResult<T> {
        self.call_with_policy(spec, &self.policy).await
    }

    /// Issues a logical call under a caller-supplied policy.
    pub async fn call_with_policy<T: DeserializeOwned>(
        &self,
        spec: &RequestSpec,
        policy: &RetryPolicy,
    ) -> CallResult<T> {
        match self.drive(spec, policy, None).await {
            RunTerminal::Finished { outcome, attempts } => normalize(outcome, attempts),
            RunTerminal::Cancelled => Err(CallError::Cancelled),
        }
    }

    /// Issues a logical call that the caller can cancel.
    ///
    /// Cancellation aborts an in-flight attempt or skips a pending backoff
    /// wait; either way the call terminates with [`CallError::Cancelled`].
    pub async fn call_cancellable<T: DeserializeOwned>(
        &self,
        spec: &RequestSpec,
        cancel: &CancellationToken,
    ) -> CallResult<T> {
        match self.drive(spec, &self.policy, Some(cancel)).await {
            RunTerminal::Finished { outcome, attempts } => normalize(outcome, attempts),
            RunTerminal::Cancelled => Err(CallError::Cancelled),
        }
    }

    /// Issues a logical call and returns the undecoded 2xx body.
    pub async fn call_raw(&self, spec: &RequestSpec) -> CallResult<String> {
        match self.drive(spec, &self.policy, None).await {
            RunTerminal::Finished { outcome, attempts } => normalize_raw(outcome, attempts),
            RunTerminal::Cancelled => Err(CallError::Cancelled),
        }
    }

    async fn drive(
        &self,
        spec: &RequestSpec,
        policy: &RetryPolicy,
        cancel: Option<&CancellationToken>,
    ) -> RunTerminal {
        let executor = HttpExecutor::new(self.http.clone());
        orchestrator::run(&executor, spec, policy, cancel).await
    }
}
