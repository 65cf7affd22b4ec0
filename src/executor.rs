use crate::{AttemptOutcome, RequestSpec};

/// One network attempt. Implementations hold no cross-attempt state; retry
/// counting and backoff live in the orchestrator.
pub(crate) trait AttemptExecutor {
    async fn attempt(&self, spec: &RequestSpec) -> AttemptOutcome;
}

/// Executor backed by a shared `reqwest` connection pool.
#[derive(Clone, Debug)]
pub(crate) struct HttpExecutor {
    http: reqwest::Client,
}

impl HttpExecutor {
    pub(crate) fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

impl AttemptExecutor for HttpExecutor {
    /// Sends the request once and classifies whatever came back.
    ///
    /// Any received status line counts as a response (2xx or not, the body is
    /// captured either way); only the failure to obtain one is a transport
    /// outcome. The spec's timeout bounds this single attempt.
    async fn attempt(&self, spec: &RequestSpec) -> AttemptOutcome {
        let mut request = self
            .http
            .request(spec.method().clone(), spec.url().clone())
            .headers(spec.headers().clone())
            .timeout(spec.timeout());
        if let Some(body) = spec.body() {
            request = request.body(body.to_vec());
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                match response.text().await {
                    Ok(body) if status.is_success() => AttemptOutcome::Success {
                        status: status.as_u16(),
                        body,
                    },
                    Ok(body) => AttemptOutcome::Http {
                        status: status.as_u16(),
                        body,
                    },
                    Err(err) => AttemptOutcome::Transport {
                        reason: transport_reason(&err),
                    },
                }
            }
            Err(err) => AttemptOutcome::Transport {
                reason: transport_reason(&err),
            },
        }
    }
}

fn transport_reason(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "timeout".to_owned()
    } else if err.is_connect() {
        format!("connect: {err}")
    } else {
        err.to_string()
    }
}
