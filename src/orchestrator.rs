use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::executor::AttemptExecutor;
use crate::{AttemptOutcome, RequestSpec, RetryPolicy};

/// Terminal state of the retry loop for one logical call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum RunTerminal {
    /// The loop ended with a final attempt outcome, successful or not.
    Finished {
        outcome: AttemptOutcome,
        attempts: u32,
    },
    /// The caller cancelled the call mid-attempt or mid-backoff.
    Cancelled,
}

/// Drives 1..=max_attempts executor calls for one logical call.
///
/// Retry eligibility is decided from the outcome just produced and the
/// policy's static classification only; response bodies are never inspected
/// here. A non-retryable status terminates immediately, even on the first
/// attempt. This function never fails: every path ends in a [`RunTerminal`].
pub(crate) async fn run<E: AttemptExecutor>(
    executor: &E,
    spec: &RequestSpec,
    policy: &RetryPolicy,
    cancel: Option<&CancellationToken>,
) -> RunTerminal {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1u32;

    loop {
        let outcome = match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => return RunTerminal::Cancelled,
                outcome = executor.attempt(spec) => outcome,
            },
            None => executor.attempt(spec).await,
        };

        let eligible = match &outcome {
            AttemptOutcome::Success { .. } => false,
            AttemptOutcome::Http { status, .. } => policy.is_retryable_status(*status),
            AttemptOutcome::Transport { .. } => policy.retry_on_transport_error,
        };

        if outcome.is_success() || !eligible || attempt >= max_attempts {
            return RunTerminal::Finished { outcome, attempts: attempt };
        }

        let delay = policy.backoff_delay(attempt + 1);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            "retrying request after backoff"
        );

        match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => return RunTerminal::Cancelled,
                _ = sleep(delay) => {}
            },
            None => sleep(delay).await,
        }

        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use tokio_util::sync::CancellationToken;

    use super::{run, RunTerminal};
    use crate::executor::AttemptExecutor;
    use crate::{AttemptOutcome, RequestSpec, RetryPolicy};

    struct ScriptedExecutor {
        outcomes: Mutex<VecDeque<AttemptOutcome>>,
        hits: AtomicUsize,
    }

    impl ScriptedExecutor {
        fn new(outcomes: impl IntoIterator<Item = AttemptOutcome>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into_iter().collect()),
                hits: AtomicUsize::new(0),
            }
        }

        fn hits(&self) -> usize {
            self.hits.load(Ordering::SeqCst)
        }
    }

    impl AttemptExecutor for ScriptedExecutor {
        async fn attempt(&self, _spec: &RequestSpec) -> AttemptOutcome {
            self.hits.fetch_add(1, Ordering::SeqCst);
            self.outcomes
                .lock()
                .expect("outcome queue mutex must not be poisoned")
                .pop_front()
                .expect("executor invoked more times than scripted")
        }
    }

    fn spec() -> RequestSpec {
        RequestSpec::get("https://api.example.com/articles")
            .build()
            .expect("spec must build")
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::default().with_initial_delay(Duration::from_millis(1))
    }

    fn http(status: u16) -> AttemptOutcome {
        AttemptOutcome::Http {
            status,
            body: String::new(),
        }
    }

    fn transport() -> AttemptOutcome {
        AttemptOutcome::Transport {
            reason: "connect: refused".to_owned(),
        }
    }

    fn success() -> AttemptOutcome {
        AttemptOutcome::Success {
            status: 200,
            body: "{}".to_owned(),
        }
    }

    #[tokio::test]
    async fn success_on_first_attempt_makes_exactly_one_call() {
        let executor = ScriptedExecutor::new([success()]);
        let terminal = run(&executor, &spec(), &fast_policy(), None).await;

        assert_eq!(executor.hits(), 1);
        assert!(matches!(
            terminal,
            RunTerminal::Finished { attempts: 1, outcome } if outcome.is_success()
        ));
    }

    #[tokio::test]
    async fn retryable_status_exhausts_attempt_budget() {
        let executor = ScriptedExecutor::new([http(500), http(500), http(500)]);
        let policy = fast_policy().with_max_attempts(3);
        let terminal = run(&executor, &spec(), &policy, None).await;

        assert_eq!(executor.hits(), 3);
        assert_eq!(
            terminal,
            RunTerminal::Finished {
                outcome: http(500),
                attempts: 3
            }
        );
    }

    #[tokio::test]
    async fn non_retryable_status_terminates_on_first_attempt() {
        let executor = ScriptedExecutor::new([http(400)]);
        let terminal = run(&executor, &spec(), &fast_policy(), None).await;

        assert_eq!(executor.hits(), 1);
        assert_eq!(
            terminal,
            RunTerminal::Finished {
                outcome: http(400),
                attempts: 1
            }
        );
    }

    #[tokio::test]
    async fn transport_failures_recover_within_budget() {
        let executor = ScriptedExecutor::new([transport(), transport(), success()]);
        let policy = fast_policy().with_max_attempts(3);
        let terminal = run(&executor, &spec(), &policy, None).await;

        assert_eq!(executor.hits(), 3);
        assert!(matches!(
            terminal,
            RunTerminal::Finished { attempts: 3, outcome } if outcome.is_success()
        ));
    }

    #[tokio::test]
    async fn transport_retry_disabled_terminates_immediately() {
        let executor = ScriptedExecutor::new([transport()]);
        let policy = fast_policy().with_retry_on_transport_error(false);
        let terminal = run(&executor, &spec(), &policy, None).await;

        assert_eq!(executor.hits(), 1);
        assert_eq!(
            terminal,
            RunTerminal::Finished {
                outcome: transport(),
                attempts: 1
            }
        );
    }

    #[tokio::test]
    async fn single_attempt_budget_never_invokes_backoff() {
        let executor = ScriptedExecutor::new([http(503)]);
        // A pathological initial delay would hang the test if backoff ran.
        let policy = RetryPolicy::no_retries().with_initial_delay(Duration::from_secs(3_600));
        let terminal = run(&executor, &spec(), &policy, None).await;

        assert_eq!(executor.hits(), 1);
        assert_eq!(
            terminal,
            RunTerminal::Finished {
                outcome: http(503),
                attempts: 1
            }
        );
    }

    #[tokio::test]
    async fn pre_cancelled_token_prevents_any_attempt() {
        let executor = ScriptedExecutor::new([success()]);
        let token = CancellationToken::new();
        token.cancel();

        let terminal = run(&executor, &spec(), &fast_policy(), Some(&token)).await;

        assert_eq!(executor.hits(), 0);
        assert_eq!(terminal, RunTerminal::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_mid_backoff_skips_the_wait_and_further_attempts() {
        let executor = ScriptedExecutor::new([http(500), success()]);
        let policy = fast_policy().with_initial_delay(Duration::from_secs(60));
        let token = CancellationToken::new();

        let cancel = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            cancel.cancel();
        });

        let terminal = run(&executor, &spec(), &policy, Some(&token)).await;

        assert_eq!(executor.hits(), 1);
        assert_eq!(terminal, RunTerminal::Cancelled);
    }
}
