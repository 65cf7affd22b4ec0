/// Result of a single network attempt.
///
/// Produced once per attempt by the executor and consumed by the retry
/// orchestrator to decide whether another attempt is warranted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// A response with a 2xx status code.
    Success {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },
    /// A response with any non-2xx status code. The body is still captured
    /// for error reporting.
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },
    /// No status line was obtained: connect failure, DNS failure or timeout.
    Transport {
        /// Human-readable failure description, `"timeout"` for timeouts.
        reason: String,
    },
}

impl AttemptOutcome {
    /// True when this outcome terminates the call successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}
