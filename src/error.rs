/// Error type returned by this crate.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    /// No HTTP response was obtained (timeout, connect or DNS failure),
    /// after retries were exhausted or retry was disabled.
    #[error("remote unreachable after {attempts} attempt(s): {reason}")]
    Unreachable {
        /// Transport-level failure description.
        reason: String,
        /// Attempts made before giving up.
        attempts: u32,
    },
    /// The remote endpoint answered with a non-2xx status that was either not
    /// eligible for retry or still failing once retries ran out.
    #[error("remote rejected request with status {status} after {attempts} attempt(s): {message}")]
    RemoteRejected {
        /// Final HTTP status code.
        status: u16,
        /// Message derived from the response body when decodable.
        message: String,
        /// Attempts made before giving up.
        attempts: u32,
    },
    /// A 2xx response whose body did not decode into the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    /// The caller cancelled the call before it completed.
    #[error("call cancelled")]
    Cancelled,
    /// The request description was rejected before any network attempt.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl CallError {
    /// Final HTTP status code, when the remote produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RemoteRejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Attempts made before the call terminated, when attempts were counted.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Self::Unreachable { attempts, .. } | Self::RemoteRejected { attempts, .. } => {
                Some(*attempts)
            }
            _ => None,
        }
    }
}
