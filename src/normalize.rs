use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::{AttemptOutcome, CallError, CallResult};

/// Maps a terminal attempt outcome into the caller-facing result.
///
/// Pure and deterministic: the same terminal outcome always yields the same
/// result. This is the only place the caller-facing shape is produced.
pub(crate) fn normalize<T: DeserializeOwned>(
    outcome: AttemptOutcome,
    attempts: u32,
) -> CallResult<T> {
    match outcome {
        AttemptOutcome::Success { body, .. } => serde_json::from_str(&body).map_err(|err| {
            CallError::MalformedResponse(format!("invalid response JSON: {err}; body: {body}"))
        }),
        failure => Err(failure_error(failure, attempts)),
    }
}

/// Like [`normalize`] but hands back the undecoded 2xx body.
pub(crate) fn normalize_raw(outcome: AttemptOutcome, attempts: u32) -> CallResult<String> {
    match outcome {
        AttemptOutcome::Success { body, .. } => Ok(body),
        failure => Err(failure_error(failure, attempts)),
    }
}

fn failure_error(outcome: AttemptOutcome, attempts: u32) -> CallError {
    match outcome {
        AttemptOutcome::Success { .. } => {
            unreachable!("success outcomes are handled before failure mapping")
        }
        AttemptOutcome::Http { status, body } => CallError::RemoteRejected {
            status,
            message: error_message(&body),
            attempts,
        },
        AttemptOutcome::Transport { reason } => CallError::Unreachable { reason, attempts },
    }
}

/// Error envelope shapes commonly returned by JSON APIs:
/// `{"message": "..."}` or `{"error": "..."}` or `{"error": {"message": "..."}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Message(String),
    Nested {
        #[serde(default)]
        message: Option<String>,
    },
}

fn error_message(body: &str) -> String {
    let decoded: Option<ErrorEnvelope> = serde_json::from_str(body).ok();
    decoded
        .and_then(|envelope| {
            envelope.message.or(match envelope.error {
                Some(ErrorDetail::Message(message)) => Some(message),
                Some(ErrorDetail::Nested { message }) => message,
                None => None,
            })
        })
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| "unrecognized error response".to_owned())
}
