use std::fmt;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::Serialize;

use crate::CallError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Immutable description of one logical call.
///
/// Built once by the caller through [`RequestSpec::builder`] and never
/// mutated afterwards. Validation happens in [`RequestSpecBuilder::build`],
/// before any network attempt.
#[derive(Clone)]
pub struct RequestSpec {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
    timeout: Duration,
}

impl RequestSpec {
    /// Starts building a spec for the given method and URL.
    pub fn builder(method: Method, url: impl Into<String>) -> RequestSpecBuilder {
        RequestSpecBuilder {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            body_error: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Shorthand for [`RequestSpec::builder`] with `GET`.
    pub fn get(url: impl Into<String>) -> RequestSpecBuilder {
        Self::builder(Method::GET, url)
    }

    /// Shorthand for [`RequestSpec::builder`] with `POST`.
    pub fn post(url: impl Into<String>) -> RequestSpecBuilder {
        Self::builder(Method::POST, url)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Per-attempt timeout; bounds a single attempt, not the whole call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl fmt::Debug for RequestSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(name, value)| {
                if name == &AUTHORIZATION {
                    (name.as_str(), "<redacted>")
                } else {
                    (name.as_str(), value.to_str().unwrap_or("<binary>"))
                }
            })
            .collect();
        f.debug_struct("RequestSpec")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &headers)
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Builder for [`RequestSpec`].
#[derive(Debug)]
pub struct RequestSpecBuilder {
    method: Method,
    url: String,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    body_error: Option<String>,
    timeout: Duration,
}

impl RequestSpecBuilder {
    /// Adds a header. Names are case-insensitive; setting the same name twice
    /// keeps the last value.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the `Authorization` header from a bearer token.
    ///
    /// If the token is missing the `Bearer ` prefix, it is added
    /// automatically.
    pub fn bearer_auth(self, token: impl AsRef<str>) -> Self {
        self.header(
            AUTHORIZATION.as_str(),
            normalize_bearer_authorization(token.as_ref()),
        )
    }

    /// Sets a JSON body and the matching `Content-Type` header.
    pub fn json<T: Serialize + ?Sized>(mut self, payload: &T) -> Self {
        match serde_json::to_vec(payload) {
            Ok(bytes) => {
                self.body = Some(bytes);
                self.header(CONTENT_TYPE.as_str(), "application/json")
            }
            Err(err) => {
                self.body_error = Some(format!("unserializable JSON body: {err}"));
                self
            }
        }
    }

    /// Sets an opaque, already-serialized body.
    pub fn body(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.body = Some(bytes.into());
        self
    }

    /// Sets the per-attempt timeout. Defaults to 10 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validates the URL, headers and body and freezes the spec.
    ///
    /// Rejections here are programming errors in the caller and surface as
    /// [`CallError::InvalidRequest`] without any network attempt being made.
    pub fn build(self) -> Result<RequestSpec, CallError> {
        if let Some(reason) = self.body_error {
            return Err(CallError::InvalidRequest(reason));
        }

        let url = Url::parse(&self.url)
            .map_err(|err| CallError::InvalidRequest(format!("invalid URL '{}': {err}", self.url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CallError::InvalidRequest(format!(
                "unsupported URL scheme '{}'",
                url.scheme()
            )));
        }

        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in self.headers {
            let name = HeaderName::try_from(name.as_str()).map_err(|err| {
                CallError::InvalidRequest(format!("invalid header name '{name}': {err}"))
            })?;
            let value = HeaderValue::try_from(value.as_str()).map_err(|err| {
                CallError::InvalidRequest(format!(
                    "invalid value for header '{}': {err}",
                    name.as_str()
                ))
            })?;
            // HeaderMap::insert gives last-write-wins semantics.
            headers.insert(name, value);
        }

        Ok(RequestSpec {
            method: self.method,
            url,
            headers,
            body: self.body,
            timeout: self.timeout,
        })
    }
}

fn normalize_bearer_authorization(token: &str) -> String {
    let trimmed = token.trim();
    let prefix = trimmed.get(..7);
    if prefix.is_some_and(|value| value.eq_ignore_ascii_case("bearer ")) {
        trimmed.to_owned()
    } else {
        format!("Bearer {trimmed}")
    }
}
