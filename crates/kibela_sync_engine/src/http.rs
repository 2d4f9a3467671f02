//! HTTP client abstraction.
//!
//! The GraphQL client talks HTTP through the [`HttpClient`] trait so that the
//! network can be swapped for an in-process handler in tests.

use crate::error::{ConnectionCode, ConnectionError};
use std::borrow::Cow;
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// A header name/value pair.
pub type Header = (String, String);

/// A received HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Raw body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// A 200 response with a JSON body.
    pub fn json(value: &serde_json::Value) -> Self {
        Self::new(200, value.to_string())
    }

    /// Returns true for status 200.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// The body as text, lossily decoded.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// HTTP client abstraction.
///
/// Implementations perform one POST and return whatever the server
/// answered; only failures to get an answer at all are errors.
pub trait HttpClient: Send + Sync {
    /// Sends a POST request.
    fn post(
        &self,
        url: &str,
        headers: &[Header],
        body: Vec<u8>,
    ) -> Result<HttpResponse, ConnectionError>;
}

/// [`HttpClient`] over reqwest's blocking client.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Creates a client whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, ConnectionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConnectionError::new(ConnectionCode::Other, e.to_string()))?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn post(
        &self,
        url: &str,
        headers: &[Header],
        body: Vec<u8>,
    ) -> Result<HttpResponse, ConnectionError> {
        let mut request = self.client.post(url).body(body);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().map_err(connection_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(connection_error)?;
        debug!(status, bytes = body.len(), "received response");
        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

fn connection_error(err: reqwest::Error) -> ConnectionError {
    let code = if err.is_timeout() {
        ConnectionCode::Timeout
    } else if is_dns_failure(&err) {
        ConnectionCode::DnsFailure
    } else if err.is_connect() {
        ConnectionCode::Refused
    } else {
        ConnectionCode::Other
    };
    ConnectionError::new(code, describe(&err))
}

/// Resolver failures only show up in the text of the error chain.
fn is_dns_failure(err: &(dyn StdError + 'static)) -> bool {
    const MARKERS: [&str; 4] = [
        "dns error",
        "failed to lookup address",
        "name or service not known",
        "no such host",
    ];
    let mut current = Some(err);
    while let Some(e) = current {
        let text = e.to_string().to_lowercase();
        if MARKERS.iter().any(|m| text.contains(m)) {
            return true;
        }
        current = e.source();
    }
    false
}

/// The error and its sources joined with `": "`.
fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![err.to_string()];
    let mut current = err.source();
    while let Some(e) = current {
        parts.push(e.to_string());
        current = e.source();
    }
    parts.join(": ")
}

/// Trait for in-process servers behind a [`LoopbackClient`].
pub trait LoopbackServer {
    /// Handles a POST to `path` and returns the response.
    fn handle_post(
        &self,
        path: &str,
        headers: &[Header],
        body: &[u8],
    ) -> Result<HttpResponse, ConnectionError>;
}

impl<S: LoopbackServer + ?Sized> LoopbackServer for Arc<S> {
    fn handle_post(
        &self,
        path: &str,
        headers: &[Header],
        body: &[u8],
    ) -> Result<HttpResponse, ConnectionError> {
        (**self).handle_post(path, headers, body)
    }
}

/// An HTTP client that routes requests directly to an in-process server.
///
/// Useful for testing without actual network overhead.
pub struct LoopbackClient<S: LoopbackServer> {
    server: S,
}

impl<S: LoopbackServer + Send + Sync> LoopbackClient<S> {
    /// Creates a loopback client connected to the given server.
    pub fn new(server: S) -> Self {
        Self { server }
    }

    /// The server behind this client.
    pub fn server(&self) -> &S {
        &self.server
    }
}

impl<S: LoopbackServer + Send + Sync> HttpClient for LoopbackClient<S> {
    fn post(
        &self,
        url: &str,
        headers: &[Header],
        body: Vec<u8>,
    ) -> Result<HttpResponse, ConnectionError> {
        self.server.handle_post(url_path(url), headers, &body)
    }
}

/// The path part of an absolute URL, or the input unchanged.
fn url_path(url: &str) -> &str {
    let Some((_, rest)) = url.split_once("://") else {
        return url;
    };
    rest.find('/').map_or("/", |i| &rest[i..])
}
