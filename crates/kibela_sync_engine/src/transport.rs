//! GraphQL transport.

use crate::config::SyncConfig;
use crate::error::{ConnectionError, TransportError, TransportResult};
use crate::http::{Header, HttpClient, ReqwestClient};
use kibela_protocol::queries::operation_name;
use kibela_protocol::{GraphqlRequest, GraphqlResponse};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use tracing::debug;

/// Sends GraphQL operations and returns their `data`.
///
/// This is the seam the sync engine depends on; it abstracts the network so
/// the engine can run against a scripted transport in tests.
pub trait GraphqlTransport {
    /// Sends one operation with its variables.
    fn send(&self, query: &str, variables: Value) -> TransportResult<Value>;
}

impl<T: GraphqlTransport + ?Sized> GraphqlTransport for &T {
    fn send(&self, query: &str, variables: Value) -> TransportResult<Value> {
        (**self).send(query, variables)
    }
}

/// GraphQL client over an [`HttpClient`].
///
/// Headers are fixed at construction: bearer credential, JSON content type
/// and accept, and a user agent.
pub struct GraphqlClient<C: HttpClient> {
    endpoint: String,
    headers: Vec<Header>,
    client: C,
}

impl GraphqlClient<ReqwestClient> {
    /// Creates a network client from engine configuration.
    pub fn from_config(config: &SyncConfig) -> Result<Self, ConnectionError> {
        let client = ReqwestClient::new(config.timeout)?;
        Ok(Self::new(config.endpoint(), &config.token, client))
    }
}

impl<C: HttpClient> GraphqlClient<C> {
    /// Creates a client posting to `endpoint` with `token` as credential.
    pub fn new(endpoint: impl Into<String>, token: &str, client: C) -> Self {
        let headers = vec![
            ("Authorization".to_string(), format!("Bearer {token}")),
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
            (
                "User-Agent".to_string(),
                concat!("kibela-sync/", env!("CARGO_PKG_VERSION")).to_string(),
            ),
        ];
        Self {
            endpoint: endpoint.into(),
            headers,
            client,
        }
    }

    /// The endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Looks up a request header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The underlying HTTP client.
    pub fn http_client(&self) -> &C {
        &self.client
    }
}

impl<C: HttpClient> GraphqlTransport for GraphqlClient<C> {
    fn send(&self, query: &str, variables: Value) -> TransportResult<Value> {
        let request = GraphqlRequest::new(query, variables);
        let body = serde_json::to_vec(&request).map_err(|e| TransportError::Encode(e.to_string()))?;

        debug!(
            operation = operation_name(query).unwrap_or("anonymous"),
            endpoint = %self.endpoint,
            "sending GraphQL request"
        );
        let response = self.client.post(&self.endpoint, &self.headers, body)?;

        if !response.is_ok() {
            return Err(TransportError::Status {
                status: response.status,
                body: response.text().into_owned(),
            });
        }

        let envelope: GraphqlResponse = serde_json::from_slice(&response.body)
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        if envelope.has_errors() {
            return Err(TransportError::graphql(envelope.errors.unwrap_or_default()));
        }

        match envelope.data {
            Some(data) if !data.is_null() => Ok(data),
            _ => Err(TransportError::MissingData),
        }
    }
}

/// A call recorded by [`MockTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Query text.
    pub query: String,
    /// Variables mapping.
    pub variables: Value,
}

impl RecordedCall {
    /// The operation name of the recorded query.
    pub fn operation(&self) -> Option<&str> {
        operation_name(&self.query)
    }
}

/// A mock transport for testing.
///
/// Replays scripted results in order and records every call. Once the
/// script runs out, calls fail with [`TransportError::MissingData`].
#[derive(Debug, Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<TransportResult<Value>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    /// Creates a mock transport with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful result.
    pub fn push_data(&self, data: Value) {
        self.script.lock().push_back(Ok(data));
    }

    /// Queues a failure.
    pub fn push_error(&self, error: TransportError) {
        self.script.lock().push_back(Err(error));
    }

    /// All calls made so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

impl GraphqlTransport for MockTransport {
    fn send(&self, query: &str, variables: Value) -> TransportResult<Value> {
        self.calls.lock().push(RecordedCall {
            query: query.to_string(),
            variables,
        });
        self.script
            .lock()
            .pop_front()
            .unwrap_or(Err(TransportError::MissingData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConnectionCode;
    use crate::http::HttpResponse;
    use serde_json::json;

    struct FixedClient {
        response: Result<HttpResponse, ConnectionError>,
        seen: Mutex<Vec<(Vec<Header>, Vec<u8>)>>,
    }

    impl FixedClient {
        fn answering(response: Result<HttpResponse, ConnectionError>) -> Self {
            Self {
                response,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn json(value: Value) -> Self {
            Self::answering(Ok(HttpResponse::json(&value)))
        }
    }

    impl HttpClient for FixedClient {
        fn post(
            &self,
            _url: &str,
            headers: &[Header],
            body: Vec<u8>,
        ) -> Result<HttpResponse, ConnectionError> {
            self.seen.lock().push((headers.to_vec(), body));
            self.response.clone()
        }
    }

    fn client(http: FixedClient) -> GraphqlClient<FixedClient> {
        GraphqlClient::new("https://acme.kibe.la/api/v1", "tok", http)
    }

    #[test]
    fn fixed_headers() {
        let client = client(FixedClient::json(json!({"data": {}})));
        assert_eq!(client.header("authorization"), Some("Bearer tok"));
        assert_eq!(client.header("Content-Type"), Some("application/json"));
        assert!(client.header("User-Agent").unwrap().starts_with("kibela-sync/"));
        assert_eq!(client.endpoint(), "https://acme.kibe.la/api/v1");
    }

    #[test]
    fn sends_query_and_variables_and_returns_data() {
        let client = client(FixedClient::json(json!({"data": {"notes": []}})));
        let data = client
            .send("query Q { notes }", json!({"first": 1}))
            .unwrap();
        assert_eq!(data, json!({"notes": []}));

        let seen = client.http_client().seen.lock();
        let body: Value = serde_json::from_slice(&seen[0].1).unwrap();
        assert_eq!(body, json!({"query": "query Q { notes }", "variables": {"first": 1}}));
    }

    #[test]
    fn non_200_status() {
        let client = client(FixedClient::answering(Ok(HttpResponse::new(401, "nope"))));
        let err = client.send("query Q { a }", json!({})).unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 401, ref body } if body == "nope"));
    }

    #[test]
    fn undecodable_body() {
        let client = client(FixedClient::answering(Ok(HttpResponse::new(200, "<html>"))));
        let err = client.send("query Q { a }", json!({})).unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }

    #[test]
    fn graphql_errors_are_joined() {
        let client = client(FixedClient::json(json!({
            "data": null,
            "errors": [{"message": "first"}, {"message": "second"}]
        })));
        let err = client.send("query Q { a }", json!({})).unwrap_err();
        match err {
            TransportError::GraphQl { message, errors } => {
                assert_eq!(message, "first, second");
                assert_eq!(errors.len(), 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_errors_list_is_not_an_error() {
        let client = client(FixedClient::json(json!({"data": {"a": 1}, "errors": []})));
        assert_eq!(client.send("query Q { a }", json!({})).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn missing_data() {
        for body in [json!({}), json!({"data": null})] {
            let client = client(FixedClient::json(body));
            let err = client.send("query Q { a }", json!({})).unwrap_err();
            assert!(matches!(err, TransportError::MissingData));
        }
    }

    #[test]
    fn connection_failures_pass_through() {
        let failure = ConnectionError::new(ConnectionCode::DnsFailure, "no host");
        let client = client(FixedClient::answering(Err(failure.clone())));
        let err = client.send("query Q { a }", json!({})).unwrap_err();
        assert!(matches!(err, TransportError::Connection(e) if e == failure));
    }

    #[test]
    fn mock_transport_replays_and_records() {
        let transport = MockTransport::new();
        transport.push_data(json!({"ok": true}));
        transport.push_error(TransportError::MissingData);

        assert_eq!(
            transport.send("query First { a }", json!({"x": 1})).unwrap(),
            json!({"ok": true})
        );
        assert!(transport.send("query Second { a }", json!({})).is_err());
        assert!(transport.send("query Third { a }", json!({})).is_err());

        let calls = transport.calls();
        assert_eq!(transport.call_count(), 3);
        assert_eq!(calls[0].operation(), Some("First"));
        assert_eq!(calls[0].variables, json!({"x": 1}));
    }
}
