//! An in-process fake of the notes API.
//!
//! [`FakeNotesService`] answers `ListNotes`, `CreateNote` and `UpdateNote`
//! against an in-memory note list and is reached through
//! [`LoopbackClient`], so engine tests exercise the real GraphQL client and
//! envelope handling without a network.

use crate::fixtures::{folder_connection, TEST_TEAM, TEST_TOKEN};
use kibela_protocol::queries::operation_name;
use kibela_protocol::{
    Author, Connection, CreateNoteInput, Edge, GraphqlRequest, GraphqlResponse, GroupRef, PageInfo,
    RemoteFolder, RemoteNote, UpdateNoteInput,
};
use kibela_sync_engine::{
    ConnectionCode, ConnectionError, DirectoryStore, GraphqlClient, Header, HttpResponse,
    LoopbackClient, LoopbackServer, SyncConfig, SyncEngine,
};
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Publication time given to notes created without `draft`.
pub const FAKE_PUBLISHED_AT: &str = "2024-06-01T12:00:00Z";

/// Account recorded as author of created notes.
pub const FAKE_AUTHOR: &str = "tester";

/// A failure the fake service can be told to produce.
#[derive(Debug, Clone)]
pub enum FakeFailure {
    /// Answer 200 with these GraphQL error messages.
    GraphQl(Vec<String>),
    /// Answer with a non-200 status and body.
    Status(u16, String),
    /// Fail the connection itself.
    Connection(ConnectionCode),
    /// Answer 200 with an envelope lacking `data`.
    EmptyEnvelope,
}

impl FakeFailure {
    /// A single GraphQL error message.
    pub fn graphql(message: impl Into<String>) -> Self {
        FakeFailure::GraphQl(vec![message.into()])
    }

    fn respond(&self) -> Result<HttpResponse, ConnectionError> {
        match self {
            FakeFailure::GraphQl(messages) => Ok(errors_response(messages)),
            FakeFailure::Status(status, body) => Ok(HttpResponse::new(*status, body.clone())),
            FakeFailure::Connection(code) => {
                Err(ConnectionError::new(*code, "injected connection failure"))
            }
            FakeFailure::EmptyEnvelope => Ok(HttpResponse::json(&json!({}))),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    notes: Vec<RemoteNote>,
    next_number: u64,
    list_calls: usize,
    page_failures: HashMap<usize, FakeFailure>,
    next_failure: Option<FakeFailure>,
    operations: Vec<String>,
    last_variables: Option<Value>,
}

/// A paged, in-memory notes service.
#[derive(Debug)]
pub struct FakeNotesService {
    token: String,
    include_nodes: bool,
    state: RwLock<State>,
}

impl FakeNotesService {
    /// An empty service accepting [`TEST_TOKEN`].
    pub fn new() -> Self {
        Self {
            token: TEST_TOKEN.to_string(),
            include_nodes: false,
            state: RwLock::new(State {
                next_number: 1,
                ..State::default()
            }),
        }
    }

    /// A service holding the given notes.
    pub fn with_notes(notes: impl IntoIterator<Item = RemoteNote>) -> Self {
        let service = Self::new();
        for note in notes {
            service.insert(note);
        }
        service
    }

    /// Accepts only `token` as bearer credential.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Sends `nodes` alongside `edges` in list responses.
    pub fn with_nodes(mut self) -> Self {
        self.include_nodes = true;
        self
    }

    /// Adds a note.
    pub fn insert(&self, note: RemoteNote) {
        let mut state = self.state.write();
        if let Some(number) = note_number(&note.id) {
            state.next_number = state.next_number.max(number + 1);
        }
        state.notes.push(note);
    }

    /// Makes the `page`-th list request (1-based) fail.
    pub fn fail_page(&self, page: usize, failure: FakeFailure) {
        self.state.write().page_failures.insert(page, failure);
    }

    /// Makes the next request of any kind fail.
    pub fn fail_next(&self, failure: FakeFailure) {
        self.state.write().next_failure = Some(failure);
    }

    /// Current notes.
    pub fn notes(&self) -> Vec<RemoteNote> {
        self.state.read().notes.clone()
    }

    /// Looks up a note.
    pub fn note(&self, id: &str) -> Option<RemoteNote> {
        self.state.read().notes.iter().find(|n| n.id == id).cloned()
    }

    /// Operation names received, in order.
    pub fn operations(&self) -> Vec<String> {
        self.state.read().operations.clone()
    }

    /// Variables of the most recent request.
    pub fn last_variables(&self) -> Option<Value> {
        self.state.read().last_variables.clone()
    }

    /// Number of list requests received.
    pub fn list_calls(&self) -> usize {
        self.state.read().list_calls
    }

    fn authorized(&self, headers: &[Header]) -> bool {
        let expected = format!("Bearer {}", self.token);
        headers
            .iter()
            .any(|(name, value)| name.eq_ignore_ascii_case("authorization") && *value == expected)
    }

    fn list(&self, variables: &Value) -> Result<HttpResponse, ConnectionError> {
        let mut state = self.state.write();
        state.list_calls += 1;
        let page = state.list_calls;
        if let Some(failure) = state.page_failures.remove(&page) {
            return failure.respond();
        }

        let first = variables["first"].as_u64().unwrap_or(100).max(1) as usize;
        let start = match variables["after"].as_str() {
            None => 0,
            Some(cursor) => match parse_cursor(cursor) {
                Some(start) => start,
                None => return Ok(errors_response(&[format!("invalid cursor: {cursor}")])),
            },
        };

        let total = state.notes.len();
        let start = start.min(total);
        let end = (start + first).min(total);
        let edges: Vec<Edge<RemoteNote>> = state.notes[start..end]
            .iter()
            .enumerate()
            .map(|(i, note)| Edge {
                cursor: cursor(start + i + 1),
                node: note.clone(),
            })
            .collect();
        let page_info = if end < total {
            PageInfo::more(cursor(end))
        } else {
            PageInfo {
                end_cursor: (end > 0).then(|| cursor(end)),
                ..PageInfo::last()
            }
        };

        let connection = Connection::from_edges(edges, page_info, Some(total as u64));
        let mut notes = serde_json::to_value(&connection).expect("Failed to encode page");
        if !self.include_nodes {
            if let Some(object) = notes.as_object_mut() {
                object.remove("nodes");
            }
        }
        Ok(data_response(json!({ "notes": notes })))
    }

    fn create(&self, variables: &Value) -> Result<HttpResponse, ConnectionError> {
        let input: CreateNoteInput = match serde_json::from_value(variables["input"].clone()) {
            Ok(input) => input,
            Err(e) => return Ok(errors_response(&[format!("invalid input: {e}")])),
        };

        let mut state = self.state.write();
        let number = state.next_number;
        state.next_number += 1;

        let mut note = RemoteNote::new(format!("Note/{number}"), input.title);
        note.content = input.content;
        note.coediting = input.coediting;
        note.url = Some(format!("https://{TEST_TEAM}.kibe.la/notes/{number}"));
        note.author = Some(Author {
            account: FAKE_AUTHOR.to_string(),
            real_name: None,
        });
        note.groups = groups(input.group_ids);
        note.published_at = (!input.draft).then(|| FAKE_PUBLISHED_AT.to_string());
        note.content_updated_at = Some(FAKE_PUBLISHED_AT.to_string());
        if let Some(folders) = input.folders {
            let folders = folders
                .into_iter()
                .map(|f| RemoteFolder {
                    id: None,
                    name: f.folder_name,
                    group: Some(GroupRef {
                        id: f.group_id,
                        name: None,
                    }),
                })
                .collect();
            note.folders = Some(folder_connection(folders));
        }

        state.notes.push(note.clone());
        Ok(data_response(json!({ "createNote": { "note": note } })))
    }

    fn update(&self, variables: &Value) -> Result<HttpResponse, ConnectionError> {
        let input: UpdateNoteInput = match serde_json::from_value(variables["input"].clone()) {
            Ok(input) => input,
            Err(e) => return Ok(errors_response(&[format!("invalid input: {e}")])),
        };

        let mut state = self.state.write();
        let Some(note) = state.notes.iter_mut().find(|n| n.id == input.id) else {
            return Ok(errors_response(&[format!("Note not found: {}", input.id)]));
        };
        note.title = input.title;
        note.content = input.content;
        if let Some(coediting) = input.coediting {
            note.coediting = coediting;
        }
        if let Some(group_ids) = input.group_ids {
            note.groups = groups(group_ids);
        }
        note.published_at = match (input.draft, note.published_at.take()) {
            (true, _) => None,
            (false, Some(at)) => Some(at),
            (false, None) => Some(FAKE_PUBLISHED_AT.to_string()),
        };

        let note = note.clone();
        Ok(data_response(json!({ "updateNote": { "note": note } })))
    }
}

impl Default for FakeNotesService {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackServer for FakeNotesService {
    fn handle_post(
        &self,
        _path: &str,
        headers: &[Header],
        body: &[u8],
    ) -> Result<HttpResponse, ConnectionError> {
        let request: GraphqlRequest = match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(e) => return Ok(HttpResponse::new(400, format!("bad request: {e}"))),
        };
        let operation = operation_name(&request.query).unwrap_or("").to_string();
        {
            let mut state = self.state.write();
            state.operations.push(operation.clone());
            state.last_variables = Some(request.variables.clone());
            if let Some(failure) = state.next_failure.take() {
                return failure.respond();
            }
        }

        if !self.authorized(headers) {
            return Ok(errors_response(&["Unauthorized: invalid access token"]));
        }

        match operation.as_str() {
            "ListNotes" => self.list(&request.variables),
            "CreateNote" => self.create(&request.variables),
            "UpdateNote" => self.update(&request.variables),
            other => Ok(errors_response(&[format!("unknown operation '{other}'")])),
        }
    }
}

/// The engine type produced by [`loopback_engine`].
pub type LoopbackEngine =
    SyncEngine<GraphqlClient<LoopbackClient<Arc<FakeNotesService>>>, DirectoryStore>;

/// An engine wired to `service` and writing to the configured directory.
pub fn loopback_engine(service: Arc<FakeNotesService>, config: SyncConfig) -> LoopbackEngine {
    let transport = GraphqlClient::new(config.endpoint(), &config.token, LoopbackClient::new(service));
    let store = DirectoryStore::new(config.directory.clone());
    SyncEngine::new(config, transport, store)
}

fn cursor(position: usize) -> String {
    format!("cursor:{position}")
}

fn parse_cursor(cursor: &str) -> Option<usize> {
    cursor.strip_prefix("cursor:")?.parse().ok()
}

fn note_number(id: &str) -> Option<u64> {
    id.strip_prefix("Note/")?.parse().ok()
}

fn groups(ids: Vec<String>) -> Vec<GroupRef> {
    ids.into_iter()
        .map(|id| GroupRef { id, name: None })
        .collect()
}

fn envelope_response(envelope: &GraphqlResponse) -> HttpResponse {
    match serde_json::to_value(envelope) {
        Ok(body) => HttpResponse::json(&body),
        Err(e) => HttpResponse::new(500, e.to_string()),
    }
}

fn data_response(data: Value) -> HttpResponse {
    envelope_response(&GraphqlResponse::data(data))
}

fn errors_response<S: AsRef<str>>(messages: &[S]) -> HttpResponse {
    envelope_response(&GraphqlResponse::errors(messages.iter().map(|m| m.as_ref())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::numbered_notes;
    use kibela_sync_engine::{GraphqlTransport, TransportError};

    fn client(service: Arc<FakeNotesService>) -> GraphqlClient<LoopbackClient<Arc<FakeNotesService>>> {
        GraphqlClient::new("https://acme.kibe.la/api/v1", TEST_TOKEN, LoopbackClient::new(service))
    }

    const LIST: &str = "query ListNotes($first: Int, $after: String) { notes { totalCount } }";

    #[test]
    fn pages_through_notes() {
        let service = Arc::new(FakeNotesService::with_notes(numbered_notes(3)));
        let client = client(Arc::clone(&service));

        let first = client.send(LIST, json!({"first": 2, "after": null})).unwrap();
        assert_eq!(first["notes"]["edges"].as_array().unwrap().len(), 2);
        assert_eq!(first["notes"]["pageInfo"]["hasNextPage"], json!(true));
        assert_eq!(first["notes"]["totalCount"], json!(3));
        assert!(first["notes"].get("nodes").is_none());

        let cursor = first["notes"]["pageInfo"]["endCursor"].as_str().unwrap().to_string();
        let second = client.send(LIST, json!({"first": 2, "after": cursor})).unwrap();
        assert_eq!(second["notes"]["edges"].as_array().unwrap().len(), 1);
        assert_eq!(second["notes"]["pageInfo"]["hasNextPage"], json!(false));
        assert_eq!(service.list_calls(), 2);
    }

    #[test]
    fn rejects_wrong_token() {
        let service = Arc::new(FakeNotesService::new().with_token("other"));
        let err = client(service).send(LIST, json!({})).unwrap_err();
        assert!(matches!(err, TransportError::GraphQl { ref message, .. } if message.contains("Unauthorized")));
    }

    #[test]
    fn injected_failures() {
        let service = Arc::new(FakeNotesService::new());
        service.fail_next(FakeFailure::Connection(ConnectionCode::DnsFailure));
        let err = client(Arc::clone(&service)).send(LIST, json!({})).unwrap_err();
        assert!(matches!(err, TransportError::Connection(ref e) if e.code == ConnectionCode::DnsFailure));

        service.fail_page(2, FakeFailure::Status(503, "down".into()));
        let client = client(Arc::clone(&service));
        assert!(client.send(LIST, json!({})).is_ok());
        assert!(matches!(
            client.send(LIST, json!({})).unwrap_err(),
            TransportError::Status { status: 503, .. }
        ));
    }

    #[test]
    fn create_assigns_next_number() {
        let service = Arc::new(FakeNotesService::with_notes(numbered_notes(2)));
        let data = client(Arc::clone(&service))
            .send(
                "mutation CreateNote($input: CreateNoteInput!) { x }",
                json!({"input": {"title": "T", "content": "c", "coediting": true, "groupIds": [], "draft": false}}),
            )
            .unwrap();
        assert_eq!(data["createNote"]["note"]["id"], json!("Note/3"));
        assert_eq!(service.notes().len(), 3);
        assert!(service.note("Note/3").unwrap().is_published());
    }

    #[test]
    fn update_unknown_note() {
        let service = Arc::new(FakeNotesService::new());
        let err = client(service)
            .send(
                "mutation UpdateNote($input: UpdateNoteInput!) { x }",
                json!({"input": {"id": "Note/404", "title": "T", "content": "c", "draft": true}}),
            )
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
