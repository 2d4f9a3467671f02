//! Integration tests for the sync engine against the fake notes service.

use kibela_document::Document;
use kibela_sync_engine::{ConnectionCode, ErrorKind, SyncError};
use kibela_testkit::prelude::*;
use std::fs;
use std::sync::Arc;

fn service_with(count: u64) -> Arc<FakeNotesService> {
    Arc::new(FakeNotesService::with_notes(numbered_notes(count)))
}

#[test]
fn pull_walks_pages_and_writes_files() {
    let service = service_with(5);
    let dir = TempSyncDir::new();
    let engine = loopback_engine(Arc::clone(&service), dir.config().with_page_size(2));

    let report = engine.pull().unwrap();

    assert_eq!(report.written.len(), 5);
    assert_eq!(report.total_count, Some(5));
    assert_eq!(service.list_calls(), 3);
    assert_eq!(
        dir.file_names(),
        vec!["1.md", "2.md", "3.md", "4.md", "5.md"]
    );

    let doc = Document::parse(&dir.read("3.md"));
    assert_eq!(doc.metadata.id.as_deref(), Some("Note/3"));
    assert_eq!(doc.metadata.title, "Note 3");
    assert_eq!(doc.metadata.author.as_deref(), Some("unknown"));
    assert_eq!(doc.metadata.published, Some(false));
    assert_eq!(doc.content, "Body of note 3.");
}

#[test]
fn pull_accepts_pages_with_nodes() {
    let service = Arc::new(FakeNotesService::with_notes(numbered_notes(3)).with_nodes());
    let dir = TempSyncDir::new();
    let engine = loopback_engine(service, dir.config().with_page_size(2));

    assert_eq!(engine.pull().unwrap().written.len(), 3);
}

#[test]
fn pull_is_deterministic() {
    let service = service_with(3);
    let dir = TempSyncDir::new();
    let engine = loopback_engine(service, dir.config());

    engine.pull().unwrap();
    let first: Vec<String> = dir.file_names().iter().map(|n| dir.read(n)).collect();
    engine.pull().unwrap();
    let second: Vec<String> = dir.file_names().iter().map(|n| dir.read(n)).collect();

    assert_eq!(dir.file_names().len(), 3);
    assert_eq!(first, second);
}

#[test]
fn pull_overwrites_local_edits() {
    let service = service_with(1);
    let dir = TempSyncDir::new();
    dir.write("1.md", "local edit");

    loopback_engine(service, dir.config()).pull().unwrap();
    assert!(dir.read("1.md").contains("Body of note 1."));
}

#[test]
fn pull_keeps_files_from_pages_before_a_failure() {
    let service = service_with(5);
    service.fail_page(2, FakeFailure::graphql("Internal error"));
    let dir = TempSyncDir::new();
    let engine = loopback_engine(Arc::clone(&service), dir.config().with_page_size(2));

    let err = engine.pull().unwrap_err();

    assert_eq!(err.written_count(), 2);
    assert_eq!(err.kind(), ErrorKind::GraphQl);
    assert_eq!(dir.file_names(), vec!["1.md", "2.md"]);
    assert_eq!(service.list_calls(), 2);
}

#[test]
fn pull_classifies_connection_failures() {
    let cases = [
        (ConnectionCode::DnsFailure, ErrorKind::NetworkUnreachable),
        (ConnectionCode::Timeout, ErrorKind::Timeout),
        (ConnectionCode::Refused, ErrorKind::Unknown),
    ];
    for (code, kind) in cases {
        let service = service_with(1);
        service.fail_next(FakeFailure::Connection(code));
        let dir = TempSyncDir::new();
        let err = loopback_engine(service, dir.config()).pull().unwrap_err();
        assert_eq!(err.kind(), kind);
        assert_eq!(err.written_count(), 0);
    }
}

#[test]
fn pull_with_wrong_token_is_auth_failure() {
    let service = Arc::new(FakeNotesService::with_notes(numbered_notes(2)).with_token("rotated"));
    let dir = TempSyncDir::new();

    let err = loopback_engine(service, dir.config()).pull().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::AuthFailure);
    assert!(ErrorKind::AuthFailure.hint().is_some());
    assert!(dir.file_names().is_empty());
}

#[test]
fn pull_reports_status_and_missing_data() {
    let service = service_with(1);
    service.fail_page(1, FakeFailure::Status(500, "oops".into()));
    let dir = TempSyncDir::new();
    let err = loopback_engine(service, dir.config()).pull().unwrap_err();
    assert!(matches!(err.source, SyncError::Unknown { status: Some(500), .. }));

    let service = service_with(1);
    service.fail_page(1, FakeFailure::EmptyEnvelope);
    let err = loopback_engine(service, dir.config()).pull().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ProtocolViolation);
}

#[test]
fn empty_collection() {
    let service = service_with(0);
    let dir = TempSyncDir::new();
    let report = loopback_engine(service, dir.config()).pull().unwrap();
    assert!(report.written.is_empty());
    assert_eq!(report.total_count, Some(0));
}

#[test]
fn push_updates_remote_from_pulled_file() {
    let service = Arc::new(FakeNotesService::with_notes([NoteBuilder::new(8)
        .published_at("2024-01-01T00:00:00Z")
        .group("Group/1")
        .build()]));
    let dir = TempSyncDir::new();
    let engine = loopback_engine(Arc::clone(&service), dir.config());
    engine.pull().unwrap();

    let path = dir.file("8.md");
    let edited = dir.read("8.md").replace("Body of note 8.", "Edited body.");
    fs::write(&path, &edited).unwrap();
    let before = dir.read("8.md");

    let note = engine.push(&path).unwrap();

    assert_eq!(note.content, "Edited body.");
    let remote = service.note("Note/8").unwrap();
    assert_eq!(remote.content, "Edited body.");
    assert!(remote.is_published());
    assert_eq!(remote.group_ids(), vec!["Group/1"]);
    assert_eq!(dir.read("8.md"), before);
}

#[test]
fn push_without_id_never_reaches_the_service() {
    let service = service_with(0);
    let dir = TempSyncDir::new();
    let path = dir.write("new.md", "---\ntitle: Draft\n---\n\ntext");

    let err = loopback_engine(Arc::clone(&service), dir.config())
        .push(&path)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidDocument);
    assert!(service.operations().is_empty());
}

#[test]
fn push_unknown_note_is_not_found() {
    let service = service_with(0);
    let dir = TempSyncDir::new();
    let path = dir.write("9.md", "---\nid: Note/9\ntitle: Gone\n---\n\ntext");

    let err = loopback_engine(service, dir.config()).push(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn push_missing_file_is_local_io() {
    let dir = TempSyncDir::new();
    let err = loopback_engine(service_with(0), dir.config())
        .push(&dir.file("missing.md"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::LocalIo);
}

#[test]
fn publish_creates_note_and_matches_pull_output() {
    let service = service_with(2);
    let dir = TempSyncDir::new();
    let engine = loopback_engine(Arc::clone(&service), dir.config());

    let report = engine
        .publish("---\ntitle: Launch plan\npublished: true\ngroups: [Group/1]\nfolders:\n  - groupId: Group/1\n    folderName: Plans\n---\n\n# Launch\n")
        .unwrap();

    assert_eq!(report.note.id, "Note/3");
    assert_eq!(report.path, dir.file("3.md"));
    assert_eq!(
        service.last_variables().unwrap()["input"]["folders"][0]["folderName"],
        "Plans"
    );

    let published = dir.read("3.md");
    let doc = Document::parse(&published);
    assert_eq!(doc.metadata.title, "Launch plan");
    assert_eq!(doc.metadata.published, Some(true));
    assert_eq!(doc.metadata.coediting, Some(true));
    assert_eq!(doc.metadata.author.as_deref(), Some(FAKE_AUTHOR));
    assert_eq!(doc.content, "# Launch");

    engine.pull().unwrap();
    assert_eq!(dir.read("3.md"), published);
}

#[test]
fn publish_without_title_never_reaches_the_service() {
    let service = service_with(0);
    let dir = TempSyncDir::new();
    let err = loopback_engine(Arc::clone(&service), dir.config())
        .publish("no frontmatter here")
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidDocument);
    assert!(service.operations().is_empty());
    assert!(dir.file_names().is_empty());
}
