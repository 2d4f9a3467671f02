//! Pull, push and publish.

use crate::config::SyncConfig;
use crate::error::{PullError, SyncError, SyncResult, TransportError, TransportResult};
use crate::http::ReqwestClient;
use crate::pagination::paginate;
use crate::store::{DirectoryStore, DocumentStore};
use crate::transport::{GraphqlClient, GraphqlTransport};
use kibela_document::{Document, FolderRef, Metadata};
use kibela_protocol::queries::{self, with_note_fragment};
use kibela_protocol::{
    Connection, CreateNoteInput, CreateNotePayload, FolderInput, NotesPage, RemoteNote,
    UpdateNoteInput, UpdateNotePayload,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Author written for notes whose author is hidden.
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// Outcome of a completed pull.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullReport {
    /// Files written, in arrival order.
    pub written: Vec<PathBuf>,
    /// Total reported by the server, for display.
    pub total_count: Option<u64>,
}

/// Outcome of a publish.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishReport {
    /// The created note.
    pub note: RemoteNote,
    /// Where the note was written locally.
    pub path: PathBuf,
}

/// Syncs notes between the remote service and a document store.
///
/// Each operation is independent; nothing is cached between calls.
pub struct SyncEngine<T: GraphqlTransport, S: DocumentStore = DirectoryStore> {
    config: SyncConfig,
    transport: T,
    store: S,
}

impl SyncEngine<GraphqlClient<ReqwestClient>, DirectoryStore> {
    /// Creates an engine talking to the configured team over the network
    /// and writing to the configured directory.
    pub fn connect(config: SyncConfig) -> SyncResult<Self> {
        let transport =
            GraphqlClient::from_config(&config).map_err(|e| SyncError::classify(e.into()))?;
        let store = DirectoryStore::new(config.directory.clone());
        Ok(Self::new(config, transport, store))
    }
}

impl<T: GraphqlTransport, S: DocumentStore> SyncEngine<T, S> {
    /// Creates a sync engine.
    pub fn new(config: SyncConfig, transport: T, store: S) -> Self {
        Self {
            config,
            transport,
            store,
        }
    }

    /// Gets the configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Gets the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Gets the document store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Writes every remote note to the store.
    ///
    /// Pages are fetched and written strictly one after another. Existing
    /// files are overwritten. On failure, files written so far stay and are
    /// listed in the error.
    pub fn pull(&self) -> Result<PullReport, PullError> {
        info!(page_size = self.config.page_size, "pulling notes");
        let query = with_note_fragment(queries::LIST_NOTES);
        let mut pages = paginate(|cursor: Option<&str>| self.fetch_page(&query, cursor));
        let mut written = Vec::new();

        for item in pages.by_ref() {
            let result = item
                .map_err(SyncError::classify)
                .and_then(|note| self.write_note(&note));
            match result {
                Ok(path) => written.push(path),
                Err(source) => {
                    warn!(written = written.len(), error = %source, "pull stopped");
                    return Err(PullError { written, source });
                }
            }
        }

        let total_count = pages.total_count();
        info!(
            written = written.len(),
            total = total_count,
            pages = pages.pages_fetched(),
            "pull complete"
        );
        Ok(PullReport {
            written,
            total_count,
        })
    }

    /// Sends the document at `path` as an update of the note it came from.
    ///
    /// The file must carry an `id`; otherwise nothing is sent. The file is
    /// not rewritten afterwards.
    pub fn push(&self, path: &Path) -> SyncResult<RemoteNote> {
        let text = self
            .store
            .read(path)
            .map_err(|e| SyncError::io(path, e))?;
        let doc = Document::parse(&text);
        let input = update_input(&doc)?;
        info!(id = %input.id, path = %path.display(), "pushing note");

        let payload: UpdateNotePayload = self
            .request(&with_note_fragment(queries::UPDATE_NOTE), &input)
            .inspect_err(|e| warn!(error = %e, "push failed"))?;
        Ok(payload.update_note.note)
    }

    /// Creates a note from full file text and writes the result locally.
    ///
    /// The text must carry a non-empty `title`; otherwise nothing is sent.
    pub fn publish(&self, content: &str) -> SyncResult<PublishReport> {
        let doc = Document::parse(content);
        let input = create_input(&doc)?;
        info!(title = %input.title, "publishing note");

        let payload: CreateNotePayload = self
            .request(&with_note_fragment(queries::CREATE_NOTE), &input)
            .inspect_err(|e| warn!(error = %e, "publish failed"))?;
        let note = payload.create_note.note;
        let path = self.write_note(&note)?;
        info!(id = %note.id, path = %path.display(), "published note");
        Ok(PublishReport { note, path })
    }

    fn fetch_page(
        &self,
        query: &str,
        cursor: Option<&str>,
    ) -> TransportResult<Connection<RemoteNote>> {
        let variables = json!({ "first": self.config.page_size, "after": cursor });
        let data = self.transport.send(query, variables)?;
        let page: NotesPage = decode(data)?;
        Ok(page.notes)
    }

    fn request<I: Serialize, P: DeserializeOwned>(&self, query: &str, input: &I) -> SyncResult<P> {
        let input = serde_json::to_value(input)
            .map_err(|e| SyncError::classify(TransportError::Encode(e.to_string())))?;
        let data = self.transport.send(query, json!({ "input": input }))?;
        Ok(decode(data)?)
    }

    fn write_note(&self, note: &RemoteNote) -> SyncResult<PathBuf> {
        if note.id.is_empty() {
            return Err(SyncError::ProtocolViolation("note without an id".into()));
        }
        let file_name = local_file_name(&note.id);
        let text = note_document(note).to_text();
        let path = self
            .store
            .write(&file_name, &text)
            .map_err(|e| SyncError::io(self.config.directory.join(&file_name), e))?;
        debug!(id = %note.id, path = %path.display(), "saved note");
        Ok(path)
    }
}

fn decode<P: DeserializeOwned>(data: Value) -> TransportResult<P> {
    serde_json::from_value(data).map_err(|e| TransportError::Decode(e.to_string()))
}

/// Derives the local file name for a remote identifier.
///
/// The digits following the first `Note/` become the name (`Note/12345` ->
/// `12345.md`); otherwise the whole identifier is used with path separators
/// replaced by `-`.
pub fn local_file_name(id: &str) -> String {
    format!("{}.md", local_stem(id))
}

fn local_stem(id: &str) -> String {
    for (start, marker) in id.match_indices("Note/") {
        let rest = &id[start + marker.len()..];
        let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if end > 0 {
            return rest[..end].to_string();
        }
    }
    id.replace(['/', '\\'], "-")
}

/// Projects a remote note into its local document form.
pub fn note_document(note: &RemoteNote) -> Document {
    let folders = note
        .folder_list()
        .iter()
        .map(|folder| {
            FolderRef::new(
                folder.group.as_ref().map(|g| g.id.clone()).unwrap_or_default(),
                folder.name.clone(),
            )
        })
        .collect();

    let metadata = Metadata {
        id: Some(note.id.clone()),
        title: note.title.clone(),
        coediting: Some(note.coediting),
        published: Some(note.is_published()),
        groups: Some(note.group_ids()),
        folders: Some(folders),
        author: Some(
            note.author
                .as_ref()
                .map(|a| a.account.clone())
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        ),
        created_at: note.published_at.clone(),
        updated_at: note.content_updated_at.clone(),
        url: note.url.clone(),
        extra: Vec::new(),
    };
    Document::new(metadata, note.content.clone())
}

/// Builds the update input for a pulled document.
pub fn update_input(doc: &Document) -> SyncResult<UpdateNoteInput> {
    let metadata = &doc.metadata;
    let id = match metadata.id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            return Err(SyncError::InvalidDocument(
                "no note id in frontmatter; use publish for new notes".into(),
            ))
        }
    };
    Ok(UpdateNoteInput {
        id,
        title: metadata.title.clone(),
        content: doc.content.clone(),
        coediting: metadata.coediting,
        group_ids: metadata.groups.clone(),
        draft: !metadata.is_published(),
    })
}

/// Builds the create input for a new document.
pub fn create_input(doc: &Document) -> SyncResult<CreateNoteInput> {
    let metadata = &doc.metadata;
    if metadata.title.trim().is_empty() {
        return Err(SyncError::InvalidDocument(
            "title is required in frontmatter".into(),
        ));
    }
    let folders = metadata.folders.as_ref().map(|folders| {
        folders
            .iter()
            .map(|f| FolderInput {
                group_id: f.group_id.clone(),
                folder_name: f.folder_name.clone(),
            })
            .collect()
    });
    Ok(CreateNoteInput {
        title: metadata.title.clone(),
        content: doc.content.clone(),
        coediting: metadata.coediting.unwrap_or(true),
        group_ids: metadata.groups.clone().unwrap_or_default(),
        draft: !metadata.is_published(),
        folders,
    })
}
