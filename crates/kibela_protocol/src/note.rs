//! Notes as the remote service sees them.

use crate::connection::Connection;
use serde::{Deserialize, Serialize};

/// The author of a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    /// Account name.
    pub account: String,
    /// Display name.
    #[serde(default)]
    pub real_name: Option<String>,
}

/// A group reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    /// Group identifier.
    pub id: String,
    /// Group name.
    #[serde(default)]
    pub name: Option<String>,
}

/// A folder a note is filed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFolder {
    /// Folder identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Folder name.
    pub name: String,
    /// The group owning the folder.
    #[serde(default)]
    pub group: Option<GroupRef>,
}

/// A note on the remote service.
///
/// Everything except `title`, `content` and `coediting` is owned by the
/// server and only ever read by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteNote {
    /// Opaque identifier, e.g. `Note/12345`.
    pub id: String,
    /// Title.
    #[serde(default)]
    pub title: String,
    /// Markdown body.
    #[serde(default)]
    pub content: String,
    /// When the body was last changed.
    #[serde(default)]
    pub content_updated_at: Option<String>,
    /// Publication time; absent for drafts.
    #[serde(default)]
    pub published_at: Option<String>,
    /// Web URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Whether other members may edit the note.
    #[serde(default)]
    pub coediting: bool,
    /// Author.
    #[serde(default)]
    pub author: Option<Author>,
    /// Groups the note is shared with.
    #[serde(default)]
    pub groups: Vec<GroupRef>,
    /// Folders the note is filed under.
    #[serde(default)]
    pub folders: Option<Connection<RemoteFolder>>,
}

impl RemoteNote {
    /// Creates a minimal note with the given identifier and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: String::new(),
            content_updated_at: None,
            published_at: None,
            url: None,
            coediting: false,
            author: None,
            groups: Vec::new(),
            folders: None,
        }
    }

    /// Returns true if the note has been published (is not a draft).
    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }

    /// Identifiers of the groups the note belongs to.
    pub fn group_ids(&self) -> Vec<String> {
        self.groups.iter().map(|g| g.id.clone()).collect()
    }

    /// Folders the note is filed under, in server order.
    pub fn folder_list(&self) -> &[RemoteFolder] {
        self.folders.as_ref().map_or(&[], |c| c.nodes.as_slice())
    }
}

/// A folder placement in a create request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderInput {
    /// Group owning the folder.
    pub group_id: String,
    /// Folder name within the group.
    pub folder_name: String,
}

/// Input of the `updateNote` mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteInput {
    /// Note to update.
    pub id: String,
    /// New title.
    pub title: String,
    /// New body.
    pub content: String,
    /// Co-editing flag, left unchanged when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coediting: Option<bool>,
    /// Group identifiers, left unchanged when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_ids: Option<Vec<String>>,
    /// Whether the note is a draft.
    pub draft: bool,
}

/// Input of the `createNote` mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteInput {
    /// Title.
    pub title: String,
    /// Body.
    pub content: String,
    /// Co-editing flag.
    pub coediting: bool,
    /// Group identifiers.
    pub group_ids: Vec<String>,
    /// Whether the note is a draft.
    pub draft: bool,
    /// Folder placements.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folders: Option<Vec<FolderInput>>,
}

/// The `{note}` object returned by note mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteMutationResult {
    /// The note after the mutation.
    pub note: RemoteNote,
}

/// Result shape of the `createNote` mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotePayload {
    /// Mutation result.
    pub create_note: NoteMutationResult,
}

/// Result shape of the `updateNote` mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNotePayload {
    /// Mutation result.
    pub update_note: NoteMutationResult,
}

/// Result shape of the notes list query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotesPage {
    /// One page of notes.
    pub notes: Connection<RemoteNote>,
}
