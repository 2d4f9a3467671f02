//! Test fixtures.
//!
//! Temporary sync directories and builders for remote notes.

use kibela_protocol::{Author, Connection, Edge, GroupRef, PageInfo, RemoteFolder, RemoteNote};
use kibela_sync_engine::SyncConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Team name used by fixtures.
pub const TEST_TEAM: &str = "acme";

/// Access token used by fixtures.
pub const TEST_TOKEN: &str = "test-token";

/// A sync directory with automatic cleanup.
pub struct TempSyncDir {
    temp_dir: TempDir,
}

impl TempSyncDir {
    /// Creates an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Directory path.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of a file inside the directory.
    pub fn file(&self, name: &str) -> PathBuf {
        self.path().join(name)
    }

    /// Engine configuration pointing at this directory.
    pub fn config(&self) -> SyncConfig {
        SyncConfig::new(TEST_TEAM, TEST_TOKEN, self.path())
    }

    /// Writes a file and returns its path.
    pub fn write(&self, name: &str, text: &str) -> PathBuf {
        let path = self.file(name);
        fs::write(&path, text).expect("Failed to write file");
        path
    }

    /// Reads a file.
    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.file(name)).expect("Failed to read file")
    }

    /// Names of the files in the directory, sorted.
    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.path())
            .expect("Failed to list directory")
            .map(|entry| {
                entry
                    .expect("Failed to read entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        names.sort();
        names
    }
}

impl Default for TempSyncDir {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`RemoteNote`] values.
#[derive(Debug, Clone)]
pub struct NoteBuilder {
    note: RemoteNote,
    folders: Vec<RemoteFolder>,
}

impl NoteBuilder {
    /// A note with id `Note/<number>` and title `Note <number>`.
    pub fn new(number: u64) -> Self {
        let mut note = RemoteNote::new(format!("Note/{number}"), format!("Note {number}"));
        note.content = format!("Body of note {number}.");
        note.url = Some(format!("https://{TEST_TEAM}.kibe.la/notes/{number}"));
        note.content_updated_at = Some("2024-05-01T09:00:00Z".to_string());
        Self {
            note,
            folders: Vec::new(),
        }
    }

    /// A note with an arbitrary id.
    pub fn with_id(id: impl Into<String>) -> Self {
        let mut builder = Self::new(0);
        builder.note.id = id.into();
        builder
    }

    /// Sets the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.note.title = title.into();
        self
    }

    /// Sets the body.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.note.content = content.into();
        self
    }

    /// Marks the note published at the given time.
    pub fn published_at(mut self, at: impl Into<String>) -> Self {
        self.note.published_at = Some(at.into());
        self
    }

    /// Sets the co-editing flag.
    pub fn coediting(mut self, coediting: bool) -> Self {
        self.note.coediting = coediting;
        self
    }

    /// Sets the author account.
    pub fn author(mut self, account: impl Into<String>) -> Self {
        self.note.author = Some(Author {
            account: account.into(),
            real_name: None,
        });
        self
    }

    /// Adds a group.
    pub fn group(mut self, id: impl Into<String>) -> Self {
        self.note.groups.push(GroupRef {
            id: id.into(),
            name: None,
        });
        self
    }

    /// Adds a folder inside a group.
    pub fn folder(mut self, group_id: impl Into<String>, name: impl Into<String>) -> Self {
        self.folders.push(RemoteFolder {
            id: None,
            name: name.into(),
            group: Some(GroupRef {
                id: group_id.into(),
                name: None,
            }),
        });
        self
    }

    /// Builds the note.
    pub fn build(self) -> RemoteNote {
        let mut note = self.note;
        if !self.folders.is_empty() {
            note.folders = Some(folder_connection(self.folders));
        }
        note
    }
}

/// Wraps folders in a single-page connection.
pub fn folder_connection(folders: Vec<RemoteFolder>) -> Connection<RemoteFolder> {
    let edges = folders
        .into_iter()
        .map(|node| Edge {
            cursor: String::new(),
            node,
        })
        .collect();
    Connection::from_edges(edges, PageInfo::last(), None)
}

/// `count` notes numbered from 1.
pub fn numbered_notes(count: u64) -> Vec<RemoteNote> {
    (1..=count).map(|n| NoteBuilder::new(n).build()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_dir_files() {
        let dir = TempSyncDir::new();
        dir.write("b.md", "b");
        dir.write("a.md", "a");
        assert_eq!(dir.file_names(), vec!["a.md", "b.md"]);
        assert_eq!(dir.read("a.md"), "a");
        assert_eq!(dir.config().directory, dir.path());
    }

    #[test]
    fn note_builder() {
        let note = NoteBuilder::new(4)
            .title("Plan")
            .published_at("2024-01-01T00:00:00Z")
            .group("Group/1")
            .folder("Group/1", "Specs")
            .author("alice")
            .build();
        assert_eq!(note.id, "Note/4");
        assert!(note.is_published());
        assert_eq!(note.group_ids(), vec!["Group/1"]);
        assert_eq!(note.folder_list()[0].name, "Specs");
        assert_eq!(numbered_notes(3).len(), 3);
    }
}
