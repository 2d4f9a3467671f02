//! Frontmatter writer.

use crate::metadata::{FolderRef, Key, Metadata};
use crate::scalar::quote;
use crate::{Document, DELIMITER};

/// Serializes a document to file text.
///
/// Output is the opening delimiter, one line per present key in canonical
/// order, the closing delimiter, a blank line, then the content.
pub fn stringify(doc: &Document) -> String {
    let mut writer = FrontmatterWriter::new();
    writer.write_metadata(&doc.metadata);
    writer.finish(&doc.content)
}

/// Incremental builder for a frontmatter block.
#[derive(Debug, Default)]
pub struct FrontmatterWriter {
    out: String,
}

impl FrontmatterWriter {
    /// Creates a writer with the opening delimiter already written.
    pub fn new() -> Self {
        let mut out = String::with_capacity(256);
        out.push_str(DELIMITER);
        out.push('\n');
        Self { out }
    }

    /// Writes every present field of `metadata`.
    pub fn write_metadata(&mut self, metadata: &Metadata) {
        for key in Key::ALL {
            match key {
                Key::Title => self.scalar(key.name(), &metadata.title),
                Key::Coediting => self.flag(key.name(), metadata.coediting),
                Key::Published => self.flag(key.name(), metadata.published),
                Key::Groups => {
                    if let Some(groups) = &metadata.groups {
                        self.list(key.name(), groups);
                    }
                }
                Key::Folders => {
                    if let Some(folders) = &metadata.folders {
                        self.folders(key.name(), folders);
                    }
                }
                _ => {
                    if let Some(value) = metadata.text(key) {
                        self.scalar(key.name(), value);
                    }
                }
            }
        }
        for (key, value) in &metadata.extra {
            self.scalar(key, value);
        }
    }

    /// Writes `key: value`, quoting the value when needed.
    pub fn scalar(&mut self, key: &str, value: &str) {
        self.line(key, &quote(value));
    }

    fn flag(&mut self, key: &str, value: Option<bool>) {
        if let Some(value) = value {
            self.line(key, if value { "true" } else { "false" });
        }
    }

    fn list(&mut self, key: &str, items: &[String]) {
        if items.is_empty() {
            self.line(key, "[]");
            return;
        }
        self.open(key);
        for item in items {
            self.out.push_str("  - ");
            self.out.push_str(&quote(item));
            self.out.push('\n');
        }
    }

    fn folders(&mut self, key: &str, folders: &[FolderRef]) {
        if folders.is_empty() {
            self.line(key, "[]");
            return;
        }
        self.open(key);
        for folder in folders {
            self.out.push_str("  - groupId: ");
            self.out.push_str(&quote(&folder.group_id));
            self.out.push_str("\n    folderName: ");
            self.out.push_str(&quote(&folder.folder_name));
            self.out.push('\n');
        }
    }

    fn open(&mut self, key: &str) {
        self.out.push_str(key);
        self.out.push_str(":\n");
    }

    fn line(&mut self, key: &str, value: &str) {
        self.out.push_str(key);
        self.out.push_str(": ");
        self.out.push_str(value);
        self.out.push('\n');
    }

    /// Closes the block and appends the content.
    pub fn finish(mut self, content: &str) -> String {
        self.out.push_str(DELIMITER);
        self.out.push_str("\n\n");
        self.out.push_str(content);
        self.out
    }
}
