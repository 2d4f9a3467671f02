//! # Kibela Document
//!
//! The local, file-resident form of a note: a frontmatter metadata block
//! followed by a Markdown body.
//!
//! ```text
//! ---
//! id: Note/12345
//! title: "Release plan: Q3"
//! coediting: true
//! groups:
//!   - Group/1
//! ---
//!
//! # Body
//! ```
//!
//! ## Format Rules
//!
//! - The block opens and closes with a line of exactly three hyphens
//! - One `key: value` per line; array keys use an indented list
//! - Text without a valid block is plain content with an empty title
//! - Malformed frontmatter is never an error
//!
//! ## Usage
//!
//! ```
//! use kibela_document::{parse, stringify, Document, Metadata};
//!
//! let mut metadata = Metadata::titled("T");
//! metadata.coediting = Some(true);
//! let text = stringify(&Document::new(metadata, "body"));
//!
//! let doc = parse(&text);
//! assert_eq!(doc.metadata.title, "T");
//! assert_eq!(doc.content, "body");
//! ```
//!
//! This is a pure format crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod metadata;
mod parser;
mod scalar;
mod writer;

pub use metadata::{FolderRef, Key, Metadata};
pub use parser::{parse, FrontmatterParser};
pub use writer::{stringify, FrontmatterWriter};

use std::fmt;

/// Line that opens and closes the metadata block.
pub const DELIMITER: &str = "---";

/// A note as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Metadata block.
    pub metadata: Metadata,
    /// Markdown body.
    pub content: String,
}

impl Document {
    /// Creates a document.
    pub fn new(metadata: Metadata, content: impl Into<String>) -> Self {
        Self {
            metadata,
            content: content.into(),
        }
    }

    /// A document without metadata: empty title, the whole text as content.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            metadata: Metadata::default(),
            content: text.into(),
        }
    }

    /// Parses a document from file text.
    pub fn parse(text: &str) -> Self {
        parse(text)
    }

    /// Serializes the document to file text.
    pub fn to_text(&self) -> String {
        stringify(self)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&stringify(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_title_flag_and_groups() {
        let mut metadata = Metadata::titled("T");
        metadata.coediting = Some(true);
        metadata.groups = Some(vec!["g1".into(), "g2".into()]);
        let original = Document::new(metadata, "body");

        let parsed = parse(&stringify(&original));
        assert_eq!(parsed.metadata.title, "T");
        assert_eq!(parsed.metadata.coediting, Some(true));
        assert_eq!(
            parsed.metadata.groups,
            Some(vec!["g1".to_string(), "g2".to_string()])
        );
        assert_eq!(parsed.content, "body");
    }

    #[test]
    fn plain_text_has_empty_title() {
        let doc = parse("just text, no frontmatter");
        assert_eq!(doc, Document::plain("just text, no frontmatter"));
        assert_eq!(doc.metadata.title, "");
    }

    #[test]
    fn display_matches_stringify() {
        let doc = Document::new(Metadata::titled("Hello"), "world");
        assert_eq!(doc.to_string(), doc.to_text());
    }
}
