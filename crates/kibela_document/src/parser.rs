//! Frontmatter parser.

use crate::metadata::{FolderRef, Key, Metadata};
use crate::scalar::{bracketed, split_flow_items, unquote};
use crate::{Document, DELIMITER};

/// Parses file text into a document.
///
/// Never fails: text without a complete metadata block is returned whole as
/// content with an empty title.
pub fn parse(text: &str) -> Document {
    FrontmatterParser::new(text).parse()
}

/// Which array key indented list items belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpenList {
    Groups,
    Folders,
}

/// A frontmatter parser over one file's text.
pub struct FrontmatterParser<'a> {
    text: &'a str,
}

impl<'a> FrontmatterParser<'a> {
    /// Creates a parser for the given text.
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// Parses the text.
    pub fn parse(&self) -> Document {
        match self.split() {
            Some((block, body)) => Document {
                metadata: parse_block(block),
                content: body.trim().to_string(),
            },
            None => Document::plain(self.text),
        }
    }

    /// Splits the text into metadata block and body.
    ///
    /// Returns `None` when the first line is not a delimiter or no closing
    /// delimiter follows.
    pub fn split(&self) -> Option<(&'a str, &'a str)> {
        let text = self.text;
        let mut lines = text.split_inclusive('\n');
        let first = lines.next()?;
        if !is_delimiter(first) {
            return None;
        }

        let block_start = first.len();
        let mut offset = block_start;
        for line in lines {
            if is_delimiter(line) {
                return Some((&text[block_start..offset], &text[offset + line.len()..]));
            }
            offset += line.len();
        }
        None
    }
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches(['\n', '\r']) == DELIMITER
}

fn parse_block(block: &str) -> Metadata {
    let mut metadata = Metadata::default();
    let mut open_list: Option<OpenList> = None;

    for raw in block.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Folder entries continue on undashed indented lines; group items
        // are always dashed. Any other indented line is a plain key.
        let dashed = line == "-" || line.starts_with("- ");
        let indented = raw.starts_with([' ', '\t']);
        match open_list {
            Some(OpenList::Groups) if dashed => {
                push_group_item(&mut metadata, line);
                continue;
            }
            Some(OpenList::Folders) if dashed || indented => {
                push_folder_line(&mut metadata, line);
                continue;
            }
            _ if dashed => continue,
            _ => open_list = None,
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        match Key::from_name(key) {
            Some(Key::Groups) => {
                if value.is_empty() {
                    open_list = Some(OpenList::Groups);
                }
                metadata.groups = Some(inline_list(value));
            }
            Some(Key::Folders) => {
                if value.is_empty() {
                    open_list = Some(OpenList::Folders);
                }
                metadata.folders = Some(inline_folders(value));
            }
            Some(Key::Coediting) => metadata.coediting = Some(value == "true"),
            Some(Key::Published) => metadata.published = Some(value == "true"),
            Some(other) => metadata.set_text(other, unquote(value)),
            None => metadata.set_extra(key, unquote(value)),
        }
    }

    metadata
}

/// Items of an inline array value: `[a, "b"]`, or a bare single value.
fn inline_list(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    match bracketed(value) {
        Some(inner) => split_flow_items(inner).into_iter().map(unquote).collect(),
        None => vec![unquote(value)],
    }
}

/// Folders of an inline value: `[{groupId: g, folderName: f}, ...]`.
///
/// Entries that are not `{...}` maps are skipped.
fn inline_folders(value: &str) -> Vec<FolderRef> {
    let Some(inner) = bracketed(value) else {
        return Vec::new();
    };
    split_flow_items(inner)
        .into_iter()
        .filter_map(|item| item.strip_prefix('{').and_then(|i| i.strip_suffix('}')))
        .map(|fields| {
            let mut folder = FolderRef::default();
            for field in split_flow_items(fields) {
                set_folder_field(&mut folder, field);
            }
            folder
        })
        .collect()
}

fn push_group_item(metadata: &mut Metadata, line: &str) {
    let Some(item) = line.strip_prefix('-') else {
        return;
    };
    metadata
        .groups
        .get_or_insert_with(Vec::new)
        .push(unquote(item.trim()));
}

/// Handles one line of an indented folder list.
///
/// `- groupId: g` starts a new entry; an undashed `folderName: f` continues
/// the current one.
fn push_folder_line(metadata: &mut Metadata, line: &str) {
    let folders = metadata.folders.get_or_insert_with(Vec::new);
    let field = match line.strip_prefix('-') {
        Some(rest) => {
            folders.push(FolderRef::default());
            rest.trim()
        }
        None => line,
    };
    if folders.is_empty() {
        folders.push(FolderRef::default());
    }
    if let Some(folder) = folders.last_mut() {
        set_folder_field(folder, field);
    }
}

fn set_folder_field(folder: &mut FolderRef, field: &str) {
    let Some((key, value)) = field.split_once(':') else {
        return;
    };
    let value = unquote(value.trim());
    match key.trim() {
        "groupId" => folder.group_id = value,
        "folderName" => folder.folder_name = value,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_delimiter_is_plain_content() {
        let doc = parse("# Title\n\nbody");
        assert_eq!(doc.metadata, Metadata::default());
        assert_eq!(doc.content, "# Title\n\nbody");
    }

    #[test]
    fn unclosed_block_is_plain_content() {
        let text = "---\ntitle: T\nno closing line";
        let doc = parse(text);
        assert_eq!(doc.metadata.title, "");
        assert_eq!(doc.content, text);
    }

    #[test]
    fn delimiter_must_be_exact() {
        let text = "----\ntitle: T\n----\nbody";
        assert_eq!(parse(text).content, text);
        let text = " ---\ntitle: T\n---\nbody";
        assert_eq!(parse(text).content, text);
    }

    #[test]
    fn scalar_and_bool_keys() {
        let doc = parse(
            "---\nid: Note/7\ntitle: \"A: B\"\ncoediting: true\npublished: yes\nauthor: bob\n---\n\n  body text  \n",
        );
        assert_eq!(doc.metadata.id.as_deref(), Some("Note/7"));
        assert_eq!(doc.metadata.title, "A: B");
        assert_eq!(doc.metadata.coediting, Some(true));
        assert_eq!(doc.metadata.published, Some(false));
        assert_eq!(doc.metadata.author.as_deref(), Some("bob"));
        assert_eq!(doc.content, "body text");
    }

    #[test]
    fn value_splits_at_first_colon() {
        let doc = parse("---\nurl: https://acme.kibe.la/notes/1\n---\n");
        assert_eq!(doc.metadata.url.as_deref(), Some("https://acme.kibe.la/notes/1"));
    }

    #[test]
    fn inline_arrays() {
        let doc = parse("---\ngroups: [g1, \"g2\", 'g3']\nfolders: []\n---\n");
        assert_eq!(
            doc.metadata.groups,
            Some(vec!["g1".to_string(), "g2".to_string(), "g3".to_string()])
        );
        assert_eq!(doc.metadata.folders, Some(vec![]));

        let doc = parse("---\ngroups: []\n---\n");
        assert_eq!(doc.metadata.groups, Some(vec![]));
    }

    #[test]
    fn inline_folder_maps() {
        let doc = parse("---\nfolders: [{groupId: G/1, folderName: \"a, b\"}]\n---\n");
        assert_eq!(doc.metadata.folders, Some(vec![FolderRef::new("G/1", "a, b")]));
    }

    #[test]
    fn indented_lists() {
        let doc = parse(
            "---\ngroups:\n  - g1\n  - \"g: 2\"\nfolders:\n  - groupId: G/1\n    folderName: Minutes\n  - groupId: G/2\n    folderName: Specs\ntitle: T\n---\nbody",
        );
        assert_eq!(
            doc.metadata.groups,
            Some(vec!["g1".to_string(), "g: 2".to_string()])
        );
        assert_eq!(
            doc.metadata.folders,
            Some(vec![
                FolderRef::new("G/1", "Minutes"),
                FolderRef::new("G/2", "Specs")
            ])
        );
        assert_eq!(doc.metadata.title, "T");
    }

    #[test]
    fn indented_scalar_keys() {
        let doc = parse("---\n  title: Indented\n\tid: Note/5\n  published: true\n---\nbody");
        assert_eq!(doc.metadata.title, "Indented");
        assert_eq!(doc.metadata.id.as_deref(), Some("Note/5"));
        assert_eq!(doc.metadata.published, Some(true));
        assert_eq!(doc.content, "body");
    }

    #[test]
    fn indented_key_after_group_list() {
        let doc = parse("---\ngroups:\n  - g1\n  title: T\n---\n");
        assert_eq!(doc.metadata.groups, Some(vec!["g1".to_string()]));
        assert_eq!(doc.metadata.title, "T");
    }

    #[test]
    fn stray_list_items_are_skipped() {
        let doc = parse("---\n- orphan\ntitle: T\n---\n");
        assert_eq!(doc.metadata.title, "T");
        assert!(doc.metadata.extra.is_empty());
    }

    #[test]
    fn comments_blank_lines_and_colonless_lines_are_skipped() {
        let doc = parse("---\n# comment\n\njunk line\ntitle: T\n---\nbody");
        assert_eq!(doc.metadata.title, "T");
        assert!(doc.metadata.extra.is_empty());
    }

    #[test]
    fn unknown_keys_are_kept() {
        let doc = parse("---\ntitle: T\nemoji: \"x: y\"\nlayout: wide\n---\n");
        assert_eq!(doc.metadata.extra("emoji"), Some("x: y"));
        assert_eq!(doc.metadata.extra("layout"), Some("wide"));
    }

    #[test]
    fn crlf_delimiters() {
        let doc = parse("---\r\ntitle: T\r\n---\r\n\r\nbody\r\n");
        assert_eq!(doc.metadata.title, "T");
        assert_eq!(doc.content, "body");
    }

    #[test]
    fn empty_block() {
        let doc = parse("---\n---\nbody");
        assert_eq!(doc.metadata, Metadata::default());
        assert_eq!(doc.content, "body");
    }

    #[test]
    fn split_exposes_block_and_body() {
        let parser = FrontmatterParser::new("---\na: 1\n---\nrest");
        assert_eq!(parser.split(), Some(("a: 1\n", "rest")));
        assert_eq!(FrontmatterParser::new("rest").split(), None);
    }
}
