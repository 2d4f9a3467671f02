//! Query and mutation text used by sync.
//!
//! The strings are an opaque contract with the server; callers pair each
//! with a variables mapping and decode the result into the matching
//! payload type ([`NotesPage`](crate::NotesPage),
//! [`CreateNotePayload`](crate::CreateNotePayload),
//! [`UpdateNotePayload`](crate::UpdateNotePayload)).

/// Lists notes, one page at a time. Variables: `first`, `after`.
pub const LIST_NOTES: &str = r#"
query ListNotes($first: Int, $after: String) {
  notes(first: $first, after: $after) {
    edges {
      cursor
      node {
        ...SyncedNote
      }
    }
    pageInfo {
      endCursor
      hasNextPage
    }
    totalCount
  }
}
"#;

/// Creates a note. Variables: `input` ([`CreateNoteInput`](crate::CreateNoteInput)).
pub const CREATE_NOTE: &str = r#"
mutation CreateNote($input: CreateNoteInput!) {
  createNote(input: $input) {
    note {
      ...SyncedNote
    }
  }
}
"#;

/// Updates a note. Variables: `input` ([`UpdateNoteInput`](crate::UpdateNoteInput)).
pub const UPDATE_NOTE: &str = r#"
mutation UpdateNote($input: UpdateNoteInput!) {
  updateNote(input: $input) {
    note {
      ...SyncedNote
    }
  }
}
"#;

/// Fields of a note that end up in a local document.
pub const SYNCED_NOTE_FRAGMENT: &str = r#"
fragment SyncedNote on Note {
  id
  title
  content
  contentUpdatedAt
  publishedAt
  url
  coediting
  author {
    account
    realName
  }
  groups {
    id
    name
  }
  folders(first: 100) {
    edges {
      node {
        id
        name
        group {
          id
        }
      }
    }
    pageInfo {
      hasNextPage
    }
  }
}
"#;

/// Appends the note fragment to an operation so it can be sent as-is.
pub fn with_note_fragment(operation: &str) -> String {
    format!("{operation}{SYNCED_NOTE_FRAGMENT}")
}

/// Extracts the operation name (`ListNotes`, `CreateNote`, ...) from query text.
pub fn operation_name(query: &str) -> Option<&str> {
    let mut tokens = query.split_whitespace();
    while let Some(token) = tokens.next() {
        if token == "query" || token == "mutation" {
            let name = tokens.next()?;
            let end = name.find(['(', '{']).unwrap_or(name.len());
            let name = &name[..end];
            return (!name.is_empty()).then_some(name);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_names() {
        assert_eq!(operation_name(LIST_NOTES), Some("ListNotes"));
        assert_eq!(operation_name(CREATE_NOTE), Some("CreateNote"));
        assert_eq!(operation_name(UPDATE_NOTE), Some("UpdateNote"));
        assert_eq!(operation_name("{ notes { totalCount } }"), None);
        assert_eq!(operation_name("query Q{ a }"), Some("Q"));
    }

    #[test]
    fn fragment_is_appended() {
        let text = with_note_fragment(LIST_NOTES);
        assert!(text.contains("...SyncedNote"));
        assert!(text.contains("fragment SyncedNote on Note"));
        assert_eq!(operation_name(&text), Some("ListNotes"));
    }
}
