//! Property-based test generators using proptest.
//!
//! Strategies produce documents whose metadata exercises the quoting rules:
//! colons, hashes, quotes, newlines, surrounding spaces and non-ASCII text.

use kibela_document::{Document, FolderRef, Key, Metadata};
use proptest::prelude::*;

/// Strategy for scalar metadata values, including characters that force quoting.
pub fn scalar_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::string::string_regex("[a-zA-Z0-9 ]{0,16}").expect("Invalid regex"),
        prop::string::string_regex("[ -~\t\n\ré日本]{0,24}").expect("Invalid regex"),
        Just(String::new()),
        Just("a: b # c".to_string()),
        Just(" padded ".to_string()),
        Just("say \"hi\"\\".to_string()),
    ]
}

/// Strategy for keys the parser does not recognize.
pub fn extra_key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-zA-Z0-9_]{0,11}")
        .expect("Invalid regex")
        .prop_filter("Key must not be a recognized key", |k| Key::from_name(k).is_none())
}

/// Strategy for folder placements.
pub fn folder_strategy() -> impl Strategy<Value = FolderRef> {
    (scalar_strategy(), scalar_strategy()).prop_map(|(group, name)| FolderRef::new(group, name))
}

/// Strategy for metadata blocks.
pub fn metadata_strategy() -> impl Strategy<Value = Metadata> {
    let text = || proptest::option::of(scalar_strategy());
    (
        (text(), scalar_strategy(), any::<Option<bool>>(), any::<Option<bool>>()),
        (
            proptest::option::of(prop::collection::vec(scalar_strategy(), 0..4)),
            proptest::option::of(prop::collection::vec(folder_strategy(), 0..3)),
        ),
        (text(), text(), text(), text()),
        prop::collection::vec((extra_key_strategy(), scalar_strategy()), 0..3),
    )
        .prop_map(
            |((id, title, coediting, published), (groups, folders), (author, created_at, updated_at, url), extras)| {
                let mut metadata = Metadata {
                    id,
                    title,
                    coediting,
                    published,
                    groups,
                    folders,
                    author,
                    created_at,
                    updated_at,
                    url,
                    extra: Vec::new(),
                };
                for (key, value) in extras {
                    metadata.set_extra(key, value);
                }
                metadata
            },
        )
}

/// Strategy for Markdown bodies, already trimmed as the parser returns them.
pub fn content_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[ -~\n]{0,120}")
        .expect("Invalid regex")
        .prop_map(|s| s.trim().to_string())
}

/// Strategy for whole documents.
pub fn document_strategy() -> impl Strategy<Value = Document> {
    (metadata_strategy(), content_strategy())
        .prop_map(|(metadata, content)| Document::new(metadata, content))
}
