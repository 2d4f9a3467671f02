//! Metadata block fields.

/// Recognized metadata keys, in canonical output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Remote note identifier.
    Id,
    /// Note title.
    Title,
    /// Co-editing flag.
    Coediting,
    /// Published (non-draft) flag.
    Published,
    /// Group identifiers.
    Groups,
    /// Folder placements.
    Folders,
    /// Author account.
    Author,
    /// Creation time.
    CreatedAt,
    /// Last content update time.
    UpdatedAt,
    /// Web URL.
    Url,
}

impl Key {
    /// All recognized keys in canonical order.
    pub const ALL: [Key; 10] = [
        Key::Id,
        Key::Title,
        Key::Coediting,
        Key::Published,
        Key::Groups,
        Key::Folders,
        Key::Author,
        Key::CreatedAt,
        Key::UpdatedAt,
        Key::Url,
    ];

    /// The key as written in a file.
    pub fn name(self) -> &'static str {
        match self {
            Key::Id => "id",
            Key::Title => "title",
            Key::Coediting => "coediting",
            Key::Published => "published",
            Key::Groups => "groups",
            Key::Folders => "folders",
            Key::Author => "author",
            Key::CreatedAt => "createdAt",
            Key::UpdatedAt => "updatedAt",
            Key::Url => "url",
        }
    }

    /// Looks up a recognized key by its file name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }
}

/// A folder placement: folder `folder_name` inside group `group_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderRef {
    /// Group owning the folder.
    pub group_id: String,
    /// Folder name.
    pub folder_name: String,
}

impl FolderRef {
    /// Creates a folder placement.
    pub fn new(group_id: impl Into<String>, folder_name: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            folder_name: folder_name.into(),
        }
    }
}

/// The metadata block of a document.
///
/// Every field except `title` is optional and omitted from output when
/// absent. Keys the parser does not recognize are kept in `extra`, in the
/// order they were read, and written back after the recognized ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Remote identifier; present once a note has been pulled or published.
    pub id: Option<String>,
    /// Title, empty when absent.
    pub title: String,
    /// Co-editing flag.
    pub coediting: Option<bool>,
    /// Published (non-draft) flag.
    pub published: Option<bool>,
    /// Group identifiers.
    pub groups: Option<Vec<String>>,
    /// Folder placements.
    pub folders: Option<Vec<FolderRef>>,
    /// Author account.
    pub author: Option<String>,
    /// Creation time.
    pub created_at: Option<String>,
    /// Last content update time.
    pub updated_at: Option<String>,
    /// Web URL.
    pub url: Option<String>,
    /// Unrecognized keys.
    pub extra: Vec<(String, String)>,
}

impl Metadata {
    /// Metadata carrying only a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Returns true if the note is marked published. Absent means draft.
    pub fn is_published(&self) -> bool {
        self.published.unwrap_or(false)
    }

    /// Looks up an unrecognized key.
    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extra
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Sets an unrecognized key, replacing an earlier value in place.
    pub fn set_extra(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.extra.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.extra.push((key, value)),
        }
    }

    /// Sets a recognized scalar string key.
    ///
    /// Array and boolean keys are left untouched; use the fields directly.
    pub fn set_text(&mut self, key: Key, value: String) {
        match key {
            Key::Id => self.id = Some(value),
            Key::Title => self.title = value,
            Key::Author => self.author = Some(value),
            Key::CreatedAt => self.created_at = Some(value),
            Key::UpdatedAt => self.updated_at = Some(value),
            Key::Url => self.url = Some(value),
            Key::Coediting | Key::Published | Key::Groups | Key::Folders => {}
        }
    }

    /// Returns a recognized scalar string key.
    pub fn text(&self, key: Key) -> Option<&str> {
        match key {
            Key::Id => self.id.as_deref(),
            Key::Title => Some(self.title.as_str()),
            Key::Author => self.author.as_deref(),
            Key::CreatedAt => self.created_at.as_deref(),
            Key::UpdatedAt => self.updated_at.as_deref(),
            Key::Url => self.url.as_deref(),
            Key::Coediting | Key::Published | Key::Groups | Key::Folders => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names_roundtrip() {
        for key in Key::ALL {
            assert_eq!(Key::from_name(key.name()), Some(key));
        }
        assert_eq!(Key::from_name("created_at"), None);
        assert_eq!(Key::from_name("Title"), None);
    }

    #[test]
    fn extra_keys_keep_order_and_replace() {
        let mut metadata = Metadata::default();
        metadata.set_extra("tags", "a");
        metadata.set_extra("emoji", "x");
        metadata.set_extra("tags", "b");
        assert_eq!(
            metadata.extra,
            vec![
                ("tags".to_string(), "b".to_string()),
                ("emoji".to_string(), "x".to_string())
            ]
        );
        assert_eq!(metadata.extra("emoji"), Some("x"));
        assert_eq!(metadata.extra("missing"), None);
    }

    #[test]
    fn published_defaults_to_draft() {
        assert!(!Metadata::default().is_published());
        let metadata = Metadata {
            published: Some(true),
            ..Metadata::default()
        };
        assert!(metadata.is_published());
    }
}
