//! Cursor-paginated collections.
//!
//! Every list-style query returns the same envelope: `edges`, `nodes`,
//! `pageInfo` and `totalCount`. Some queries leave out `nodes` to save
//! payload size, so decoding goes through [`RawConnection`] and is normalized
//! into a [`Connection`] whose `nodes` are always populated.

use serde::{Deserialize, Serialize};

/// Position information for one page of a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Whether another page follows this one.
    pub has_next_page: bool,
    /// Cursor of the last item on this page.
    ///
    /// Present whenever `has_next_page` is true.
    #[serde(default)]
    pub end_cursor: Option<String>,
    /// Whether a page precedes this one.
    #[serde(default)]
    pub has_previous_page: bool,
    /// Cursor of the first item on this page.
    #[serde(default)]
    pub start_cursor: Option<String>,
}

impl PageInfo {
    /// Page info for the final page of a collection.
    pub fn last() -> Self {
        Self::default()
    }

    /// Page info for a page followed by another one starting after `end_cursor`.
    pub fn more(end_cursor: impl Into<String>) -> Self {
        Self {
            has_next_page: true,
            end_cursor: Some(end_cursor.into()),
            ..Self::default()
        }
    }
}

/// A single item of a connection together with its cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge<T> {
    /// Opaque server-issued position of this item.
    #[serde(default)]
    pub cursor: String,
    /// The item.
    pub node: T,
}

/// A connection exactly as it arrives on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConnection<T> {
    /// Edges, in server order.
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<T>>,
    /// Nodes, when the query asked for them.
    #[serde(default = "Option::default")]
    pub nodes: Option<Vec<T>>,
    /// Position information.
    #[serde(default)]
    pub page_info: PageInfo,
    /// Total items across all pages.
    #[serde(default)]
    pub total_count: Option<u64>,
}

/// A normalized page of a cursor-paginated collection.
///
/// `nodes` is always populated: when the wire form omitted it, it was
/// projected from `edges`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(
    from = "RawConnection<T>",
    bound(deserialize = "T: Deserialize<'de> + Clone")
)]
pub struct Connection<T> {
    /// Edges, in server order.
    pub edges: Vec<Edge<T>>,
    /// Items on this page, in server order.
    pub nodes: Vec<T>,
    /// Position information.
    pub page_info: PageInfo,
    /// Total items across all pages. Informational only.
    pub total_count: Option<u64>,
}

impl<T: Clone> Connection<T> {
    /// Normalizes a wire connection, deriving `nodes` from `edges` if absent.
    pub fn normalize(raw: RawConnection<T>) -> Self {
        let nodes = match raw.nodes {
            Some(nodes) => nodes,
            None => raw.edges.iter().map(|edge| edge.node.clone()).collect(),
        };
        Self {
            edges: raw.edges,
            nodes,
            page_info: raw.page_info,
            total_count: raw.total_count,
        }
    }

    /// Builds a page from edges alone.
    pub fn from_edges(edges: Vec<Edge<T>>, page_info: PageInfo, total_count: Option<u64>) -> Self {
        Self::normalize(RawConnection {
            edges,
            nodes: None,
            page_info,
            total_count,
        })
    }
}

impl<T> Connection<T> {
    /// Returns the cursor to request the next page with, if there is one.
    pub fn next_cursor(&self) -> Option<&str> {
        if self.page_info.has_next_page {
            self.page_info.end_cursor.as_deref()
        } else {
            None
        }
    }

    /// Number of items on this page.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if this page has no items.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Consumes the page, returning its items.
    pub fn into_nodes(self) -> Vec<T> {
        self.nodes
    }
}

impl<T: Clone> From<RawConnection<T>> for Connection<T> {
    fn from(raw: RawConnection<T>) -> Self {
        Self::normalize(raw)
    }
}
