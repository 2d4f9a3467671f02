//! Cursor pagination.
//!
//! [`Paginator`] walks any [`Connection`]-shaped query to the end, one page
//! at a time, yielding items lazily in server order.

use kibela_protocol::Connection;
use std::iter::FusedIterator;
use std::vec;
use tracing::{debug, warn};

/// Iterator over every item of a paginated collection.
///
/// `fetch` is called with `None` for the first page and with the previous
/// page's end cursor afterwards, until a page reports no next page. A failed
/// fetch is yielded once as `Err` and ends the iteration; items yielded
/// before it are the caller's to keep or discard. The iterator cannot be
/// restarted.
pub struct Paginator<T, E, F>
where
    F: FnMut(Option<&str>) -> Result<Connection<T>, E>,
{
    fetch: F,
    buffer: vec::IntoIter<T>,
    cursor: Option<String>,
    done: bool,
    pages: usize,
    total_count: Option<u64>,
}

impl<T, E, F> Paginator<T, E, F>
where
    F: FnMut(Option<&str>) -> Result<Connection<T>, E>,
{
    /// Creates a paginator; nothing is fetched until the first `next`.
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            buffer: Vec::new().into_iter(),
            cursor: None,
            done: false,
            pages: 0,
            total_count: None,
        }
    }

    /// The latest `totalCount` reported by the server.
    ///
    /// For display only; it is never compared with the items yielded.
    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    /// Number of pages fetched so far.
    pub fn pages_fetched(&self) -> usize {
        self.pages
    }

    fn load_page(&mut self) -> Result<(), E> {
        let cursor = self.cursor.take();
        let page = match (self.fetch)(cursor.as_deref()) {
            Ok(page) => page,
            Err(err) => {
                self.done = true;
                return Err(err);
            }
        };

        self.pages += 1;
        if page.total_count.is_some() {
            self.total_count = page.total_count;
        }
        debug!(page = self.pages, items = page.len(), "fetched page");

        self.cursor = page.next_cursor().map(str::to_owned);
        if self.cursor.is_none() {
            if page.page_info.has_next_page {
                warn!(page = self.pages, "page claims more items but has no end cursor; stopping");
            }
            self.done = true;
        }
        self.buffer = page.into_nodes().into_iter();
        Ok(())
    }
}

impl<T, E, F> Iterator for Paginator<T, E, F>
where
    F: FnMut(Option<&str>) -> Result<Connection<T>, E>,
{
    type Item = Result<T, E>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.next() {
                return Some(Ok(item));
            }
            if self.done {
                return None;
            }
            if let Err(err) = self.load_page() {
                return Some(Err(err));
            }
        }
    }
}

impl<T, E, F> FusedIterator for Paginator<T, E, F> where
    F: FnMut(Option<&str>) -> Result<Connection<T>, E>
{
}

/// Walks a paginated collection; see [`Paginator`].
pub fn paginate<T, E, F>(fetch: F) -> Paginator<T, E, F>
where
    F: FnMut(Option<&str>) -> Result<Connection<T>, E>,
{
    Paginator::new(fetch)
}
