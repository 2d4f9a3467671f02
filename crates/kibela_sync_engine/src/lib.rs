//! # Kibela Sync Engine
//!
//! Syncs Kibela notes with a directory of Markdown files.
//!
//! This crate provides:
//! - A GraphQL transport over a pluggable HTTP client
//! - A lazy cursor paginator for `Connection`-shaped collections
//! - Pull (remote → files), push (file → remote) and publish (text → new note)
//! - Classification of transport failures into actionable kinds
//!
//! ## Architecture
//!
//! ```text
//! SyncEngine ──> Paginator (pull only) ──> GraphqlTransport ──> HttpClient
//!     │
//!     └──> DocumentStore (frontmatter files)
//! ```
//!
//! Failures from the transport and paginator propagate unchanged to the
//! engine, which classifies them once into a [`SyncError`].
//!
//! ## Key Invariants
//!
//! - Execution is strictly sequential; one page, then its files, then the next page
//! - Local file names are a pure function of the remote note id
//! - Pull overwrites unconditionally; files written before a failure stay
//! - Push and publish validate the document before any network call
//! - No retries and no state carried between operations

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Version of this crate, sent in the `User-Agent` header.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod config;
mod engine;
mod error;
mod http;
mod pagination;
mod store;
mod transport;

pub use config::{SyncConfig, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT};
pub use engine::{
    create_input, local_file_name, note_document, update_input, PublishReport, PullReport,
    SyncEngine, UNKNOWN_AUTHOR,
};
pub use error::{
    ConnectionCode, ConnectionError, ErrorKind, PullError, SyncError, SyncResult, TransportError,
    TransportResult,
};
pub use http::{Header, HttpClient, HttpResponse, LoopbackClient, LoopbackServer, ReqwestClient};
pub use pagination::{paginate, Paginator};
pub use store::{DirectoryStore, DocumentStore, MemoryStore};
pub use transport::{GraphqlClient, GraphqlTransport, MockTransport, RecordedCall};
