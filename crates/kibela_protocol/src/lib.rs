//! # Kibela Protocol
//!
//! Wire types for the Kibela GraphQL API.
//!
//! This crate provides:
//! - `Connection<T>` for cursor-paginated collections
//! - `RemoteNote` and the mutation inputs/payloads used by sync
//! - The GraphQL request/response envelope
//! - Query and mutation text
//!
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod envelope;
mod note;
pub mod queries;

pub use connection::{Connection, Edge, PageInfo, RawConnection};
pub use envelope::{GraphqlErrorEntry, GraphqlRequest, GraphqlResponse, Location};
pub use note::{
    Author, CreateNoteInput, CreateNotePayload, FolderInput, GroupRef, NoteMutationResult,
    NotesPage, RemoteFolder, RemoteNote, UpdateNoteInput, UpdateNotePayload,
};
