//! # Kibela Testkit
//!
//! Test utilities for kibela-sync.
//!
//! This crate provides:
//! - Temporary sync directories and remote-note builders
//! - An in-process fake of the notes API, reachable through a loopback client
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kibela_testkit::prelude::*;
//! use std::sync::Arc;
//!
//! #[test]
//! fn pulls_everything() {
//!     let service = Arc::new(FakeNotesService::with_notes(numbered_notes(3)));
//!     let dir = TempSyncDir::new();
//!     let engine = loopback_engine(service, dir.config());
//!     assert_eq!(engine.pull().unwrap().written.len(), 3);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod service;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::service::*;
}

pub use fixtures::*;
pub use generators::*;
pub use service::*;
