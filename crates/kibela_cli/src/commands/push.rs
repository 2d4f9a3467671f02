//! Push command implementation.

use crate::error::CliResult;
use kibela_sync_engine::{DocumentStore, GraphqlTransport, SyncEngine};
use std::io::Write;
use std::path::Path;

/// Runs the push command.
pub fn run<T: GraphqlTransport, S: DocumentStore>(
    engine: &SyncEngine<T, S>,
    path: &Path,
    out: &mut impl Write,
) -> CliResult<()> {
    let note = engine.push(path)?;
    writeln!(out, "Updated {}", note.id)?;
    if let Some(url) = &note.url {
        writeln!(out, "  {url}")?;
    }
    Ok(())
}
