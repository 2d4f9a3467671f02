//! Pull command implementation.

use crate::error::CliResult;
use kibela_sync_engine::{DocumentStore, GraphqlTransport, SyncEngine};
use std::io::Write;

/// Runs the pull command.
pub fn run<T: GraphqlTransport, S: DocumentStore>(
    engine: &SyncEngine<T, S>,
    out: &mut impl Write,
) -> CliResult<()> {
    let report = engine.pull()?;
    let directory = engine.config().directory().display();
    match report.total_count {
        Some(total) => writeln!(
            out,
            "Pulled {} of {} notes into {}",
            report.written.len(),
            total,
            directory
        )?,
        None => writeln!(out, "Pulled {} notes into {}", report.written.len(), directory)?,
    }
    Ok(())
}
