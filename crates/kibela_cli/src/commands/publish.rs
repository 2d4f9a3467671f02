//! Publish command implementation.

use crate::error::{CliError, CliResult};
use kibela_sync_engine::{DocumentStore, GraphqlTransport, SyncEngine};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Reads the document text from `file`, or from `stdin` when no file is given.
pub fn read_input(file: Option<&Path>, mut stdin: impl Read) -> CliResult<String> {
    let text = match file {
        Some(path) => fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?,
        None => {
            let mut text = String::new();
            stdin
                .read_to_string(&mut text)
                .map_err(|source| CliError::Read {
                    path: PathBuf::from("<stdin>"),
                    source,
                })?;
            text
        }
    };
    if text.trim().is_empty() {
        return Err(CliError::Input("nothing to publish: input is empty".into()));
    }
    Ok(text)
}

/// Runs the publish command.
pub fn run<T: GraphqlTransport, S: DocumentStore>(
    engine: &SyncEngine<T, S>,
    content: &str,
    out: &mut impl Write,
) -> CliResult<()> {
    let report = engine.publish(content)?;
    writeln!(out, "Created {}", report.note.id)?;
    if let Some(url) = &report.note.url {
        writeln!(out, "  {url}")?;
    }
    writeln!(out, "  saved to {}", report.path.display())?;
    Ok(())
}
