//! Errors surfaced to the user.

use kibela_sync_engine::{ErrorKind, PullError, SyncError};
use std::fmt::Write as _;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Anything that ends a command with a non-zero exit status.
#[derive(Error, Debug)]
pub enum CliError {
    /// Credentials or options are missing or invalid.
    #[error("{0}")]
    Config(String),

    /// The input given to a command is unusable.
    #[error("{0}")]
    Input(String),

    /// A local file or stream could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// What was being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),

    /// A sync operation failed.
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// A pull stopped part way.
    #[error("{}", .0.source)]
    Pull(#[from] PullError),
}

impl CliError {
    /// The classified kind, for sync failures.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            CliError::Sync(e) => Some(e.kind()),
            CliError::Pull(e) => Some(e.kind()),
            _ => None,
        }
    }

    /// Stable code shown in brackets.
    pub fn code(&self) -> &'static str {
        match self {
            CliError::Config(_) => "CONFIG_ERROR",
            CliError::Input(_) => "INVALID_INPUT",
            CliError::Read { .. } | CliError::Output(_) => "IO_ERROR",
            CliError::Sync(e) => e.kind().code(),
            CliError::Pull(e) => e.kind().code(),
        }
    }

    /// Remediation hint, if any.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            CliError::Config(_) => Some(
                "Pass --team and --token, or set KIBELA_TEAM and KIBELA_TOKEN in the environment.",
            ),
            _ => self.kind().and_then(ErrorKind::hint),
        }
    }

    /// Renders the error for the terminal.
    ///
    /// ```text
    /// error[AUTH_ERROR]: authentication failed: Unauthorized
    ///   hint: Check your access token ...
    /// ```
    pub fn render(&self) -> String {
        let mut out = format!("error[{}]: {}\n", self.code(), self);
        if let CliError::Pull(e) = self {
            let _ = writeln!(
                out,
                "  {} note(s) were written before the failure",
                e.written_count()
            );
        }
        if let Some(hint) = self.hint() {
            let _ = writeln!(out, "  hint: {hint}");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_code_message_and_hint() {
        let err = CliError::Config("no team configured".into());
        let text = err.render();
        assert!(text.starts_with("error[CONFIG_ERROR]: no team configured\n"));
        assert!(text.contains("hint: Pass --team"));
    }

    #[test]
    fn pull_error_reports_written_count() {
        let err = CliError::from(PullError {
            written: vec![PathBuf::from("1.md"), PathBuf::from("2.md")],
            source: SyncError::Timeout {
                message: "operation timed out".into(),
            },
        });
        assert_eq!(err.code(), "TIMEOUT_ERROR");
        let text = err.render();
        assert!(text.starts_with("error[TIMEOUT_ERROR]: request timed out: operation timed out\n"));
        assert!(text.contains("2 note(s) were written"));
        assert!(text.contains("hint:"));
    }

    #[test]
    fn unknown_has_no_hint() {
        let err = CliError::from(SyncError::Unknown {
            message: "HTTP 502".into(),
            status: Some(502),
        });
        assert_eq!(err.render(), "error[UNKNOWN_ERROR]: HTTP 502\n");
    }
}
