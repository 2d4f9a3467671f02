//! Error types for the sync engine.
//!
//! Lower layers fail with [`ConnectionError`] (HTTP client) and
//! [`TransportError`] (GraphQL client). The engine classifies those once,
//! through [`SyncError::classify`], before handing a [`SyncError`] to its
//! caller.

use kibela_protocol::GraphqlErrorEntry;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Why a connection-level failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionCode {
    /// The host name could not be resolved.
    DnsFailure,
    /// Connecting or reading the response took too long.
    Timeout,
    /// The connection was refused or reset.
    Refused,
    /// Any other client-side failure.
    Other,
}

impl fmt::Display for ConnectionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionCode::DnsFailure => "dns failure",
            ConnectionCode::Timeout => "timeout",
            ConnectionCode::Refused => "refused",
            ConnectionCode::Other => "other",
        };
        f.write_str(name)
    }
}

/// A failure of the network call itself; no HTTP response was received.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("connection failed ({code}): {message}")]
pub struct ConnectionError {
    /// Failure code.
    pub code: ConnectionCode,
    /// Client message.
    pub message: String,
}

impl ConnectionError {
    /// Creates a connection error.
    pub fn new(code: ConnectionCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Errors raised by the GraphQL transport.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The network call failed.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// The server answered with a non-success status.
    #[error("unexpected HTTP status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The request could not be encoded.
    #[error("failed to encode request: {0}")]
    Encode(String),

    /// The response body or its data could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The response carried a non-empty `errors` list.
    #[error("{message}")]
    GraphQl {
        /// All error messages joined with `", "`.
        message: String,
        /// The structured error list.
        errors: Vec<GraphqlErrorEntry>,
    },

    /// The response carried neither errors nor data.
    #[error("response carried no data")]
    MissingData,
}

impl TransportError {
    /// Builds a GraphQL error from its structured entries.
    pub fn graphql(errors: Vec<GraphqlErrorEntry>) -> Self {
        let message = errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Self::GraphQl { message, errors }
    }
}

/// Classified sync failures.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The remote host could not be resolved.
    #[error("network unreachable: {message}")]
    NetworkUnreachable {
        /// Client message.
        message: String,
    },

    /// The request timed out.
    #[error("request timed out: {message}")]
    Timeout {
        /// Client message.
        message: String,
    },

    /// The credentials were rejected.
    #[error("authentication failed: {message}")]
    AuthFailure {
        /// Joined server messages.
        message: String,
        /// Structured server errors.
        errors: Vec<GraphqlErrorEntry>,
    },

    /// The requested resource does not exist.
    #[error("not found: {message}")]
    NotFound {
        /// Joined server messages.
        message: String,
        /// Structured server errors.
        errors: Vec<GraphqlErrorEntry>,
    },

    /// The credentials lack the required permission.
    #[error("permission denied: {message}")]
    PermissionDenied {
        /// Joined server messages.
        message: String,
        /// Structured server errors.
        errors: Vec<GraphqlErrorEntry>,
    },

    /// Any other GraphQL error.
    #[error("GraphQL error: {message}")]
    GraphQl {
        /// Joined server messages.
        message: String,
        /// Structured server errors.
        errors: Vec<GraphqlErrorEntry>,
    },

    /// The server answered with something that is not a valid envelope.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// Reading or writing a local file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    LocalIo {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// A local document lacks metadata the operation requires.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// Anything not matched by the other kinds.
    #[error("{message}")]
    Unknown {
        /// Description.
        message: String,
        /// HTTP status, when the server answered with one.
        status: Option<u16>,
    },
}

impl SyncError {
    /// Classifies a transport failure.
    ///
    /// GraphQL errors are matched case-insensitively against known
    /// vocabulary in their messages. Connection failures are matched on
    /// their code. Everything else is a protocol violation or unknown.
    pub fn classify(err: TransportError) -> Self {
        match err {
            TransportError::Connection(conn) => match conn.code {
                ConnectionCode::DnsFailure => SyncError::NetworkUnreachable {
                    message: conn.message,
                },
                ConnectionCode::Timeout => SyncError::Timeout {
                    message: conn.message,
                },
                ConnectionCode::Refused | ConnectionCode::Other => SyncError::Unknown {
                    message: conn.to_string(),
                    status: None,
                },
            },
            TransportError::Status { status, body } => SyncError::Unknown {
                message: status_message(status, &body),
                status: Some(status),
            },
            TransportError::Encode(message) | TransportError::Decode(message) => {
                SyncError::ProtocolViolation(message)
            }
            TransportError::MissingData => {
                SyncError::ProtocolViolation("response carried neither data nor errors".into())
            }
            TransportError::GraphQl { message, errors } => classify_graphql(message, errors),
        }
    }

    /// Wraps an I/O error on `path`.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SyncError::LocalIo {
            path: path.into(),
            source,
        }
    }

    /// Returns the classified kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::NetworkUnreachable { .. } => ErrorKind::NetworkUnreachable,
            SyncError::Timeout { .. } => ErrorKind::Timeout,
            SyncError::AuthFailure { .. } => ErrorKind::AuthFailure,
            SyncError::NotFound { .. } => ErrorKind::NotFound,
            SyncError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            SyncError::GraphQl { .. } => ErrorKind::GraphQl,
            SyncError::ProtocolViolation(_) => ErrorKind::ProtocolViolation,
            SyncError::LocalIo { .. } => ErrorKind::LocalIo,
            SyncError::InvalidDocument(_) => ErrorKind::InvalidDocument,
            SyncError::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// Structured server errors, for the GraphQL kinds.
    pub fn graphql_errors(&self) -> &[GraphqlErrorEntry] {
        match self {
            SyncError::AuthFailure { errors, .. }
            | SyncError::NotFound { errors, .. }
            | SyncError::PermissionDenied { errors, .. }
            | SyncError::GraphQl { errors, .. } => errors,
            _ => &[],
        }
    }
}

impl From<TransportError> for SyncError {
    fn from(err: TransportError) -> Self {
        SyncError::classify(err)
    }
}

// Known imprecision: matching is a plain substring search, so a note title
// quoted inside a server message can trip it.
fn classify_graphql(message: String, errors: Vec<GraphqlErrorEntry>) -> SyncError {
    let haystack = if errors.is_empty() {
        message.to_lowercase()
    } else {
        errors
            .iter()
            .map(|e| e.message.to_lowercase())
            .collect::<Vec<_>>()
            .join("\n")
    };

    if mentions(&haystack, &["authentication", "unauthorized"]) {
        SyncError::AuthFailure { message, errors }
    } else if mentions(&haystack, &["not found"]) {
        SyncError::NotFound { message, errors }
    } else if mentions(&haystack, &["permission", "forbidden"]) {
        SyncError::PermissionDenied { message, errors }
    } else {
        SyncError::GraphQl { message, errors }
    }
}

fn mentions(haystack: &str, words: &[&str]) -> bool {
    words.iter().any(|w| haystack.contains(w))
}

fn status_message(status: u16, body: &str) -> String {
    const MAX_BODY: usize = 200;
    let body = body.trim();
    if body.is_empty() {
        return format!("HTTP {status}");
    }
    match body.char_indices().nth(MAX_BODY) {
        Some((end, _)) => format!("HTTP {status}: {}...", &body[..end]),
        None => format!("HTTP {status}: {body}"),
    }
}

/// The classified kind of a [`SyncError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// DNS resolution failed.
    NetworkUnreachable,
    /// The request timed out.
    Timeout,
    /// Credentials were rejected.
    AuthFailure,
    /// The resource does not exist.
    NotFound,
    /// Credentials lack permission.
    PermissionDenied,
    /// Other GraphQL error.
    GraphQl,
    /// Invalid response envelope.
    ProtocolViolation,
    /// Local file error.
    LocalIo,
    /// Missing required metadata.
    InvalidDocument,
    /// Unmatched failure.
    Unknown,
}

impl ErrorKind {
    /// Stable code for display and scripting.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::NetworkUnreachable => "NETWORK_ERROR",
            ErrorKind::Timeout => "TIMEOUT_ERROR",
            ErrorKind::AuthFailure => "AUTH_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::PermissionDenied => "PERMISSION_ERROR",
            ErrorKind::GraphQl => "GRAPHQL_ERROR",
            ErrorKind::ProtocolViolation => "PROTOCOL_ERROR",
            ErrorKind::LocalIo => "IO_ERROR",
            ErrorKind::InvalidDocument => "INVALID_DOCUMENT",
            ErrorKind::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// A remediation hint, if there is a useful one.
    pub fn hint(self) -> Option<&'static str> {
        match self {
            ErrorKind::AuthFailure => {
                Some("Check your access token (KIBELA_TOKEN) and generate a new one if it expired.")
            }
            ErrorKind::NetworkUnreachable => {
                Some("Check your internet connection and that the team name (KIBELA_TEAM) is correct.")
            }
            ErrorKind::Timeout => Some("The server did not answer in time; try again later."),
            ErrorKind::PermissionDenied => {
                Some("Your account cannot access this resource; ask a team admin for access.")
            }
            ErrorKind::InvalidDocument => {
                Some("Use `pull` or `publish` to create files with the required frontmatter.")
            }
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A pull that stopped part way.
///
/// Files written before the failure stay on disk and are listed here.
#[derive(Error, Debug)]
#[error("pull stopped after writing {} notes: {source}", .written.len())]
pub struct PullError {
    /// Files written before the failure, in order.
    pub written: Vec<PathBuf>,
    /// The classified failure.
    #[source]
    pub source: SyncError,
}

impl PullError {
    /// Number of files written before the failure.
    pub fn written_count(&self) -> usize {
        self.written.len()
    }

    /// The classified kind of the failure.
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}
