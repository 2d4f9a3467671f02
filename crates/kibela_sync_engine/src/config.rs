//! Configuration for the sync engine.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Notes requested per page during a pull.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Request timeout used unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for sync operations.
///
/// Values arrive already validated; the engine reads no environment
/// variables or files of its own.
#[derive(Clone)]
pub struct SyncConfig {
    /// Team name, the subdomain of `<team>.kibe.la`.
    pub team: String,
    /// Access token sent as a bearer credential.
    pub token: String,
    /// Directory pulled notes are written to.
    pub directory: PathBuf,
    /// Notes requested per page.
    pub page_size: u32,
    /// Request timeout.
    pub timeout: Duration,
    /// Endpoint override; derived from `team` when unset.
    pub endpoint: Option<String>,
}

impl SyncConfig {
    /// Creates a configuration with default page size and timeout.
    pub fn new(
        team: impl Into<String>,
        token: impl Into<String>,
        directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            team: team.into(),
            token: token.into(),
            directory: directory.into(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: DEFAULT_TIMEOUT,
            endpoint: None,
        }
    }

    /// Sets the page size. Zero is raised to one.
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Points the engine at a different endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// The GraphQL endpoint URL.
    pub fn endpoint(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://{}.kibe.la/api/v1", self.team),
        }
    }

    /// The sync directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("team", &self.team)
            .field("token", &"<redacted>")
            .field("directory", &self.directory)
            .field("page_size", &self.page_size)
            .field("timeout", &self.timeout)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
