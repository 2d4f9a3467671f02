//! Credential and option resolution.

use crate::error::{CliError, CliResult};
use kibela_sync_engine::SyncConfig;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable consulted when no token is given.
pub const API_KEY_VAR: &str = "KIBELA_API_KEY";

/// Default sync directory.
pub const DEFAULT_DIR: &str = "./notes";

/// Options as parsed from flags and environment.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Team name.
    pub team: Option<String>,
    /// Access token.
    pub token: Option<String>,
    /// Token from the legacy variable, used when `token` is unset.
    pub api_key: Option<String>,
    /// Sync directory.
    pub dir: PathBuf,
    /// Notes per page.
    pub page_size: Option<u32>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl Options {
    /// Builds the engine configuration, rejecting missing credentials.
    pub fn resolve(self) -> CliResult<SyncConfig> {
        let team = non_empty(self.team).ok_or_else(|| {
            CliError::Config("no team configured (use --team or KIBELA_TEAM)".into())
        })?;
        let token = non_empty(self.token)
            .or_else(|| non_empty(self.api_key))
            .ok_or_else(|| {
                CliError::Config("no access token configured (use --token or KIBELA_TOKEN)".into())
            })?;

        let mut config = SyncConfig::new(team, token, self.dir);
        if let Some(size) = self.page_size {
            config = config.with_page_size(size);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
