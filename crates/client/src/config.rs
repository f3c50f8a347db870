// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::time::Duration;

/// Backend used when the front end is served from anywhere but localhost.
pub const DEFAULT_BACKEND_URL: &str = "https://api.foolder.tv";

/// Backend used during local development.
pub const LOCAL_BACKEND_URL: &str = "http://localhost:3000";

/// Name of the credential file inside the state directory.
pub const STORAGE_FILE: &str = "storage.json";

/// Client configuration shared by the library and the CLI.
#[derive(Debug, Clone, clap::Args)]
pub struct ClientConfig {
    /// Backend base URL. Takes precedence over the persisted override.
    #[arg(long, env = "FOOLDER_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Host the front end is served from; localhost selects the local backend.
    #[arg(long, env = "FOOLDER_SITE_HOST")]
    pub site_host: Option<String>,

    /// Directory for persisted client state.
    #[arg(long, env = "FOOLDER_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Transport timeout in milliseconds.
    #[arg(long, default_value_t = 30_000, env = "FOOLDER_TIMEOUT_MS")]
    pub timeout_ms: u64,

    /// Never refresh tokens; the first 401 signs the user out.
    #[arg(long, env = "FOOLDER_NO_REFRESH")]
    pub no_refresh: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: None,
            site_host: None,
            state_dir: None,
            timeout_ms: 30_000,
            no_refresh: false,
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Resolve the backend base URL: explicit override, then the persisted
    /// override, then the default for the site host.
    pub fn resolve_backend_url(&self, persisted: Option<&str>) -> String {
        let chosen = [self.backend_url.as_deref(), persisted]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|url| !url.is_empty())
            .unwrap_or_else(|| default_backend_url(self.site_host.as_deref()));
        chosen.trim_end_matches('/').to_owned()
    }

    /// Resolve the state directory.
    ///
    /// Checks `--state-dir`/`FOOLDER_STATE_DIR`, then `$XDG_STATE_HOME/foolder`,
    /// then `$HOME/.local/state/foolder`.
    pub fn state_dir(&self) -> PathBuf {
        state_dir_with(self.state_dir.as_ref(), |name| std::env::var(name).ok())
    }

    /// Path of the credential file.
    pub fn storage_path(&self) -> PathBuf {
        self.state_dir().join(STORAGE_FILE)
    }
}

/// Default backend for the host the front end is served from.
pub fn default_backend_url(site_host: Option<&str>) -> &'static str {
    match site_host.map(str::trim) {
        Some("localhost") | Some("127.0.0.1") => LOCAL_BACKEND_URL,
        _ => DEFAULT_BACKEND_URL,
    }
}

fn state_dir_with(explicit: Option<&PathBuf>, get_env: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.clone();
    }
    if let Some(xdg) = get_env("XDG_STATE_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg).join("foolder");
    }
    if let Some(home) = get_env("HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(home).join(".local/state/foolder");
    }
    PathBuf::from(".foolder")
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
