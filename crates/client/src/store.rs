// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential store: the access token and session, persisted together.
//!
//! [`FileStore`] mirrors browser key-value storage: a flat JSON object of
//! string keys to string values, with the session kept as a JSON string
//! under its own key.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

pub const TOKEN_KEY: &str = "foolder_token";
pub const SESSION_KEY: &str = "foolder_session";
pub const BACKEND_URL_KEY: &str = "foolder_backend_url";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("malformed storage file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Backend-issued session. Only `refresh_token` is interpreted; every other
/// field is carried through storage and pairing payloads untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Session {
    pub fn with_refresh_token(token: impl Into<String>) -> Self {
        Self { refresh_token: Some(token.into()), extra: Map::new() }
    }
}

/// An access token and the session it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub token: String,
    pub session: Session,
}

/// Snapshot of what is currently stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CredentialRecord {
    pub access_token: Option<String>,
    pub session: Option<Session>,
}

impl CredentialRecord {
    pub fn is_logged_in(&self) -> bool {
        self.access_token.is_some() && self.session.is_some()
    }

    /// Refresh token of the stored session, if any.
    pub fn refresh_token(&self) -> Option<&str> {
        self.session.as_ref()?.refresh_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Durable storage for the access token and session.
///
/// `set` and `clear` always touch both entries. Last writer wins.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Result<CredentialRecord, StoreError>;
    fn set(&self, token: &str, session: &Session) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// Process-local store, used by tests and embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    record: Mutex<CredentialRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(token: impl Into<String>, session: Session) -> Self {
        Self {
            record: Mutex::new(CredentialRecord {
                access_token: Some(token.into()),
                session: Some(session),
            }),
        }
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self) -> Result<CredentialRecord, StoreError> {
        Ok(self.record.lock().clone())
    }

    fn set(&self, token: &str, session: &Session) -> Result<(), StoreError> {
        *self.record.lock() =
            CredentialRecord { access_token: Some(token.to_owned()), session: Some(session.clone()) };
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.record.lock() = CredentialRecord::default();
        Ok(())
    }
}

type Entries = BTreeMap<String, String>;

/// JSON-file key-value store with atomic writes.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persisted backend URL override.
    pub fn backend_url(&self) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(BACKEND_URL_KEY).filter(|u| !u.trim().is_empty()))
    }

    pub fn set_backend_url(&self, url: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.insert(BACKEND_URL_KEY.to_owned(), url.to_owned());
        })
    }

    pub fn clear_backend_url(&self) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.remove(BACKEND_URL_KEY);
        })
    }

    fn load(&self) -> Result<Entries, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(Entries::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn update(&self, f: impl FnOnce(&mut Entries)) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        let mut entries = self.load()?;
        f(&mut entries);
        self.save(&entries)
    }

    /// Write tmp + rename, unique tmp name per process and call.
    fn save(&self, entries: &Entries) -> Result<(), StoreError> {
        use std::sync::atomic::{AtomicU32, Ordering};
        static COUNTER: AtomicU32 = AtomicU32::new(0);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp_name = format!(
            "{}.{}.{}.tmp",
            self.path.file_name().unwrap_or_default().to_string_lossy(),
            std::process::id(),
            seq,
        );
        let tmp_path = self.path.with_file_name(tmp_name);
        std::fs::write(&tmp_path, json)?;
        if let Err(e) = std::fs::rename(&tmp_path, &self.path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }
}

impl CredentialStore for FileStore {
    fn get(&self) -> Result<CredentialRecord, StoreError> {
        let mut entries = self.load()?;
        let session = entries.remove(SESSION_KEY).and_then(|raw| {
            match serde_json::from_str::<Session>(&raw) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!(path = %self.path.display(), err = %e, "ignoring unreadable stored session");
                    None
                }
            }
        });
        Ok(CredentialRecord { access_token: entries.remove(TOKEN_KEY), session })
    }

    fn set(&self, token: &str, session: &Session) -> Result<(), StoreError> {
        let session_json = serde_json::to_string(session)?;
        self.update(|entries| {
            entries.insert(TOKEN_KEY.to_owned(), token.to_owned());
            entries.insert(SESSION_KEY.to_owned(), session_json);
        })
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.remove(TOKEN_KEY);
            entries.remove(SESSION_KEY);
        })
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
