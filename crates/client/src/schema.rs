// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Response and request bodies for each backend endpoint.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::store::{Credentials, Session};

/// Token/session pair returned by login, registration, refresh and
/// credential-based pairing. Either half may be missing on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GrantResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub session: Option<Session>,
}

impl GrantResponse {
    /// Both halves, or nothing. A partial grant is never usable.
    pub fn into_credentials(self) -> Option<Credentials> {
        match (self.token, self.session) {
            (Some(token), Some(session)) if !token.is_empty() => Some(Credentials { token, session }),
            _ => None,
        }
    }
}

/// Identifier that the backend may encode as a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Ids typed by a user stay verbatim; `007` is not `7`.
impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// `GET /me`
#[derive(Debug, Clone, Deserialize)]
pub struct MeResponse {
    pub user: UserProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl UserProfile {
    /// Name to show for the signed-in account.
    pub fn display_name(&self) -> &str {
        self.email.as_deref().or(self.username.as_deref()).unwrap_or("user")
    }
}

/// `GET /auth/qr-code/{code}`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeLookup {
    #[serde(default)]
    pub session_id: Option<String>,
}

/// An addon or IPTV source attached to the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub id: RecordId,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub enabled: bool,
}

/// Body for creating or updating a [`SourceEntry`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceDraft {
    pub name: String,
    pub url: String,
    pub enabled: bool,
}

/// `GET /user/addons`
#[derive(Debug, Clone, Deserialize)]
pub struct AddonList {
    pub addons: Vec<SourceEntry>,
}

/// `GET /user/iptv`
#[derive(Debug, Clone, Deserialize)]
pub struct IptvList {
    #[serde(rename = "iptvUrls", alias = "iptv")]
    pub iptv_urls: Vec<SourceEntry>,
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
