// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Media sources attached to the account: addons and IPTV playlists.

use serde_json::json;
use tracing::{debug, info};

use crate::api::{decode, ApiClient, ApiRequest};
use crate::error::ClientError;
use crate::schema::{AddonList, IptvList, RecordId, SourceDraft, SourceEntry};

/// Which collection a source belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Addon,
    Iptv,
}

impl SourceKind {
    /// Collection path on the backend.
    pub fn collection(self) -> &'static str {
        match self {
            Self::Addon => "/user/addons",
            Self::Iptv => "/user/iptv",
        }
    }

    fn item(self, id: &RecordId) -> String {
        format!("{}/{}", self.collection(), urlencoding::encode(&id.to_string()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Addon => "addon",
            Self::Iptv => "iptv",
        }
    }
}

impl SourceDraft {
    /// Trimmed copy. Name and URL are both required.
    pub fn normalized(&self) -> Result<SourceDraft, ClientError> {
        let name = self.name.trim();
        let url = self.url.trim();
        if name.is_empty() || url.is_empty() {
            return Err(ClientError::validation("please fill in all fields"));
        }
        Ok(SourceDraft { name: name.to_owned(), url: url.to_owned(), enabled: self.enabled })
    }
}

impl ApiClient {
    /// List sources of `kind`. A 404 means the account has none yet.
    pub async fn sources(&self, kind: SourceKind) -> Result<Vec<SourceEntry>, ClientError> {
        let body = match self.execute(&ApiRequest::get(kind.collection())).await {
            Err(ClientError::Api { status: 404, .. }) => {
                debug!(kind = kind.as_str(), "source list not found, treating as empty");
                return Ok(Vec::new());
            }
            other => other?,
        };
        match kind {
            SourceKind::Addon => decode::<AddonList>(body).map(|list| list.addons),
            SourceKind::Iptv => decode::<IptvList>(body).map(|list| list.iptv_urls),
        }
    }

    pub async fn addons(&self) -> Result<Vec<SourceEntry>, ClientError> {
        self.sources(SourceKind::Addon).await
    }

    pub async fn iptv_sources(&self) -> Result<Vec<SourceEntry>, ClientError> {
        self.sources(SourceKind::Iptv).await
    }

    /// Create a source, or update the one with `id`.
    pub async fn save_source(
        &self,
        kind: SourceKind,
        id: Option<&RecordId>,
        draft: &SourceDraft,
    ) -> Result<(), ClientError> {
        let draft = draft.normalized()?;
        let req = match id {
            Some(id) => ApiRequest::put(kind.item(id)),
            None => ApiRequest::post(kind.collection()),
        };
        let req =
            req.json(json!({ "name": draft.name, "url": draft.url, "enabled": draft.enabled }));
        self.execute(&req).await?;
        info!(kind = kind.as_str(), update = id.is_some(), "source saved");
        Ok(())
    }

    pub async fn delete_source(&self, kind: SourceKind, id: &RecordId) -> Result<(), ClientError> {
        self.execute(&ApiRequest::delete(kind.item(id))).await?;
        info!(kind = kind.as_str(), id = %id, "source deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "account_tests.rs"]
mod tests;
