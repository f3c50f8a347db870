// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Token refresh: exchange the stored refresh token for a new token/session pair.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::schema::GrantResponse;
use crate::store::{CredentialStore, Credentials};

pub const REFRESH_PATH: &str = "/auth/refresh";

/// Exchanges refresh tokens and stores the result.
///
/// Refreshes are serialized: a caller that queued behind another refresh and
/// finds the stored token already replaced reuses it instead of spending the
/// refresh token a second time.
pub struct TokenRefresher {
    http: reqwest::Client,
    url: String,
    store: Arc<dyn CredentialStore>,
    gate: Mutex<()>,
}

impl TokenRefresher {
    pub fn new(http: reqwest::Client, base_url: &str, store: Arc<dyn CredentialStore>) -> Self {
        Self { http, url: format!("{base_url}{REFRESH_PATH}"), store, gate: Mutex::new(()) }
    }

    /// Refresh unconditionally. Returns true when new credentials were stored.
    pub async fn refresh(&self) -> bool {
        self.refresh_after(None).await.is_some()
    }

    /// Refresh because `stale` was rejected. Returns the access token to retry with.
    pub(crate) async fn refresh_after(&self, stale: Option<&str>) -> Option<String> {
        let _guard = self.gate.lock().await;

        let record = match self.store.get() {
            Ok(record) => record,
            Err(e) => {
                warn!(err = %e, "cannot read credentials for refresh");
                return None;
            }
        };

        if let (Some(stale), Some(current)) = (stale, record.access_token.as_deref()) {
            if stale != current {
                debug!("token already refreshed by a concurrent request");
                return Some(current.to_owned());
            }
        }

        let refresh_token = match record.refresh_token() {
            Some(token) => token.to_owned(),
            None => {
                debug!("no refresh token stored, skipping refresh");
                return None;
            }
        };

        let creds = match self.exchange(&refresh_token).await {
            Ok(creds) => creds,
            Err(e) => {
                warn!(err = %e, "token refresh failed");
                return None;
            }
        };

        if let Err(e) = self.store.set(&creds.token, &creds.session) {
            warn!(err = %e, "cannot persist refreshed credentials");
            return None;
        }
        info!("access token refreshed");
        Some(creds.token)
    }

    async fn exchange(&self, refresh_token: &str) -> anyhow::Result<Credentials> {
        let resp = self
            .http
            .post(&self.url)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            anyhow::bail!("refresh rejected ({status})");
        }

        let grant: GrantResponse = resp.json().await?;
        grant
            .into_credentials()
            .ok_or_else(|| anyhow::anyhow!("refresh response missing token or session"))
    }
}
