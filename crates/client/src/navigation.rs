// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Auth state for UI consumption and redirects to the login flow.

use reqwest::Url;
use tracing::debug;

use crate::api::ApiClient;
use crate::link::DeepLink;
use crate::schema::UserProfile;

/// Query parameter carrying the page to return to after signing in.
pub const REDIRECT_PARAM: &str = "redirect";

/// Whether the backend still accepts the stored credentials.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    LoggedIn(UserProfile),
    LoggedOut,
}

impl AuthState {
    pub fn is_logged_in(&self) -> bool {
        matches!(self, Self::LoggedIn(_))
    }
}

impl ApiClient {
    /// Ask the backend who we are. Never fails: any error means logged out.
    pub async fn probe(&self) -> AuthState {
        match self.me().await {
            Ok(user) => AuthState::LoggedIn(user),
            Err(e) => {
                debug!(err = %e, "identity probe failed");
                AuthState::LoggedOut
            }
        }
    }

    /// Local predicate: a token and a session are both stored.
    pub fn is_logged_in(&self) -> bool {
        self.store().get().map(|record| record.is_logged_in()).unwrap_or(false)
    }
}

/// URL of the login page that resumes at `destination` and carries a pending
/// pairing along.
pub fn login_redirect(login_page: &Url, destination: &str, link: Option<&DeepLink>) -> Url {
    let mut url = login_page.clone();
    {
        let mut query = url.query_pairs_mut();
        if !destination.is_empty() {
            query.append_pair(REDIRECT_PARAM, destination);
        }
        if let Some(link) = link {
            let (name, value) = link.param();
            query.append_pair(name, value);
        }
    }
    if url.query() == Some("") {
        url.set_query(None);
    }
    url
}

/// Where to go after signing in: the preserved destination, else `fallback`.
pub fn resume_target(current: &Url, fallback: &str) -> String {
    current
        .query_pairs()
        .find(|(name, value)| name == REDIRECT_PARAM && !value.is_empty())
        .map(|(_, value)| value.into_owned())
        .unwrap_or_else(|| fallback.to_owned())
}

#[cfg(test)]
#[path = "navigation_tests.rs"]
mod tests;
