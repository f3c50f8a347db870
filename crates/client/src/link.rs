// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Device linking: bind a code shown on a TV to this account.
//!
//! Two entry points. [`ApiClient::link_code`] takes a code the user typed;
//! [`ApiClient::link_deep`] finishes a pairing that arrived through a
//! QR-scanned URL, possibly after the user signed in. Completion is
//! idempotent per pairing session on the backend, so callers may retry.

use reqwest::Url;
use serde_json::json;
use tracing::info;

use crate::api::{ApiClient, ApiRequest};
use crate::auth::{login_fields, signup_fields};
use crate::error::ClientError;
use crate::schema::{CodeLookup, GrantResponse};
use crate::store::Credentials;

/// Query parameter holding a pairing session id.
pub const QR_SESSION_PARAM: &str = "qr";
/// Query parameter holding a human-enterable pairing code.
pub const CODE_PARAM: &str = "code";

/// A pairing request carried in a page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeepLink {
    /// The backend pairing session id itself.
    Session(String),
    /// A code that still needs resolving.
    Code(String),
}

impl DeepLink {
    /// Extract a pairing from `url`. A session id wins over a code.
    pub fn from_url(url: &Url) -> Option<Self> {
        let find = |param: &str| {
            url.query_pairs()
                .find(|(name, value)| name == param && !value.trim().is_empty())
                .map(|(_, value)| value.trim().to_owned())
        };
        find(QR_SESSION_PARAM).map(Self::Session).or_else(|| find(CODE_PARAM).map(Self::Code))
    }

    /// Query parameter name and value for propagating this link.
    pub fn param(&self) -> (&'static str, &str) {
        match self {
            Self::Session(id) => (QR_SESSION_PARAM, id.as_str()),
            Self::Code(code) => (CODE_PARAM, code.as_str()),
        }
    }

    /// `url` without any pairing parameters, for replacing the visible
    /// address once linking is done.
    pub fn strip(url: &Url) -> Url {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(name, _)| name != QR_SESSION_PARAM && name != CODE_PARAM)
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();
        let mut stripped = url.clone();
        if kept.is_empty() {
            stripped.set_query(None);
        } else {
            stripped.query_pairs_mut().clear().extend_pairs(kept);
        }
        stripped
    }
}

/// Email/password entered on the pairing page by a signed-out user.
#[derive(Debug, Clone)]
pub struct LinkCredentials {
    pub email: String,
    pub password: String,
    /// Create the account instead of signing in.
    pub register: bool,
}

/// A completed pairing.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkedDevice {
    pub session_id: String,
    /// Credentials issued to this client while completing with email/password.
    pub credentials: Option<Credentials>,
}

impl ApiClient {
    /// Link the device showing `code` to the signed-in account.
    pub async fn link_code(&self, code: &str) -> Result<LinkedDevice, ClientError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(ClientError::validation("enter the TV code shown on your device"));
        }
        self.require_session()?;
        let session_id = self.resolve_code(code).await?;
        self.complete_session(&session_id).await?;
        info!(session_id = %session_id, "device linked");
        Ok(LinkedDevice { session_id, credentials: None })
    }

    /// Finish a pairing that arrived through a page URL.
    ///
    /// Signed in: completes with the stored session. Signed out: completes with
    /// `credentials` if given, else fails with `AuthenticationRequired` so the
    /// caller can redirect to login carrying the link along.
    pub async fn link_deep(
        &self,
        link: &DeepLink,
        credentials: Option<&LinkCredentials>,
    ) -> Result<LinkedDevice, ClientError> {
        let signed_in = self.store().get()?.is_logged_in();

        let linked = match (signed_in, credentials) {
            (true, _) => {
                let session_id = self.session_id_for(link).await?;
                self.complete_session(&session_id).await?;
                LinkedDevice { session_id, credentials: None }
            }
            (false, Some(creds)) => {
                let session_id = self.session_id_for(link).await?;
                let issued = self.complete_with_credentials(&session_id, creds).await?;
                LinkedDevice { session_id, credentials: issued }
            }
            (false, None) => {
                return Err(ClientError::AuthenticationRequired {
                    message: "sign in to link this device".to_owned(),
                });
            }
        };
        info!(session_id = %linked.session_id, "device linked");
        Ok(linked)
    }

    async fn session_id_for(&self, link: &DeepLink) -> Result<String, ClientError> {
        match link {
            DeepLink::Session(id) => Ok(id.clone()),
            DeepLink::Code(code) => self.resolve_code(code).await,
        }
    }

    /// Resolve a displayed code to its pairing session id. Unknown codes
    /// (404 or no id in the answer) are [`ClientError::InvalidCode`].
    pub async fn resolve_code(&self, code: &str) -> Result<String, ClientError> {
        let path = format!("/auth/qr-code/{}", urlencoding::encode(code.trim()));
        let mut req = ApiRequest::get(path);
        if !self.is_logged_in() {
            req = req.anonymous();
        }
        let lookup: CodeLookup = match self.request(req).await {
            Err(ClientError::Api { status: 404, .. }) => return Err(ClientError::InvalidCode),
            other => other?,
        };
        lookup.session_id.filter(|id| !id.is_empty()).ok_or(ClientError::InvalidCode)
    }

    /// Complete a pairing with the stored session. Refresh and retry apply;
    /// the retry sends the session as stored after the refresh.
    pub async fn complete_session(&self, session_id: &str) -> Result<(), ClientError> {
        let path = format!("/auth/qr-session/{}/complete-session", urlencoding::encode(session_id));
        let req = ApiRequest::post(path).with_stored_session("session");
        self.execute(&req).await?;
        Ok(())
    }

    /// Complete a pairing by signing in (or registering) on this page.
    /// Stores the credentials the backend issues back, when complete.
    pub async fn complete_with_credentials(
        &self,
        session_id: &str,
        creds: &LinkCredentials,
    ) -> Result<Option<Credentials>, ClientError> {
        let (email, password) = if creds.register {
            signup_fields(&creds.email, &creds.password)?
        } else {
            login_fields(&creds.email, &creds.password)?
        };
        let path = format!("/auth/qr-session/{}/complete", urlencoding::encode(session_id));
        let req = ApiRequest::post(path)
            .json(json!({ "email": email, "password": password, "isRegister": creds.register }))
            .anonymous();
        let grant: GrantResponse = self.request(req).await?;
        let issued = grant.into_credentials();
        if let Some(ref c) = issued {
            self.store().set(&c.token, &c.session)?;
            info!("signed in while linking device");
        }
        Ok(issued)
    }

    fn require_session(&self) -> Result<(), ClientError> {
        if self.store().get()?.is_logged_in() {
            return Ok(());
        }
        Err(ClientError::AuthenticationRequired {
            message: "session missing, please sign in again".to_owned(),
        })
    }
}

#[cfg(test)]
#[path = "link_tests.rs"]
mod tests;
