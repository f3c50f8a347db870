// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Account credential operations: login, registration, logout, password change.

use serde_json::json;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiRequest};
use crate::error::ClientError;
use crate::schema::{GrantResponse, MeResponse, UserProfile};
use crate::store::Credentials;

/// Minimum password length accepted by the backend.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Outcome of a registration.
#[derive(Debug, Clone, PartialEq)]
pub enum Registration {
    /// The backend issued credentials; they are stored.
    SignedIn(Credentials),
    /// The account exists but the user still has to sign in.
    Created,
}

/// A password change request as entered by the user.
#[derive(Debug, Clone)]
pub struct PasswordChange {
    pub current: String,
    pub new: String,
    pub confirm: String,
}

impl PasswordChange {
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.current.is_empty() || self.new.is_empty() || self.confirm.is_empty() {
            return Err(ClientError::validation("please fill in all fields"));
        }
        if self.new != self.confirm {
            return Err(ClientError::validation("new passwords do not match"));
        }
        check_password_len(&self.new)
    }
}

/// Trimmed email plus password, both required.
pub(crate) fn login_fields<'a>(
    email: &'a str,
    password: &'a str,
) -> Result<(&'a str, &'a str), ClientError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(ClientError::validation("please enter email and password"));
    }
    Ok((email, password))
}

/// Login checks plus the registration rules.
pub(crate) fn signup_fields<'a>(
    email: &'a str,
    password: &'a str,
) -> Result<(&'a str, &'a str), ClientError> {
    let (email, password) = login_fields(email, password)?;
    if !email.contains('@') {
        return Err(ClientError::validation("please enter a valid email address"));
    }
    check_password_len(password)?;
    Ok((email, password))
}

fn check_password_len(password: &str) -> Result<(), ClientError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ClientError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

impl ApiClient {
    /// Sign in and store the issued credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<Credentials, ClientError> {
        let (email, password) = login_fields(email, password)?;
        let req = ApiRequest::post("/auth/login")
            .json(json!({ "email": email, "password": password }))
            .anonymous();
        let grant: GrantResponse = self.request(req).await?;
        let creds = grant
            .into_credentials()
            .ok_or_else(|| ClientError::schema("login response missing token or session"))?;
        self.store().set(&creds.token, &creds.session)?;
        info!("signed in");
        Ok(creds)
    }

    /// Create an account. Stores credentials when the backend issues a full pair.
    pub async fn register(&self, email: &str, password: &str) -> Result<Registration, ClientError> {
        let (email, password) = signup_fields(email, password)?;
        let req = ApiRequest::post("/auth/register")
            .json(json!({ "email": email, "password": password }))
            .anonymous();
        let grant: GrantResponse = self.request(req).await?;
        if grant.token.is_some() != grant.session.is_some() {
            warn!("registration returned partial credentials, not storing them");
        }
        match grant.into_credentials() {
            Some(creds) => {
                self.store().set(&creds.token, &creds.session)?;
                info!("account created and signed in");
                Ok(Registration::SignedIn(creds))
            }
            None => Ok(Registration::Created),
        }
    }

    /// Invalidate the server-side session (best effort) and clear local credentials.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let req = ApiRequest::post("/auth/logout").no_refresh();
        if let Err(e) = self.execute(&req).await {
            debug!(err = %e, "server-side logout failed, clearing locally anyway");
        }
        self.store().clear()?;
        info!("signed out");
        Ok(())
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<(), ClientError> {
        change.validate()?;
        let req = ApiRequest::post("/auth/change-password")
            .json(json!({ "currentPassword": change.current, "newPassword": change.new }));
        self.execute(&req).await?;
        Ok(())
    }

    /// Identity of the signed-in account.
    pub async fn me(&self) -> Result<UserProfile, ClientError> {
        let resp: MeResponse = self.request(ApiRequest::get("/me")).await?;
        Ok(resp.user)
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
