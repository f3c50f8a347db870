// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authenticated request execution.
//!
//! Every backend call goes through [`ApiClient::execute`]: it attaches the
//! stored bearer token, parses the body, and on a 401 refreshes the token and
//! retries exactly once before clearing the store.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, FormatHint};
use crate::refresh::TokenRefresher;
use crate::store::CredentialStore;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the shared HTTP client.
pub fn http_client(timeout: Duration) -> reqwest::Client {
    // Already installed is fine.
    let _ = rustls::crypto::ring::default_provider().install_default();
    reqwest::Client::builder().timeout(timeout).build().unwrap_or_default()
}

/// A single backend call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    body: Option<Value>,
    headers: HeaderMap,
    bearer: bool,
    refresh: bool,
    session_field: Option<&'static str>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: HeaderMap::new(),
            bearer: true,
            refresh: true,
            session_field: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// JSON request body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Extra header. Overrides the default `Content-Type`.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Credential exchange: no bearer token, and a 401 is an ordinary
    /// [`ClientError::Api`] rather than a lost session.
    pub fn anonymous(mut self) -> Self {
        self.bearer = false;
        self.refresh = false;
        self
    }

    /// Put the stored session into the JSON body under `field`. It is read
    /// on every send, so a retry after refresh carries the new session.
    pub fn with_stored_session(mut self, field: &'static str) -> Self {
        self.session_field = Some(field);
        self
    }

    /// Send the bearer token but never refresh on 401.
    pub fn no_refresh(mut self) -> Self {
        self.refresh = false;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

struct Reply {
    status: StatusCode,
    text: String,
}

/// HTTP client for the backend API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn CredentialStore>,
    refresher: Option<TokenRefresher>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, store: Arc<dyn CredentialStore>) -> Self {
        Self::with_http_client(http_client(DEFAULT_TIMEOUT), base_url, store)
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    pub fn with_http_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        let refresher = TokenRefresher::new(http.clone(), &base_url, Arc::clone(&store));
        Self { http, base_url, store, refresher: Some(refresher) }
    }

    /// Build from configuration. `persisted_backend` is the stored URL override.
    pub fn from_config(
        config: &ClientConfig,
        store: Arc<dyn CredentialStore>,
        persisted_backend: Option<&str>,
    ) -> Self {
        let client = Self::with_http_client(
            http_client(config.timeout()),
            config.resolve_backend_url(persisted_backend),
            store,
        );
        if config.no_refresh {
            client.without_refresh()
        } else {
            client
        }
    }

    /// Drop the refresh coordinator: every 401 ends the session.
    pub fn without_refresh(mut self) -> Self {
        self.refresher = None;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Refresh the stored credentials now. False when refresh is disabled or fails.
    pub async fn refresh(&self) -> bool {
        match self.refresher {
            Some(ref refresher) => refresher.refresh().await,
            None => false,
        }
    }

    /// Execute a request and decode the body into `T`.
    pub async fn request<T: DeserializeOwned>(&self, req: ApiRequest) -> Result<T, ClientError> {
        let body = self.execute(&req).await?;
        decode(body)
    }

    /// Execute a request and return the parsed JSON body.
    ///
    /// An empty body parses as `{}`.
    pub async fn execute(&self, req: &ApiRequest) -> Result<Value, ClientError> {
        let token = if req.bearer { self.store.get()?.access_token } else { None };

        let reply = self.send(req, token.as_deref()).await?;
        if reply.status.is_success() {
            return parse_body(&reply.text);
        }

        if reply.status != StatusCode::UNAUTHORIZED || !req.bearer {
            let body = parse_body(&reply.text)?;
            return Err(ClientError::Api {
                status: reply.status.as_u16(),
                message: error_message(reply.status, &body),
            });
        }

        // The body of a rejected request is only used for its message.
        let message = parse_body(&reply.text)
            .map(|body| error_message(reply.status, &body))
            .unwrap_or_else(|_| format!("HTTP {}", reply.status.as_u16()));

        if let Some(refresher) = self.refresher.as_ref().filter(|_| req.refresh) {
            if let Some(fresh) = refresher.refresh_after(token.as_deref()).await {
                match self.send(req, Some(&fresh)).await {
                    Ok(retry) if retry.status.is_success() => return parse_body(&retry.text),
                    Ok(retry) => {
                        debug!(path = %req.path, status = retry.status.as_u16(), "retry after refresh rejected");
                    }
                    Err(e) => debug!(path = %req.path, err = %e, "retry after refresh failed"),
                }
            }
        }

        self.sign_out_locally();
        Err(ClientError::AuthenticationRequired { message })
    }

    pub(crate) fn sign_out_locally(&self) {
        match self.store.clear() {
            Ok(()) => info!("stored credentials cleared"),
            Err(e) => warn!(err = %e, "failed to clear stored credentials"),
        }
    }

    fn headers_for(&self, req: &ApiRequest, token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &req.headers {
            headers.insert(name.clone(), value.clone());
        }
        if let Some(token) = token {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("stored access token is not a valid header value"),
            }
        }
        headers
    }

    fn body_for(&self, req: &ApiRequest) -> Result<Option<Value>, ClientError> {
        let Some(field) = req.session_field else {
            return Ok(req.body.clone());
        };
        let session = self.store.get()?.session.ok_or_else(|| {
            ClientError::AuthenticationRequired {
                message: "session missing, please sign in again".to_owned(),
            }
        })?;
        let mut body = match req.body.clone() {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        body.insert(field.to_owned(), serde_json::to_value(&session).map_err(ClientError::schema)?);
        Ok(Some(Value::Object(body)))
    }

    async fn send(&self, req: &ApiRequest, token: Option<&str>) -> Result<Reply, ClientError> {
        let url = format!("{}{}", self.base_url, req.path);
        let mut builder =
            self.http.request(req.method.clone(), &url).headers(self.headers_for(req, token));
        if let Some(body) = self.body_for(req)? {
            builder = builder.body(body.to_string());
        }
        let resp = builder.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        debug!(method = %req.method, path = %req.path, status = status.as_u16(), "api request");
        Ok(Reply { status, text })
    }
}

/// Parse a response body. Empty means `{}`.
pub fn parse_body(text: &str) -> Result<Value, ClientError> {
    if text.is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_str(text).map_err(|_| ClientError::ResponseFormat(FormatHint::for_body(text)))
}

/// `error` field of an error body, else `HTTP <status>`.
fn error_message(status: StatusCode, body: &Value) -> String {
    body.get("error")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

pub(crate) fn decode<T: DeserializeOwned>(body: Value) -> Result<T, ClientError> {
    serde_json::from_value(body).map_err(ClientError::schema)
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
