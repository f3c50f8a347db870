// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process fake of the account backend.
//!
//! Every request is recorded. Responses are queued per method and path; the
//! last queued response repeats. Unknown routes answer 404.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, Method, StatusCode, Uri};
use axum::Router;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpListener;

use foolder::api::http_client;
use foolder::store::{CredentialStore, MemoryStore, Session};
use foolder::ApiClient;

/// One request as the backend saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<Value>,
}

type RouteKey = (String, String);

#[derive(Debug, Clone, Default)]
struct Canned {
    status: u16,
    body: String,
    delay: Option<Duration>,
}

#[derive(Default)]
struct Inner {
    routes: Mutex<HashMap<RouteKey, VecDeque<Canned>>>,
    delays: Mutex<HashMap<RouteKey, Duration>>,
    log: Mutex<Vec<Recorded>>,
}

impl Inner {
    fn next_response(&self, key: &RouteKey) -> Canned {
        let mut routes = self.routes.lock();
        match routes.get_mut(key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_default(),
            Some(queue) => queue.front().cloned().unwrap_or_default(),
            None => Canned {
                status: 404,
                body: r#"{"error":"Not Found"}"#.to_owned(),
                delay: None,
            },
        }
    }
}

pub struct FakeBackend {
    inner: Arc<Inner>,
    url: String,
}

impl FakeBackend {
    pub async fn start() -> anyhow::Result<Self> {
        let inner = Arc::new(Inner::default());
        let app = Router::new().fallback(handle).with_state(Arc::clone(&inner));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self { inner, url: format!("http://{addr}") })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Queue a JSON response for `method path`.
    pub fn on(&self, method: &str, path: &str, status: u16, body: Value) -> &Self {
        self.on_raw(method, path, status, &body.to_string())
    }

    /// Queue a response with a verbatim body.
    pub fn on_raw(&self, method: &str, path: &str, status: u16, body: &str) -> &Self {
        self.push(method, path, Canned { status, body: body.to_owned(), delay: None })
    }

    /// Queue a JSON response that is held for `delay` before it is sent.
    pub fn on_slow(&self, method: &str, path: &str, status: u16, body: Value, delay: Duration) -> &Self {
        self.push(method, path, Canned { status, body: body.to_string(), delay: Some(delay) })
    }

    fn push(&self, method: &str, path: &str, canned: Canned) -> &Self {
        self.inner
            .routes
            .lock()
            .entry((method.to_owned(), path.to_owned()))
            .or_default()
            .push_back(canned);
        self
    }

    /// Hold every response on `method path` for `delay`.
    pub fn delay(&self, method: &str, path: &str, delay: Duration) -> &Self {
        self.inner.delays.lock().insert((method.to_owned(), path.to_owned()), delay);
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.inner.log.lock().clone()
    }

    /// Requests made to `path`, in order.
    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests().into_iter().filter(|r| r.path == path).collect()
    }

    /// Client for this backend with refresh enabled.
    pub fn client(&self, store: Arc<dyn CredentialStore>) -> ApiClient {
        self.client_with_timeout(store, Duration::from_secs(5))
    }

    /// Client whose transport gives up after `timeout`.
    pub fn client_with_timeout(&self, store: Arc<dyn CredentialStore>, timeout: Duration) -> ApiClient {
        ApiClient::with_http_client(http_client(timeout), self.url(), store)
    }
}

async fn handle(
    State(inner): State<Arc<Inner>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, [(HeaderName, &'static str); 1], String) {
    let header = |name: HeaderName| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_owned);
    let key = (method.as_str().to_owned(), uri.path().to_owned());

    inner.log.lock().push(Recorded {
        method: key.0.clone(),
        path: key.1.clone(),
        authorization: header(AUTHORIZATION),
        content_type: header(CONTENT_TYPE),
        body: serde_json::from_str(&body).ok(),
    });

    let canned = inner.next_response(&key);
    let delay = canned.delay.or_else(|| inner.delays.lock().get(&key).copied());
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    (
        StatusCode::from_u16(canned.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        [(CONTENT_TYPE, "application/json")],
        canned.body,
    )
}

/// Memory store holding `token` and a session with `refresh`.
pub fn signed_in(token: &str, refresh: &str) -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_credentials(token, Session::with_refresh_token(refresh)))
}
