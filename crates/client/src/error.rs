// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// Why a response body could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatHint {
    /// The body looks like an HTML document, usually a misconfigured backend URL.
    Html,
    /// The body is not JSON at all.
    InvalidJson,
    /// The body is JSON but does not match the endpoint's schema.
    Schema(String),
}

impl FormatHint {
    /// Classify an unparsable body.
    pub fn for_body(body: &str) -> Self {
        if body.trim_start().starts_with('<') {
            Self::Html
        } else {
            Self::InvalidJson
        }
    }
}

impl fmt::Display for FormatHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Html => f.write_str("server returned HTML; check the backend URL configuration"),
            Self::InvalidJson => f.write_str("invalid JSON response from server"),
            Self::Schema(detail) => write!(f, "unexpected response shape: {detail}"),
        }
    }
}

/// Errors surfaced by the client library.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ClientError {
    #[error("{0}")]
    ResponseFormat(FormatHint),
    #[error("{message}")]
    Api { status: u16, message: String },
    /// Unrecoverable 401. The credential store has already been cleared.
    #[error("authentication required: {message}")]
    AuthenticationRequired { message: String },
    #[error("invalid code")]
    InvalidCode,
    #[error("{0}")]
    Validation(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("credential store: {0}")]
    Store(#[from] StoreError),
}

impl ClientError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn schema(detail: impl fmt::Display) -> Self {
        Self::ResponseFormat(FormatHint::Schema(detail.to_string()))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ResponseFormat(_) => ErrorKind::ResponseFormat,
            Self::Api { .. } => ErrorKind::Api,
            Self::AuthenticationRequired { .. } => ErrorKind::AuthenticationRequired,
            Self::InvalidCode => ErrorKind::InvalidCode,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Network(_) => ErrorKind::Network,
            Self::Store(_) => ErrorKind::Store,
        }
    }

    /// HTTP status of a backend error response, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Stable error codes, shared by the library and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    ResponseFormat,
    Api,
    AuthenticationRequired,
    InvalidCode,
    Validation,
    Network,
    Store,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResponseFormat => "RESPONSE_FORMAT",
            Self::Api => "API_ERROR",
            Self::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            Self::InvalidCode => "INVALID_CODE",
            Self::Validation => "VALIDATION",
            Self::Network => "NETWORK",
            Self::Store => "STORE",
        }
    }

    /// Process exit code used by the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation => 2,
            Self::AuthenticationRequired => 3,
            Self::InvalidCode => 4,
            Self::Api => 5,
            Self::ResponseFormat => 6,
            Self::Network => 7,
            Self::Store => 8,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
