// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client for the Foolder account backend: credential storage, authenticated
//! requests with token refresh, and TV device linking.

pub mod account;
pub mod api;
pub mod auth;
pub mod command;
pub mod config;
pub mod error;
pub mod link;
pub mod navigation;
pub mod refresh;
pub mod schema;
pub mod store;

pub use api::{ApiClient, ApiRequest};
pub use config::ClientConfig;
pub use error::{ClientError, ErrorKind, FormatHint};
pub use link::DeepLink;
pub use navigation::AuthState;
pub use store::{CredentialRecord, CredentialStore, Credentials, FileStore, MemoryStore, Session};
