// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `foolder` subcommands.

mod sources;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use reqwest::Url;

use crate::api::ApiClient;
use crate::auth::{PasswordChange, Registration};
use crate::config::ClientConfig;
use crate::error::{ClientError, ErrorKind};
use crate::link::{DeepLink, LinkCredentials};
use crate::navigation::{login_redirect, AuthState};
use crate::store::{CredentialStore, FileStore};

pub use sources::SourceCommand;

#[derive(Parser)]
#[command(name = "foolder", version, about = "Foolder account and device-link client")]
pub struct Cli {
    #[command(flatten)]
    pub client: ClientConfig,

    /// Log filter (tracing EnvFilter syntax).
    #[arg(long, env = "FOOLDER_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Log format: text or json.
    #[arg(long, env = "FOOLDER_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sign in and store the issued credentials
    Login {
        email: String,
        #[arg(long, env = "FOOLDER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Register {
        email: String,
        #[arg(long, env = "FOOLDER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign out and forget stored credentials
    Logout,
    /// Show whether the backend accepts the stored credentials
    Status,
    /// Change the account password
    Passwd {
        /// Current password
        #[arg(long, env = "FOOLDER_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, env = "FOOLDER_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
        /// Repeat of the new password (defaults to --new-password)
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Link the TV showing CODE to this account
    Link { code: String },
    /// Finish a pairing carried in a page URL (?qr= or ?code=)
    Resume {
        url: String,
        /// Sign in with this email while linking, when signed out
        #[arg(long)]
        email: Option<String>,
        #[arg(long, env = "FOOLDER_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Create the account instead of signing in
        #[arg(long)]
        register: bool,
        /// Login page, relative to URL
        #[arg(long, default_value = "login.html")]
        login_page: String,
    },
    /// Manage stream addons
    Addons {
        #[command(subcommand)]
        action: SourceCommand,
    },
    /// Manage IPTV playlist URLs
    Iptv {
        #[command(subcommand)]
        action: SourceCommand,
    },
    /// Manage the persisted backend URL override
    Backend {
        #[command(subcommand)]
        action: BackendCommand,
    },
}

#[derive(Subcommand)]
pub enum BackendCommand {
    /// Print the backend URL in effect
    Show,
    /// Persist a backend URL override
    Set { url: String },
    /// Remove the persisted override
    Clear,
}

/// Run a parsed command line and return the process exit code.
pub async fn run(cli: Cli) -> i32 {
    match execute(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            e.kind().exit_code()
        }
    }
}

async fn execute(cli: Cli) -> Result<i32, ClientError> {
    let files = Arc::new(FileStore::new(cli.client.storage_path()));
    let persisted = files.backend_url()?;
    let store: Arc<dyn CredentialStore> = files.clone();
    let client = ApiClient::from_config(&cli.client, store, persisted.as_deref());

    match cli.command {
        Command::Login { email, password } => {
            client.login(&email, &password).await?;
            println!("Signed in as {}", email.trim());
        }

        Command::Register { email, password } => match client.register(&email, &password).await? {
            Registration::SignedIn(_) => println!("Account created. Signed in as {}", email.trim()),
            Registration::Created => println!("Account created. Sign in with `foolder login`."),
        },

        Command::Logout => {
            client.logout().await?;
            println!("Signed out");
        }

        Command::Status => match client.probe().await {
            AuthState::LoggedIn(user) => {
                println!("Signed in as {} ({})", user.display_name(), client.base_url());
            }
            AuthState::LoggedOut => {
                println!("Signed out ({})", client.base_url());
                return Ok(ErrorKind::AuthenticationRequired.exit_code());
            }
        },

        Command::Passwd { password, new_password, confirm } => {
            let change = PasswordChange {
                current: password,
                confirm: confirm.unwrap_or_else(|| new_password.clone()),
                new: new_password,
            };
            client.change_password(&change).await?;
            println!("Password changed");
        }

        Command::Link { code } => {
            let linked = client.link_code(&code).await?;
            println!("Device linked (session {})", linked.session_id);
        }

        Command::Resume { url, email, password, register, login_page } => {
            let credentials = email.map(|email| LinkCredentials {
                email,
                password: password.unwrap_or_default(),
                register,
            });
            let resumed = resume(&client, &url, credentials.as_ref(), &login_page).await?;
            println!("{}", resumed.url());
            return Ok(resumed.exit_code());
        }

        Command::Addons { action } => {
            sources::run(&client, crate::account::SourceKind::Addon, action).await?;
        }

        Command::Iptv { action } => {
            sources::run(&client, crate::account::SourceKind::Iptv, action).await?;
        }

        Command::Backend { action } => match action {
            BackendCommand::Show => println!("{}", client.base_url()),
            BackendCommand::Set { url } => {
                let parsed = Url::parse(url.trim())
                    .map_err(|e| ClientError::validation(format!("invalid backend URL: {e}")))?;
                files.set_backend_url(parsed.as_str().trim_end_matches('/'))?;
                println!("Backend set to {}", parsed.as_str().trim_end_matches('/'));
            }
            BackendCommand::Clear => {
                files.clear_backend_url()?;
                println!("Backend override cleared");
            }
        },
    }
    Ok(0)
}

/// Where a deep-linked page goes next.
#[derive(Debug, Clone, PartialEq)]
pub enum Resumed {
    /// The URL carried no pairing.
    Unchanged(Url),
    /// Linked; the URL without its pairing parameters.
    Linked(Url),
    /// Sign-in needed; the login page carrying the destination and the link.
    SignIn(Url),
}

impl Resumed {
    pub fn url(&self) -> &Url {
        match self {
            Self::Unchanged(url) | Self::Linked(url) | Self::SignIn(url) => url,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SignIn(_) => ErrorKind::AuthenticationRequired.exit_code(),
            Self::Unchanged(_) | Self::Linked(_) => 0,
        }
    }
}

/// Finish a deep-linked pairing found in `url`.
async fn resume(
    client: &ApiClient,
    url: &str,
    credentials: Option<&LinkCredentials>,
    login_page: &str,
) -> Result<Resumed, ClientError> {
    let current = Url::parse(url.trim())
        .map_err(|e| ClientError::validation(format!("invalid URL: {e}")))?;
    let Some(link) = DeepLink::from_url(&current) else {
        return Ok(Resumed::Unchanged(current));
    };

    match client.link_deep(&link, credentials).await {
        Ok(_) => Ok(Resumed::Linked(DeepLink::strip(&current))),
        Err(ClientError::AuthenticationRequired { .. }) => {
            let login = current
                .join(login_page)
                .map_err(|e| ClientError::validation(format!("invalid login page: {e}")))?;
            Ok(Resumed::SignIn(login_redirect(&login, current.path(), Some(&link))))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
