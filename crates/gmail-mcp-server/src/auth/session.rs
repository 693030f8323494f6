//! The authenticated mail-client handle, as an explicit two-state session.

use super::credentials::OAuthClientCredentials;
use super::token::{refresh_access_token, TokenStore};
use super::AuthError;
use crate::config::ServerConfig;
use chrono::{DateTime, Duration, Utc};
use gmail_mcp_core::{GmailClient, ToolError};
use reqwest::Client;
use std::path::PathBuf;

/// Turns the credentials and token on disk into a live client. The files are
/// re-read on every attempt.
#[derive(Debug, Clone)]
pub struct Authenticator {
    http: Client,
    credentials_path: PathBuf,
    tokens: TokenStore,
    token_uri: String,
    api_base: String,
}

impl Authenticator {
    pub fn from_config(cfg: &ServerConfig) -> Result<Self, AuthError> {
        Ok(Self {
            http: Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .user_agent(concat!("gmail-mcp/", env!("CARGO_PKG_VERSION")))
                .redirect(reqwest::redirect::Policy::none())
                .build()?,
            credentials_path: cfg.credentials_path(),
            tokens: TokenStore::new(cfg.token_path()),
            token_uri: cfg.oauth_token_uri.clone(),
            api_base: cfg.gmail_api_base.clone(),
        })
    }

    pub async fn authenticate(&self) -> Result<AuthenticatedSession, AuthError> {
        let creds = OAuthClientCredentials::load(&self.credentials_path)?;
        let mut token = self.tokens.load()?;

        if token.is_expired() {
            let refresh = token.refresh_token.clone().ok_or_else(|| {
                AuthError::TokenEndpoint("access token expired and no refresh token stored".into())
            })?;
            token = refresh_access_token(&self.http, &self.token_uri, &creds, &refresh).await?;
            self.tokens.save(&token)?;
        }

        tracing::info!(event = "authenticated", expires_at = ?token.expires_at);
        let client = GmailClient::with_base_url(&self.api_base, token.access_token.clone())?;
        Ok(AuthenticatedSession::new(client, token.expires_at))
    }
}

#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    client: GmailClient,
    expires_at: Option<DateTime<Utc>>,
}

impl AuthenticatedSession {
    /// `expires_at: None` never expires (externally managed tokens).
    pub fn new(client: GmailClient, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { client, expires_at }
    }

    pub fn client(&self) -> &GmailClient {
        &self.client
    }

    fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|exp| Utc::now() >= exp - Duration::seconds(60))
    }
}

#[derive(Debug, Default)]
pub enum Session {
    #[default]
    Unauthenticated,
    Authenticated(AuthenticatedSession),
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }

    /// Returns the client, authenticating first when there is none or its
    /// access token has expired. A failed attempt leaves the session
    /// unauthenticated.
    pub async fn ensure(&mut self, auth: &Authenticator) -> Result<&GmailClient, ToolError> {
        let needs_auth = match self {
            Session::Authenticated(s) => s.is_expired(),
            Session::Unauthenticated => true,
        };

        if needs_auth {
            match auth.authenticate().await {
                Ok(s) => *self = Session::Authenticated(s),
                Err(e) => {
                    tracing::warn!(event = "authentication_failed", error = %e);
                    *self = Session::Unauthenticated;
                    return Err(ToolError::AuthRequired(e.to_string()));
                }
            }
        }

        match self {
            Session::Authenticated(s) => Ok(&s.client),
            Session::Unauthenticated => Err(ToolError::AuthRequired("not authenticated".into())),
        }
    }
}
