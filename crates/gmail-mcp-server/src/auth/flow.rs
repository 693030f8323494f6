//! Interactive authorization for the `auth` subcommand. The consent round
//! trip (loopback redirect, code exchange) is driven by yup-oauth2; the
//! resulting token is written through [`StoreBackedTokens`] into the same
//! `token.json` the server reads.

use super::credentials::OAuthClientCredentials;
use super::token::{OAuthToken, TokenStore};
use crate::config::ServerConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use yup_oauth2::storage::{TokenInfo, TokenStorage};
use yup_oauth2::{ApplicationSecret, InstalledFlowAuthenticator, InstalledFlowReturnMethod};

pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/gmail.readonly",
    "https://www.googleapis.com/auth/gmail.send",
    "https://www.googleapis.com/auth/gmail.modify",
];

/// Client secret for the installed flow. The configured endpoints win over
/// whatever the credentials file names.
pub fn application_secret(
    cfg: &ServerConfig,
    creds: &OAuthClientCredentials,
) -> ApplicationSecret {
    ApplicationSecret {
        client_id: creds.client_id.clone(),
        client_secret: creds.client_secret.clone(),
        auth_uri: cfg.oauth_auth_uri.clone(),
        token_uri: cfg.oauth_token_uri.clone(),
        redirect_uris: creds.redirect_uris.clone(),
        ..Default::default()
    }
}

/// yup-oauth2 storage that persists into our [`TokenStore`].
pub struct StoreBackedTokens {
    store: TokenStore,
}

impl StoreBackedTokens {
    pub fn new(store: TokenStore) -> Self {
        Self { store }
    }

    /// Google omits the refresh token on repeat consents; the stored one is
    /// kept in that case.
    pub fn to_oauth_token(&self, info: TokenInfo) -> Option<OAuthToken> {
        let access_token = info.access_token?;
        let refresh_token = info
            .refresh_token
            .or_else(|| self.store.load().ok().and_then(|t| t.refresh_token));
        Some(OAuthToken {
            access_token,
            refresh_token,
            expires_at: info
                .expires_at
                .and_then(|t| DateTime::<Utc>::from_timestamp(t.unix_timestamp(), 0)),
            scope: Some(SCOPES.join(" ")),
            token_type: Some("Bearer".to_string()),
        })
    }
}

#[async_trait]
impl TokenStorage for StoreBackedTokens {
    async fn set(&self, _scopes: &[&str], token: TokenInfo) -> anyhow::Result<()> {
        let token = self
            .to_oauth_token(token)
            .context("token response carried no access token")?;
        self.store.save(&token)?;
        tracing::info!(event = "auth_flow_complete", token = %token, path = %self.store.path().display());
        Ok(())
    }

    // Running `auth` always asks for fresh consent.
    async fn get(&self, _scopes: &[&str]) -> Option<TokenInfo> {
        None
    }
}

pub async fn run(cfg: &ServerConfig, port: u16) -> Result<PathBuf> {
    let creds_path = cfg.credentials_path();
    let creds = OAuthClientCredentials::load(&creds_path).with_context(|| {
        format!(
            "place the OAuth client JSON from the Google Cloud console at {}",
            creds_path.display()
        )
    })?;

    let store = TokenStore::new(cfg.token_path());
    let path = store.path().to_path_buf();
    let auth = InstalledFlowAuthenticator::builder(
        application_secret(cfg, &creds),
        InstalledFlowReturnMethod::HTTPPortRedirect(port),
    )
    .with_storage(Box::new(StoreBackedTokens::new(store)))
    .build()
    .await
    .with_context(|| format!("cannot start the authorization flow on port {}", port))?;

    tracing::info!(event = "auth_flow_waiting", port);
    auth.token(SCOPES)
        .await
        .context("authorization did not complete")?;
    Ok(path)
}
