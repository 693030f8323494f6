use super::credentials::OAuthClientCredentials;
use super::AuthError;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// Access tokens are treated as expired this long before their real expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

impl OAuthToken {
    /// Unknown expiry counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(exp) => now >= exp - Duration::seconds(EXPIRY_MARGIN_SECS),
            None => true,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// First four characters, then `***`.
pub fn mask_token(token: &str) -> String {
    match token.char_indices().nth(4) {
        Some((idx, _)) => format!("{}***", &token[..idx]),
        None => "***".to_string(),
    }
}

impl fmt::Display for OAuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OAuthToken(access={}, refresh={}, expires_at={:?})",
            mask_token(&self.access_token),
            self.refresh_token.as_deref().map(mask_token).unwrap_or_default(),
            self.expires_at
        )
    }
}

impl fmt::Debug for OAuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// `token.json` on disk, written owner-only on unix.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<OAuthToken, AuthError> {
        if !self.path.exists() {
            return Err(AuthError::TokenMissing(self.path.clone()));
        }
        let content = std::fs::read_to_string(&self.path).map_err(|source| AuthError::Io {
            path: self.path.clone(),
            source,
        })?;
        let token: OAuthToken = serde_json::from_str(&content).map_err(|e| AuthError::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %self.path.display(), expires_at = ?token.expires_at, "loaded token");
        Ok(token)
    }

    pub fn save(&self, token: &OAuthToken) -> Result<(), AuthError> {
        let io_err = |source| AuthError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let content = serde_json::to_string_pretty(token).map_err(|e| AuthError::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&self.path, content).map_err(io_err)?;
        restrict_permissions(&self.path).map_err(io_err)?;
        tracing::debug!(path = %self.path.display(), "saved token");
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
    scope: Option<String>,
    token_type: Option<String>,
}

impl TokenResponse {
    /// Google only returns a refresh token on the first grant; keep the
    /// previous one otherwise.
    fn into_token(self, previous_refresh: Option<&str>) -> OAuthToken {
        OAuthToken {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .or_else(|| previous_refresh.map(str::to_string)),
            expires_at: Some(Utc::now() + Duration::seconds(self.expires_in.unwrap_or(3600))),
            scope: self.scope,
            token_type: self.token_type,
        }
    }
}

async fn token_request(
    http: &Client,
    token_uri: &str,
    form: &[(&str, &str)],
) -> Result<TokenResponse, AuthError> {
    let resp = http.post(token_uri).form(form).send().await?;
    let status = resp.status();
    let body: Value = resp.json().await.unwrap_or(Value::Null);
    if !status.is_success() {
        let reason = body
            .get("error_description")
            .and_then(Value::as_str)
            .or_else(|| body.get("error").and_then(Value::as_str))
            .unwrap_or("unknown error");
        tracing::warn!(event = "token_request_failed", status = status.as_u16(), %reason);
        return Err(AuthError::TokenEndpoint(format!("{} ({})", reason, status.as_u16())));
    }
    serde_json::from_value(body)
        .map_err(|e| AuthError::TokenEndpoint(format!("unexpected token response: {}", e)))
}

pub async fn refresh_access_token(
    http: &Client,
    token_uri: &str,
    creds: &OAuthClientCredentials,
    refresh_token: &str,
) -> Result<OAuthToken, AuthError> {
    tracing::info!(event = "token_refresh", uri = %token_uri);
    let resp = token_request(
        http,
        token_uri,
        &[
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ],
    )
    .await?;
    Ok(resp.into_token(Some(refresh_token)))
}
