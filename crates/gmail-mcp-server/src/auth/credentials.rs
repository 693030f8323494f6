use super::AuthError;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::path::Path;

/// OAuth client id/secret as downloaded from the Google Cloud console.
/// Accepts the `installed` and `web` wrappers as well as a flat object.
#[derive(Clone, Deserialize)]
pub struct OAuthClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

impl fmt::Debug for OAuthClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("redirect_uris", &self.redirect_uris)
            .finish()
    }
}

impl OAuthClientCredentials {
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let v: Value = serde_json::from_str(content)?;
        let inner = v
            .get("installed")
            .or_else(|| v.get("web"))
            .cloned()
            .unwrap_or(v);
        serde_json::from_value(inner)
    }

    pub fn load(path: &Path) -> Result<Self, AuthError> {
        if !path.exists() {
            return Err(AuthError::CredentialsMissing(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| AuthError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|e| AuthError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
