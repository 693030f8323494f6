pub mod credentials;
pub mod flow;
pub mod session;
pub mod token;

pub use credentials::OAuthClientCredentials;
pub use session::{AuthenticatedSession, Authenticator, Session};
pub use token::{mask_token, OAuthToken, TokenStore};

use gmail_mcp_core::GmailError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("OAuth client credentials not found at {0}")]
    CredentialsMissing(PathBuf),

    #[error("no stored token at {0}")]
    TokenMissing(PathBuf),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("token request failed: {0}")]
    TokenEndpoint(String),

    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("could not build Gmail client: {0}")]
    Client(#[from] GmailError),
}
