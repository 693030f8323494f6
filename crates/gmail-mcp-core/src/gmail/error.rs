use thiserror::Error;

#[derive(Debug, Error)]
pub enum GmailError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid base URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("could not decode message data: {0}")]
    Decode(String),
}

impl GmailError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GmailError::Api { status, .. } => Some(*status),
            GmailError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
