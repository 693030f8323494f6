use crate::gmail::GmailError;
use thiserror::Error;

/// Failure of a single tool call, as surfaced to the MCP client.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Rate limit exceeded: at most {limit} requests per {window_ms} ms, try again later")]
    RateLimited { limit: usize, window_ms: u64 },

    #[error("Authentication required: {0}. Run `gmail-mcp-server auth` to authorize access.")]
    AuthRequired(String),

    #[error("Invalid arguments: {0}")]
    Validation(String),

    #[error("Unknown tool: {0}")]
    UnsupportedTool(String),

    #[error("Gmail API error: {0}")]
    Api(#[from] GmailError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Stable machine-readable code, mirrored into `structuredContent`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => "E_RATE_LIMIT",
            Self::AuthRequired(_) => "E_AUTH_REQUIRED",
            Self::Validation(_) => "E_VALIDATION",
            Self::UnsupportedTool(_) => "E_UNSUPPORTED_TOOL",
            Self::Api(_) => "E_API",
            Self::Io(_) => "E_IO",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        })
    }
}

pub type ToolResult<T> = Result<T, ToolError>;
