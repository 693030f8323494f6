//! Single entry point for tool calls: rate limit, session, audit, route.

use crate::auth::{AuthError, Authenticator, Session};
use crate::config::ServerConfig;
use crate::tools::{self, ToolContext, ToolName};
use gmail_mcp_core::errors::{ToolError, ToolResult};
use gmail_mcp_core::mcp::ToolDescriptor;
use gmail_mcp_core::{AuditLog, RateLimiter};
use serde_json::Value;

/// Every caller shares one rate window.
pub const GLOBAL_CLIENT_ID: &str = "global";

#[derive(Debug)]
pub struct ToolDispatcher {
    config: ServerConfig,
    limiter: RateLimiter,
    session: Session,
    authenticator: Authenticator,
    audit: AuditLog,
}

impl ToolDispatcher {
    pub fn new(config: ServerConfig) -> Result<Self, AuthError> {
        Self::with_session(config, Session::default())
    }

    /// Starts from an existing session instead of the unauthenticated state.
    pub fn with_session(config: ServerConfig, session: Session) -> Result<Self, AuthError> {
        Ok(Self {
            limiter: RateLimiter::new(config.rate_limit),
            authenticator: Authenticator::from_config(&config)?,
            audit: AuditLog::new(config.audit_log_path()),
            session,
            config,
        })
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        tools::tool_descriptors()
    }

    pub async fn call(&mut self, name: &str, args: &Value) -> ToolResult<Value> {
        // 1. Rate limit; a denial does no other work.
        if !self.limiter.allow(GLOBAL_CLIENT_ID) {
            let cfg = self.limiter.config();
            tracing::warn!(event = "rate_limited", tool = %name);
            return Err(ToolError::RateLimited {
                limit: cfg.max_requests,
                window_ms: cfg.window_ms,
            });
        }

        // 2. Session
        let client = self.session.ensure(&self.authenticator).await?;

        // 3. Pre-execution audit
        let args_json = serde_json::to_string(args).unwrap_or_default();
        self.audit
            .info(format!("Tool called: {} with args: {}", name, args_json));

        // 4. Route
        let ctx = ToolContext {
            client,
            config: &self.config,
            audit: &self.audit,
        };
        let result = match name.parse::<ToolName>() {
            Ok(tool) => tool.invoke(&ctx, args).await,
            Err(e) => Err(e),
        };

        // 5. Outcome
        match &result {
            Ok(_) => {
                tracing::info!(event = "tool_completed", tool = %name);
                self.audit.info(format!("Tool {} completed", name));
            }
            Err(e) => {
                tracing::warn!(event = "tool_failed", tool = %name, code = e.code(), error = %e);
                self.audit.error(format!("Tool {} failed: {}", name, e));
            }
        }
        result
    }
}
