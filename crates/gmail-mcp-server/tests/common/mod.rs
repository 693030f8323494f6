#![allow(dead_code)]

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use gmail_mcp_core::GmailClient;
use gmail_mcp_server::auth::{AuthenticatedSession, Session};
use gmail_mcp_server::{ServerConfig, ToolDispatcher};
use tempfile::TempDir;
use wiremock::MockServer;

pub const API_PREFIX: &str = "/gmail/v1/users/me";

pub fn api_path(rest: &str) -> String {
    format!("{}/{}", API_PREFIX, rest)
}

pub fn b64(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn test_config(tmp: &TempDir, server: &MockServer) -> ServerConfig {
    let mut cfg = ServerConfig::for_dir(tmp.path());
    cfg.gmail_api_base = format!("{}{}", server.uri(), API_PREFIX);
    cfg.spam.batch_pause_ms = 0;
    cfg
}

/// Dispatcher with a live session pointed at the mock server.
pub fn authed_dispatcher(cfg: ServerConfig) -> ToolDispatcher {
    let client = GmailClient::with_base_url(&cfg.gmail_api_base, "test-token").unwrap();
    let session = Session::Authenticated(AuthenticatedSession::new(client, None));
    ToolDispatcher::with_session(cfg, session).unwrap()
}

pub fn read_audit(cfg: &ServerConfig) -> String {
    std::fs::read_to_string(cfg.audit_log_path()).unwrap_or_default()
}
