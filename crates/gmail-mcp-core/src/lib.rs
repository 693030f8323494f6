//! Core building blocks for the gmail-mcp tool server.
//!
//! Everything here is transport-agnostic: the Gmail REST client and its
//! resource types, MIME part walking, outgoing message composition, the
//! rate limiter, argument validation and the audit log. The server crate
//! wires these into a stdio MCP endpoint.

pub mod errors;
pub mod gmail;
pub mod mcp;
pub mod validate;

pub use errors::ToolError;
pub use gmail::{GmailClient, GmailError};
pub use mcp::audit::AuditLog;
pub use mcp::rate_limit::{RateLimitConfig, RateLimiter};
