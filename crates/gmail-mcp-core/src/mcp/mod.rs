pub mod audit;
pub mod jsonrpc;
pub mod rate_limit;

pub use audit::{AuditLevel, AuditLog};
pub use jsonrpc::*;
pub use rate_limit::{RateLimitConfig, RateLimiter};
