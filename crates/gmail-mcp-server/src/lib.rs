//! Gmail tool server speaking MCP over stdio.

pub mod auth;
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod logging;
pub mod server;
pub mod tools;

pub use config::ServerConfig;
pub use dispatcher::ToolDispatcher;
pub use server::McpServer;
