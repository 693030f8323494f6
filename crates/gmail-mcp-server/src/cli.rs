use crate::config::ServerConfig;
use crate::dispatcher::ToolDispatcher;
use crate::server::McpServer;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::BufReader;

#[derive(Debug, Parser)]
#[command(
    name = "gmail-mcp-server",
    version,
    about = "Gmail tools for MCP clients over stdio"
)]
pub struct Cli {
    /// Directory holding credentials.json, token.json, audit.log and downloads/
    #[arg(long, global = true, env = "GMAIL_MCP_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Option<Command>,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Serve tool calls on stdin/stdout (default)
    Serve,
    /// Authorize Gmail access in the browser and store the token
    Auth {
        /// Loopback port for the OAuth redirect
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}

pub async fn dispatch(cli: Cli) -> Result<()> {
    let cfg = ServerConfig::load(cli.config_dir).context("loading configuration")?;
    match cli.cmd.unwrap_or(Command::Serve) {
        Command::Serve => serve(cfg).await,
        Command::Auth { port } => {
            let path = crate::auth::flow::run(&cfg, port).await?;
            eprintln!("Token saved to {}", path.display());
            Ok(())
        }
    }
}

async fn serve(cfg: ServerConfig) -> Result<()> {
    tracing::info!(
        event = "server_start",
        config_dir = %cfg.config_dir.display(),
        rate_limit = cfg.rate_limit.max_requests,
        window_ms = cfg.rate_limit.window_ms
    );
    let dispatcher = ToolDispatcher::new(cfg).context("initializing dispatcher")?;
    let mut server = McpServer::new(dispatcher);
    server
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
        .context("stdio transport failed")?;

    let failed = server.dispatcher().audit().failed_writes();
    if failed > 0 {
        tracing::warn!(event = "audit_failures", failed_writes = failed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_is_serve() {
        let cli = Cli::try_parse_from(["gmail-mcp-server"]).unwrap();
        assert_eq!(cli.cmd, None);

        let cli = Cli::try_parse_from(["gmail-mcp-server", "serve"]).unwrap();
        assert_eq!(cli.cmd, Some(Command::Serve));
    }

    #[test]
    fn test_auth_port() {
        let cli = Cli::try_parse_from(["gmail-mcp-server", "auth"]).unwrap();
        assert_eq!(cli.cmd, Some(Command::Auth { port: 3000 }));

        let cli = Cli::try_parse_from([
            "gmail-mcp-server",
            "auth",
            "--port",
            "8765",
            "--config-dir",
            "/tmp/gm",
        ])
        .unwrap();
        assert_eq!(cli.cmd, Some(Command::Auth { port: 8765 }));
        assert_eq!(cli.config_dir, Some(PathBuf::from("/tmp/gm")));
    }
}
