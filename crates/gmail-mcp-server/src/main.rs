use clap::Parser;
use gmail_mcp_server::cli::{dispatch, Cli};
use gmail_mcp_server::logging::{self, LogFormat};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    logging::init(LogFormat::from_env());
    let cli = Cli::parse();
    if let Err(e) = dispatch(cli).await {
        eprintln!("fatal: {e:?}");
        std::process::exit(1);
    }
}
