use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

use icsrelay::config::Config;
use icsrelay::state::AppState;
use icsrelay::telemetry;

#[derive(Parser)]
#[command(name = "icsrelay")]
#[command(about = "Serve cleaned copies of an allow-listed calendar export", version)]
struct Cli {
    /// Config file (default: ~/.config/icsrelay/config.toml)
    #[arg(short, long, env = "ICSRELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the config file
    #[arg(short, long, env = "ICSRELAY_LISTEN")]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(listen) = cli.listen {
        config.listen = listen;
    }

    let state = AppState::from_config(&config)?;

    let listener = TcpListener::bind(config.listen).await?;
    tracing::info!(
        allowed = %format!("{}://{}{}", state.policy.scheme, state.policy.authority, state.policy.path),
        "icsrelay listening on http://{}",
        config.listen
    );

    icsrelay::serve(listener, state).await
}
