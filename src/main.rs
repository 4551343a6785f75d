use std::sync::Arc;

use armada::{default_bind, init_logging, serve, SessionRegistry};
use clap::Parser;
use tokio::net::TcpListener;

/// Session server for the grid-battle game.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Host to bind (defaults to $SERVER_HOST, then "localhost").
    #[arg(long)]
    host: Option<String>,
    /// Port to bind (defaults to $SERVER_PORT, then 1234).
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let (default_host, default_port) = default_bind();
    let host = cli.host.unwrap_or(default_host);
    let port = cli.port.unwrap_or(default_port);

    let listener = TcpListener::bind((host.as_str(), port)).await?;
    log::info!("listening on {host}:{port}");

    let registry = Arc::new(SessionRegistry::new());
    serve(listener, registry).await
}
