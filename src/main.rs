use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use books_gateway::config::load_config;
use books_gateway::lifecycle::{signals, Shutdown};
use books_gateway::observability::{logging, metrics};
use books_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "books-gateway")]
#[command(about = "Path-prefix HTTP gateway for the books microservices", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file (built-in defaults apply when omitted).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    logging::init(&config.observability.log_level);

    tracing::info!("books-gateway v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );
    for route in &config.routes {
        tracing::info!(
            route = %route.name,
            prefix = %route.prefix,
            target = %route.target,
            strip_prefix = route.strip_prefix,
            "Route registered"
        );
    }

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::trigger_on_signal(shutdown);

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
