//! `space-api` server binary.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use space_api::lifecycle::{resolve_config, wait_for_signal, Overrides};
use space_api::observability::{logging, metrics};
use space_api::{init_api, App, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "space-api")]
#[command(about = "HTTP API server with uniform JSON errors", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Serve {
        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Address to listen on, e.g. 127.0.0.1:8090
        #[arg(long)]
        http: Option<String>,

        /// Log error internals
        #[arg(long)]
        debug: bool,

        /// Directory served at the site root
        #[arg(long)]
        public_dir: Option<String>,

        /// Serve index.html for missing static files
        #[arg(long)]
        index_fallback: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            config,
            http,
            debug,
            public_dir,
            index_fallback,
        } => {
            let overrides = Overrides {
                bind_address: http,
                debug,
                public_dir,
                index_fallback,
            };
            serve(config, overrides).await
        }
    }
}

async fn serve(
    config_path: Option<PathBuf>,
    overrides: Overrides,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(config_path.as_deref(), &overrides)?;

    logging::init(&config.observability.log_level, config.debug)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "space-api starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        debug = config.debug,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let grace = Duration::from_secs(config.timeouts.shutdown_secs);

    let service = init_api(App::new(config), &[]);
    let server = HttpServer::new(service, grace);

    let shutdown = Shutdown::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        trigger.trigger();
    });

    server.run(listener, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
