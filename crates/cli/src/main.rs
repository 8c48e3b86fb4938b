//! Ferry dot-state service CLI.
//!
//! Command-line entry point for the HTTP server, plus a couple of
//! direct read commands useful for poking at the assembler without
//! standing up the server.

use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use eyre::{Result, WrapErr};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ferry_client::UpstreamClient;
use ferry_core::StateAssembler;
use server::AppState;

#[derive(Parser)]
#[command(name = "ferryd")]
#[command(about = "Ferry dot-state assembly service")]
#[command(version)]
struct Cli {
    /// WSDOT ferries API access code.
    #[arg(long, env = "WSF_ACCESS_CODE")]
    access_code: Option<String>,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API server.
    Serve {
        /// Address to bind to.
        #[arg(short, long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },

    /// List the supported routes.
    Routes,

    /// Build and print a single route's snapshot.
    Snapshot {
        /// Route ID, e.g. 1 for Seattle/Bainbridge Island.
        route_id: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .init();

    let access_code = cli.access_code.unwrap_or_default();
    if access_code.is_empty() {
        tracing::warn!("no WSF_ACCESS_CODE set; upstream calls will fail and snapshots will degrade to synthetic");
    }

    match cli.command {
        Commands::Serve { addr } => handle_serve(addr, &access_code).await?,
        Commands::Routes => handle_routes()?,
        Commands::Snapshot { route_id } => handle_snapshot(route_id, &access_code).await?,
    }

    Ok(())
}

async fn handle_serve(addr: SocketAddr, access_code: &str) -> Result<()> {
    let assembler = StateAssembler::new(UpstreamClient::new(access_code));
    let state = AppState::new(assembler);
    server::run(addr, state)
        .await
        .wrap_err("server exited with an error")
}

fn handle_routes() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(ferry_core::list_routes())?);
    Ok(())
}

async fn handle_snapshot(route_id: u32, access_code: &str) -> Result<()> {
    let assembler = StateAssembler::new(UpstreamClient::new(access_code));
    let snapshot = assembler
        .build_snapshot(route_id)
        .await
        .wrap_err("failed to build snapshot")?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
