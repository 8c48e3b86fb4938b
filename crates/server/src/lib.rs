//! HTTP surface over the ferry state assembler.
//!
//! A thin wrapper: every handler either serves static route metadata or
//! delegates straight to `ferry_core::StateAssembler`.

mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;

use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

/// Run the server on the specified address.
///
/// # Errors
///
/// Returns an error if the server fails to bind or serve.
pub async fn run(addr: SocketAddr, state: AppState) -> eyre::Result<()> {
    let app = create_router(state);

    info!("Starting server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
