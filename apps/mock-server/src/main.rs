use anyhow::Result;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use crewdesk_mock_server::{MockState, router};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let state = MockState::new();
    let app = router(state);

    let addr: std::net::SocketAddr = std::env::var("BIND")
        .unwrap_or_else(|_| "0.0.0.0:8990".into())
        .parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("crewdesk mock server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
