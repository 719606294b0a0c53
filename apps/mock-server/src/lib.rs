//! In-memory mock of the crewdesk backend.
//!
//! Implements just enough of the real surface for the client crates to be
//! driven end to end: login/refresh/me with rotating single-use refresh
//! tokens, a `/ws/chat` echo assistant, and a thin tasks/notifications CRUD.
//! Call counters on [`MockState`] let tests assert how often an endpoint was
//! actually hit.
pub mod routes;
pub mod state;
pub mod ws;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;

pub use routes::router;
pub use state::{Claims, Counters, MockState, SeedUser};

/// Binds the mock on an ephemeral port and serves it in the background.
/// Abort the returned task (or drop the runtime) to stop it.
pub async fn spawn(state: Arc<MockState>) -> Result<(SocketAddr, tokio::task::JoinHandle<()>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = router(state);
    let task = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            tracing::error!("mock server stopped: {err}");
        }
    });
    Ok((addr, task))
}
