//! HTTP signing service for csrca.
//!
//! Mints an in-memory root authority at startup and signs CSRs posted to
//! `/sign`, answering with a 24-hour client certificate.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::future::Future;

use tokio::net::TcpListener;
use tracing::info;

pub use config::Config;
pub use error::{ApiError, ServerError};
pub use routes::{router, PEM_CONTENT_TYPE, SIGN_PATH};
pub use state::AppState;

/// Serve the signing API on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    config: &Config,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    let app = router(state, &config.server);
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("server stopped");
    Ok(())
}
