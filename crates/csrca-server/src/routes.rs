//! HTTP routes.

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Content type of request and response bodies.
pub const PEM_CONTENT_TYPE: &str = "application/x-pem-file";

/// Path of the signing endpoint.
pub const SIGN_PATH: &str = "/sign";

/// Build the router with body size and processing time limits applied.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route(SIGN_PATH, post(sign))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(TraceLayer::new_for_http())
}

/// Accept a PEM CSR and answer with a PEM certificate signed by the authority.
async fn sign(State(state): State<AppState>, body: Bytes) -> Result<impl IntoResponse, ApiError> {
    let issued = state.authority.sign_request(&body)?;
    debug!(serial = %issued.serial, "created certificate:\n{}", issued.pem);
    Ok(([(header::CONTENT_TYPE, PEM_CONTENT_TYPE)], issued.pem))
}
