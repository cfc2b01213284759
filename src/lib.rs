//! ENS Media Server
//!
//! Serves avatar and header images for ENS names out of S3, with an
//! authenticated upload path (EIP-712 signatures checked against on-chain
//! ownership) and on-read promotion of uploads made before a name was
//! registered.

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod eth;
pub mod media;
pub mod routes;
pub mod state;
pub mod storage;

pub use state::AppState;

/// Assemble the application router with its middleware stack.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
