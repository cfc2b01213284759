//! HTTP routes

pub mod health;
pub mod media;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

/// Build the full route table.
///
/// The network path segment is optional and defaults to mainnet, so every
/// media route is registered twice: once with a leading name segment and
/// once with a leading network segment. The first path parameter is a
/// network when a second name-bearing segment follows, otherwise it is the
/// name itself.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route(
            "/:first",
            get(media::get_avatar).put(media::put_avatar),
        )
        .route(
            "/:first/h",
            get(media::get_header).put(media::put_header),
        )
        .route(
            "/:first/:second",
            get(media::get_avatar_on_network).put(media::put_avatar_on_network),
        )
        .route(
            "/:first/:second/h",
            get(media::get_header_on_network).put(media::put_header_on_network),
        )
}
