//! Avatar and header routes
//!
//! `GET /{network?}/{name}` serves the avatar, `GET /{network?}/{name}/h`
//! the header; `PUT` on the same paths uploads. Reads are public; a read
//! that only finds a pending upload under the name's confirmed owner
//! promotes it on the fly. axum answers HEAD from the same handlers with
//! the body dropped, so HEAD also triggers promotion while transferring
//! nothing.

use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::eth::Network;
use crate::media::{
    find_and_promote_unregistered_media, keys, process_upload, MediaSlot, UploadRequest,
    IMAGE_CONTENT_TYPE,
};
use crate::state::AppState;

/// Raw PUT body shape, prior to field validation
#[derive(Deserialize)]
struct RawUploadBody {
    expiry: String,
    #[serde(rename = "dataURL")]
    data_url: String,
    sig: String,
    #[serde(rename = "unverifiedAddress")]
    unverified_address: String,
}

// --- GET handlers -----------------------------------------------------

pub async fn get_avatar(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response> {
    serve_media(&state, None, &name, MediaSlot::Avatar).await
}

pub async fn get_header(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response> {
    serve_media(&state, None, &name, MediaSlot::Header).await
}

pub async fn get_avatar_on_network(
    State(state): State<AppState>,
    Path((network, name)): Path<(String, String)>,
) -> Result<Response> {
    serve_media(&state, Some(&network), &name, MediaSlot::Avatar).await
}

pub async fn get_header_on_network(
    State(state): State<AppState>,
    Path((network, name)): Path<(String, String)>,
) -> Result<Response> {
    serve_media(&state, Some(&network), &name, MediaSlot::Header).await
}

// --- PUT handlers -----------------------------------------------------

pub async fn put_avatar(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Response> {
    upload_media(&state, None, &name, MediaSlot::Avatar, &body).await
}

pub async fn put_header(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Response> {
    upload_media(&state, None, &name, MediaSlot::Header, &body).await
}

pub async fn put_avatar_on_network(
    State(state): State<AppState>,
    Path((network, name)): Path<(String, String)>,
    body: Bytes,
) -> Result<Response> {
    upload_media(&state, Some(&network), &name, MediaSlot::Avatar, &body).await
}

pub async fn put_header_on_network(
    State(state): State<AppState>,
    Path((network, name)): Path<(String, String)>,
    body: Bytes,
) -> Result<Response> {
    upload_media(&state, Some(&network), &name, MediaSlot::Header, &body).await
}

// --- Shared logic -----------------------------------------------------

async fn serve_media(
    state: &AppState,
    network_segment: Option<&str>,
    name: &str,
    slot: MediaSlot,
) -> Result<Response> {
    let network = resolve_network(state, network_segment)?;
    let store = state.store(slot);

    if let Some(object) = store.get(&keys::registered(network, name)).await? {
        if object.content_type.as_deref() == Some(IMAGE_CONTENT_TYPE) {
            return image_response(object.data.len(), object.data.into());
        }
    }

    if let Some(promoted) =
        find_and_promote_unregistered_media(store, state.oracle(), network, name).await?
    {
        return image_response(promoted.size(), promoted.body.into());
    }

    Err(AppError::NotFound(format!(
        "{} not found on {}",
        name, network
    )))
}

async fn upload_media(
    state: &AppState,
    network_segment: Option<&str>,
    name: &str,
    slot: MediaSlot,
    body: &Bytes,
) -> Result<Response> {
    let network = resolve_network(state, network_segment)?;
    let request = parse_upload_body(body)?;

    process_upload(state.store(slot), state.oracle(), network, slot, name, request).await?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "message": "uploaded" })),
    )
        .into_response())
}

fn resolve_network(state: &AppState, segment: Option<&str>) -> Result<Network> {
    let Some(segment) = segment else {
        return Ok(Network::Mainnet);
    };

    let network: Network = segment
        .to_lowercase()
        .parse()
        .map_err(|_| AppError::BadRequest("Network is not supported".to_string()))?;

    if network == Network::Localhost && !state.config().is_dev() {
        return Err(AppError::BadRequest(
            "localhost is only available in development mode".to_string(),
        ));
    }

    Ok(network)
}

fn parse_upload_body(body: &Bytes) -> Result<UploadRequest> {
    let raw: RawUploadBody =
        serde_json::from_slice(body).map_err(|e| AppError::BadRequest(e.to_string()))?;

    if raw.expiry.is_empty() || !raw.expiry.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::BadRequest("expiry value is not number".to_string()));
    }

    let sig_hex = raw.sig.strip_prefix("0x").unwrap_or(&raw.sig);
    if sig_hex.is_empty() || !sig_hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(AppError::BadRequest("sig value is not hex".to_string()));
    }

    let unverified_address = raw
        .unverified_address
        .parse()
        .map_err(|_| AppError::BadRequest("unverifiedAddress value is not address".to_string()))?;

    Ok(UploadRequest {
        expiry: raw.expiry,
        data_url: raw.data_url,
        sig: raw.sig,
        unverified_address,
    })
}

fn image_response(size: usize, body: Body) -> Result<Response> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, IMAGE_CONTENT_TYPE)
        .header(header::CONTENT_LENGTH, size)
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(body)
        .map_err(|e| AppError::Internal(e.to_string()))
}
