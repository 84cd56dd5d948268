//! /register handler: announce an endpoint to the caller's network.

use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use serde::Deserialize;

use beacon_services::Instance;

use super::{is_json, request_key, ApiState};

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub url: String,
}

pub async fn handle_register(
    State(state): State<ApiState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, (StatusCode, String)> {
    if !is_json(&headers) {
        return Err((StatusCode::BAD_REQUEST, "Please send json".to_string()));
    }
    if body.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Please send a request body".to_string(),
        ));
    }

    let req: RegisterRequest =
        serde_json::from_slice(&body).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let key = request_key(&state, peer, &headers)?;
    tracing::info!(%key, peer = %peer, url = %req.url, "register request");

    let outcome = state
        .registry
        .announce(key, Instance::new(req.url, req.name));
    tracing::debug!(%key, ?outcome, "announcement stored");

    Ok(StatusCode::OK)
}
