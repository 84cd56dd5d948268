//! /devices handler: everything announced on the caller's network.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use beacon_services::Instance;

use super::{request_key, ApiState};

pub async fn handle_devices(
    State(state): State<ApiState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Json<Vec<Instance>>, (StatusCode, String)> {
    let key = request_key(&state, peer, &headers)?;
    let instances = state.registry.list(&key);
    tracing::info!(%key, peer = %peer, count = instances.len(), "list request");
    Ok(Json(instances))
}
