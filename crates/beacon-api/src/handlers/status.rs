//! /status handler.
//!
//! Aggregate counts only. Keys and urls are never exposed across networks.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::ApiState;

#[derive(Serialize)]
pub struct StatusResponse {
    pub networks: usize,
    pub instances: usize,
    pub lifetime_secs: u64,
    pub sweep_interval_secs: u64,
}

pub async fn handle_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        networks: state.registry.len(),
        instances: state.registry.instance_count(),
        lifetime_secs: state.lifetime.as_secs(),
        sweep_interval_secs: state.sweep_interval.as_secs(),
    })
}
