//! HTTP API handlers: announce, list and status.

pub mod devices;
pub mod register;
pub mod status;

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};

use beacon_core::{KeyDeriver, NetworkKey};
use beacon_services::Registry;

/// Header consulted when the deployment trusts its reverse proxy.
pub const FORWARDED_FOR: &str = "x-forwarded-for";

#[derive(Clone)]
pub struct ApiState {
    pub registry: Registry,
    pub keys: KeyDeriver,
    /// Reported by /status; the sweeper owns the actual schedule.
    pub lifetime: Duration,
    pub sweep_interval: Duration,
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Network key for a request from `peer` carrying `headers`.
///
/// A forwarded-for header that is not valid text is treated as an empty
/// address, so a trusting deployment rejects it instead of silently
/// falling back to the proxy's address.
fn request_key(
    state: &ApiState,
    peer: SocketAddr,
    headers: &HeaderMap,
) -> Result<NetworkKey, (StatusCode, String)> {
    let forwarded = headers
        .get(FORWARDED_FOR)
        .map(|value| value.to_str().unwrap_or_default());
    state.keys.derive(peer.ip(), forwarded).map_err(|e| {
        tracing::warn!(peer = %peer, error = %e, "rejecting request with unusable source address");
        (StatusCode::BAD_REQUEST, e.to_string())
    })
}

/// Whether the request declares a JSON body. Media-type parameters such
/// as `charset` are ignored.
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

// Re-export handler functions for use in router setup.
pub use devices::handle_devices;
pub use register::handle_register;
pub use status::handle_status;
