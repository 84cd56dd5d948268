pub mod handlers;

use std::net::SocketAddr;

use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

pub use handlers::ApiState;

/// Build the `/api` router over `state`.
pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/register", post(handlers::handle_register))
        .route("/devices", get(handlers::handle_devices))
        .route("/status", get(handlers::handle_status))
        .with_state(state);

    Router::new().nest("/api", api_routes).layer(cors)
}

/// Bind `listen` and serve the API until the task is dropped.
pub async fn serve(state: ApiState, listen: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(listen)
        .await
        .with_context(|| format!("failed to bind API listener on {listen}"))?;
    serve_on(listener, state).await
}

/// Serve the API on an already-bound listener.
///
/// Handlers see the TCP peer address, which is what network keys are
/// derived from unless the forwarded-for header is trusted.
pub async fn serve_on(listener: TcpListener, state: ApiState) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(
        %addr,
        trust_forwarded = state.keys.trusts_forwarded(),
        "API listening"
    );
    let app = router(state).into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app).await?;
    Ok(())
}
