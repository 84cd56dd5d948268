//! Beacon integration test harness.
//!
//! Each test starts the API in process on an ephemeral 127.0.0.1 port and
//! talks to it over real HTTP. Every request therefore arrives from
//! 127.0.0.1; tests that need several networks start the server with
//! X-Forwarded-For trusted and choose the announcer's address per request.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use beacon_api::ApiState;
use beacon_core::KeyDeriver;
use beacon_services::Registry;

mod devices;
mod status;

// ── Harness ───────────────────────────────────────────────────────────────────

pub const LIFETIME: Duration = Duration::from_secs(3600);
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(180);

/// A running API server. Aborted on drop.
pub struct TestServer {
    pub addr: SocketAddr,
    pub registry: Registry,
    pub client: reqwest::Client,
    task: JoinHandle<Result<()>>,
}

impl TestServer {
    pub async fn start(trust_forwarded: bool) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind test listener")?;
        let addr = listener.local_addr()?;
        let registry = Registry::new();
        let state = ApiState {
            registry: registry.clone(),
            keys: KeyDeriver::new(trust_forwarded),
            lifetime: LIFETIME,
            sweep_interval: SWEEP_INTERVAL,
        };
        let task = tokio::spawn(beacon_api::serve_on(listener, state));
        Ok(Self {
            addr,
            registry,
            client: reqwest::Client::new(),
            task,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}/api{}", self.addr, path)
    }

    /// POST /register as `from` (sent as X-Forwarded-For when given).
    pub async fn register(&self, from: Option<&str>, name: &str, url: &str) -> Result<StatusCode> {
        let mut req = self
            .client
            .post(self.url("/register"))
            .json(&json!({ "name": name, "url": url }));
        if let Some(addr) = from {
            req = req.header("X-Forwarded-For", addr);
        }
        Ok(req.send().await?.status())
    }

    /// GET /devices as `from`. Non-JSON bodies come back as a string value.
    pub async fn devices(&self, from: Option<&str>) -> Result<(StatusCode, Value)> {
        let mut req = self.client.get(self.url("/devices"));
        if let Some(addr) = from {
            req = req.header("X-Forwarded-For", addr);
        }
        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        let value = serde_json::from_str(&body).unwrap_or(Value::String(body));
        Ok((status, value))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// The `name` fields of a /devices listing, in order.
pub fn names(listing: &Value) -> Vec<String> {
    listing
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["name"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
