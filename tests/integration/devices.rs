use std::time::Instant;

use beacon_services::sweep;

use crate::*;

/// A network that never announced lists as an empty array, not an error.
#[tokio::test]
async fn test_unknown_network_lists_empty() -> Result<()> {
    let server = TestServer::start(false).await?;

    let (status, listing) = server.devices(None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing, json!([]));
    Ok(())
}

#[tokio::test]
async fn test_devices_rejects_post() -> Result<()> {
    let server = TestServer::start(false).await?;

    let resp = server
        .client
        .post(server.url("/devices"))
        .json(&json!({}))
        .send()
        .await?;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    Ok(())
}

/// Neighbouring IPv4 hosts are separate networks.
#[tokio::test]
async fn test_ipv4_neighbours_do_not_see_each_other() -> Result<()> {
    let server = TestServer::start(true).await?;

    server.register(Some("203.0.113.5"), "five", "http://five").await?;
    server.register(Some("203.0.113.6"), "six", "http://six").await?;

    let (_, five) = server.devices(Some("203.0.113.5")).await?;
    let (_, six) = server.devices(Some("203.0.113.6")).await?;
    assert_eq!(names(&five), vec!["five"]);
    assert_eq!(names(&six), vec!["six"]);
    Ok(())
}

/// Hosts on one IPv6 /64 share a listing, in announcement order.
#[tokio::test]
async fn test_ipv6_subnet_shares_listing() -> Result<()> {
    let server = TestServer::start(true).await?;

    server.register(Some("2001:db8::1"), "one", "http://one").await?;
    server.register(Some("2001:db8::2"), "two", "http://two").await?;

    let (_, listing) = server.devices(Some("2001:db8::abcd")).await?;
    assert_eq!(names(&listing), vec!["one", "two"]);

    let (_, other) = server.devices(Some("2001:db8:0:1::1")).await?;
    assert_eq!(other, json!([]));
    Ok(())
}

/// A forwarded-for chain is attributed to its left-most (client) entry.
#[tokio::test]
async fn test_forwarded_chain_uses_client_entry() -> Result<()> {
    let server = TestServer::start(true).await?;

    server
        .register(Some("198.51.100.7, 10.0.0.254"), "client", "http://client")
        .await?;

    let (_, listing) = server.devices(Some("198.51.100.7")).await?;
    assert_eq!(names(&listing), vec!["client"]);
    Ok(())
}

/// With forwarding untrusted, the header cannot move an announcer.
#[tokio::test]
async fn test_untrusted_server_ignores_forwarded_for() -> Result<()> {
    let server = TestServer::start(false).await?;

    server.register(Some("198.51.100.7"), "spoof", "http://spoof").await?;

    let (_, listing) = server.devices(None).await?;
    assert_eq!(names(&listing), vec!["spoof"]);
    let (_, spoofed) = server.devices(Some("203.0.113.200")).await?;
    assert_eq!(names(&spoofed), vec!["spoof"]);
    Ok(())
}

/// After the lifetime passes and a sweep runs, the network lists empty and
/// is gone from the registry.
#[tokio::test]
async fn test_expired_network_is_pruned_by_sweep() -> Result<()> {
    let server = TestServer::start(false).await?;
    server.register(None, "node-a", "http://node-a").await?;
    assert_eq!(server.registry.len(), 1);

    let later = Instant::now() + LIFETIME + Duration::from_secs(1);
    let report = sweep(&server.registry, later, LIFETIME);
    assert_eq!(report.expired, 1);
    assert_eq!(report.networks_removed, 1);

    let (status, listing) = server.devices(None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing, json!([]));
    assert!(server.registry.keys().is_empty());
    Ok(())
}

/// Listing with an unparsable forwarded address is a client error.
#[tokio::test]
async fn test_devices_with_bad_source_address_is_client_error() -> Result<()> {
    let server = TestServer::start(true).await?;

    let (status, _) = server.devices(Some("nonsense")).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}
