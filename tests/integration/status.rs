use crate::*;

/// /status reports aggregate counts and the expiry schedule.
#[tokio::test]
async fn test_status_counts_networks_and_instances() -> Result<()> {
    let server = TestServer::start(true).await?;

    server.register(Some("10.0.0.1"), "a", "http://a").await?;
    server.register(Some("10.0.0.1"), "b", "http://b").await?;
    server.register(Some("10.0.0.2"), "c", "http://c").await?;

    let status: Value = server
        .client
        .get(server.url("/status"))
        .send()
        .await?
        .json()
        .await?;

    assert_eq!(status["networks"], 2);
    assert_eq!(status["instances"], 3);
    assert_eq!(status["lifetime_secs"], LIFETIME.as_secs());
    assert_eq!(status["sweep_interval_secs"], SWEEP_INTERVAL.as_secs());
    Ok(())
}
