//! End-to-end resolution tests against the public API
//!
//! The offline tests drive the client through mock providers; the tests
//! marked `#[ignore]` hit the real public resolvers and are meant to be run
//! manually with `cargo test -- --ignored`.

use std::sync::Arc;
use std::time::Duration;

use doh_client::provider::mock::MockProvider;
use doh_client::{DohClient, Provider, ProviderId, RecordType};

fn mock(name: &'static str, delay_ms: u64, ttl: u32) -> Arc<MockProvider> {
    Arc::new(MockProvider::succeeding(
        name,
        Duration::from_millis(delay_ms),
        ttl,
    ))
}

#[tokio::test(start_paused = true)]
async fn race_returns_first_successful_response() {
    let cloudflare = mock("cloudflare", 40, 300);
    let dnspod = mock("dnspod", 20, 300);
    let google = mock("google", 60, 300);
    let quad9 = mock("quad9", 80, 300);

    let client = DohClient::with_providers(vec![
        cloudflare.clone() as Arc<dyn Provider>,
        dnspod.clone() as Arc<dyn Provider>,
        google.clone() as Arc<dyn Provider>,
        quad9.clone() as Arc<dyn Provider>,
    ])
    .unwrap();

    let response = client.query("likexian.com", RecordType::A).await.unwrap();

    assert_eq!(response.status, 0);
    assert_eq!(response.provider, "dnspod");
    assert!(!response.answer.is_empty());

    // Every provider was attempted exactly once; the losers were cancelled
    // or discarded but none leaked past the query.
    for provider in [&cloudflare, &dnspod, &google, &quad9] {
        assert_eq!(provider.calls(), 1);
    }

    client.close().await;
}

#[tokio::test(start_paused = true)]
async fn cached_response_is_returned_verbatim() {
    let upstream = mock("only", 10, 600);
    let client =
        DohClient::with_providers(vec![upstream.clone() as Arc<dyn Provider>]).unwrap();
    client.enable_cache(true).await;

    let first = client.query("likexian.com", RecordType::A).await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    let second = client.query("likexian.com", RecordType::A).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.answer[0].ttl, second.answer[0].ttl);
    assert_eq!(upstream.calls(), 1);

    client.close().await;
}

#[tokio::test(start_paused = true)]
async fn all_providers_failing_reports_all_query_failed() {
    let client = DohClient::with_providers(vec![
        Arc::new(MockProvider::failing("a", Duration::from_millis(10))) as Arc<dyn Provider>,
        Arc::new(MockProvider::failing("b", Duration::from_millis(20))) as Arc<dyn Provider>,
    ])
    .unwrap();

    let err = client.query("likexian", RecordType::A).await.unwrap_err();
    assert!(err.to_string().contains("all query failed"));

    client.close().await;
}

#[tokio::test]
async fn closing_mid_flight_cancels_promptly() {
    let client = Arc::new(
        DohClient::with_providers(vec![Arc::new(MockProvider::succeeding(
            "stuck",
            Duration::from_secs(30),
            300,
        )) as Arc<dyn Provider>])
        .unwrap(),
    );

    let querying = {
        let client = client.clone();
        tokio::spawn(async move { client.query("likexian.com", RecordType::A).await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    client.close().await;

    let result = tokio::time::timeout(Duration::from_secs(1), querying)
        .await
        .expect("query did not return after close")
        .unwrap();
    assert!(result.is_err());
}

#[tokio::test]
#[ignore = "requires network access"]
async fn live_default_set_resolves() {
    let client = DohClient::new(&[]).unwrap();
    let response = client.query("likexian.com", RecordType::A).await.unwrap();

    assert_eq!(response.status, 0);
    assert!(!response.provider.is_empty());
    assert!(!response.answer.is_empty());

    client.close().await;
}

#[tokio::test]
#[ignore = "requires network access"]
async fn live_quad9_resolves() {
    let client = DohClient::new(&[ProviderId::Quad9]).unwrap();
    let response = client.query("likexian.com", RecordType::A).await.unwrap();

    assert_eq!(response.status, 0);
    assert_eq!(response.provider, "quad9");
    assert!(!response.answer.is_empty());

    client.close().await;
}

#[tokio::test]
#[ignore = "requires network access"]
async fn live_ecs_is_canonicalized() {
    let client = DohClient::new(&[ProviderId::Cloudflare]).unwrap();

    let bare = client
        .query_with_subnet("likexian.com", RecordType::A, "1.1.1.1")
        .await
        .unwrap();
    let cidr = client
        .query_with_subnet("likexian.com", RecordType::A, "1.1.1.1/24")
        .await
        .unwrap();

    assert_eq!(bare.status, 0);
    assert_eq!(cidr.status, 0);

    client.close().await;
}
