//! End-to-end send tests against a mock APNs endpoint.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use apns_client::{ApnsError, Classification, Client, HeaderOption, Priority, PushType, Reason};

mod common;

use common::{device_path, sample_payload, DEVICE_TOKEN, NOTIFICATION_ID, TOPIC};

fn rejection(status: u16, reason: &str) -> ResponseTemplate {
    ResponseTemplate::new(status)
        .insert_header("apns-id", NOTIFICATION_ID)
        .set_body_json(json!({ "reason": reason }))
}

#[tokio::test]
async fn test_accepted_notification_returns_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(device_path()))
        .and(header("content-type", "application/json"))
        .and(header("apns-topic", TOPIC))
        .and(header("apns-priority", "5"))
        .and(header("apns-push-type", "alert"))
        .and(header("apns-collapse-id", "order-42"))
        .and(header("apns-expiration", "1700000000"))
        .and(body_json(json!({
            "aps": { "alert": { "title": "Order shipped", "body": "Your package is on the way" } },
            "order_id": 42
        })))
        .respond_with(ResponseTemplate::new(200).insert_header("apns-id", NOTIFICATION_ID))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::new(common::base_config(&server.uri())).unwrap();
    let options = [
        HeaderOption::priority(Priority::PowerConsiderate),
        HeaderOption::push_type(PushType::Alert),
        HeaderOption::collapse_id("order-42").unwrap(),
        HeaderOption::expiration(1_700_000_000),
    ];

    let response = client.send(DEVICE_TOKEN, &sample_payload(), &options).await.unwrap();

    assert!(response.is_success());
    assert_eq!(response.status, 200);
    assert_eq!(response.notification_id.as_deref(), Some(NOTIFICATION_ID));
    assert!(response.reason.is_none());
}

#[tokio::test]
async fn test_endpoint_path_prefix_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/mock/3/device/{}", DEVICE_TOKEN)))
        .respond_with(ResponseTemplate::new(200).insert_header("apns-id", NOTIFICATION_ID))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint = format!("{}/mock", server.uri());
    let client = Client::new(common::base_config(&endpoint)).unwrap();
    let response = client.send(DEVICE_TOKEN, &sample_payload(), &[]).await.unwrap();

    assert!(response.is_success());
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.path(), format!("/mock/3/device/{}", DEVICE_TOKEN));
}

#[tokio::test]
async fn test_per_call_option_overrides_registry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("apns-topic", "com.example.app.voip"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::new(common::base_config(&server.uri())).unwrap();
    let options = [HeaderOption::topic("com.example.app.voip").unwrap()];
    client.send(DEVICE_TOKEN, &sample_payload(), &options).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].headers.get_all("apns-topic").iter().count(), 1);
}

#[tokio::test]
async fn test_bad_device_token_is_application_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rejection(400, "BadDeviceToken"))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::new(common::base_config(&server.uri())).unwrap();
    let err = client.send(DEVICE_TOKEN, &sample_payload(), &[]).await.unwrap_err();

    assert_eq!(err.reason(), Some(&Reason::BadDeviceToken));
    assert_eq!(err.classification(), Some(Classification::Application));
    assert!(!err.is_temporary());
    let response = err.response().unwrap();
    assert_eq!(response.status, 400);
    assert_eq!(response.notification_id.as_deref(), Some(NOTIFICATION_ID));
}

#[tokio::test]
async fn test_unregistered_keeps_timestamp() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(410).set_body_json(json!({ "reason": "Unregistered", "timestamp": 1_650_000_000_000_i64 })),
        )
        .mount(&server)
        .await;

    let client = Client::new(common::base_config(&server.uri())).unwrap();
    let err = client.send(DEVICE_TOKEN, &sample_payload(), &[]).await.unwrap_err();

    assert_eq!(err.reason(), Some(&Reason::Unregistered));
    assert_eq!(err.response().unwrap().timestamp, 1_650_000_000_000);
}

#[tokio::test]
async fn test_unknown_reason_is_preserved() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rejection(400, "SomethingNew"))
        .mount(&server)
        .await;

    let client = Client::new(common::base_config(&server.uri())).unwrap();
    let err = client.send(DEVICE_TOKEN, &sample_payload(), &[]).await.unwrap_err();

    assert_eq!(err.reason(), Some(&Reason::Unknown("SomethingNew".to_string())));
    assert_eq!(err.classification(), Some(Classification::Application));
}

#[tokio::test]
async fn test_server_error_is_retryable_and_body_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::new(common::base_config(&server.uri())).unwrap();
    let err = client.send(DEVICE_TOKEN, &sample_payload(), &[]).await.unwrap_err();

    assert!(matches!(err, ApnsError::Server { status: 500, .. }));
    assert_eq!(err.classification(), Some(Classification::Server));
    assert!(err.is_temporary());
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = Client::new(common::base_config(&server.uri())).unwrap();
    let err = client.send(DEVICE_TOKEN, &sample_payload(), &[]).await.unwrap_err();

    assert!(matches!(err, ApnsError::Decode { status: 400, .. }));
    assert_eq!(err.classification(), None);
}

#[tokio::test]
async fn test_connection_refused_is_connection_error() {
    let client = Client::new(common::base_config(&common::unused_endpoint())).unwrap();
    let err = client.send(DEVICE_TOKEN, &sample_payload(), &[]).await.unwrap_err();

    assert!(matches!(err, ApnsError::Connection(_)));
    assert!(err.is_temporary());
}

#[tokio::test]
async fn test_token_auth_sends_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::new(common::token_config(&server.uri())).unwrap();
    client.send(DEVICE_TOKEN, &sample_payload(), &[]).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let auth = requests[0].headers.get("authorization").unwrap().to_str().unwrap();
    assert!(auth.starts_with("bearer "));
    assert_eq!(auth.matches('.').count(), 2);
}

#[tokio::test]
async fn test_expired_token_is_renewed_and_retried_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rejection(403, "ExpiredProviderToken"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).insert_header("apns-id", NOTIFICATION_ID))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::new(common::token_config(&server.uri())).unwrap();
    assert_eq!(client.tokens_issued(), 1);

    let response = client.send(DEVICE_TOKEN, &sample_payload(), &[]).await.unwrap();

    assert!(response.is_success());
    assert_eq!(client.tokens_issued(), 2);
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_expired_token_retry_is_bounded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rejection(403, "ExpiredProviderToken"))
        .expect(2)
        .mount(&server)
        .await;

    let client = Client::new(common::token_config(&server.uri())).unwrap();
    let err = client.send(DEVICE_TOKEN, &sample_payload(), &[]).await.unwrap_err();

    assert_eq!(err.reason(), Some(&Reason::ExpiredProviderToken));
    assert_eq!(client.tokens_issued(), 2);
}

#[tokio::test]
async fn test_expired_token_without_token_auth_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("authorization", "bearer pre.signed.jwt"))
        .respond_with(rejection(403, "ExpiredProviderToken"))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::new(common::bearer_config(&server.uri(), "pre.signed.jwt")).unwrap();
    let err = client.send(DEVICE_TOKEN, &sample_payload(), &[]).await.unwrap_err();

    assert_eq!(err.reason(), Some(&Reason::ExpiredProviderToken));
    assert_eq!(client.tokens_issued(), 0);
}

#[tokio::test]
async fn test_invalid_token_is_not_renewed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rejection(403, "InvalidProviderToken"))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::new(common::token_config(&server.uri())).unwrap();
    let err = client.send(DEVICE_TOKEN, &sample_payload(), &[]).await.unwrap_err();

    assert_eq!(err.reason(), Some(&Reason::InvalidProviderToken));
    assert_eq!(client.tokens_issued(), 1);
}

#[tokio::test]
async fn test_send_with_retry_recovers_from_unavailable() {
    let server = MockServer::start().await;
    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts_clone = attempts.clone();
    Mock::given(method("POST"))
        .respond_with(move |_req: &wiremock::Request| -> ResponseTemplate {
            if attempts_clone.fetch_add(1, Ordering::SeqCst) < 2 {
                ResponseTemplate::new(503)
            } else {
                ResponseTemplate::new(200).insert_header("apns-id", NOTIFICATION_ID)
            }
        })
        .expect(3)
        .mount(&server)
        .await;

    let client = Client::new(common::base_config(&server.uri())).unwrap();
    let response = client.send_with_retry(DEVICE_TOKEN, &sample_payload(), &[]).await.unwrap();

    assert_eq!(response.notification_id.as_deref(), Some(NOTIFICATION_ID));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_send_with_retry_does_not_retry_rejections() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(rejection(400, "BadTopic"))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::new(common::base_config(&server.uri())).unwrap();
    let err = client.send_with_retry(DEVICE_TOKEN, &sample_payload(), &[]).await.unwrap_err();

    assert_eq!(err.reason(), Some(&Reason::BadTopic));
}

#[tokio::test]
async fn test_cancellation_returns_promptly() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let client = Client::new(common::base_config(&server.uri())).unwrap();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let start = Instant::now();
    let err = client
        .send_until_cancelled(&cancel, DEVICE_TOKEN, &sample_payload(), &[])
        .await
        .unwrap_err();

    assert!(matches!(err, ApnsError::Cancelled));
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_empty_raw_body_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = Client::new(common::base_config(&server.uri())).unwrap();
    let err = client.send_raw(DEVICE_TOKEN, Vec::new(), &[]).await.unwrap_err();

    assert!(matches!(err, ApnsError::EmptyPayload));
}
