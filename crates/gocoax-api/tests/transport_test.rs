#![allow(clippy::unwrap_used)]
// Integration tests for `HttpTransport` using wiremock.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gocoax_api::{
    BasicCredentials, Endpoint, Fetch, FieldTag, HttpTransport, RawValue, TransportConfig,
    TransportError, decode,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(timeout: Duration) -> (MockServer, HttpTransport) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let transport = HttpTransport::new(
        base_url,
        BasicCredentials::default(),
        &TransportConfig {
            timeout,
            ..TransportConfig::default()
        },
    )
    .unwrap();
    (server, transport)
}

// base64("admin:gocoax")
const DEFAULT_AUTH: &str = "Basic YWRtaW46Z29jb2F4";

// ── Success ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_sends_basic_auth() {
    let (server, transport) = setup(Duration::from_secs(5)).await;

    Mock::given(method("GET"))
        .and(path("/ms/1/0x103/GET"))
        .and(header("authorization", DEFAULT_AUTH))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"data":["0xa4817a49","0xe3dd0000"]}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let body = transport.fetch(Endpoint::Mac).await.unwrap();
    let payload = decode(Endpoint::Mac, &body).unwrap();

    assert_eq!(
        payload.get(FieldTag::MacAddress),
        Some(&RawValue::Words(vec![0xa481_7a49, 0xe3dd_0000]))
    );
}

#[tokio::test]
async fn test_custom_credentials() {
    let server = MockServer::start().await;
    let transport = HttpTransport::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        BasicCredentials::new("root", SecretString::from("s3cret".to_owned())),
        Duration::from_secs(5),
    );

    Mock::given(method("GET"))
        .and(path("/index.html"))
        // base64("root:s3cret")
        .and(header("authorization", "Basic cm9vdDpzM2NyZXQ="))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let body = transport.fetch(Endpoint::StatusPage).await.unwrap();
    assert_eq!(&body[..], b"<html></html>");
}

// ── Error mapping ───────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized() {
    let (server, transport) = setup(Duration::from_secs(5)).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = transport.fetch(Endpoint::LocalInfo).await;
    assert_eq!(result, Err(TransportError::Unauthorized { status: 401 }));
}

#[tokio::test]
async fn test_server_error_is_unreachable() {
    let (server, transport) = setup(Duration::from_secs(5)).await;

    Mock::given(method("GET"))
        .and(path("/ms/0/0x14"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    match transport.fetch(Endpoint::FrameInfo).await {
        Err(TransportError::Unreachable { reason }) => {
            assert!(reason.contains("500"), "unexpected reason: {reason}");
        }
        other => panic!("expected Unreachable, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let (server, transport) = setup(Duration::from_millis(200)).await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"data":["0x1"]}"#)
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let result = transport.fetch(Endpoint::Privacy).await;
    assert!(
        matches!(result, Err(TransportError::Timeout { .. })),
        "expected Timeout, got: {result:?}"
    );
}

#[tokio::test]
async fn test_connection_refused_is_unreachable() {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    drop(server);

    let transport = HttpTransport::new(
        base_url,
        BasicCredentials::default(),
        &TransportConfig::default(),
    )
    .unwrap();

    let result = transport.fetch(Endpoint::Mac).await;
    assert!(
        matches!(result, Err(TransportError::Unreachable { .. })),
        "expected Unreachable, got: {result:?}"
    );
}
