//! The reqwest-backed request client against a mock backend.

use assistant_lib::adapters::HttpRequestClient;
use learning_assistant_core::ports::{HttpMethod, RequestClient, RequestError};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(base: &str) -> HttpRequestClient {
    HttpRequestClient::new(base, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn sends_json_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ai/summary"))
        .and(header("authorization", "Bearer tok"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "topic": "Gravity" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "summary": "Falls." })))
        .expect(1)
        .mount(&server)
        .await;

    let base = format!("{}/", server.uri());
    let response = client(&base)
        .call("/ai/summary", HttpMethod::Post, Some(&json!({ "topic": "Gravity" })), Some("tok"))
        .await
        .unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.str_field("summary"), Some("Falls."));
}

#[tokio::test]
async fn omits_authorization_without_a_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "t" })))
        .mount(&server)
        .await;

    client(&server.uri())
        .call("/auth/login", HttpMethod::Post, Some(&json!({})), None)
        .await
        .unwrap();
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn non_2xx_is_classified_with_the_body_message() {
    let server = MockServer::start().await;
    Mock::given(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid credentials" })))
        .mount(&server)
        .await;
    Mock::given(path("/ai/test"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let c = client(&server.uri());
    let err = c.call("/auth/login", HttpMethod::Post, None, None).await.unwrap_err();
    assert_eq!(err, RequestError::Http { status: 401, message: "Invalid credentials".into() });

    let err = c.call("/ai/test", HttpMethod::Post, None, None).await.unwrap_err();
    assert_eq!(err, RequestError::Http { status: 500, message: "HTTP 500".into() });
}

#[tokio::test]
async fn non_json_success_keeps_the_text() {
    let server = MockServer::start().await;
    Mock::given(path("/ai/doubt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Because of Rayleigh scattering."))
        .mount(&server)
        .await;
    Mock::given(path("/events/teacher"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let c = client(&server.uri());
    let response = c.call("/ai/doubt", HttpMethod::Post, None, None).await.unwrap();
    assert_eq!(response.json, None);
    assert_eq!(response.text, "Because of Rayleigh scattering.");

    let empty = c.call("/events/teacher", HttpMethod::Post, None, None).await.unwrap();
    assert_eq!(empty.status, 204);
    assert_eq!(empty.json, None);
}

#[tokio::test]
async fn refused_connection_is_network_unreachable() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let err = client(&format!("http://127.0.0.1:{}", port))
        .call("/auth/login", HttpMethod::Post, Some(&json!({})), None)
        .await
        .unwrap_err();
    assert!(err.is_network(), "{:?}", err);
}

#[tokio::test]
async fn slow_server_times_out_as_network_unreachable() {
    let server = MockServer::start().await;
    Mock::given(path("/ai/summary"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let c = HttpRequestClient::new(&server.uri(), Duration::from_millis(200)).unwrap();
    let err = c.call("/ai/summary", HttpMethod::Post, None, None).await.unwrap_err();
    assert!(err.is_network(), "{:?}", err);
}
