//! Routed arguments → HTTP request dispatch.
//!
//! Builds the target URL from the path template, applies content
//! negotiation for the body kind, and performs the call. Every failure is
//! surfaced to the caller; nothing is retried.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::args::{BodyPayload, RoutedArgs};
use crate::error::CallError;

/// Fixed ceiling on every request. No per-call override.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fixed configuration for one bridged API, known at startup.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct BridgeConfig {
    /// Base URL the path templates are appended to
    pub base_url: String,
    /// Client identifier sent as `User-Agent` on every request
    pub user_agent: String,
}

impl BridgeConfig {
    pub fn new(base_url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_agent: user_agent.into(),
        }
    }
}

/// Build the shared client with the fixed request timeout.
pub fn http_client() -> reqwest::Result<Client> {
    Client::builder().timeout(REQUEST_TIMEOUT).build()
}

/// Perform one HTTP call for an operation.
///
/// Returns the JSON-decoded response body, or `None` for `204 No Content`.
pub async fn dispatch(
    client: &Client,
    config: &BridgeConfig,
    method: &str,
    path_template: &str,
    routed: RoutedArgs,
) -> Result<Option<Value>, CallError> {
    let method: Method = method.parse().map_err(|_| CallError::UnsupportedMethod {
        method: method.to_string(),
    })?;
    let url = build_url(&config.base_url, path_template, &routed.path_params);
    debug!(%method, %url, "dispatching");

    let mut req = client.request(method, &url);

    if !routed.query_params.is_empty() {
        req = req.query(&routed.query_params);
    }
    req = req.headers(build_headers(config, &routed.headers)?);

    match routed.body {
        BodyPayload::None => {}
        // .json also sets Content-Type: application/json unless the caller
        // supplied their own
        BodyPayload::Json(body) => req = req.json(&body),
        // raw bytes carry no forced content type
        BodyPayload::Raw(bytes) => req = req.body(bytes),
    }

    send(req).await
}

/// Substitute `{name}` tokens with the string form of each path parameter.
///
/// Tokens without a matching parameter are left as-is, and values are not
/// percent-encoded; callers supply URL-safe values.
fn build_url(base_url: &str, path_template: &str, path_params: &[(String, String)]) -> String {
    let mut path = path_template.to_string();
    for (name, value) in path_params {
        path = path.replace(&format!("{{{name}}}"), value);
    }
    format!("{base_url}{path}")
}

/// Default headers first, caller headers after with insert semantics, so a
/// caller header under the same key overrides the default.
fn build_headers(
    config: &BridgeConfig,
    headers: &[(String, String)],
) -> Result<HeaderMap, CallError> {
    let mut map = HeaderMap::new();

    let agent =
        HeaderValue::from_str(&config.user_agent).map_err(|e| CallError::InvalidArgument {
            name: "User-Agent".to_string(),
            reason: e.to_string(),
        })?;
    map.insert(USER_AGENT, agent);

    for (name, value) in headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| CallError::InvalidArgument {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|e| CallError::InvalidArgument {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        map.insert(header_name, header_value);
    }

    Ok(map)
}

async fn send(req: reqwest::RequestBuilder) -> Result<Option<Value>, CallError> {
    let resp = req.send().await.map_err(CallError::Transport)?;
    let status = resp.status();

    if status == StatusCode::NO_CONTENT {
        return Ok(None);
    }

    let text = resp.text().await.map_err(CallError::Transport)?;

    if status.as_u16() >= 400 {
        warn!(%status, "upstream error");
        return Err(CallError::Upstream { status, body: text });
    }

    let value: Value = serde_json::from_str(&text).map_err(CallError::Decode)?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{BodyPayload, RoutedArgs};
    use serde_json::json;

    fn config(base_url: &str) -> BridgeConfig {
        BridgeConfig::new(base_url, "petstore-bridge/1.0")
    }

    fn no_args() -> RoutedArgs {
        RoutedArgs {
            path_params: Vec::new(),
            query_params: Vec::new(),
            headers: Vec::new(),
            body: BodyPayload::None,
        }
    }

    // -- build_url --

    #[test]
    fn build_url_substitutes_path_params() {
        let url = build_url(
            "https://api.example.com",
            "/pet/{petId}",
            &[("petId".to_string(), "42".to_string())],
        );
        assert_eq!(url, "https://api.example.com/pet/42");
    }

    #[test]
    fn build_url_leaves_unknown_tokens_as_is() {
        let url = build_url("https://api.example.com", "/pet/{petId}", &[]);
        assert_eq!(url, "https://api.example.com/pet/{petId}");
    }

    #[test]
    fn build_url_does_not_encode_values() {
        let url = build_url(
            "https://api.example.com",
            "/pet/{petId}",
            &[("petId".to_string(), "a b".to_string())],
        );
        assert_eq!(url, "https://api.example.com/pet/a b");
    }

    // -- dispatch --

    #[tokio::test]
    async fn dispatch_substitutes_path_and_sends_user_agent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/pet/42")
            .match_header("user-agent", "petstore-bridge/1.0")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":42}"#)
            .create_async()
            .await;

        let client = http_client().unwrap();
        let mut routed = no_args();
        routed.path_params.push(("petId".to_string(), "42".to_string()));

        let result = dispatch(&client, &config(&server.url()), "GET", "/pet/{petId}", routed)
            .await
            .unwrap();
        assert_eq!(result, Some(json!({ "id": 42 })));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn dispatch_sends_query_params_and_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/pet/findByStatus")
            .match_query(mockito::Matcher::UrlEncoded(
                "status".into(),
                "sold".into(),
            ))
            .match_header("x-request-id", "abc123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        let client = http_client().unwrap();
        let mut routed = no_args();
        routed
            .query_params
            .push(("status".to_string(), "sold".to_string()));
        routed
            .headers
            .push(("X-Request-Id".to_string(), "abc123".to_string()));

        let result = dispatch(
            &client,
            &config(&server.url()),
            "GET",
            "/pet/findByStatus",
            routed,
        )
        .await
        .unwrap();
        assert_eq!(result, Some(json!([])));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn dispatch_json_body_sets_content_type() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/pet")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::Json(json!({ "name": "rex" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":1}"#)
            .create_async()
            .await;

        let client = http_client().unwrap();
        let mut routed = no_args();
        routed.body = BodyPayload::Json(json!({ "name": "rex" }));

        let result = dispatch(&client, &config(&server.url()), "POST", "/pet", routed)
            .await
            .unwrap();
        assert_eq!(result, Some(json!({ "id": 1 })));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn dispatch_raw_body_sends_exact_bytes_without_json_content_type() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/pet/1/uploadImage")
            .match_header("content-type", mockito::Matcher::Missing)
            .match_body(mockito::Matcher::Exact(
                String::from_utf8(vec![0x01, 0x02]).unwrap(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":true}"#)
            .create_async()
            .await;

        let client = http_client().unwrap();
        let mut routed = no_args();
        routed.body = BodyPayload::Raw(vec![0x01, 0x02]);

        let result = dispatch(
            &client,
            &config(&server.url()),
            "POST",
            "/pet/1/uploadImage",
            routed,
        )
        .await
        .unwrap();
        assert_eq!(result, Some(json!({ "ok": true })));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn dispatch_caller_header_overrides_user_agent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/pet")
            .match_header("user-agent", "custom/2.0")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("[]")
            .create_async()
            .await;

        let client = http_client().unwrap();
        let mut routed = no_args();
        routed
            .headers
            .push(("User-Agent".to_string(), "custom/2.0".to_string()));

        let result = dispatch(&client, &config(&server.url()), "GET", "/pet", routed).await;
        assert!(result.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn dispatch_error_status_surfaces_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/pet/9999")
            .with_status(404)
            .with_body("Pet not found")
            .create_async()
            .await;

        let client = http_client().unwrap();
        let err = dispatch(&client, &config(&server.url()), "GET", "/pet/9999", no_args())
            .await
            .unwrap_err();

        match err {
            CallError::Upstream { status, body } => {
                assert_eq!(status.as_u16(), 404);
                assert_eq!(body, "Pet not found");
            }
            other => panic!("expected Upstream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn dispatch_no_content_yields_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/pet/1")
            .with_status(204)
            .create_async()
            .await;

        let client = http_client().unwrap();
        let result = dispatch(&client, &config(&server.url()), "DELETE", "/pet/1", no_args())
            .await
            .unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn dispatch_non_json_success_body_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/pet")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = http_client().unwrap();
        let err = dispatch(&client, &config(&server.url()), "GET", "/pet", no_args())
            .await
            .unwrap_err();
        assert!(matches!(err, CallError::Decode(_)));
    }
}
