//! HTTP transport for the Limits backend.
//!
//! Every failure leaves this module as a [`TransportError`], so callers never
//! see reqwest-specific error types.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, SdkError, TransportError};

/// JSON-over-HTTP client bound to one base URL.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a client with a request timeout and default headers.
    /// `Content-Type: application/json` is always sent; `headers` may add to it.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        headers: &HashMap<String, String>,
    ) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| SdkError::Config(format!("Invalid header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                SdkError::Config(format!("Invalid value for header '{}': {}", name, e))
            })?;
            default_headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|e| SdkError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(base_url, client))
    }

    /// Create a client around a preconfigured reqwest client.
    pub fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: Option<&Q>,
    ) -> Result<T> {
        let mut request = self.client.get(self.url(path));
        if let Some(query) = query {
            request = request.query(query);
        }
        let response = request.send().await?;
        Self::decode(response).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send(Method::POST, self.url(path), body).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send(Method::PUT, self.url(path), body).await
    }

    /// POST to an absolute URL outside the base URL (e.g. the permit service).
    pub async fn post_url<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T> {
        self.send(Method::POST, url.to_string(), body).await
    }

    async fn send<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: String,
        body: &B,
    ) -> Result<T> {
        debug!("{} {}", method, url);
        let response = self.client.request(method, &url).json(body).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(|e| {
                if e.is_timeout() {
                    return SdkError::from(e);
                }
                SdkError::Transport(TransportError::Unknown(format!(
                    "Failed to decode response: {}",
                    e
                )))
            });
        }

        let text = response.text().await.unwrap_or_default();
        let body: Option<Value> = serde_json::from_str(&text).ok();
        Err(SdkError::Transport(http_error(status.as_u16(), status.canonical_reason(), body)))
    }
}

/// Normalize a non-2xx response. The backend's own `code`/`message`/`error`
/// fields win over the status line.
fn http_error(status: u16, reason: Option<&str>, body: Option<Value>) -> TransportError {
    let field = |name: &str| {
        body.as_ref()
            .and_then(|b| b.get(name))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let code = field("code").unwrap_or_else(|| format!("HTTP_{}", status));
    let message = field("message")
        .or_else(|| field("error"))
        .or_else(|| reason.map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {}", status));

    TransportError::Http {
        status,
        code,
        message,
        body,
    }
}


#[cfg(test)]
mod tests {
    use super::test_server::serve_once;
    use super::*;
    use serde_json::json;

    fn client(url: &str) -> HttpClient {
        let mut headers = HashMap::new();
        headers.insert("X-API-Key".to_string(), "test-key".to_string());
        HttpClient::new(url, Duration::from_secs(5), &headers).unwrap()
    }

    #[tokio::test]
    async fn test_post_sends_json_and_headers() {
        let (url, server) = serve_once("200 OK", r#"{"success":true,"message":"ok"}"#).await;

        let resp: Value = client(&url).post("/order", &json!({"coin": "BTC"})).await.unwrap();
        let captured = server.await.unwrap();

        assert_eq!(resp["success"], true);
        assert_eq!(captured.request_line, "POST /order HTTP/1.1");
        assert!(captured.headers.contains("content-type: application/json"));
        assert!(captured.headers.contains("x-api-key: test-key"));
        assert_eq!(captured.body, json!({"coin": "BTC"}));
    }

    #[tokio::test]
    async fn test_http_error_uses_backend_fields() {
        let (url, _server) = serve_once(
            "400 Bad Request",
            r#"{"success":false,"message":"Invalid coin","code":"INVALID_COIN"}"#,
        )
        .await;

        let err = client(&url)
            .put::<Value, _>("/connect", &json!({}))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(400));
        assert_eq!(err.code(), "INVALID_COIN");
        assert!(err.to_string().contains("Invalid coin"));
    }

    #[tokio::test]
    async fn test_http_error_without_body_fields() {
        let (url, _server) = serve_once("503 Service Unavailable", r#"{"error":"maintenance"}"#).await;

        let err = client(&url).post::<Value, _>("/order", &json!({})).await.unwrap_err();

        match err {
            SdkError::Transport(TransportError::Http { status, code, message, body }) => {
                assert_eq!(status, 503);
                assert_eq!(code, "HTTP_503");
                assert_eq!(message, "maintenance");
                assert_eq!(body, Some(json!({"error": "maintenance"})));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err = client(&url).post::<Value, _>("/order", &json!({})).await.unwrap_err();
        assert_eq!(err.code(), "NETWORK_ERROR");
    }

    #[tokio::test]
    async fn test_undecodable_body_is_unknown_error() {
        let (url, _server) = serve_once("200 OK", "not json").await;

        let err = client(&url).post::<Value, _>("/order", &json!({})).await.unwrap_err();
        assert_eq!(err.code(), "UNKNOWN_ERROR");
    }

    #[tokio::test]
    async fn test_body_read_timeout_is_network_error() {
        use tokio::io::AsyncWriteExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = tokio::io::AsyncReadExt::read(&mut socket, &mut buf).await;
            // Promise a body that never arrives
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 64\r\n\r\n{")
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let client = HttpClient::new(&url, Duration::from_millis(300), &HashMap::new()).unwrap();
        let err = client.post::<Value, _>("/order", &json!({})).await.unwrap_err();

        assert_eq!(err.code(), "NETWORK_ERROR");
        server.abort();
    }

    #[test]
    fn test_invalid_header_is_config_error() {
        let mut headers = HashMap::new();
        headers.insert("bad header".to_string(), "x".to_string());
        let err = HttpClient::new("http://localhost", Duration::from_secs(1), &headers).unwrap_err();
        assert_eq!(err.code(), "CONFIG_ERROR");
    }
}
