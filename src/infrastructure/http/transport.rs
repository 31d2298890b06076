//! HTTP transport abstraction and the reqwest implementation

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::Value;

use crate::core::OpsError;

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Raw response: status code plus body text. Callers interpret the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[cfg(test)]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn json(&self) -> Result<Value, OpsError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Abstract transport used for every cluster call.
///
/// `url` is always the full URL (active endpoint + resource path).
/// `timeout` overrides the client default for a single request.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, timeout: Option<Duration>) -> Result<HttpResponse, OpsError>;

    async fn post(&self, url: &str, payload: &Value) -> Result<HttpResponse, OpsError>;

    async fn put(&self, url: &str, payload: &Value) -> Result<HttpResponse, OpsError>;
}

/// Credentials and TLS material, set once before the first call
#[derive(Clone)]
pub struct TransportConfig {
    pub username: String,
    pub password: String,
    pub ca_cert: Option<PathBuf>,
    pub accept_invalid_certs: bool,
    pub request_timeout: Duration,
}

impl fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("ca_cert", &self.ca_cert)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Authenticated session over a single pooled reqwest client
pub struct HttpTransport {
    http: reqwest::Client,
    username: String,
    password: String,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, OpsError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs);

        if let Some(path) = &config.ca_cert {
            let pem = std::fs::read(path)?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|err| {
                OpsError::Config(format!("invalid CA certificate {}: {err}", path.display()))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        Ok(Self {
            http: builder.build()?,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<HttpResponse, OpsError> {
        let response = request
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }

    /// `RequestBuilder::json` would replace the charset-qualified default header.
    fn with_json(
        request: reqwest::RequestBuilder,
        payload: &Value,
    ) -> Result<reqwest::RequestBuilder, OpsError> {
        Ok(request
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(serde_json::to_vec(payload)?))
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, timeout: Option<Duration>) -> Result<HttpResponse, OpsError> {
        let mut request = self.http.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        self.send(request).await
    }

    async fn post(&self, url: &str, payload: &Value) -> Result<HttpResponse, OpsError> {
        self.send(Self::with_json(self.http.post(url), payload)?).await
    }

    async fn put(&self, url: &str, payload: &Value) -> Result<HttpResponse, OpsError> {
        self.send(Self::with_json(self.http.put(url), payload)?).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn config() -> TransportConfig {
        TransportConfig {
            username: "admin".into(),
            password: "secret".into(),
            ca_cert: None,
            accept_invalid_certs: false,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Accept one connection, answer `{"acknowledged":true}` and return the raw request.
    async fn serve_once(listener: TcpListener) -> String {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let read = socket.read(&mut chunk).await.unwrap();
            raw.extend_from_slice(&chunk[..read]);
            let text = String::from_utf8_lossy(&raw).into_owned();
            if let Some(head_end) = text.find("\r\n\r\n") {
                let length = text[..head_end]
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .map(|value| value.trim().parse::<usize>().unwrap())
                    .unwrap_or(0);
                if raw.len() >= head_end + 4 + length {
                    break;
                }
            }
            if read == 0 {
                break;
            }
        }
        let body = r#"{"acknowledged":true}"#;
        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        String::from_utf8(raw).unwrap()
    }

    #[tokio::test]
    async fn test_put_sends_json_with_basic_auth() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let server = tokio::spawn(serve_once(listener));
        let transport = HttpTransport::new(&config()).unwrap();

        let response = transport
            .put(
                &format!("http://{address}/filebeat-7.9.0-2021.08.27/_settings?pretty"),
                &json!({"index": {"refresh_interval": "60s"}}),
            )
            .await
            .unwrap();

        assert!(response.is_ok());
        assert_eq!(response.json().unwrap()["acknowledged"], true);
        let request = server.await.unwrap();
        let (head, body) = request.split_once("\r\n\r\n").unwrap();
        let mut lines = head.lines();
        assert_eq!(
            lines.next(),
            Some("PUT /filebeat-7.9.0-2021.08.27/_settings?pretty HTTP/1.1")
        );
        let headers: Vec<&str> = lines.collect();
        assert!(headers.contains(&"content-type: application/json; charset=utf-8"));
        // base64("admin:secret")
        assert!(headers.contains(&"authorization: Basic YWRtaW46c2VjcmV0"));
        assert_eq!(body, r#"{"index":{"refresh_interval":"60s"}}"#);
    }

    #[tokio::test]
    async fn test_get_carries_default_headers() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let server = tokio::spawn(serve_once(listener));
        let transport = HttpTransport::new(&config()).unwrap();

        transport
            .get(
                &format!("http://{address}/_cluster/health"),
                Some(Duration::from_secs(5)),
            )
            .await
            .unwrap();

        let request = server.await.unwrap();
        let headers: Vec<&str> = request.lines().collect();
        assert_eq!(headers[0], "GET /_cluster/health HTTP/1.1");
        assert!(headers.contains(&"content-type: application/json; charset=utf-8"));
        assert!(headers.contains(&"authorization: Basic YWRtaW46c2VjcmV0"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("admin"));
    }

    #[test]
    fn test_response_json_decodes_body() {
        let response = HttpResponse::new(200, r#"{"status":"green"}"#);
        assert!(response.is_ok());
        assert_eq!(response.json().unwrap()["status"], "green");
    }

    #[test]
    fn test_created_is_not_ok_status() {
        // Only 200 counts as a healthy probe / applied setting
        assert!(!HttpResponse::new(201, "{}").is_ok());
    }

    #[test]
    fn test_transport_builds_without_ca() {
        assert!(HttpTransport::new(&config()).is_ok());
    }

    #[test]
    fn test_transport_rejects_missing_ca_file() {
        let config = TransportConfig {
            ca_cert: Some(PathBuf::from("/nonexistent/ca.pem")),
            ..config()
        };
        assert!(matches!(HttpTransport::new(&config), Err(OpsError::Io(_))));
    }
}
