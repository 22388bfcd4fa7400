//! HTTP transport implementation.
//!
//! This module provides the reqwest-backed [`Transport`] used in production. Requests go
//! to `{base_url}{rest prefix}{path}` with a bearer token when one is configured.

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument};

use super::config::{HttpConfig, HttpVersion};
use crate::{
    config::BridgeConfig,
    criteria::{SearchCriteria, build_path_with_criteria},
    error::{BridgeError, HttpMethod, Result},
    transport::{Transport, sanitize_path},
};

/// HTTP/1.1 and HTTP/2 transport using reqwest.
///
/// Supports connection pooling and keep-alive. Timeouts come from [`HttpConfig`] and
/// surface as [`BridgeError::Timeout`].
///
/// # Examples
///
/// ```
/// use m2_commerce_bridge::{config::BridgeConfig, transport::HttpTransport};
///
/// let mut config = BridgeConfig::new("https://shop.example.com");
/// config.store_code = Some("default".to_owned());
///
/// let transport = HttpTransport::new(&config).unwrap();
/// assert_eq!(transport.rest_root(), "https://shop.example.com/rest/default/V1");
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    rest_root: String,
    access_token: Option<String>,
}

impl HttpTransport {
    /// Creates a transport for the configured platform.
    ///
    /// # Errors
    ///
    /// Returns error if the access token contains control characters or the HTTP client
    /// cannot be built.
    pub fn new(config: &BridgeConfig) -> Result<Self> {
        if let Some(token) = &config.access_token
            && token.chars().any(char::is_control)
        {
            return Err(BridgeError::ConfigError(
                "access_token must not contain control characters".to_owned(),
            ));
        }

        Ok(Self {
            client: build_client(&config.http)?,
            rest_root: config.rest_root(),
            access_token: config.access_token.clone(),
        })
    }

    /// REST root every path is appended to.
    #[must_use]
    pub fn rest_root(&self) -> &str {
        &self.rest_root
    }

    #[instrument(skip_all, fields(method = %method, endpoint = endpoint_of(path)))]
    async fn execute(&self, method: HttpMethod, path: &str, body: Option<&Value>) -> Result<Value> {
        let path = sanitize_path(path)?;
        let endpoint = endpoint_of(path);
        let url = format!("{}{path}", self.rest_root);

        let mut request = match method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Put => self.client.put(&url),
        };
        request = request.header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| send_error(e, method, endpoint))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| send_error(e, method, endpoint))?;
        debug!(status = status.as_u16(), bytes = text.len(), "platform responded");

        if !status.is_success() {
            return Err(BridgeError::Transport {
                status: status.as_u16(),
                method,
                endpoint: endpoint.to_owned(),
                message: extract_message(status, &text),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            BridgeError::Response(format!("{method} {endpoint} returned invalid JSON: {e}"))
        })
    }
}

fn build_client(config: &HttpConfig) -> Result<Client> {
    let mut builder = Client::builder()
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout());

    builder = match config.http_version {
        HttpVersion::Http1 => builder.http1_only(),
        HttpVersion::Http2 => builder.http2_prior_knowledge(),
        HttpVersion::Auto => builder,
    };

    builder.build().map_err(BridgeError::HttpError)
}

/// Request path without its query string.
fn endpoint_of(path: &str) -> &str {
    path.split('?').next().unwrap_or(path)
}

fn send_error(error: reqwest::Error, method: HttpMethod, endpoint: &str) -> BridgeError {
    if error.is_timeout() {
        BridgeError::Timeout { method, endpoint: endpoint.to_owned() }
    } else {
        BridgeError::HttpError(error)
    }
}

/// Extracts the failure message of an error response.
///
/// Structured bodies look like `{"message": "No such entity with %fieldName = %fieldValue",
/// "parameters": {"fieldName": "id", ...}}`; placeholders are filled from `parameters`
/// (named or positional `%1`, `%2`). Anything else is returned as raw text.
fn extract_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return status.canonical_reason().unwrap_or("request failed").to_owned();
    }

    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) else {
        return body.to_owned();
    };
    let Some(message) = map.get("message").and_then(Value::as_str) else {
        return body.to_owned();
    };

    let mut message = message.to_owned();
    match map.get("parameters") {
        Some(Value::Object(named)) => {
            let mut keys: Vec<&String> = named.keys().collect();
            keys.sort_by_key(|key| std::cmp::Reverse(key.len()));
            for key in keys {
                message = message.replace(&format!("%{key}"), &parameter_text(&named[key.as_str()]));
            }
        }
        Some(Value::Array(positional)) => {
            for (index, value) in positional.iter().enumerate().rev() {
                message = message.replace(&format!("%{}", index + 1), &parameter_text(value));
            }
        }
        _ => {}
    }
    message
}

fn parameter_text(value: &Value) -> String {
    value.as_str().map_or_else(|| value.to_string(), str::to_owned)
}

impl Transport for HttpTransport {
    async fn get<'a>(&'a self, path: &'a str, criteria: Option<&'a SearchCriteria>) -> Result<Value> {
        let path = build_path_with_criteria(path, criteria)?;
        self.execute(HttpMethod::Get, &path, None).await
    }

    async fn post<'a>(&'a self, path: &'a str, body: &'a Value) -> Result<Value> {
        self.execute(HttpMethod::Post, path, Some(body)).await
    }

    async fn put<'a>(&'a self, path: &'a str, body: &'a Value) -> Result<Value> {
        self.execute(HttpMethod::Put, path, Some(body)).await
    }
}

#[cfg(test)]
#[allow(
    clippy::unreachable,
    reason = "test code uses unreachable for expected-path assertions"
)]
mod tests {
    use std::{
        io::{BufRead, BufReader, Read, Write},
        net::TcpListener,
        sync::mpsc,
        thread,
    };

    use serde_json::json;

    use super::*;

    /// Serves one canned HTTP response and reports the raw request it received.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut head = String::new();
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap();
                }
                head.push_str(&line);
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            let mut request_body = vec![0; content_length];
            reader.read_exact(&mut request_body).unwrap();
            head.push_str(&String::from_utf8_lossy(&request_body));
            tx.send(head).unwrap();

            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        });

        (format!("http://{addr}"), rx)
    }

    /// Transport that bypasses any proxy configured in the environment.
    fn transport(base_url: &str) -> HttpTransport {
        let config = BridgeConfig::new(base_url);
        HttpTransport {
            client: Client::builder().no_proxy().build().unwrap(),
            rest_root: config.rest_root(),
            access_token: Some("secret-token".to_owned()),
        }
    }

    #[test]
    fn test_rest_root_from_config() {
        let transport = transport("https://shop.example.com/");
        assert_eq!(transport.rest_root(), "https://shop.example.com/rest/V1");
    }

    #[test]
    fn test_rejects_token_with_newline() {
        let mut config = BridgeConfig::new("https://shop.example.com");
        config.access_token = Some("abc\r\nX-Injected: 1".to_owned());
        assert!(matches!(HttpTransport::new(&config), Err(BridgeError::ConfigError(_))));
    }

    #[test]
    fn test_with_http_versions() {
        for http_version in [HttpVersion::Http1, HttpVersion::Http2, HttpVersion::Auto] {
            let mut config = BridgeConfig::new("https://shop.example.com");
            config.http = HttpConfig { http_version, ..HttpConfig::default() };
            assert!(HttpTransport::new(&config).is_ok());
        }
    }

    #[test]
    fn test_extract_named_parameters() {
        let body = r#"{"message":"No such entity with %fieldName = %fieldValue","parameters":{"fieldName":"orderId","fieldValue":42}}"#;
        assert_eq!(
            extract_message(StatusCode::NOT_FOUND, body),
            "No such entity with orderId = 42"
        );
    }

    #[test]
    fn test_extract_positional_parameters() {
        let body = r#"{"message":"The \"%1\" value is invalid for %2.","parameters":["abc","qty"]}"#;
        assert_eq!(
            extract_message(StatusCode::BAD_REQUEST, body),
            "The \"abc\" value is invalid for qty."
        );
    }

    #[test]
    fn test_extract_raw_and_empty_bodies() {
        assert_eq!(extract_message(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>"), "<html>bad gateway</html>");
        assert_eq!(extract_message(StatusCode::SERVICE_UNAVAILABLE, "  "), "Service Unavailable");
        assert_eq!(extract_message(StatusCode::BAD_REQUEST, r#"{"error":"x"}"#), r#"{"error":"x"}"#);
    }

    #[test]
    fn test_endpoint_of() {
        assert_eq!(endpoint_of("/orders?searchCriteria%5BpageSize%5D=10"), "/orders");
        assert_eq!(endpoint_of("/orders/1"), "/orders/1");
    }

    #[tokio::test]
    async fn test_get_with_criteria_and_bearer_token() {
        let (base_url, requests) = serve_once("200 OK", r#"{"items":[],"total_count":0}"#);
        let transport = transport(&base_url);

        let criteria = SearchCriteria::single("sku", "MB01", crate::criteria::ConditionType::Eq);
        let value = transport.get("/products", Some(&criteria)).await.unwrap();
        assert_eq!(value, json!({"items": [], "total_count": 0}));

        let request = requests.recv().unwrap();
        assert!(request.starts_with("GET /rest/V1/products?searchCriteria%5BfilterGroups%5D"));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer secret-token"));
    }

    #[tokio::test]
    async fn test_post_sends_json_body() {
        let (base_url, requests) = serve_once("200 OK", "true");
        let transport = transport(&base_url);

        let value = transport.post("/orders/12/cancel", &json!({"reason": "x"})).await.unwrap();
        assert_eq!(value, Value::Bool(true));

        let request = requests.recv().unwrap();
        assert!(request.starts_with("POST /rest/V1/orders/12/cancel"));
        assert!(request.ends_with(r#"{"reason":"x"}"#));
    }

    #[tokio::test]
    async fn test_non_success_maps_to_transport_error() {
        let (base_url, _requests) = serve_once(
            "404 Not Found",
            r#"{"message":"Request does not match any route."}"#,
        );
        let transport = transport(&base_url);

        let Err(error) = transport.get("/returns", None).await else {
            unreachable!("expected Transport error")
        };
        assert!(error.is_capability_absent());
        let BridgeError::Transport { status, method, endpoint, message } = error else {
            unreachable!("expected Transport error")
        };
        assert_eq!(status, 404);
        assert_eq!(method, HttpMethod::Get);
        assert_eq!(endpoint, "/returns");
        assert_eq!(message, "Request does not match any route.");
    }

    #[tokio::test]
    async fn test_empty_body_is_null() {
        let (base_url, _requests) = serve_once("200 OK", "");
        let value = transport(&base_url).put("/orders/1", &json!({})).await.unwrap();
        assert_eq!(value, Value::Null);
    }

    #[tokio::test]
    async fn test_invalid_json_is_response_error() {
        let (base_url, _requests) = serve_once("200 OK", "not json");
        let result = transport(&base_url).get("/orders", None).await;
        assert!(matches!(result, Err(BridgeError::Response(_))));
    }

    #[tokio::test]
    async fn test_deadline_maps_to_timeout_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            thread::sleep(std::time::Duration::from_secs(2));
            drop(stream);
        });

        let transport = HttpTransport {
            client: Client::builder()
                .no_proxy()
                .timeout(std::time::Duration::from_millis(200))
                .build()
                .unwrap(),
            rest_root: format!("http://{addr}/rest/V1"),
            access_token: None,
        };

        let Err(BridgeError::Timeout { method, endpoint }) =
            transport.post("/order/12/ship", &json!({})).await
        else {
            unreachable!("expected Timeout")
        };
        assert_eq!(method, HttpMethod::Post);
        assert_eq!(endpoint, "/order/12/ship");
    }

    #[tokio::test]
    async fn test_traversal_path_rejected_before_request() {
        let transport = transport("https://shop.example.com");
        let result = transport.get("/orders/../admin", None).await;
        assert!(matches!(result, Err(BridgeError::InvalidInput(_))));
    }
}
