//! HTTP transport.
//!
//! The engine issues exactly one request per operation and needs nothing
//! beyond "send this, give me status and body". That surface is the
//! [`HttpClient`] trait, so tests can script responses and embedders can
//! bring their own client.

use std::io::Read;
use std::time::Duration;

/// Largest response body read from the wire.
const MAX_BODY_BYTES: u64 = 16 * 1024 * 1024;

/// HTTP methods used by the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET.
    Get,
    /// POST.
    Post,
}

impl Method {
    /// Returns the method token as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// An outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Method.
    pub method: Method,
    /// Absolute URL, including any query string.
    pub url: String,
    /// Headers in insertion order.
    pub headers: Vec<(String, String)>,
    /// Request body.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Creates a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Creates a POST request with a body.
    pub fn post(url: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Looks up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A response with any status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Creates a `200 OK` response.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, body)
    }
}

/// HTTP client abstraction.
///
/// Implementations return every response that arrived, whatever its
/// status. `Err` is reserved for requests that produced no response
/// (DNS, TLS, connection, timeout).
pub trait HttpClient: Send + Sync {
    /// Sends a request and waits for the full response.
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, String>;
}

/// Blocking HTTPS client backed by `ureq`.
#[derive(Debug, Clone)]
pub struct UreqClient {
    agent: ureq::Agent,
}

impl UreqClient {
    /// Creates a client with the given overall request timeout.
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl Default for UreqClient {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl HttpClient for UreqClient {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, String> {
        let mut outbound = self.agent.request(request.method.as_str(), &request.url);
        for (name, value) in &request.headers {
            outbound = outbound.set(name, value);
        }

        let result = match &request.body {
            Some(body) => outbound.send_bytes(body),
            None => outbound.call(),
        };

        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(err)) => return Err(err.to_string()),
        };

        let status = response.status();
        let mut body = Vec::new();
        response
            .into_reader()
            .take(MAX_BODY_BYTES)
            .read_to_end(&mut body)
            .map_err(|e| format!("failed to read response body: {e}"))?;

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder() {
        let request = HttpRequest::get("https://todo.example.com/sync")
            .with_header("Host", "todo.example.com")
            .with_header("User-Agent", "Dalvik/1.2.0");

        assert_eq!(request.method, Method::Get);
        assert_eq!(request.header("host"), Some("todo.example.com"));
        assert_eq!(request.header("USER-AGENT"), Some("Dalvik/1.2.0"));
        assert_eq!(request.header("missing"), None);
        assert!(request.body.is_none());
    }

    #[test]
    fn post_carries_body() {
        let request = HttpRequest::post("https://firs.example.com/register", b"a=b".to_vec());
        assert_eq!(request.method.as_str(), "POST");
        assert_eq!(request.body.as_deref(), Some(&b"a=b"[..]));
    }

    #[test]
    fn unreachable_host_is_transport_failure() {
        let client = UreqClient::new(Duration::from_secs(2));
        let request = HttpRequest::get("http://127.0.0.1:1/unreachable");
        assert!(client.send(&request).is_err());
    }
}
