//! Scripted HTTP client for tests.

use crate::http::{HttpClient, HttpRequest, HttpResponse};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// An [`HttpClient`] that replays queued responses and records every
/// request it receives.
#[derive(Debug, Default)]
pub struct MockHttpClient {
    responses: Mutex<VecDeque<Result<HttpResponse, String>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockHttpClient {
    /// Creates a client with nothing queued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response.
    pub fn push_response(&self, status: u16, body: impl Into<Vec<u8>>) {
        self.responses
            .lock()
            .push_back(Ok(HttpResponse::new(status, body)));
    }

    /// Queues a transport failure.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.responses.lock().push_back(Err(message.into()));
    }

    /// Returns all requests seen so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Returns the most recent request.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().last().cloned()
    }

    /// Returns the number of responses not yet consumed.
    pub fn pending(&self) -> usize {
        self.responses.lock().len()
    }
}

impl HttpClient for MockHttpClient {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, String> {
        self.requests.lock().push(request.clone());
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err("no scripted response".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_in_order_and_records() {
        let client = MockHttpClient::new();
        client.push_response(200, "first");
        client.push_failure("connection reset");

        let request = HttpRequest::get("https://example.com/a");
        assert_eq!(client.send(&request).unwrap().body, b"first");
        assert_eq!(client.send(&request).unwrap_err(), "connection reset");
        assert!(client.send(&request).is_err());

        assert_eq!(client.requests().len(), 3);
        assert_eq!(client.pending(), 0);
    }
}
