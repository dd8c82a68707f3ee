//! Response header staging.

use std::collections::HashMap;

use tracing::{trace, warn};

/// Receives the response shaping decided by the router.
///
/// Content type and status are staged first; `send` commits them.
pub trait ResponseHeaders {
    /// Stages the content type.
    fn content_type(&mut self, content_type: &str);

    /// Stages the status code.
    fn status(&mut self, status: u16);

    /// Commits the staged headers.
    fn send(&mut self);
}

/// An in-memory response that records what the router staged.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Number of times headers were committed.
    pub sends: usize,
}

impl Response {
    /// Creates a new response with the given status.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            sends: 0,
        }
    }

    /// Creates a 200 OK response.
    pub fn ok() -> Self {
        Self::new(200)
    }

    /// Returns true once headers have been committed.
    pub fn headers_sent(&self) -> bool {
        self.sends > 0
    }

    /// Returns the staged content type.
    pub fn get_content_type(&self) -> Option<&str> {
        self.headers.get("Content-Type").map(String::as_str)
    }

    /// Returns the status text for the current status code.
    pub fn status_text(&self) -> &'static str {
        match self.status {
            200 => "OK",
            201 => "Created",
            204 => "No Content",
            301 => "Moved Permanently",
            302 => "Found",
            304 => "Not Modified",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            409 => "Conflict",
            422 => "Unprocessable Entity",
            500 => "Internal Server Error",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            _ => "Unknown",
        }
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::ok()
    }
}

impl ResponseHeaders for Response {
    fn content_type(&mut self, content_type: &str) {
        self.headers
            .insert("Content-Type".to_string(), content_type.to_string());
    }

    fn status(&mut self, status: u16) {
        if self.headers_sent() {
            warn!(status, "status staged after headers were sent");
        }
        self.status = status;
    }

    fn send(&mut self) {
        self.sends += 1;
        trace!(status = self.status, sends = self.sends, "headers sent");
    }
}
