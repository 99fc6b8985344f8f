//! Handler responses and the sink they are emitted to.

use std::collections::HashMap;

/// A response produced by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HashMap<String, String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl Response {
    /// Creates a new response with the given status.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Creates a 200 OK response.
    pub fn ok() -> Self {
        Self::new(200)
    }

    /// Creates a response with plain text content.
    pub fn text(body: impl Into<String>) -> Self {
        let body_str: String = body.into();
        Self::ok()
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body_str)
    }

    /// Creates a response with JSON content.
    pub fn json<T: serde::Serialize>(data: &T) -> Self {
        match serde_json::to_vec(data) {
            Ok(body) => Self::ok()
                .header("Content-Type", "application/json")
                .body(body),
            Err(_) => Self::new(500).body("Internal Server Error"),
        }
    }

    /// Creates the generic 404 Not Found response.
    pub fn not_found() -> Self {
        Self::new(404).body("Not Found")
    }

    /// Sets a header.
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the body as a string.
    pub fn body_string(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }

    /// Returns the status text for the current status code.
    pub fn status_text(&self) -> &'static str {
        match self.status {
            200 => "OK",
            201 => "Created",
            204 => "No Content",
            301 => "Moved Permanently",
            302 => "Found",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            405 => "Method Not Allowed",
            500 => "Internal Server Error",
            _ => "Unknown",
        }
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::ok()
    }
}

/// Receives the outcome of a dispatch.
///
/// `suppress_body` is set for `HEAD` requests: status and headers go out,
/// the body must not.
pub trait ResponseSink {
    /// Emits a handler's response.
    fn emit(&mut self, response: Response, suppress_body: bool);

    /// Emits the generic not-found status when no fallback handler applies.
    fn not_found(&mut self, suppress_body: bool) {
        self.emit(Response::not_found(), suppress_body);
    }
}

/// A sink that keeps the last emitted response in memory.
#[derive(Debug, Default)]
pub struct BufferedSink {
    response: Option<Response>,
    emitted: usize,
}

impl BufferedSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the emitted response, if any.
    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// Takes the emitted response out of the sink.
    pub fn take(&mut self) -> Option<Response> {
        self.response.take()
    }

    /// Number of times the sink was written to.
    pub fn emitted(&self) -> usize {
        self.emitted
    }
}

impl ResponseSink for BufferedSink {
    fn emit(&mut self, mut response: Response, suppress_body: bool) {
        if suppress_body {
            response.body.clear();
        }
        self.response = Some(response);
        self.emitted += 1;
    }
}
