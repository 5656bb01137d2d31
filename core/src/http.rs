//! HTTP transport types and the seam to the transport client.
//!
//! # Design
//! `HttpRequest` is plain data produced by the request builder. The
//! `Transport` trait is the only outbound operation the pipeline needs: run
//! one request synchronously and hand back a status plus a body stream, or a
//! `TransportFailure`. Connection handling, TLS and redirects live behind it.
//!
//! `TransportResponse` owns the body stream. Dropping it releases the
//! underlying connection, so whoever holds the response is the one that
//! releases it.

use std::fmt;
use std::io::Read;

use crate::error::TransportFailure;

/// HTTP method for a request. Implied by whether a body is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

/// An in-flight response returned by a `Transport`.
pub struct TransportResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Option<Box<dyn Read>>,
}

impl TransportResponse {
    pub fn new(status: u16, body: Option<Box<dyn Read>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body,
        }
    }

    /// The `content-type` header value, matched case-insensitively.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

/// Executes a single request synchronously.
///
/// Implementations must be safe to share across threads: one instance serves
/// every call in the process, and each call owns its own request/response
/// pair.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<TransportResponse, TransportFailure>;
}
