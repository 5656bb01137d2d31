//! Default `Transport` backed by a blocking `ureq` agent.

use std::net::ToSocketAddrs;

use tracing::{debug, trace};
use ureq::http::Uri;
use ureq::Agent;

use crate::config::ClientConfig;
use crate::error::TransportFailure;
use crate::http::{HttpMethod, HttpRequest, Transport, TransportResponse};

/// Shares one `ureq::Agent` (and its connection pool) across calls.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
    user_agent: Option<String>,
}

impl UreqTransport {
    pub fn new(config: &ClientConfig) -> Self {
        // Status codes are data here; the code matcher interprets them.
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(config.timeout())
            .max_redirects(config.max_redirects)
            .build()
            .new_agent();
        Self {
            agent,
            user_agent: config.user_agent.clone(),
        }
    }

    fn with_headers<B>(
        &self,
        mut builder: ureq::RequestBuilder<B>,
        headers: &[(String, String)],
    ) -> ureq::RequestBuilder<B> {
        if let Some(user_agent) = &self.user_agent {
            builder = builder.header("user-agent", user_agent.as_str());
        }
        for (key, value) in headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        builder
    }

    /// ureq's resolver reports a failed lookup as a bare I/O error, so an I/O
    /// failure is checked against the URL's host before it is classified.
    fn classify(&self, err: ureq::Error, url: &str) -> TransportFailure {
        match TransportFailure::from(err) {
            TransportFailure::Io(io_err) if !host_resolves(url) => {
                debug!(url, error = %io_err, "host did not resolve");
                TransportFailure::UnknownHost(io_err.to_string())
            }
            failure => failure,
        }
    }
}

/// Whether the URL's host resolves to at least one address. A URL without a
/// usable host is not a resolution problem and reports `true`.
fn host_resolves(url: &str) -> bool {
    let Ok(uri) = url.parse::<Uri>() else {
        return true;
    };
    let Some(host) = uri.host() else {
        return true;
    };
    let port = uri
        .port_u16()
        .unwrap_or(if uri.scheme_str() == Some("https") { 443 } else { 80 });
    let host = host.trim_start_matches('[').trim_end_matches(']');
    (host, port)
        .to_socket_addrs()
        .map(|mut addrs| addrs.next().is_some())
        .unwrap_or(false)
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<TransportResponse, TransportFailure> {
        trace!(method = ?request.method, url = %request.url, "executing request");
        let response = match (request.method, &request.body) {
            (HttpMethod::Get, _) => self
                .with_headers(self.agent.get(&request.url), &request.headers)
                .call(),
            (HttpMethod::Post, Some(body)) => self
                .with_headers(self.agent.post(&request.url), &request.headers)
                .send(&body[..]),
            (HttpMethod::Post, None) => self
                .with_headers(self.agent.post(&request.url), &request.headers)
                .send_empty(),
        }
        .map_err(|err| self.classify(err, &request.url))?;

        let (parts, body) = response.into_parts();
        let headers = parts
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        Ok(TransportResponse {
            status: parts.status.as_u16(),
            headers,
            body: Some(Box::new(body.into_reader())),
        })
    }
}
