//! Blocking REST facade.
//!
//! # Design
//! `RestClient` holds only a shared `Transport` and carries no mutable state
//! between calls. Every operation is a direct blocking call: the caller waits
//! until the `ResultValue` exists, and callbacks run on the calling thread
//! after the pipeline finishes. A host that must not block its UI thread
//! calls in from its own worker.
//!
//! `RestClient::shared` exposes one process-wide client built lazily from
//! the environment. Code that wants a different transport injects it with
//! `RestClient::new`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::{debug, info_span, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::executor;
use crate::http::Transport;
use crate::request::{build_request, CallParams, RequestBody};
use crate::transport::UreqTransport;
use crate::types::{ResponseExpectation, ResultCode, ResultValue};

static SHARED: Lazy<RestClient> = Lazy::new(|| {
    let config = ClientConfig::from_env().unwrap_or_else(|err| {
        warn!(error = %err, "ignoring invalid client configuration");
        ClientConfig::default()
    });
    RestClient::from_config(&config)
});

#[derive(Clone)]
pub struct RestClient {
    transport: Arc<dyn Transport>,
}

impl RestClient {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    pub fn from_shared(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(UreqTransport::new(config))
    }

    /// Process-wide client, initialized on first use and never mutated.
    pub fn shared() -> &'static RestClient {
        &SHARED
    }

    /// Run one call and classify its outcome.
    ///
    /// Never fails: every transport, status and body problem is reported
    /// through the returned code.
    pub fn make_call(&self, params: &CallParams) -> ResultValue {
        let span = info_span!("make_call", call_id = %Uuid::new_v4(), url = %params.url);
        let _guard = span.enter();

        if params.accepted.is_empty() {
            warn!("no accepted codes declared; every status will be a transport error");
        }
        let request = build_request(params);
        let value = executor::execute(
            self.transport.as_ref(),
            &request,
            params.expectation,
            &params.accepted,
        );
        debug!(code = ?value.code(), "call finished");
        value
    }

    /// Fetch `url` as structured data, accepting only `Ok`.
    pub fn get<F>(&self, url: &str, callback: F)
    where
        F: FnOnce(ResultValue),
    {
        self.get_with(url, ResponseExpectation::StructuredData, None, callback);
    }

    pub fn get_with<F>(
        &self,
        url: &str,
        expectation: ResponseExpectation,
        extra_headers: Option<&BTreeMap<String, Option<String>>>,
        callback: F,
    ) where
        F: FnOnce(ResultValue),
    {
        let mut params = CallParams::new(url).expect(expectation);
        if let Some(headers) = extra_headers {
            params.headers = headers.clone();
        }
        callback(self.make_call(&params));
    }

    /// Post a plain-text status. The outcome is logged and dropped.
    pub fn post(&self, url: &str, status: &str) {
        debug!(url, status, "posting status");
        let params = CallParams::new(url)
            .body(RequestBody::plain_text(status))
            .expect(ResponseExpectation::Ignore)
            .accept([ResultCode::Ok]);
        let value = self.make_call(&params);
        if !value.is_ok() {
            debug!(url, code = ?value.code(), "status post was not accepted");
        }
    }
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient").finish_non_exhaustive()
    }
}
