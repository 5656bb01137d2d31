//! Call parameters and the request builder.
//!
//! # Design
//! `CallParams` is everything one call needs: URL, optional body, the body
//! expectation, extra headers and the accepted codes. It is built fresh per
//! call and only borrowed by the pipeline. `build_request` turns it into an
//! `HttpRequest` without validating the URL; a malformed URL surfaces later
//! as a transport failure.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::http::{HttpMethod, HttpRequest};
use crate::types::{ResponseExpectation, ResultCode};

pub const JSON_UTF8: &str = "application/json; charset=utf-8";
pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

/// A request body together with its declared media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl RequestBody {
    pub fn bytes(content_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            content_type: content_type.to_string(),
            bytes,
        }
    }

    pub fn text(content_type: &str, text: &str) -> Self {
        Self::bytes(content_type, text.as_bytes().to_vec())
    }

    pub fn plain_text(text: &str) -> Self {
        Self::text(TEXT_PLAIN_UTF8, text)
    }

    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::bytes(JSON_UTF8, serde_json::to_vec(value)?))
    }
}

/// Parameters for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallParams {
    pub url: String,
    pub body: Option<RequestBody>,
    pub expectation: ResponseExpectation,
    /// Extra headers. Entries whose value is `None` are not sent.
    pub headers: BTreeMap<String, Option<String>>,
    /// Codes this call is prepared to handle, in declaration order.
    pub accepted: Vec<ResultCode>,
}

impl CallParams {
    /// A read of `url` expecting structured data and accepting only `Ok`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            body: None,
            expectation: ResponseExpectation::StructuredData,
            headers: BTreeMap::new(),
            accepted: vec![ResultCode::Ok],
        }
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn expect(mut self, expectation: ResponseExpectation) -> Self {
        self.expectation = expectation;
        self
    }

    pub fn header(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.optional_header(key, Some(value.into()))
    }

    pub fn optional_header(mut self, key: impl Into<String>, value: Option<String>) -> Self {
        self.headers.insert(key.into(), value);
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in headers {
            self.headers.insert(key.into(), value.map(Into::into));
        }
        self
    }

    /// Replace the accepted codes. Duplicates are dropped, first occurrence wins.
    pub fn accept(mut self, codes: impl IntoIterator<Item = ResultCode>) -> Self {
        self.accepted.clear();
        for code in codes {
            if !self.accepted.contains(&code) {
                self.accepted.push(code);
            }
        }
        self
    }
}

/// Assemble the request descriptor for `params`.
pub fn build_request(params: &CallParams) -> HttpRequest {
    let mut headers: Vec<(String, String)> = params
        .headers
        .iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| (key.clone(), v.clone())))
        .collect();

    match &params.body {
        Some(body) => {
            headers.retain(|(key, _)| !key.eq_ignore_ascii_case("content-type"));
            headers.push(("content-type".to_string(), body.content_type.clone()));
            HttpRequest {
                method: HttpMethod::Post,
                url: params.url.clone(),
                headers,
                body: Some(body.bytes.clone()),
            }
        }
        None => HttpRequest {
            method: HttpMethod::Get,
            url: params.url.clone(),
            headers,
            body: None,
        },
    }
}
