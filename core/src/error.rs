//! Error types used inside the pipeline.
//!
//! # Design
//! None of these cross the `RestClient` boundary. Each one is folded into a
//! `ResultCode` before the caller sees it: `TransportFailure` splits into
//! `Connectivity` or `TransportError`, and every `BodyError` becomes
//! `TransportError`. `ConfigError` only surfaces from `ClientConfig`
//! constructors.

use std::io;
use std::string::FromUtf8Error;

use thiserror::Error;

use crate::types::ResultCode;

/// Failure raised by a `Transport` before a status code was obtained.
#[derive(Debug, Error)]
pub enum TransportFailure {
    /// The host name could not be resolved.
    #[error("unknown host: {0}")]
    UnknownHost(String),

    /// The host or its network is unreachable from this machine.
    #[error("no route to host: {0}")]
    NoRoute(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    /// I/O failure on an established connection (reset, refused, truncated).
    #[error("I/O error: {0}")]
    Io(io::Error),

    /// Anything else the transport rejected: bad URL, protocol error, TLS.
    #[error("{0}")]
    Other(String),
}

impl TransportFailure {
    /// True when the machine could not reach the server at all.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            TransportFailure::UnknownHost(_)
                | TransportFailure::NoRoute(_)
                | TransportFailure::Timeout(_)
        )
    }

    pub fn result_code(&self) -> ResultCode {
        if self.is_connectivity() {
            ResultCode::Connectivity
        } else {
            ResultCode::TransportError
        }
    }
}

impl From<io::Error> for TransportFailure {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut => TransportFailure::Timeout(err.to_string()),
            io::ErrorKind::HostUnreachable | io::ErrorKind::NetworkUnreachable => {
                TransportFailure::NoRoute(err.to_string())
            }
            _ => TransportFailure::Io(err),
        }
    }
}

impl From<ureq::Error> for TransportFailure {
    fn from(err: ureq::Error) -> Self {
        let message = err.to_string();
        match err {
            ureq::Error::HostNotFound => TransportFailure::UnknownHost(message),
            ureq::Error::Timeout(_) => TransportFailure::Timeout(message),
            ureq::Error::Io(io_err) => TransportFailure::from(io_err),
            _ => TransportFailure::Other(message),
        }
    }
}

/// Failure while reading a successful response body.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("response has no body")]
    Missing,

    #[error("failed to read body: {0}")]
    Io(#[from] io::Error),

    #[error("body is not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),

    #[error("unsupported response expectation: {0}")]
    Unsupported(&'static str),
}

/// Invalid client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),
}
