//! Blocking REST client core.
//!
//! # Overview
//! Runs one HTTP request per call and reduces the outcome to a small closed
//! set of result codes. The pipeline is: build the request, execute it on a
//! `Transport`, match the status against the codes the caller accepts, parse
//! the body the way the caller expects, and return a `ResultValue`.
//!
//! # Design
//! - `Transport` is the seam to the HTTP client. `UreqTransport` is the
//!   default; tests inject scripted transports.
//! - Nothing is thrown past `RestClient`: connectivity problems, other I/O
//!   failures, unhandled statuses and unreadable bodies all come back as data.
//! - Calls block the caller. No thread pool, no background work.

pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod http;
pub mod matcher;
pub mod parser;
pub mod request;
pub mod transport;
pub mod types;

pub use client::RestClient;
pub use config::ClientConfig;
pub use error::{BodyError, ConfigError, TransportFailure};
pub use http::{HttpMethod, HttpRequest, Transport, TransportResponse};
pub use request::{build_request, CallParams, RequestBody};
pub use transport::UreqTransport;
pub use types::{Payload, ResponseExpectation, ResultCode, ResultValue};
