//! Runs one request through the transport, matcher and parser.
//!
//! # Design
//! The executor is the only owner of the `TransportResponse`. It is dropped
//! before `execute` returns on every branch, which releases the connection
//! exactly once whether the body was parsed, skipped or failed to read.

use std::io::Read;

use tracing::{debug, warn};

use crate::http::{HttpRequest, Transport};
use crate::matcher::{self, Route};
use crate::parser;
use crate::types::{ResponseExpectation, ResultCode, ResultValue};

pub fn execute(
    transport: &dyn Transport,
    request: &HttpRequest,
    expectation: ResponseExpectation,
    accepted: &[ResultCode],
) -> ResultValue {
    let mut response = match transport.execute(request) {
        Ok(response) => response,
        Err(failure) => {
            let code = failure.result_code();
            warn!(?code, error = %failure, "transport failed");
            return ResultValue::with_code(code);
        }
    };

    let value = match matcher::route(response.status, accepted) {
        Route::ParseBody => {
            let content_type = response.content_type().map(str::to_owned);
            let body = response
                .body
                .as_deref_mut()
                .map(|reader| reader as &mut dyn Read);
            parser::parse_success(body, content_type.as_deref(), expectation)
        }
        Route::Resolved(ResultCode::TransportError) => {
            debug!(status = response.status, ?accepted, "status not handled by this call");
            ResultValue::transport_error()
        }
        Route::Resolved(code) => ResultValue::with_code(code),
    };

    drop(response);
    value
}
