//! Status-code dispatch.
//!
//! A status is only interpreted when the caller listed it among the accepted
//! codes. Once accepted, dispatch is over the five known statuses; any other
//! accepted value and any unaccepted status fall through to
//! `TransportError`.

use crate::types::ResultCode;

/// Where an accepted (or rejected) status leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// 200 was accepted: hand the body to the parser.
    ParseBody,
    /// Finished without touching the body.
    Resolved(ResultCode),
}

pub fn route(status: u16, accepted: &[ResultCode]) -> Route {
    let is_accepted = accepted
        .iter()
        .any(|code| code.value() == i32::from(status));
    if !is_accepted {
        return Route::Resolved(ResultCode::TransportError);
    }
    match status {
        200 => Route::ParseBody,
        400 => Route::Resolved(ResultCode::BadRequest),
        401 => Route::Resolved(ResultCode::Unauthorized),
        403 => Route::Resolved(ResultCode::Forbidden),
        404 => Route::Resolved(ResultCode::NotFound),
        _ => Route::Resolved(ResultCode::TransportError),
    }
}
