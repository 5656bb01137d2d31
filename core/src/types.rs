//! Result model shared by every call.
//!
//! # Design
//! `ResultCode` is the closed classification handed back to callers. Its
//! numeric values match the HTTP status for the four recognized errors and
//! for `Ok`; the negative values mark failures that never produced a status.
//! `ResultValue` keeps the payload in a single `Payload` enum so a value can
//! never carry both text and bytes, and only the `ok_*` constructors attach
//! one.

use serde::{Deserialize, Serialize};

/// Terminal classification of one call attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultCode {
    /// The host could not be reached at all (unknown host, no route, timeout).
    Connectivity,
    /// Any other failure: mid-transfer I/O, unmatched status, unreadable body.
    TransportError,
    /// Placeholder before a call resolves. Never returned by `make_call`.
    Pending,
    Ok,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
}

impl ResultCode {
    pub const ALL: [ResultCode; 8] = [
        ResultCode::Connectivity,
        ResultCode::TransportError,
        ResultCode::Pending,
        ResultCode::Ok,
        ResultCode::BadRequest,
        ResultCode::Unauthorized,
        ResultCode::Forbidden,
        ResultCode::NotFound,
    ];

    /// Numeric value of the code. Status-backed codes use the HTTP status.
    pub fn value(self) -> i32 {
        match self {
            ResultCode::Connectivity => -2,
            ResultCode::TransportError => -1,
            ResultCode::Pending => 0,
            ResultCode::Ok => 200,
            ResultCode::BadRequest => 400,
            ResultCode::Unauthorized => 401,
            ResultCode::Forbidden => 403,
            ResultCode::NotFound => 404,
        }
    }

    pub fn from_value(value: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.value() == value)
    }

    /// Only a failure to reach the host is worth retrying.
    pub fn is_retryable(self) -> bool {
        self == ResultCode::Connectivity
    }
}

/// How a successful body should be interpreted. Chosen by the caller per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseExpectation {
    /// Body read as UTF-8 text and handed back unvalidated.
    #[default]
    StructuredData,
    /// Body drained into a byte buffer.
    RawBytes,
    /// Body decoded as text, replacing invalid UTF-8 sequences.
    PlainText,
    /// Body is never touched.
    Ignore,
    /// Reserved for signed-token bodies. Not supported; always a transport error.
    Token,
}

impl ResponseExpectation {
    /// Stable numeric tag used across the C ABI.
    pub fn tag(self) -> u32 {
        match self {
            ResponseExpectation::StructuredData => 0,
            ResponseExpectation::RawBytes => 1,
            ResponseExpectation::PlainText => 2,
            ResponseExpectation::Ignore => 3,
            ResponseExpectation::Token => 4,
        }
    }

    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            0 => Some(ResponseExpectation::StructuredData),
            1 => Some(ResponseExpectation::RawBytes),
            2 => Some(ResponseExpectation::PlainText),
            3 => Some(ResponseExpectation::Ignore),
            4 => Some(ResponseExpectation::Token),
            _ => None,
        }
    }
}

/// Body payload of a successful call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Payload {
    #[default]
    None,
    Text(String),
    Bytes(Vec<u8>),
}

/// The uniform value every call produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultValue {
    code: ResultCode,
    payload: Payload,
}

impl ResultValue {
    /// A value with `code` and no payload.
    pub fn with_code(code: ResultCode) -> Self {
        Self {
            code,
            payload: Payload::None,
        }
    }

    pub fn ok() -> Self {
        Self::with_code(ResultCode::Ok)
    }

    pub fn ok_text(text: String) -> Self {
        Self {
            code: ResultCode::Ok,
            payload: Payload::Text(text),
        }
    }

    pub fn ok_bytes(bytes: Vec<u8>) -> Self {
        Self {
            code: ResultCode::Ok,
            payload: Payload::Bytes(bytes),
        }
    }

    pub fn transport_error() -> Self {
        Self::with_code(ResultCode::TransportError)
    }

    pub fn code(&self) -> ResultCode {
        self.code
    }

    pub fn is_ok(&self) -> bool {
        self.code == ResultCode::Ok
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.payload {
            Payload::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn into_parts(self) -> (ResultCode, Payload) {
        (self.code, self.payload)
    }
}

impl Default for ResultValue {
    fn default() -> Self {
        Self::with_code(ResultCode::Pending)
    }
}
