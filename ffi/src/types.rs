//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Inputs (`FfiCallParams`, `FfiHeader`) are borrowed from the C caller and
//! never freed here. Enumerations cross as plain integers and are validated
//! on the Rust side, so an out-of-range tag from C becomes a
//! `TransportError` result instead of undefined behaviour. The one output,
//! `FfiResultValue`, is heap-allocated by Rust and released with
//! `rest_free_result`.

use std::collections::BTreeMap;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use rest_core::{CallParams, Payload, RequestBody, ResponseExpectation, ResultCode, ResultValue};

/// Opaque handle to a `RestClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiRestClient {
    pub(crate) inner: rest_core::RestClient,
}

// ---------------------------------------------------------------------------
// Inputs (caller-owned)
// ---------------------------------------------------------------------------

/// A single extra header. A null `value` means "do not send".
#[repr(C)]
pub struct FfiHeader {
    pub key: *const c_char,
    pub value: *const c_char,
}

/// Parameters for `rest_make_call`.
///
/// `body` may be null for a GET. `expectation` uses the tags 0..=4
/// (structured data, raw bytes, plain text, ignore, token). `accepted`
/// holds result-code values such as 200 or 404.
#[repr(C)]
pub struct FfiCallParams {
    pub url: *const c_char,
    pub body: *const u8,
    pub body_len: usize,
    pub content_type: *const c_char,
    pub expectation: u32,
    pub headers: *const FfiHeader,
    pub headers_len: usize,
    pub accepted: *const i32,
    pub accepted_len: usize,
}

/// Read a borrowed C string; null and invalid UTF-8 read as empty.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
pub(crate) unsafe fn str_arg<'a>(ptr: *const c_char) -> &'a str {
    if ptr.is_null() {
        return "";
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().unwrap_or("")
}

/// # Safety
/// `headers` must be null or point to `len` valid `FfiHeader` values.
pub(crate) unsafe fn headers_arg(
    headers: *const FfiHeader,
    len: usize,
) -> BTreeMap<String, Option<String>> {
    if headers.is_null() || len == 0 {
        return BTreeMap::new();
    }
    let entries = unsafe { std::slice::from_raw_parts(headers, len) };
    entries
        .iter()
        .filter(|h| !h.key.is_null())
        .map(|h| {
            let key = unsafe { str_arg(h.key) }.to_string();
            let value = (!h.value.is_null()).then(|| unsafe { str_arg(h.value) }.to_string());
            (key, value)
        })
        .collect()
}

/// Convert C call parameters. Returns `None` when the expectation tag is unknown.
///
/// # Safety
/// Every pointer in `params` must be null or valid for its stated length.
pub(crate) unsafe fn call_params(params: &FfiCallParams) -> Option<CallParams> {
    let expectation = ResponseExpectation::from_tag(params.expectation)?;
    let mut call = CallParams::new(unsafe { str_arg(params.url) }).expect(expectation);
    call.headers = unsafe { headers_arg(params.headers, params.headers_len) };

    if !params.body.is_null() {
        let bytes = unsafe { std::slice::from_raw_parts(params.body, params.body_len) }.to_vec();
        let content_type = match unsafe { str_arg(params.content_type) } {
            "" => "application/octet-stream",
            declared => declared,
        };
        call = call.body(RequestBody::bytes(content_type, bytes));
    }

    let accepted: &[i32] = if params.accepted.is_null() {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(params.accepted, params.accepted_len) }
    };
    Some(call.accept(accepted.iter().filter_map(|v| ResultCode::from_value(*v))))
}

// ---------------------------------------------------------------------------
// Output (Rust-owned)
// ---------------------------------------------------------------------------

/// Result of one call.
///
/// `code` is a result-code value (-2 connectivity, -1 transport error,
/// 200, 400, 401, 403, 404). At most one of `text` / `bytes` is non-null,
/// and only when `code` is 200. `text` is null if the decoded text contains
/// an interior NUL byte.
#[repr(C)]
pub struct FfiResultValue {
    pub code: i32,
    pub text: *mut c_char,
    pub bytes: *mut u8,
    pub bytes_len: usize,
}

impl FfiResultValue {
    pub(crate) fn from_core(value: ResultValue) -> *mut Self {
        let (code, payload) = value.into_parts();
        let mut result = FfiResultValue {
            code: code.value(),
            text: std::ptr::null_mut(),
            bytes: std::ptr::null_mut(),
            bytes_len: 0,
        };
        match payload {
            Payload::None => {}
            Payload::Text(text) => {
                result.text = CString::new(text)
                    .map(CString::into_raw)
                    .unwrap_or(std::ptr::null_mut());
            }
            Payload::Bytes(bytes) => {
                let boxed = bytes.into_boxed_slice();
                result.bytes_len = boxed.len();
                result.bytes = Box::into_raw(boxed) as *mut u8;
            }
        }
        Box::into_raw(Box::new(result))
    }

    pub(crate) fn with_code(code: ResultCode) -> *mut Self {
        Self::from_core(ResultValue::with_code(code))
    }

    /// Free the payload and the struct itself.
    ///
    /// # Safety
    /// `ptr` must come from `from_core` and not have been freed.
    pub(crate) unsafe fn free(ptr: *mut Self) {
        let result = unsafe { Box::from_raw(ptr) };
        if !result.text.is_null() {
            drop(unsafe { CString::from_raw(result.text) });
        }
        if !result.bytes.is_null() {
            let slice = std::ptr::slice_from_raw_parts_mut(result.bytes, result.bytes_len);
            drop(unsafe { Box::from_raw(slice) });
        }
    }
}
