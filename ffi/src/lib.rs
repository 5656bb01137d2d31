//! C-ABI wrapper around `rest-core`.
//!
//! # Overview
//! Exposes the blocking REST facade through `extern "C"` functions so a host
//! application can run calls from its own worker thread and receive the
//! classified result as plain data or through a completion callback.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Inputs are borrowed; the only Rust-owned output is `FfiResultValue`,
//!   released with `rest_free_result`. Results handed to a callback are
//!   borrowed for the duration of the callback and freed afterwards.
//! - Calls block. `rest_get` invokes its callback exactly once before
//!   returning, on the calling thread.

pub mod types;

use std::os::raw::{c_char, c_void};
use std::panic::{catch_unwind, AssertUnwindSafe};

use rest_core::{ClientConfig, ResponseExpectation, ResultCode, RestClient};

use types::*;

/// Completion callback for `rest_get`. `result` is only valid during the call.
pub type FfiResultCallback = extern "C" fn(result: *const FfiResultValue, user_data: *mut c_void);

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client with the default configuration.
///
/// The caller must free the returned pointer with `rest_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn rest_client_new() -> *mut FfiRestClient {
    catch_unwind(|| {
        let inner = RestClient::from_config(&ClientConfig::default());
        Box::into_raw(Box::new(FfiRestClient { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Create a client from a JSON configuration such as `{"timeout_ms": 5000}`.
///
/// A null `config_json` uses the defaults. Returns null if the JSON is
/// malformed or names an unknown field.
#[unsafe(no_mangle)]
pub extern "C" fn rest_client_new_with_config(config_json: *const c_char) -> *mut FfiRestClient {
    catch_unwind(|| {
        let config = if config_json.is_null() {
            ClientConfig::default()
        } else {
            match ClientConfig::from_json(unsafe { str_arg(config_json) }) {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!(error = %err, "rejecting client configuration");
                    return std::ptr::null_mut();
                }
            }
        };
        let inner = RestClient::from_config(&config);
        Box::into_raw(Box::new(FfiRestClient { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `rest_client_new*`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn rest_client_free(client: *mut FfiRestClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Calls
// ---------------------------------------------------------------------------

/// Run one call and return its classified result.
///
/// Returns null if `client` or `params` is null. An unknown expectation tag
/// yields a result with code -1. The caller must free the result with
/// `rest_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn rest_make_call(
    client: *const FfiRestClient,
    params: *const FfiCallParams,
) -> *mut FfiResultValue {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() || params.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match unsafe { call_params(&*params) } {
            Some(call) => FfiResultValue::from_core(client.inner.make_call(&call)),
            None => FfiResultValue::with_code(ResultCode::TransportError),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Fetch `url`, accepting only 200, and report through `callback`.
///
/// `callback` runs exactly once before this function returns. A null
/// `client` or an unknown `expectation` tag reports code -1; a null `url`
/// is sent as the empty string and fails in the transport.
#[unsafe(no_mangle)]
pub extern "C" fn rest_get(
    client: *const FfiRestClient,
    url: *const c_char,
    expectation: u32,
    headers: *const FfiHeader,
    headers_len: usize,
    callback: Option<FfiResultCallback>,
    user_data: *mut c_void,
) {
    let result = catch_unwind(AssertUnwindSafe(|| {
        let expectation = ResponseExpectation::from_tag(expectation);
        match (client.is_null(), expectation) {
            (false, Some(expectation)) => {
                let client = unsafe { &*client };
                let url = unsafe { str_arg(url) };
                let headers = unsafe { headers_arg(headers, headers_len) };
                let mut outcome = None;
                client
                    .inner
                    .get_with(url, expectation, Some(&headers), |value| outcome = Some(value));
                outcome.map_or_else(
                    || FfiResultValue::with_code(ResultCode::TransportError),
                    FfiResultValue::from_core,
                )
            }
            _ => FfiResultValue::with_code(ResultCode::TransportError),
        }
    }))
    .unwrap_or_else(|_| FfiResultValue::with_code(ResultCode::TransportError));

    if let Some(callback) = callback {
        callback(result, user_data);
    }
    unsafe { FfiResultValue::free(result) };
}

/// Post `status` as plain text to `url`. The outcome is discarded.
#[unsafe(no_mangle)]
pub extern "C" fn rest_post(client: *const FfiRestClient, url: *const c_char, status: *const c_char) {
    let _ = catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return;
        }
        let client = unsafe { &*client };
        client
            .inner
            .post(unsafe { str_arg(url) }, unsafe { str_arg(status) });
    }));
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a result returned by `rest_make_call`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn rest_free_result(result: *mut FfiResultValue) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| unsafe { FfiResultValue::free(result) }));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::{CStr, CString};
    use std::net::SocketAddr;

    fn start_server() -> SocketAddr {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                mock_server::run(listener).await
            })
            .unwrap();
        });
        addr
    }

    fn params(url: &CString, expectation: u32, accepted: &[i32]) -> FfiCallParams {
        FfiCallParams {
            url: url.as_ptr(),
            body: std::ptr::null(),
            body_len: 0,
            content_type: std::ptr::null(),
            expectation,
            headers: std::ptr::null(),
            headers_len: 0,
            accepted: accepted.as_ptr(),
            accepted_len: accepted.len(),
        }
    }

    /// Callback state: how many times it ran and what it saw.
    #[derive(Default)]
    struct Seen {
        calls: u32,
        code: i32,
        text: Option<String>,
    }

    extern "C" fn record(result: *const FfiResultValue, user_data: *mut c_void) {
        let seen = unsafe { &mut *(user_data as *mut Seen) };
        let result = unsafe { &*result };
        seen.calls += 1;
        seen.code = result.code;
        seen.text = (!result.text.is_null())
            .then(|| unsafe { CStr::from_ptr(result.text) }.to_str().unwrap().to_string());
    }

    #[test]
    fn client_new_and_free() {
        let client = rest_client_new();
        assert!(!client.is_null());
        rest_client_free(client);
    }

    #[test]
    fn client_from_config_json() {
        let json = CString::new(r#"{"timeout_ms":500,"max_redirects":2}"#).unwrap();
        let client = rest_client_new_with_config(json.as_ptr());
        assert!(!client.is_null());
        rest_client_free(client);
    }

    #[test]
    fn client_from_bad_config_returns_null() {
        let json = CString::new(r#"{"retries":3}"#).unwrap();
        assert!(rest_client_new_with_config(json.as_ptr()).is_null());
    }

    #[test]
    fn client_free_null_is_safe() {
        rest_client_free(std::ptr::null_mut());
    }

    #[test]
    fn make_call_null_args_return_null() {
        let url = CString::new("http://localhost").unwrap();
        let p = params(&url, 0, &[200]);
        assert!(rest_make_call(std::ptr::null(), &p).is_null());

        let client = rest_client_new();
        assert!(rest_make_call(client, std::ptr::null()).is_null());
        rest_client_free(client);
    }

    #[test]
    fn make_call_raw_bytes() {
        let addr = start_server();
        let client = rest_client_new();
        let url = CString::new(format!("http://{addr}/bytes/3")).unwrap();
        let result = rest_make_call(client, &params(&url, 1, &[200]));
        assert!(!result.is_null());

        let r = unsafe { &*result };
        assert_eq!(r.code, 200);
        assert!(r.text.is_null());
        let bytes = unsafe { std::slice::from_raw_parts(r.bytes, r.bytes_len) };
        assert_eq!(bytes, &[0, 1, 2]);

        rest_free_result(result);
        rest_client_free(client);
    }

    #[test]
    fn make_call_not_found_has_no_payload() {
        let addr = start_server();
        let client = rest_client_new();
        let url = CString::new(format!("http://{addr}/status/404")).unwrap();
        let result = rest_make_call(client, &params(&url, 0, &[200, 404]));

        let r = unsafe { &*result };
        assert_eq!(r.code, 404);
        assert!(r.text.is_null());
        assert!(r.bytes.is_null());

        rest_free_result(result);
        rest_client_free(client);
    }

    #[test]
    fn make_call_unknown_expectation_is_transport_error() {
        let client = rest_client_new();
        let url = CString::new("http://localhost").unwrap();
        let result = rest_make_call(client, &params(&url, 99, &[200]));
        assert_eq!(unsafe { &*result }.code, -1);
        rest_free_result(result);
        rest_client_free(client);
    }

    #[test]
    fn make_call_posts_body() {
        let addr = start_server();
        let client = rest_client_new();
        let url = CString::new(format!("http://{addr}/status")).unwrap();
        let content_type = CString::new("text/plain; charset=utf-8").unwrap();
        let body = b"busy";
        let mut p = params(&url, 3, &[200]);
        p.body = body.as_ptr();
        p.body_len = body.len();
        p.content_type = content_type.as_ptr();

        let result = rest_make_call(client, &p);
        assert_eq!(unsafe { &*result }.code, 200);
        rest_free_result(result);

        let get = rest_make_call(client, &params(&url, 2, &[200]));
        let text = unsafe { CStr::from_ptr((*get).text) }.to_str().unwrap();
        assert_eq!(text, "busy");
        rest_free_result(get);
        rest_client_free(client);
    }

    #[test]
    fn get_invokes_callback_once_with_headers() {
        let addr = start_server();
        let client = rest_client_new();
        let url = CString::new(format!("http://{addr}/headers/x-app")).unwrap();
        let key = CString::new("x-app").unwrap();
        let value = CString::new("ffi").unwrap();
        let skipped = CString::new("x-none").unwrap();
        let headers = [
            FfiHeader {
                key: key.as_ptr(),
                value: value.as_ptr(),
            },
            FfiHeader {
                key: skipped.as_ptr(),
                value: std::ptr::null(),
            },
        ];

        let mut seen = Seen::default();
        rest_get(
            client,
            url.as_ptr(),
            2,
            headers.as_ptr(),
            headers.len(),
            Some(record),
            &mut seen as *mut Seen as *mut c_void,
        );
        assert_eq!(seen.calls, 1);
        assert_eq!(seen.code, 200);
        assert_eq!(seen.text.as_deref(), Some("ffi"));
        rest_client_free(client);
    }

    #[test]
    fn get_with_null_client_still_calls_back() {
        let mut seen = Seen::default();
        rest_get(
            std::ptr::null(),
            std::ptr::null(),
            0,
            std::ptr::null(),
            0,
            Some(record),
            &mut seen as *mut Seen as *mut c_void,
        );
        assert_eq!(seen.calls, 1);
        assert_eq!(seen.code, -1);
    }

    #[test]
    fn get_with_null_url_is_transport_error() {
        let client = rest_client_new();
        let mut seen = Seen::default();
        rest_get(
            client,
            std::ptr::null(),
            0,
            std::ptr::null(),
            0,
            Some(record),
            &mut seen as *mut Seen as *mut c_void,
        );
        assert_eq!(seen.calls, 1);
        assert_eq!(seen.code, -1);
        rest_client_free(client);
    }

    #[test]
    fn post_with_null_client_is_safe() {
        let url = CString::new("http://localhost").unwrap();
        let status = CString::new("idle").unwrap();
        rest_post(std::ptr::null(), url.as_ptr(), status.as_ptr());
    }

    #[test]
    fn free_result_null_is_safe() {
        rest_free_result(std::ptr::null_mut());
    }
}
