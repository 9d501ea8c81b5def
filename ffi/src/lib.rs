//! C-ABI wrapper around `mantle-core`.
//!
//! # Overview
//! Lets a host written in any language with a C FFI forward admin-panel
//! requests to Luminate Online without linking an HTTP stack into Rust: the
//! library builds the POST, the host executes it, the library interprets the
//! answer.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - A single `FfiMantleResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `mantle_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use mantle_core::config::{
    API_KEY_KEY, API_VERSION_KEY, HOST_NAME_KEY, LOGIN_NAME_KEY, LOGIN_PASSWORD_KEY,
    RESPONSE_FORMAT_KEY, SHORT_NAME_KEY,
};
use mantle_core::{
    HttpResponse, MantleClient, MantleConfig, RemoteBody, Reply, RequestEnvelope, Settings,
};
use serde_json::Value;

use types::*;

/// Copy a borrowed C string. Null reads as `None`; invalid UTF-8 is replaced.
fn read_c_str(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

/// Copy `len` borrowed bytes. Null or zero length reads as empty.
fn read_bytes(ptr: *const u8, len: usize) -> Vec<u8> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    unsafe { std::slice::from_raw_parts(ptr, len) }.to_vec()
}

// ---------------------------------------------------------------------------
// Config lifecycle
// ---------------------------------------------------------------------------

/// Validate credentials and create a config handle.
///
/// `api_version` and `response_format` may be null to use the defaults
/// (`1.0`, structured decoding). Returns null if a credential is null or
/// blank, or if an internal panic occurs. The caller must free the returned
/// pointer with `mantle_config_free`.
#[unsafe(no_mangle)]
pub extern "C" fn mantle_config_new(
    host_name: *const c_char,
    short_name: *const c_char,
    api_key: *const c_char,
    login_name: *const c_char,
    login_password: *const c_char,
    api_version: *const c_char,
    response_format: *const c_char,
) -> *mut FfiMantleConfig {
    catch_unwind(|| {
        let fields = [
            (HOST_NAME_KEY, host_name),
            (SHORT_NAME_KEY, short_name),
            (API_KEY_KEY, api_key),
            (LOGIN_NAME_KEY, login_name),
            (LOGIN_PASSWORD_KEY, login_password),
            (API_VERSION_KEY, api_version),
            (RESPONSE_FORMAT_KEY, response_format),
        ];
        let settings: Settings = fields
            .into_iter()
            .filter_map(|(key, ptr)| read_c_str(ptr).map(|value| (key.to_string(), value)))
            .collect();
        match MantleConfig::from_settings(&settings) {
            Ok(config) => Box::into_raw(Box::new(FfiMantleConfig {
                inner: MantleClient::new(config),
            })),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a config created by `mantle_config_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn mantle_config_free(config: *mut FfiMantleConfig) {
    if !config.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(config) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build / parse
// ---------------------------------------------------------------------------

/// Build the POST for a form-encoded request such as
/// `servlet=cons&method=getUser&cons_id=42`.
///
/// A null `data` is an empty envelope (`EmptyRequest`); an empty string is
/// an envelope without request data (`MissingRequestData`). On success
/// `data_tag = Request` and `data` points to an `FfiHttpRequest`.
#[unsafe(no_mangle)]
pub extern "C" fn mantle_build_request(
    config: *const FfiMantleConfig,
    data: *const c_char,
) -> *mut FfiMantleResult {
    catch_unwind(|| {
        if config.is_null() {
            return FfiMantleResult::null_arg("config");
        }
        let config = unsafe { &*config };
        let envelope = match read_c_str(data) {
            Some(data) => RequestEnvelope::from_data(data),
            None => RequestEnvelope::new(),
        };
        match config.inner.build_call(&envelope) {
            Ok(req) => FfiMantleResult::ok_request(req),
            Err(e) => FfiMantleResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiMantleResult::panic("panic in mantle_build_request"))
}

/// Interpret the response the host received for a request built by
/// `mantle_build_request`.
///
/// Returns `data_tag = Structured` (JSON text) or `Raw` (body bytes as
/// received, `data_len` long) depending on the configured response format.
#[unsafe(no_mangle)]
pub extern "C" fn mantle_parse_response(
    config: *const FfiMantleConfig,
    response: *const FfiHttpResponse,
) -> *mut FfiMantleResult {
    catch_unwind(|| {
        if config.is_null() {
            return FfiMantleResult::null_arg("config");
        }
        if response.is_null() {
            return FfiMantleResult::null_arg("response");
        }
        let config = unsafe { &*config };
        let resp = unsafe { &*response };
        let core_resp = HttpResponse {
            status: resp.status,
            headers: Vec::new(),
            body: read_bytes(resp.body, resp.body_len),
        };
        match config.inner.parse_response(core_resp) {
            Ok(body) => FfiMantleResult::ok_body(body),
            Err(e) => FfiMantleResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiMantleResult::panic("panic in mantle_parse_response"))
}

/// Render a parse or error result as the admin-panel reply
/// `{"success":true,"data":...}` / `{"success":false,"data":"message"}`.
///
/// Returns null for null input and for successful build results, which
/// carry a request rather than an answer. Free with `mantle_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn mantle_reply_json(result: *const FfiMantleResult) -> *mut c_char {
    catch_unwind(|| {
        if result.is_null() {
            return std::ptr::null_mut();
        }
        let result = unsafe { &*result };
        let reply = match (result.error_code, result.data_tag) {
            (FfiErrorCode::Ok, FfiDataTag::Structured) => {
                let text = read_c_str(result.data as *const c_char).unwrap_or_default();
                Reply {
                    success: true,
                    data: serde_json::from_str(&text).unwrap_or(Value::Null),
                }
            }
            (FfiErrorCode::Ok, FfiDataTag::Raw) => {
                let body = read_bytes(result.data as *const u8, result.data_len);
                Reply::success(RemoteBody::Raw(body))
            }
            (FfiErrorCode::Ok, _) => return std::ptr::null_mut(),
            _ => Reply {
                success: false,
                data: Value::String(read_c_str(result.error_message).unwrap_or_default()),
            },
        };
        match serde_json::to_string(&reply) {
            Ok(json) => c_string(json),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` and the strings it owns.
fn free_request(req: *mut FfiHttpRequest) {
    let req = unsafe { Box::from_raw(req) };
    if !req.url.is_null() {
        drop(unsafe { CString::from_raw(req.url) });
    }
    if !req.body.is_null() {
        drop(unsafe { CString::from_raw(req.body) });
    }
    if !req.headers.is_null() && req.headers_len > 0 {
        let headers = unsafe {
            Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                req.headers,
                req.headers_len as usize,
            ))
        };
        for h in headers.iter() {
            if !h.key.is_null() {
                drop(unsafe { CString::from_raw(h.key) });
            }
            if !h.value.is_null() {
                drop(unsafe { CString::from_raw(h.value) });
            }
        }
    }
}

/// Free an `FfiMantleResult` returned by `mantle_build_request` or
/// `mantle_parse_response`, including its payload. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn mantle_free_result(result: *mut FfiMantleResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.data.is_null() {
            match result.data_tag {
                FfiDataTag::Request => free_request(result.data as *mut FfiHttpRequest),
                FfiDataTag::Structured => {
                    drop(unsafe { CString::from_raw(result.data as *mut c_char) });
                }
                FfiDataTag::Raw => {
                    drop(unsafe {
                        Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                            result.data as *mut u8,
                            result.data_len,
                        ))
                    });
                }
                FfiDataTag::None => {}
            }
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn mantle_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
