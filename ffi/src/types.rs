//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! tagged enums with explicit discriminants. Conversion functions live here
//! to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use mantle_core::{HttpRequest, MantleError, RemoteBody};

/// Opaque handle to a validated configuration. C callers receive a pointer
/// to this and pass it back into every FFI function.
pub struct FfiMantleConfig {
    pub(crate) inner: mantle_core::MantleClient,
}

/// Move `s` into a heap C string. Interior NULs yield an empty string.
pub(crate) fn c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// The form POST to execute, as C-compatible plain data. The method is
/// always POST.
#[repr(C)]
pub struct FfiHttpRequest {
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            url: c_string(req.url),
            headers,
            headers_len,
            body: c_string(req.body),
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this after executing the request, then passes a
/// pointer to `mantle_parse_response`. The FFI layer reads but does not free
/// these fields. `body` points to `body_len` bytes, which need not be UTF-8
/// or NUL-terminated. A null `body` is read as an empty body.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const u8,
    pub body_len: usize,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiMantleResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    EmptyRequest = 1,
    MissingCredentials = 2,
    InvalidCredentials = 3,
    MissingRequestData = 4,
    UnknownEndpoint = 5,
    UnresolvedTarget = 6,
    Transport = 7,
    Remote = 8,
    EmptyResponse = 9,
    Decode = 10,
    Panic = 11,
    NullArg = 12,
}

/// Tag that tells `mantle_free_result` what `FfiMantleResult::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    /// `data` is an `FfiHttpRequest`.
    Request = 1,
    /// `data` is a C string holding the decoded body re-encoded as JSON.
    Structured = 2,
    /// `data` points to `data_len` bytes: the body exactly as received.
    Raw = 3,
}

/// Result envelope for build and parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the payload (tagged by `data_tag`). `data_len` is the payload
/// size in bytes for `Structured` (excluding the NUL) and `Raw`, else 0.
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, and `data` is null.
#[repr(C)]
pub struct FfiMantleResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut std::ffi::c_void,
    pub data_len: usize,
}

impl FfiMantleResult {
    fn boxed(
        error_code: FfiErrorCode,
        error_message: *mut c_char,
        http_status: u16,
        data_tag: FfiDataTag,
        data: *mut std::ffi::c_void,
        data_len: usize,
    ) -> *mut Self {
        Box::into_raw(Box::new(FfiMantleResult {
            error_code,
            error_message,
            http_status,
            data_tag,
            data,
            data_len,
        }))
    }

    /// Build a success result carrying the request to execute.
    pub(crate) fn ok_request(req: HttpRequest) -> *mut Self {
        let data = FfiHttpRequest::from_core(req) as *mut std::ffi::c_void;
        Self::boxed(
            FfiErrorCode::Ok,
            std::ptr::null_mut(),
            0,
            FfiDataTag::Request,
            data,
            0,
        )
    }

    /// Build a success result carrying the API answer.
    pub(crate) fn ok_body(body: RemoteBody) -> *mut Self {
        let (tag, data, data_len) = match body {
            RemoteBody::Structured(value) => {
                let text = value.to_string();
                let len = text.len();
                (FfiDataTag::Structured, c_string(text) as *mut std::ffi::c_void, len)
            }
            RemoteBody::Raw(body) => {
                let len = body.len();
                let bytes = Box::into_raw(body.into_boxed_slice()) as *mut u8;
                (FfiDataTag::Raw, bytes as *mut std::ffi::c_void, len)
            }
        };
        Self::boxed(
            FfiErrorCode::Ok,
            std::ptr::null_mut(),
            200,
            tag,
            data,
            data_len,
        )
    }

    /// Build an error result from a `MantleError`.
    pub(crate) fn from_error(err: MantleError) -> *mut Self {
        let (error_code, http_status) = match &err {
            MantleError::EmptyRequest => (FfiErrorCode::EmptyRequest, 0),
            MantleError::MissingCredentials => (FfiErrorCode::MissingCredentials, 0),
            MantleError::InvalidCredentials { .. } => (FfiErrorCode::InvalidCredentials, 0),
            MantleError::MissingRequestData => (FfiErrorCode::MissingRequestData, 0),
            MantleError::UnknownEndpoint(_) => (FfiErrorCode::UnknownEndpoint, 0),
            MantleError::UnresolvedTarget => (FfiErrorCode::UnresolvedTarget, 0),
            MantleError::Transport(_) => (FfiErrorCode::Transport, 0),
            MantleError::Remote { code } => (FfiErrorCode::Remote, *code),
            MantleError::EmptyResponse => (FfiErrorCode::EmptyResponse, 200),
            MantleError::Decode(_) => (FfiErrorCode::Decode, 200),
        };
        Self::boxed(
            error_code,
            c_string(err.to_string()),
            http_status,
            FfiDataTag::None,
            std::ptr::null_mut(),
            0,
        )
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::NullArg,
            c_string(format!("null argument: {name}")),
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
            0,
        )
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::boxed(
            FfiErrorCode::Panic,
            c_string(msg),
            0,
            FfiDataTag::None,
            std::ptr::null_mut(),
            0,
        )
    }
}
