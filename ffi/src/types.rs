//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Conversions live here so `lib.rs`
//! stays focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use cloud_databases_core::{ApiError, CloudDatabasesClient, HttpMethod, HttpRequest};

/// Opaque handle to a `CloudDatabasesClient`. C callers receive a pointer to
/// this and pass it back into every FFI function.
pub struct FfiClient {
    pub(crate) inner: CloudDatabasesClient,
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
    Patch = 4,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
            HttpMethod::Patch => FfiHttpMethod::Patch,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// `url` is the complete URL including the encoded query string. `body` is
/// null for operations without one.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

fn c_string(s: String, what: &str) -> Result<CString, ApiError> {
    CString::new(s).map_err(|_| ApiError::InvalidParameter {
        name: what.to_string(),
        reason: "contains an interior NUL byte".to_string(),
    })
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    ///
    /// Every string is validated before anything is handed out, so an
    /// error leaves nothing to free.
    pub(crate) fn from_core(req: HttpRequest) -> Result<*mut Self, ApiError> {
        let url = c_string(req.url(), "url")?;
        let body = req.body.map(|b| c_string(b, "body")).transpose()?;
        let headers = req
            .headers
            .into_iter()
            .map(|(k, v)| Ok((c_string(k, "header name")?, c_string(v, "header value")?)))
            .collect::<Result<Vec<_>, ApiError>>()?;

        let headers_len = headers.len() as u32;
        let headers = if headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: k.into_raw(),
                    value: v.into_raw(),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        let ffi_req = Box::new(FfiHttpRequest {
            method: req.method.into(),
            url: url.into_raw(),
            headers,
            headers_len,
            body: body.map_or(std::ptr::null_mut(), CString::into_raw),
        });
        Ok(Box::into_raw(ffi_req))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this after executing a request and passes a
/// pointer to `cdb_check_response`. The FFI layer reads but does not free
/// these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiBuildResult` and `FfiResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    NotFound = 1,
    Http = 2,
    Deserialization = 3,
    Serialization = 4,
    Panic = 5,
    NullArg = 6,
    MissingParameters = 7,
    InvalidParameter = 8,
    UnknownOperation = 9,
    Transport = 10,
}

impl FfiErrorCode {
    /// Error code and HTTP status for a core error.
    fn classify(err: &ApiError) -> (Self, u16) {
        match err {
            ApiError::MissingParameters(_) => (FfiErrorCode::MissingParameters, 0),
            ApiError::InvalidParameter { .. } => (FfiErrorCode::InvalidParameter, 0),
            ApiError::UnknownOperation(_) => (FfiErrorCode::UnknownOperation, 0),
            ApiError::NotFound => (FfiErrorCode::NotFound, 404),
            ApiError::HttpError { status, .. } => (FfiErrorCode::Http, *status),
            ApiError::DeserializationError(_) => (FfiErrorCode::Deserialization, 0),
            ApiError::SerializationError(_) => (FfiErrorCode::Serialization, 0),
            ApiError::Transport(_) => (FfiErrorCode::Transport, 0),
        }
    }
}

/// Messages are produced by this crate; a stray NUL is replaced rather than
/// losing the whole message.
fn message(msg: &str) -> *mut c_char {
    CString::new(msg.replace('\0', " "))
        .unwrap_or_default()
        .into_raw()
}

/// Result of `cdb_build_request`.
///
/// On success `error_code` is `Ok`, `error_message` is null and `request`
/// points to the built request. On failure `request` is null and
/// `error_message` is a human-readable C string.
#[repr(C)]
pub struct FfiBuildResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub request: *mut FfiHttpRequest,
}

impl FfiBuildResult {
    pub(crate) fn ok(request: *mut FfiHttpRequest) -> *mut Self {
        Box::into_raw(Box::new(FfiBuildResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            request,
        }))
    }

    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let (error_code, _) = FfiErrorCode::classify(&err);
        Self::failure(error_code, &err.to_string())
    }

    pub(crate) fn failure(error_code: FfiErrorCode, msg: &str) -> *mut Self {
        Box::into_raw(Box::new(FfiBuildResult {
            error_code,
            error_message: message(msg),
            request: std::ptr::null_mut(),
        }))
    }
}

/// Result of `cdb_check_response`.
///
/// On success `body` holds a copy of the response body. On failure
/// `http_status` carries the status for `NotFound` and `Http` errors.
#[repr(C)]
pub struct FfiResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub body: *mut c_char,
}

impl FfiResult {
    pub(crate) fn ok(status: u16, body: String) -> *mut Self {
        Box::into_raw(Box::new(FfiResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: status,
            body: message(&body),
        }))
    }

    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let (error_code, http_status) = FfiErrorCode::classify(&err);
        Box::into_raw(Box::new(FfiResult {
            error_code,
            error_message: message(&err.to_string()),
            http_status,
            body: std::ptr::null_mut(),
        }))
    }

    pub(crate) fn failure(error_code: FfiErrorCode, msg: &str) -> *mut Self {
        Box::into_raw(Box::new(FfiResult {
            error_code,
            error_message: message(msg),
            http_status: 0,
            body: std::ptr::null_mut(),
        }))
    }
}
