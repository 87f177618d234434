//! C-ABI wrapper around `cloud-databases-core`.
//!
//! # Overview
//! Exposes the request builder through `extern "C"` functions so any
//! language with a C FFI can build Cloud Databases requests and check
//! responses without linking an async runtime. The host performs the HTTP
//! round-trip itself.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - One generic `cdb_build_request` takes the operation name and its
//!   parameters as a JSON object, mirroring the core operation table rather
//!   than exporting 28 near-identical functions.
//! - The C caller owns all returned pointers and must call the matching
//!   `cdb_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use cloud_databases_core::operation::{self, OPERATIONS};
use cloud_databases_core::{ApiError, CallParameters, CloudDatabasesClient, HttpResponse};

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new client bound to `service_url`.
///
/// Returns null if `service_url` is null, not UTF-8, or if an internal panic
/// occurs. The caller must free the returned pointer with `cdb_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn cdb_client_new(service_url: *const c_char) -> *mut FfiClient {
    catch_unwind(|| {
        if service_url.is_null() {
            return std::ptr::null_mut();
        }
        let Ok(url) = unsafe { CStr::from_ptr(service_url) }.to_str() else {
            return std::ptr::null_mut();
        };
        let client = CloudDatabasesClient::new(url);
        Box::into_raw(Box::new(FfiClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `cdb_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn cdb_client_free(client: *mut FfiClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Operation discovery
// ---------------------------------------------------------------------------

/// Number of operations `cdb_build_request` accepts.
#[unsafe(no_mangle)]
pub extern "C" fn cdb_operation_count() -> u32 {
    OPERATIONS.len() as u32
}

/// Name of the operation at `index`, e.g. `"getDeploymentInfo"`.
///
/// Returns null when `index` is out of range. Free with `cdb_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn cdb_operation_name(index: u32) -> *mut c_char {
    catch_unwind(|| match OPERATIONS.get(index as usize) {
        Some(spec) => CString::new(spec.name).map_or(std::ptr::null_mut(), CString::into_raw),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Request building
// ---------------------------------------------------------------------------

fn read_str<'a>(ptr: *const c_char, name: &str) -> Result<&'a str, ApiError> {
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| ApiError::InvalidParameter {
            name: name.to_string(),
            reason: "not valid UTF-8".to_string(),
        })
}

fn build(client: &FfiClient, operation: &str, params_json: Option<&str>) -> Result<*mut FfiHttpRequest, ApiError> {
    let spec = operation::find(operation).ok_or_else(|| ApiError::UnknownOperation(operation.to_string()))?;
    let value = match params_json {
        None => serde_json::Value::Null,
        Some(raw) if raw.trim().is_empty() => serde_json::Value::Null,
        Some(raw) => serde_json::from_str(raw).map_err(|e| ApiError::InvalidParameter {
            name: "params".to_string(),
            reason: e.to_string(),
        })?,
    };
    let params = CallParameters::from_json(value)?;
    let request = client.inner.build(spec, &params)?;
    FfiHttpRequest::from_core(request)
}

/// Build the request for `operation` with parameters given as a JSON object.
///
/// `params_json` may be null for operations without required parameters.
/// A top-level `"headers"` object in it supplies caller header overrides.
/// Always returns a result; free it with `cdb_free_build_result`.
#[unsafe(no_mangle)]
pub extern "C" fn cdb_build_request(
    client: *const FfiClient,
    operation: *const c_char,
    params_json: *const c_char,
) -> *mut FfiBuildResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiBuildResult::failure(FfiErrorCode::NullArg, "null argument: client");
        }
        if operation.is_null() {
            return FfiBuildResult::failure(FfiErrorCode::NullArg, "null argument: operation");
        }
        let client = unsafe { &*client };
        let result = read_str(operation, "operation").and_then(|op| {
            let params = if params_json.is_null() {
                None
            } else {
                Some(read_str(params_json, "params")?)
            };
            build(client, op, params)
        });
        match result {
            Ok(request) => FfiBuildResult::ok(request),
            Err(e) => FfiBuildResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiBuildResult::failure(FfiErrorCode::Panic, "panic in cdb_build_request"))
}

// ---------------------------------------------------------------------------
// Response checking
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body is
/// treated as empty.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(resp.body) }.to_string_lossy().into_owned()
    };
    HttpResponse {
        status: resp.status,
        headers: Vec::new(),
        body,
    }
}

/// Check a response the host received.
///
/// 2xx yields `Ok` with a copy of the body; 404 yields `NotFound`; any other
/// status yields `Http` with the status and body in the message.
/// Free the result with `cdb_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn cdb_check_response(response: *const FfiHttpResponse) -> *mut FfiResult {
    catch_unwind(|| {
        if response.is_null() {
            return FfiResult::failure(FfiErrorCode::NullArg, "null argument: response");
        }
        let resp = ffi_response_to_core(unsafe { &*response });
        match resp.check_status() {
            Ok(()) => FfiResult::ok(resp.status, resp.body),
            Err(e) => FfiResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiResult::failure(FfiErrorCode::Panic, "panic in cdb_check_response"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

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
            Box::from_raw(std::ptr::slice_from_raw_parts_mut(req.headers, req.headers_len as usize))
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

/// Free an `FfiBuildResult` and the request it carries. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn cdb_free_build_result(result: *mut FfiBuildResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.request.is_null() {
            free_request(result.request);
        }
    });
}

/// Free an `FfiResult` returned by `cdb_check_response`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn cdb_free_result(result: *mut FfiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.body.is_null() {
            drop(unsafe { CString::from_raw(result.body) });
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn cdb_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
