//! Stateless request builder for the Cloud Databases v5 API.
//!
//! # Design
//! `CloudDatabasesClient` holds only configuration (service URL and default
//! headers) and carries no mutable state between calls. `build` turns an
//! `OperationSpec` plus `CallParameters` into an `HttpRequest`, and
//! `HttpResponse::json` decodes whatever the caller got back. The round-trip
//! itself is someone else's job: an `Executor` in `service.rs`, or the host
//! behind the FFI.

use serde_json::{Map, Value};

use crate::config::{ClientConfig, DEFAULT_SERVICE_NAME};
use crate::error::ApiError;
use crate::http::{encode_component, HttpRequest};
use crate::operation::{Body, OperationSpec};
use crate::params::{json_kind, CallParameters};

const SDK_NAME: &str = "cloud-databases-rust-sdk";
const SERVICE_VERSION: &str = "v5";

#[derive(Debug, Clone)]
pub struct CloudDatabasesClient {
    base_url: String,
    default_headers: Vec<(String, String)>,
}

impl CloudDatabasesClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            default_headers: Vec::new(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            default_headers: config.headers.clone(),
            ..Self::new(&config.service_url)
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the request descriptor for one call.
    ///
    /// Fails with `MissingParameters` before doing anything else when a
    /// required parameter is absent.
    pub fn build(&self, spec: &OperationSpec, params: &CallParameters) -> Result<HttpRequest, ApiError> {
        let missing = params.missing(spec.required);
        if !missing.is_empty() {
            return Err(ApiError::MissingParameters(missing));
        }

        Ok(HttpRequest {
            method: spec.method,
            endpoint: format!("{}{}", self.base_url, resolve_path(spec, params)?),
            query: build_query(spec, params),
            headers: self.merge_headers(spec, params),
            body: build_body(spec, params)?,
        })
    }

    /// Defaults, then SDK headers, then media types, then header parameters,
    /// then caller headers. Later entries replace earlier ones by name.
    fn merge_headers(&self, spec: &OperationSpec, params: &CallParameters) -> Vec<(String, String)> {
        let mut headers = Vec::new();
        for (name, value) in &self.default_headers {
            set_header(&mut headers, name, value);
        }
        for (name, value) in sdk_headers(spec) {
            set_header(&mut headers, name, &value);
        }
        set_header(&mut headers, "Accept", spec.accept);
        if let Some(content_type) = spec.content_type() {
            set_header(&mut headers, "Content-Type", content_type);
        }
        for (name, param) in spec.headers {
            if let Some(value) = params.get(param) {
                set_header(&mut headers, name, &scalar_text(value));
            }
        }
        for (name, value) in params.headers() {
            set_header(&mut headers, name, value);
        }
        headers
    }
}

fn sdk_headers(spec: &OperationSpec) -> [(&'static str, String); 2] {
    [
        (
            "User-Agent",
            format!("{SDK_NAME}/{} ({})", env!("CARGO_PKG_VERSION"), std::env::consts::OS),
        ),
        (
            "X-IBMCloud-SDK-Analytics",
            format!(
                "service_name={DEFAULT_SERVICE_NAME};service_version={SERVICE_VERSION};operation_id={}",
                spec.name
            ),
        ),
    ]
}

fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    headers.push((name.to_string(), value.to_string()));
}

fn resolve_path(spec: &OperationSpec, params: &CallParameters) -> Result<String, ApiError> {
    let mut path = spec.url.to_string();
    for (placeholder, param) in spec.path {
        // Presence was checked against `required` already.
        let Some(value) = params.get(param) else {
            return Err(ApiError::MissingParameters(vec![param.to_string()]));
        };
        let segment = match value {
            Value::String(s) => s.clone(),
            Value::Number(_) | Value::Bool(_) => value.to_string(),
            other => {
                return Err(ApiError::InvalidParameter {
                    name: param.to_string(),
                    reason: format!("path parameters must be scalar, got {}", json_kind(other)),
                })
            }
        };
        path = path.replace(&format!("{{{placeholder}}}"), &encode_component(&segment));
    }
    Ok(path)
}

fn build_query(spec: &OperationSpec, params: &CallParameters) -> Vec<(String, String)> {
    spec.query
        .iter()
        .filter_map(|(key, param)| params.get(param).map(|v| (key.to_string(), query_text(v))))
        .collect()
}

fn build_body(spec: &OperationSpec, params: &CallParameters) -> Result<Option<String>, ApiError> {
    let body = match spec.body {
        Body::None => return Ok(None),
        Body::Whole(param) => params.get(param).cloned().unwrap_or(Value::Null),
        Body::Fields(fields) => {
            let mut object = Map::new();
            for (key, param) in fields {
                if let Some(value) = params.get(param) {
                    object.insert(key.to_string(), value.clone());
                }
            }
            Value::Object(object)
        }
    };
    serde_json::to_string(&body)
        .map(Some)
        .map_err(|e| ApiError::SerializationError(e.to_string()))
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn query_text(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(scalar_text).collect::<Vec<_>>().join(","),
        other => scalar_text(other),
    }
}
