//! Client core for the IBM Cloud Databases v5 management API.
//!
//! # Overview
//! Every API call is one row in the operation table (`operation.rs`). The
//! stateless `CloudDatabasesClient` turns a row plus `CallParameters` into an
//! `HttpRequest`; `CloudDatabasesV5` hands that request to an injected
//! `Executor` and returns the response untouched.
//!
//! # Design
//! - No I/O in this crate. Transport, authentication and retries sit behind
//!   the `Executor` trait (host-does-IO pattern).
//! - Required parameters are checked before anything is built; a missing one
//!   fails the call without reaching the executor.
//! - Header precedence: client defaults < SDK headers < operation media types
//!   < header parameters (`If-Match`) < caller headers.
//! - Paths, methods and JSON keys match the backend byte-for-byte, including
//!   its irregular cases (the unwrapped scaling-group body, the `Promotion`
//!   key).
//! - Typed models in `types` are optional; parameters and responses are
//!   plain JSON underneath.

pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod http;
pub mod operation;
pub mod params;
pub mod service;
pub mod types;

pub use client::CloudDatabasesClient;
pub use config::{service_url_for_region, ClientConfig, DEFAULT_SERVICE_NAME, DEFAULT_SERVICE_URL};
pub use error::ApiError;
pub use executor::Executor;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use operation::{Body, OperationSpec, OPERATIONS};
pub use params::CallParameters;
pub use service::CloudDatabasesV5;
pub use types::{AllowlistEntry, Task, TaskResponse};
