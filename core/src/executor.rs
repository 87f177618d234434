//! The transport seam.
//!
//! The core never performs I/O. Whoever owns the HTTP stack (a ureq or
//! hyper wrapper, a test double, a host application) implements `Executor`
//! and hands it to `CloudDatabasesV5`. Authentication, retries, timeouts and
//! TLS live behind this trait.

use std::future::Future;
use std::sync::Arc;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

pub trait Executor: Send + Sync {
    /// Execute one request. Non-2xx statuses are returned as responses, not
    /// errors; `Err` is reserved for failures that produced no response.
    fn submit(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse, ApiError>> + Send;
}

impl<E: Executor> Executor for Arc<E> {
    fn submit(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse, ApiError>> + Send {
        (**self).submit(request)
    }
}
