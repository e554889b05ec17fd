//! Request/response transport to the lock backend.
//!
//! Lock traffic is the first thing to suffer when the network misbehaves, so
//! the assembler routes it through a [`DebuggingTransport`] that logs every
//! request with timing and status. Event writes use a plain transport from the
//! same [`ConnectionFactory`] to keep routine traffic out of the diagnostics.

use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, Request, Response};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};

/// Build a request for `path` on the lock backend.
///
/// Fails when `path` is not a valid URI path, e.g. because a lock name
/// contains whitespace.
pub fn backend_request(method: Method, path: &str, body: impl Into<Bytes>) -> Result<Request<Bytes>, http::Error> {
    Request::builder().method(method).uri(path).body(body.into())
}

/// A request could not be delivered or no response came back.
///
/// Status codes are not errors at this level; they are returned in the
/// [`Response`].
#[derive(Error, Debug)]
#[error("{method} {path} failed: {source}")]
pub struct TransportError {
    pub method: Method,
    pub path: String,
    #[source]
    pub source: anyhow::Error,
}

impl TransportError {
    pub fn new(request: &Request<Bytes>, source: impl Into<anyhow::Error>) -> Self {
        Self {
            method: request.method().clone(),
            path: request.uri().path().to_string(),
            source: source.into(),
        }
    }
}

/// A connection to the lock backend.
///
/// Retries and timeouts are the implementation's business.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn round_trip(&self, request: Request<Bytes>) -> Result<Response<Bytes>, TransportError>;
}

/// Builds connections to the lock backend, e.g. from credentials.
pub trait ConnectionFactory: Send + Sync {
    type Transport: Transport + 'static;

    /// Construct a new connection. Failing here means the backend is unusable
    /// (malformed credentials, bad endpoint) and election can't start.
    fn connect(&self) -> anyhow::Result<Self::Transport>;
}

/// What a [`DebuggingTransport`] logs about each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugFlags {
    /// Log when a request starts and how long it took, with body sizes.
    pub detailed_timing: bool,
    /// Log one line per request: method, path and latency.
    pub url_timing: bool,
    /// Log the response status.
    pub response_status: bool,
}

impl DebugFlags {
    pub const fn all() -> Self {
        Self {
            detailed_timing: true,
            url_timing: true,
            response_status: true,
        }
    }

    pub const fn none() -> Self {
        Self {
            detailed_timing: false,
            url_timing: false,
            response_status: false,
        }
    }
}

impl Default for DebugFlags {
    fn default() -> Self {
        Self::all()
    }
}

/// Wraps a transport and traces every request going through it.
#[derive(Debug, Clone)]
pub struct DebuggingTransport<T> {
    inner: T,
    flags: DebugFlags,
}

impl<T> DebuggingTransport<T>
where
    T: Transport,
{
    pub fn new(inner: T, flags: DebugFlags) -> Self {
        Self { inner, flags }
    }

    pub fn flags(&self) -> DebugFlags {
        self.flags
    }
}

#[async_trait]
impl<T> Transport for DebuggingTransport<T>
where
    T: Transport,
{
    async fn round_trip(&self, request: Request<Bytes>) -> Result<Response<Bytes>, TransportError> {
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        if self.flags.detailed_timing {
            debug!(%method, %path, request_bytes = request.body().len(), "Sending lock backend request");
        }

        let started = Instant::now();
        let result = self.inner.round_trip(request).await;
        let elapsed = started.elapsed();

        match &result {
            Ok(response) => {
                if self.flags.url_timing {
                    debug!(%method, %path, elapsed_ms = elapsed.as_millis() as u64, "Lock backend request finished");
                }
                if self.flags.response_status {
                    debug!(%method, %path, status = response.status().as_u16(), "Lock backend response status");
                }
                if self.flags.detailed_timing {
                    debug!(
                        %method,
                        %path,
                        elapsed = ?elapsed,
                        response_bytes = response.body().len(),
                        "Lock backend request timing"
                    );
                }
            }
            Err(e) => {
                warn!(%method, %path, elapsed = ?elapsed, error = %e, "Lock backend request failed");
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;
    use http::StatusCode;
    use tracing_test::traced_test;

    const LEASE: &str = "/namespaces/a/leases/b";

    #[test]
    fn test_backend_request() {
        let get = backend_request(Method::GET, LEASE, Bytes::new()).unwrap();
        assert_eq!(get.method(), Method::GET);
        assert_eq!(get.uri().path(), LEASE);
        assert!(get.body().is_empty());

        assert!(backend_request(Method::GET, "/namespaces/a b/leases/c", Bytes::new()).is_err());
    }

    #[test]
    fn test_transport_error_display() {
        let request = backend_request(Method::GET, LEASE, Bytes::new()).unwrap();
        let err = TransportError::new(&request, anyhow::anyhow!("connection refused"));

        assert_eq!(err.to_string(), "GET /namespaces/a/leases/b failed: connection refused");
    }

    #[tokio::test]
    async fn test_debugging_transport_is_transparent() {
        let inner = RecordingTransport::new();
        inner.respond_with(StatusCode::CONFLICT, "conflict");
        let transport = DebuggingTransport::new(inner.clone(), DebugFlags::all());

        let response = transport
            .round_trip(backend_request(Method::PUT, LEASE, "{}").unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(response.body().as_ref(), b"conflict");
        let requests = inner.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::PUT);
        assert_eq!(requests[0].path, LEASE);
        assert_eq!(requests[0].body.as_ref(), b"{}");
    }

    #[tokio::test]
    #[traced_test]
    async fn test_debugging_transport_logs_each_request() {
        let transport = DebuggingTransport::new(RecordingTransport::new(), DebugFlags::all());

        transport
            .round_trip(backend_request(Method::GET, LEASE, Bytes::new()).unwrap())
            .await
            .unwrap();

        assert!(logs_contain("Sending lock backend request"));
        assert!(logs_contain("Lock backend request finished"));
        assert!(logs_contain("method=GET"));
        assert!(logs_contain("path=/namespaces/a/leases/b"));
        assert!(logs_contain("status=200"));
        assert!(logs_contain("elapsed_ms="));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_debugging_transport_respects_flags() {
        let transport = DebuggingTransport::new(RecordingTransport::new(), DebugFlags::none());

        transport
            .round_trip(backend_request(Method::GET, LEASE, Bytes::new()).unwrap())
            .await
            .unwrap();

        assert!(!logs_contain("Lock backend"));
        assert!(!logs_contain("lock backend"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_debugging_transport_passes_errors_through() {
        let inner = RecordingTransport::new();
        inner.fail_next("connection reset");
        let transport = DebuggingTransport::new(inner, DebugFlags::none());

        let err = transport
            .round_trip(backend_request(Method::GET, LEASE, Bytes::new()).unwrap())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("connection reset"));
        assert!(logs_contain("Lock backend request failed"));
    }
}
