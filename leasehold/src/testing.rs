//! In-memory stand-ins for the collaborators of the assembler.
//!
//! Used by this crate's tests and available to embedding applications that
//! want to test their own wiring without a lock backend.

use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, Request, Response, StatusCode};
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::core::identity::HostnameSource;
use crate::core::terminate::Terminator;
use crate::core::transport::{ConnectionFactory, Transport, TransportError};

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A request as seen by a [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Bytes,
}

#[derive(Debug, Default)]
struct Recording {
    requests: Vec<RecordedRequest>,
    outcomes: VecDeque<Result<(StatusCode, Bytes), String>>,
}

/// A transport that records requests and answers from a script.
///
/// Scripted outcomes are consumed in order; once the script is exhausted every
/// request gets an empty `200`. Clones share their state.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    state: Arc<Mutex<Recording>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    pub fn respond_with(&self, status: StatusCode, body: impl Into<Bytes>) {
        locked(&self.state).outcomes.push_back(Ok((status, body.into())));
    }

    /// Queue a transport failure.
    pub fn fail_next(&self, message: impl Into<String>) {
        locked(&self.state).outcomes.push_back(Err(message.into()));
    }

    /// Requests seen so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        locked(&self.state).requests.clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn round_trip(&self, request: Request<Bytes>) -> Result<Response<Bytes>, TransportError> {
        let mut state = locked(&self.state);
        state.requests.push(RecordedRequest {
            method: request.method().clone(),
            path: request.uri().path().to_string(),
            body: request.body().clone(),
        });
        let (status, body) = match state.outcomes.pop_front() {
            Some(Ok(outcome)) => outcome,
            Some(Err(message)) => return Err(TransportError::new(&request, anyhow::anyhow!(message))),
            None => (StatusCode::OK, Bytes::new()),
        };
        let mut response = Response::new(body);
        *response.status_mut() = status;
        Ok(response)
    }
}

#[derive(Debug, Default)]
struct Backend {
    failure: Option<String>,
    attempts: AtomicUsize,
    transports: Mutex<Vec<RecordingTransport>>,
}

/// A connection factory handing out [`RecordingTransport`]s.
#[derive(Debug, Clone, Default)]
pub struct StubBackend {
    backend: Arc<Backend>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose connections can't be constructed.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            backend: Arc::new(Backend {
                failure: Some(reason.into()),
                ..Backend::default()
            }),
        }
    }

    /// Number of connection attempts, failed ones included.
    pub fn connections(&self) -> usize {
        self.backend.attempts.load(Ordering::SeqCst)
    }

    /// Transports handed out so far, in the order they were created.
    pub fn transports(&self) -> Vec<RecordingTransport> {
        locked(&self.backend.transports).clone()
    }
}

impl ConnectionFactory for StubBackend {
    type Transport = RecordingTransport;

    fn connect(&self) -> anyhow::Result<Self::Transport> {
        self.backend.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.backend.failure {
            anyhow::bail!("{reason}");
        }
        let transport = RecordingTransport::new();
        locked(&self.backend.transports).push(transport.clone());
        Ok(transport)
    }
}

/// Counts termination requests instead of exiting.
#[derive(Debug, Default)]
pub struct SpyTerminator {
    calls: AtomicUsize,
}

impl SpyTerminator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Terminator for SpyTerminator {
    fn terminate(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// A hostname source with a fixed answer.
#[derive(Debug, Clone)]
pub struct FixedHostname {
    hostname: Option<String>,
}

impl FixedHostname {
    pub fn named(hostname: impl Into<String>) -> Self {
        Self {
            hostname: Some(hostname.into()),
        }
    }

    /// A source whose lookup always fails.
    pub fn failing() -> Self {
        Self { hostname: None }
    }
}

impl HostnameSource for FixedHostname {
    fn hostname(&self) -> io::Result<String> {
        self.hostname
            .clone()
            .ok_or_else(|| io::Error::other("hostname unavailable"))
    }
}
