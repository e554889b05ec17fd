use async_trait::async_trait;
use bytes::Bytes;
use electorate::{LeaderElectionRecord, LockError, ResourceLock};
use http::{Method, Response, StatusCode};
use tracing::instrument;

use crate::core::events::{EventRecorder, EventType, EVENT_REASON};
use crate::core::transport::{backend_request, Transport};

/// Handle to the lease resource `namespace/name` on the lock backend.
///
/// `L` carries lock traffic, `E` carries event writes. The resource itself is
/// created by the backend on the first [`ResourceLock::create`].
///
/// The record lives at `/namespaces/{namespace}/leases/{name}`:
/// - `GET` reads it (`404` if it does not exist yet),
/// - `POST` to `/namespaces/{namespace}/leases` creates it (`409` if someone
///   else created it first),
/// - `PUT` replaces it (`409` if it changed since it was read).
#[derive(Debug)]
pub struct LeaseLock<L, E> {
    namespace: String,
    name: String,
    identity: String,
    client: L,
    recorder: EventRecorder<E>,
}

impl<L, E> LeaseLock<L, E>
where
    L: Transport,
    E: Transport,
{
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        identity: impl Into<String>,
        client: L,
        recorder: EventRecorder<E>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            identity: identity.into(),
            client,
            recorder,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Transport used for lock operations.
    pub fn client(&self) -> &L {
        &self.client
    }

    pub fn recorder(&self) -> &EventRecorder<E> {
        &self.recorder
    }

    fn leases_path(&self) -> String {
        format!("/namespaces/{}/leases", self.namespace)
    }

    fn lease_path(&self) -> String {
        format!("{}/{}", self.leases_path(), self.name)
    }

    async fn send(&self, method: Method, path: &str, body: Bytes) -> Result<Response<Bytes>, LockError> {
        let request = backend_request(method, path, body).map_err(|e| LockError::Transport(e.into()))?;
        self.client
            .round_trip(request)
            .await
            .map_err(|e| LockError::Transport(e.into()))
    }

    fn unexpected(response: &Response<Bytes>) -> LockError {
        LockError::UnexpectedStatus {
            status: response.status().as_u16(),
            body: String::from_utf8_lossy(response.body()).chars().take(500).collect(),
        }
    }
}

#[async_trait]
impl<L, E> ResourceLock for LeaseLock<L, E>
where
    L: Transport,
    E: Transport,
{
    #[instrument(skip(self), fields(lock = %self.describe()), err)]
    async fn get(&self) -> Result<LeaderElectionRecord, LockError> {
        let response = self.send(Method::GET, &self.lease_path(), Bytes::new()).await?;
        match response.status() {
            status if status.is_success() => Ok(serde_json::from_slice(response.body())?),
            StatusCode::NOT_FOUND => Err(LockError::NotFound(self.describe())),
            _ => Err(Self::unexpected(&response)),
        }
    }

    #[instrument(skip(self, record), fields(lock = %self.describe(), holder = %record.holder_identity), err)]
    async fn create(&self, record: &LeaderElectionRecord) -> Result<(), LockError> {
        let body = serde_json::to_vec(record)?;
        let response = self.send(Method::POST, &self.leases_path(), body.into()).await?;
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(LockError::Conflict(self.describe())),
            _ => Err(Self::unexpected(&response)),
        }
    }

    #[instrument(skip(self, record), fields(lock = %self.describe(), holder = %record.holder_identity), err)]
    async fn update(&self, record: &LeaderElectionRecord) -> Result<(), LockError> {
        let body = serde_json::to_vec(record)?;
        let response = self.send(Method::PUT, &self.lease_path(), body.into()).await?;
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(LockError::NotFound(self.describe())),
            StatusCode::CONFLICT => Err(LockError::Conflict(self.describe())),
            _ => Err(Self::unexpected(&response)),
        }
    }

    async fn record_event(&self, message: &str) {
        let message = format!("{} {}", self.identity, message);
        self.recorder
            .record(EventType::Normal, EVENT_REASON, &message)
            .await;
    }

    fn identity(&self) -> &str {
        &self.identity
    }

    fn describe(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}
