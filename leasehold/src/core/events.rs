use chrono::Utc;
use http::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::core::transport::{backend_request, Transport};
use crate::core::DateTime;

/// Reason attached to every leader election event.
pub const EVENT_REASON: &str = "LeaderElection";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    Normal,
    Warning,
}

/// An audit record of a leadership transition, as written to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderEvent {
    /// Component that emitted the event.
    pub component: String,
    pub namespace: String,
    /// Name of the lock the event is about.
    pub involved_object: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub reason: String,
    pub message: String,
    pub timestamp: DateTime,
}

/// Event sink for lock transitions.
///
/// Events are logged and posted to the backend. Recording is best effort:
/// failures are logged and never reach the election engine.
#[derive(Debug, Clone)]
pub struct EventRecorder<T> {
    component: String,
    namespace: String,
    object: String,
    transport: T,
}

impl<T> EventRecorder<T>
where
    T: Transport,
{
    pub fn new(
        component: impl Into<String>,
        namespace: impl Into<String>,
        object: impl Into<String>,
        transport: T,
    ) -> Self {
        Self {
            component: component.into(),
            namespace: namespace.into(),
            object: object.into(),
            transport,
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    fn events_path(&self) -> String {
        format!("/namespaces/{}/events", self.namespace)
    }

    #[instrument(skip(self, message), fields(component = %self.component, object = %self.object))]
    pub async fn record(&self, event_type: EventType, reason: &str, message: &str) {
        info!(?event_type, reason, message, "Leader election event");

        let event = LeaderEvent {
            component: self.component.clone(),
            namespace: self.namespace.clone(),
            involved_object: self.object.clone(),
            event_type,
            reason: reason.to_string(),
            message: message.to_string(),
            timestamp: Utc::now(),
        };
        let body = match serde_json::to_vec(&event) {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Failed to encode leader election event");
                return;
            }
        };

        let request = match backend_request(Method::POST, &self.events_path(), body) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Failed to address leader election event");
                return;
            }
        };

        match self.transport.round_trip(request).await {
            Ok(response) if response.status().is_success() => debug!("Leader election event recorded"),
            Ok(response) => warn!(
                status = response.status().as_u16(),
                "Event sink rejected leader election event"
            ),
            Err(e) => warn!(error = %e, "Failed to write leader election event"),
        }
    }
}
