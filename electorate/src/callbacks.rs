use std::fmt;
use tokio_util::sync::CancellationToken;

/// Invoked when this process becomes the leader. The token is cancelled when
/// leadership ends.
pub type StartedLeading = Box<dyn Fn(CancellationToken) + Send + Sync>;

/// Invoked when this process stops being the leader.
pub type StoppedLeading = Box<dyn Fn() + Send + Sync>;

/// Invoked with the identity of a newly observed leader.
pub type NewLeader = Box<dyn Fn(&str) + Send + Sync>;

/// Lifecycle callbacks an election engine invokes on leadership transitions.
///
/// `on_stopped_leading` is mandatory: a process must always decide what happens
/// when it loses the lock.
pub struct LeaderCallbacks {
    on_started_leading: Option<StartedLeading>,
    on_stopped_leading: StoppedLeading,
    on_new_leader: Option<NewLeader>,
}

impl LeaderCallbacks {
    pub fn new<F>(on_stopped_leading: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            on_started_leading: None,
            on_stopped_leading: Box::new(on_stopped_leading),
            on_new_leader: None,
        }
    }

    pub fn with_on_started_leading<F>(mut self, f: F) -> Self
    where
        F: Fn(CancellationToken) + Send + Sync + 'static,
    {
        self.on_started_leading = Some(Box::new(f));
        self
    }

    pub fn with_on_new_leader<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.on_new_leader = Some(Box::new(f));
        self
    }

    pub fn started_leading(&self, token: CancellationToken) {
        if let Some(f) = &self.on_started_leading {
            f(token);
        }
    }

    pub fn stopped_leading(&self) {
        (self.on_stopped_leading)();
    }

    pub fn new_leader(&self, identity: &str) {
        if let Some(f) = &self.on_new_leader {
            f(identity);
        }
    }
}

impl fmt::Debug for LeaderCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeaderCallbacks")
            .field("on_started_leading", &self.on_started_leading.is_some())
            .field("on_new_leader", &self.on_new_leader.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicU32, Ordering},
        Arc, Mutex,
    };

    #[test]
    fn test_optional_callbacks_are_noops() {
        let stopped = Arc::new(AtomicU32::new(0));
        let counter = stopped.clone();
        let callbacks = LeaderCallbacks::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        callbacks.started_leading(CancellationToken::new());
        callbacks.new_leader("node-b");
        assert_eq!(stopped.load(Ordering::SeqCst), 0);

        callbacks.stopped_leading();
        assert_eq!(stopped.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_callbacks_receive_arguments() {
        let leaders = Arc::new(Mutex::new(Vec::new()));
        let seen = leaders.clone();
        let token = CancellationToken::new();
        let observed = Arc::new(Mutex::new(None));
        let slot = observed.clone();

        let callbacks = LeaderCallbacks::new(|| {})
            .with_on_new_leader(move |identity| seen.lock().unwrap().push(identity.to_string()))
            .with_on_started_leading(move |token| *slot.lock().unwrap() = Some(token));

        callbacks.new_leader("node-a");
        callbacks.new_leader("node-b");
        callbacks.started_leading(token.clone());

        assert_eq!(*leaders.lock().unwrap(), vec!["node-a", "node-b"]);
        token.cancel();
        assert!(observed.lock().unwrap().as_ref().unwrap().is_cancelled());
    }
}
