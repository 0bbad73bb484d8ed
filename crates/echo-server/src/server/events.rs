//! Lifecycle notifications for the hosting server.
//!
//! An [`EventBus`] carries a list of listeners and the shared shutdown
//! [`CancellationToken`]. Listeners are registered up front, then the bus is
//! cloned into the serving and signal-handling tasks. Emitting
//! [`ServerEvent::Failure`] stops the server.

use std::sync::Arc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// State changes of the hosting server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// The listener is bound and the server is accepting connections.
    Serving { addr: String },
    /// Shutdown started; health reports `NOT_SERVING` and in-flight calls drain.
    Draining,
    /// The server returned cleanly.
    Stopped,
    /// The transport failed. Triggers a stop.
    Failure { reason: String },
}

pub type Listener = Arc<dyn Fn(&ServerEvent) + Send + Sync>;

#[derive(Clone, Default)]
pub struct EventBus {
    listeners: Vec<Listener>,
    shutdown: CancellationToken,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener. Listeners run synchronously, in registration
    /// order, on the task that emits the event.
    pub fn add_listener<F>(&mut self, listener: F)
    where
        F: Fn(&ServerEvent) + Send + Sync + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    pub fn emit(&self, event: ServerEvent) {
        for listener in &self.listeners {
            listener(&event);
        }

        if matches!(event, ServerEvent::Failure { .. }) {
            self.stop();
        }
    }

    /// Requests a graceful shutdown.
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Resolves once [`EventBus::stop`] has been called on any clone.
    pub fn stopped(&self) -> WaitForCancellationFuture<'_> {
        self.shutdown.cancelled()
    }
}

impl core::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// Default listener: writes every event to the log.
pub fn log_event(_event: &ServerEvent) {
    #[cfg(feature = "tracing")]
    match _event {
        ServerEvent::Serving { addr } => tracing::info!("Echo service listening on {addr}"),
        ServerEvent::Draining => tracing::info!("Draining in-flight calls"),
        ServerEvent::Stopped => tracing::info!("Service shut down successfully"),
        ServerEvent::Failure { reason } => tracing::error!("Server failure: {reason}"),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording_bus() -> (EventBus, Arc<Mutex<Vec<(usize, ServerEvent)>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        for id in 0..2 {
            let seen = Arc::clone(&seen);
            bus.add_listener(move |event| seen.lock().unwrap().push((id, event.clone())));
        }
        (bus, seen)
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let (bus, seen) = recording_bus();
        bus.emit(ServerEvent::Serving {
            addr: "127.0.0.1:50051".to_string(),
        });
        bus.emit(ServerEvent::Stopped);

        let seen = seen.lock().unwrap();
        let order: Vec<usize> = seen.iter().map(|(id, _)| *id).collect();
        assert_eq!(order, vec![0, 1, 0, 1]);
        assert_eq!(seen[3].1, ServerEvent::Stopped);
    }

    #[test]
    fn non_failure_events_do_not_stop() {
        let (bus, _) = recording_bus();
        bus.emit(ServerEvent::Draining);
        bus.emit(ServerEvent::Stopped);
        assert!(!bus.is_stopped());
    }

    #[test]
    fn failure_stops_every_clone() {
        let (bus, seen) = recording_bus();
        let other = bus.clone();
        bus.emit(ServerEvent::Failure {
            reason: "accept failed".to_string(),
        });
        assert!(bus.is_stopped());
        assert!(other.is_stopped());
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn stopped_resolves_after_stop() {
        let bus = EventBus::new();
        let waiter = bus.clone();
        let handle = tokio::spawn(async move { waiter.stopped().await });
        bus.stop();
        tokio::time::timeout(core::time::Duration::from_secs(1), handle)
            .await
            .expect("stop was not observed")
            .unwrap();
    }

    #[test]
    fn log_event_accepts_every_variant() {
        log_event(&ServerEvent::Serving {
            addr: "/tmp/echo.sock".to_string(),
        });
        log_event(&ServerEvent::Draining);
        log_event(&ServerEvent::Stopped);
        log_event(&ServerEvent::Failure {
            reason: "boom".to_string(),
        });
    }
}
