use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::debug;

use folio_types::events::EngineEvent;

/// Fans engine events out to every in-process subscriber.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    broadcast_tx: broadcast::Sender<EngineEvent>,
}

impl Dispatcher {
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(1024);
        Self {
            inner: Arc::new(DispatcherInner { broadcast_tx }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.inner.broadcast_tx.subscribe()
    }

    /// Delivery is best effort: with no subscribers the event is dropped.
    pub fn broadcast(&self, event: EngineEvent) {
        debug!(record_id = ?event.record_id(), "Dispatching engine event");
        let _ = self.inner.broadcast_tx.send(event);
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn subscribers_receive_broadcasts() {
        let dispatcher = Dispatcher::new();
        let mut rx = dispatcher.subscribe();
        let event = EngineEvent::FilterChanged { client_id: Some(Uuid::new_v4()) };
        dispatcher.broadcast(event.clone());
        assert_eq!(rx.recv().await.unwrap(), event);
    }

    #[test]
    fn broadcast_without_subscribers_is_dropped() {
        Dispatcher::new().broadcast(EngineEvent::SettingsToggled { open: true });
    }
}
