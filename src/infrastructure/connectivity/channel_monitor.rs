use crate::application::ports::connectivity::{
    ConnectivityEvent, ConnectivityMonitor, ConnectivityState,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Connectivity monitor fed programmatically by the host application (from
/// OS signals, a heartbeat probe, whatever it trusts). Publishes an event
/// only on an actual state change, so subscribers see discrete transitions
/// and never repeated reports of the same state.
pub struct ChannelConnectivityMonitor {
    online: Arc<AtomicBool>,
    tx: broadcast::Sender<ConnectivityEvent>,
}

impl ChannelConnectivityMonitor {
    pub fn new(initial: ConnectivityState) -> Self {
        let (tx, _) = broadcast::channel(16);
        Self {
            online: Arc::new(AtomicBool::new(initial.is_online())),
            tx,
        }
    }

    /// Handle for the side of the application that observes the network.
    pub fn handle(&self) -> ConnectivityHandle {
        ConnectivityHandle {
            online: Arc::clone(&self.online),
            tx: self.tx.clone(),
        }
    }
}

impl ConnectivityMonitor for ChannelConnectivityMonitor {
    fn current(&self) -> ConnectivityState {
        if self.online.load(Ordering::SeqCst) {
            ConnectivityState::Online
        } else {
            ConnectivityState::Offline
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<ConnectivityEvent> {
        self.tx.subscribe()
    }
}

#[derive(Clone)]
pub struct ConnectivityHandle {
    online: Arc<AtomicBool>,
    tx: broadcast::Sender<ConnectivityEvent>,
}

impl ConnectivityHandle {
    pub fn set_state(&self, state: ConnectivityState) {
        let was_online = self.online.swap(state.is_online(), Ordering::SeqCst);
        if was_online == state.is_online() {
            return;
        }
        let event = if state.is_online() {
            ConnectivityEvent::CameOnline
        } else {
            ConnectivityEvent::WentOffline
        };
        tracing::info!("Connectivity changed: {:?}", event);
        // Nobody listening yet is fine; the state flag alone answers
        // `current()` for late subscribers.
        let _ = self.tx.send(event);
    }
}
