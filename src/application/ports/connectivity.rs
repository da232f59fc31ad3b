use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    Online,
    Offline,
}

impl ConnectivityState {
    pub fn is_online(&self) -> bool {
        matches!(self, ConnectivityState::Online)
    }
}

/// A discrete transition between connectivity states. Subscribers only ever
/// see edges, never repeated reports of the same state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    CameOnline,
    WentOffline,
}

/// Source of connectivity transitions. The sync core reads `current()` once
/// at startup and reacts to subscribed events afterwards; it never polls.
pub trait ConnectivityMonitor: Send + Sync {
    fn current(&self) -> ConnectivityState;

    fn subscribe(&self) -> broadcast::Receiver<ConnectivityEvent>;
}
