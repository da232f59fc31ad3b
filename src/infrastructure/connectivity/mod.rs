mod channel_monitor;

pub use channel_monitor::{ChannelConnectivityMonitor, ConnectivityHandle};
