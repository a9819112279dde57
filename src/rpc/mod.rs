// RPC module - JSON-RPC client for the daemon
pub mod daemon;
pub mod protocol;
pub mod transport;

pub use daemon::{DaemonClient, StatusReport};
pub use transport::{TcpTransport, Transport};
