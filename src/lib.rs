//! Mycodo client library
//!
//! Command-line client for the Mycodo environmental control daemon. Each
//! invocation validates one action, sends it to the daemon as a single
//! JSON-RPC call over TCP and reports the result.

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod rpc;

pub use domain::action::Action;
pub use domain::config::ClientConfig;
pub use domain::error::{ClientError, ClientResult};
pub use rpc::{DaemonClient, StatusReport, TcpTransport, Transport};
