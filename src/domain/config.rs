use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Mycodo client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Daemon endpoint settings
    #[serde(default)]
    pub daemon: DaemonConfig,
    /// Global settings
    #[serde(default)]
    pub global: GlobalConfig,
}

/// Where and how to reach the daemon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Daemon host name or address
    #[serde(default = "default_host")]
    pub host: String,
    /// Daemon TCP port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Connection establishment timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,
    /// Per-request timeout in milliseconds, 0 waits indefinitely
    #[serde(default)]
    pub request_timeout_ms: u64,
}

/// Global configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Default log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Default value functions
fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    18812
}

fn default_connect_timeout() -> u64 {
    3000
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            connect_timeout_ms: default_connect_timeout(),
            request_timeout_ms: 0,
        }
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl DaemonConfig {
    /// `host:port` form used for connecting and in error messages
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// `None` when requests may block indefinitely
    pub fn request_timeout(&self) -> Option<Duration> {
        match self.request_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}
