//! Dashboard configuration structs and defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub server: ServerSettings,
    pub ipmi: IpmiSettings,
    pub poller: PollerSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_address: String,
    pub port: u16,
}

/// How ipmitool is invoked. BMC credentials are not part of the file; they
/// come from the environment on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IpmiSettings {
    pub tool: String,        // executable name or path
    pub interface: String,   // "lanplus"
    pub timeout_secs: f64,   // upper bound for one invocation
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerSettings {
    pub enabled: bool,
    pub interval_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub log_level: String,
}

impl IpmiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs)
    }
}

impl PollerSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_secs)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for IpmiSettings {
    fn default() -> Self {
        Self {
            tool: "ipmitool".to_string(),
            interface: "lanplus".to_string(),
            timeout_secs: 30.0,
        }
    }
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 30.0,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            log_level: "INFO".to_string(),
        }
    }
}
