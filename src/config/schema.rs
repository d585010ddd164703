//! Settings schema definitions.
//!
//! This module defines the process settings for the monitor. All types
//! derive Serde traits for deserialization from a TOML settings file.
//! Service definitions (domains, IP sets) are not settings; they live in
//! separate JSON documents read through a config source.

use serde::{Deserialize, Serialize};

/// Root settings for the certificate monitor.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WatchConfig {
    /// Where service documents are read from.
    pub source: SourceConfig,

    /// Sweep and reload timing.
    pub schedule: ScheduleConfig,

    /// Probe timeouts.
    pub probe: ProbeConfig,

    /// Logging and metrics endpoint.
    pub observability: ObservabilityConfig,
}

/// Service document source.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Directory holding the service documents.
    pub config_dir: String,

    /// Only files ending with this suffix are read.
    pub config_file_suffix: String,

    /// Reload on filesystem notifications for the directory.
    pub watch: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            config_dir: "/etc/ssl-watch".to_string(),
            config_file_suffix: ".json".to_string(),
            watch: true,
        }
    }
}

/// Sweep and reload timing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Seconds between sweeps.
    pub scrape_interval_secs: u64,

    /// Seconds between source change checks (0 disables polling).
    pub reload_poll_secs: u64,

    /// Domains probed concurrently within one sweep.
    pub sweep_concurrency: usize,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            scrape_interval_secs: 60,
            reload_poll_secs: 60,
            sweep_concurrency: 1,
        }
    }
}

/// Probe timeouts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// TCP connect timeout in seconds. The handshake gets five more.
    pub connection_timeout_secs: u64,

    /// DNS lookup timeout in seconds.
    pub lookup_timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            connection_timeout_secs: 10,
            lookup_timeout_secs: 5,
        }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Shorthand for debug-level logging.
    pub debug: bool,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Metrics endpoint bind address.
    pub bind_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            debug: false,
            json_logs: false,
            bind_address: "0.0.0.0:9105".to_string(),
        }
    }
}
