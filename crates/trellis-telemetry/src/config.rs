//! Telemetry configuration from environment variables.

use std::env;

use serde::{Deserialize, Serialize};

/// Configuration for logging output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Service name included in structured log lines.
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive string.
    pub log_level: String,

    /// Whether to emit JSON formatted logs instead of plain text.
    pub json_logs: bool,

    /// Network identifier (devnet, testnet, mainnet).
    pub network: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "trellis".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            network: "devnet".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TRELLIS_LOG` or `RUST_LOG`: log level filter (default: info)
    /// - `TRELLIS_JSON_LOGS`: emit JSON logs when set to `1` or `true`
    /// - `TRELLIS_NETWORK`: network name (default: devnet)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            service_name: defaults.service_name,
            log_level: env::var("TRELLIS_LOG")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            json_logs: env::var("TRELLIS_JSON_LOGS")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.json_logs),
            network: env::var("TRELLIS_NETWORK").unwrap_or(defaults.network),
        }
    }
}
