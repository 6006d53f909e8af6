//! # Node Configuration
//!
//! Runtime configuration for one node: telemetry, the governance parameter
//! set shared by every subsystem, the operator identity, and the demo toggle.
//!
//! Defaults are development-grade. Deployments override through `TL_*`
//! environment variables; malformed values fall back to the default rather
//! than aborting startup.

use thiserror::Error;
use tracing::warn;

use shared_types::{Address, ConfigError as ParamError, GovernanceParams};
use trellis_telemetry::TelemetryConfig;

/// Development operator identity, granted the administrator capability.
const DEV_OPERATOR: Address = [0xad; 20];

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Telemetry configuration (log level, format, network name).
    pub telemetry: TelemetryConfig,
    /// Governance parameters consumed by all six subsystems.
    pub params: GovernanceParams,
    /// Operator address. Receives the administrator grant at startup.
    pub operator: Address,
    /// Whether to run the startup choreography after wiring.
    pub run_demo: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            telemetry: TelemetryConfig::default(),
            params: GovernanceParams::default(),
            operator: DEV_OPERATOR,
            run_demo: true,
        }
    }
}

impl NodeConfig {
    /// Load configuration from the environment.
    ///
    /// # Environment Variables
    ///
    /// - `TL_MIN_STAKE`: minimum validator stake
    /// - `TL_ROUND_DURATION_SECS`: consensus round budget
    /// - `TL_APPROVAL_PERCENT`: vote threshold percentage
    /// - `TL_REBALANCE_THRESHOLD_PERCENT`: shard rebalance trigger
    /// - `TL_CONGESTION_THRESHOLD_PERCENT`: route congestion trigger
    /// - `TL_DISPUTE_WINDOW_SECS`: bridge dispute window
    /// - `TL_SETTLE_TIMEOUT_SECS`: cooperative-close deadline
    /// - `TL_OPERATOR`: operator address, 40 hex chars
    /// - `TL_DEMO`: `0` or `false` skips the startup choreography
    ///
    /// Telemetry variables (`TRELLIS_LOG`, `TRELLIS_JSON_LOGS`,
    /// `TRELLIS_NETWORK`) are read by [`TelemetryConfig::from_env`].
    pub fn from_env() -> Self {
        let mut config = Self {
            telemetry: TelemetryConfig::from_env(),
            ..Self::default()
        };

        if let Ok(value) = std::env::var("TL_MIN_STAKE") {
            if let Ok(stake) = value.parse() {
                config.params.validators.min_stake = stake;
            }
        }
        if let Ok(value) = std::env::var("TL_ROUND_DURATION_SECS") {
            if let Ok(secs) = value.parse() {
                config.params.consensus.round_duration_secs = secs;
            }
        }
        if let Ok(value) = std::env::var("TL_APPROVAL_PERCENT") {
            if let Ok(percent) = value.parse() {
                config.params.consensus.approval_percent = percent;
            }
        }
        if let Ok(value) = std::env::var("TL_REBALANCE_THRESHOLD_PERCENT") {
            if let Ok(percent) = value.parse() {
                config.params.shards.rebalance_threshold_percent = percent;
            }
        }
        if let Ok(value) = std::env::var("TL_CONGESTION_THRESHOLD_PERCENT") {
            if let Ok(percent) = value.parse() {
                config.params.routing.congestion_threshold_percent = percent;
            }
        }
        if let Ok(value) = std::env::var("TL_DISPUTE_WINDOW_SECS") {
            if let Ok(secs) = value.parse() {
                config.params.bridge.dispute_window_secs = secs;
            }
        }
        if let Ok(value) = std::env::var("TL_SETTLE_TIMEOUT_SECS") {
            if let Ok(secs) = value.parse() {
                config.params.channels.settle_timeout_secs = secs;
            }
        }

        if let Ok(value) = std::env::var("TL_OPERATOR") {
            match parse_address(&value) {
                Some(operator) => config.operator = operator,
                None => warn!("TL_OPERATOR must be 20 bytes (40 hex chars), keeping default"),
            }
        }
        if let Ok(value) = std::env::var("TL_DEMO") {
            config.run_demo = !(value == "0" || value.eq_ignore_ascii_case("false"));
        }

        config
    }

    /// Reject configurations that would wedge a subsystem or leave the
    /// deployment without an administrator.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params.validate()?;
        if self.operator == [0u8; 20] {
            return Err(ConfigError::NullOperator);
        }
        Ok(())
    }
}

/// Decode a 20-byte address from a hex string, with or without `0x`.
fn parse_address(value: &str) -> Option<Address> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    let bytes = hex::decode(stripped).ok()?;
    let mut address = [0u8; 20];
    if bytes.len() != address.len() {
        return None;
    }
    address.copy_from_slice(&bytes);
    Some(address)
}

/// Configuration validation failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A governance parameter is out of range.
    #[error("invalid governance parameter: {0}")]
    InvalidParams(#[from] ParamError),
    /// The operator address is all zeroes, so no one would hold the
    /// administrator capability.
    #[error("operator address is all zeroes; set TL_OPERATOR")]
    NullOperator,
}
