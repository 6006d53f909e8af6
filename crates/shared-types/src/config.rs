//! # Governance Parameters
//!
//! The read-only parameter set supplied by the governance layer. The core
//! consumes these values and never mutates them; parameter voting itself is
//! out of scope.
//!
//! Every threshold that gates a state transition lives here so that all
//! subsystems agree on one source: round duration, consensus approval,
//! rebalance and congestion thresholds, dispute window, batch and HTLC caps.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Complete parameter set for one deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GovernanceParams {
    /// Validator registry parameters.
    pub validators: ValidatorParams,
    /// Consensus round parameters.
    pub consensus: ConsensusParams,
    /// Shard registry parameters.
    pub shards: ShardParams,
    /// Cross-shard routing parameters.
    pub routing: RoutingParams,
    /// Channel bridge parameters.
    pub bridge: BridgeParams,
    /// Channel ledger parameters.
    pub channels: ChannelParams,
}

impl GovernanceParams {
    /// Parameters suited to unit tests: short windows, small histories,
    /// thresholds kept at their production percentages so threshold tests
    /// exercise the real arithmetic.
    pub fn for_testing() -> Self {
        Self {
            validators: ValidatorParams {
                min_stake: 100,
                jail_duration_secs: 60,
                ..ValidatorParams::default()
            },
            consensus: ConsensusParams {
                round_duration_secs: 60,
                round_history_capacity: 8,
                ..ConsensusParams::default()
            },
            shards: ShardParams {
                min_validators: 2,
                rebalance_cooldown_secs: 10,
                root_history_capacity: 8,
                ..ShardParams::default()
            },
            routing: RoutingParams {
                message_ttl_secs: 60,
                max_batch_size: 10,
                ..RoutingParams::default()
            },
            bridge: BridgeParams {
                dispute_window_secs: 30,
            },
            channels: ChannelParams {
                max_htlcs_per_channel: 4,
                settle_timeout_secs: 60,
            },
        }
    }

    /// Reject parameter sets that would wedge a subsystem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.validators.min_stake == 0 {
            return Err(ConfigError::ZeroValue { field: "validators.min_stake" });
        }
        if self.validators.max_commission_bps > 10_000 {
            return Err(ConfigError::BasisPointsOutOfRange {
                field: "validators.max_commission_bps",
                value: self.validators.max_commission_bps,
            });
        }
        if self.validators.slash_fraction_bps > 10_000 {
            return Err(ConfigError::BasisPointsOutOfRange {
                field: "validators.slash_fraction_bps",
                value: self.validators.slash_fraction_bps,
            });
        }
        for (field, percent) in [
            ("consensus.approval_percent", self.consensus.approval_percent),
            ("shards.rebalance_threshold_percent", self.shards.rebalance_threshold_percent),
            ("routing.congestion_threshold_percent", self.routing.congestion_threshold_percent),
        ] {
            if percent == 0 || percent > 100 {
                return Err(ConfigError::PercentOutOfRange { field, value: percent });
            }
        }
        for (field, value) in [
            ("consensus.round_duration_secs", self.consensus.round_duration_secs),
            ("consensus.round_history_capacity", self.consensus.round_history_capacity as u64),
            ("shards.min_validators", self.shards.min_validators as u64),
            ("shards.root_history_capacity", self.shards.root_history_capacity as u64),
            ("routing.message_ttl_secs", self.routing.message_ttl_secs),
            ("routing.max_batch_size", self.routing.max_batch_size as u64),
            ("routing.max_payload_bytes", self.routing.max_payload_bytes as u64),
            ("routing.success_window", self.routing.success_window as u64),
            ("bridge.dispute_window_secs", self.bridge.dispute_window_secs),
            ("channels.max_htlcs_per_channel", self.channels.max_htlcs_per_channel as u64),
            ("channels.settle_timeout_secs", self.channels.settle_timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroValue { field });
            }
        }
        Ok(())
    }
}

/// Validator registry parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorParams {
    /// Minimum stake that must be locked at registration.
    pub min_stake: u128,
    /// Commission cap in basis points.
    pub max_commission_bps: u16,
    /// Fraction of stake deducted on slashing, in basis points.
    pub slash_fraction_bps: u16,
    /// Seconds a jailed validator must wait before release.
    pub jail_duration_secs: u64,
    /// Maximum validators assignable to one shard.
    pub max_validators_per_shard: usize,
}

impl Default for ValidatorParams {
    fn default() -> Self {
        Self {
            min_stake: 1_000,
            max_commission_bps: 2_000,
            slash_fraction_bps: 1_000,
            jail_duration_secs: 3_600,
            max_validators_per_shard: 100,
        }
    }
}

/// Consensus round parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusParams {
    /// Wall-clock budget of one round, seconds.
    pub round_duration_secs: u64,
    /// Percentage of the shard's active validators whose votes finalize a
    /// round (default: 67 = 2/3).
    pub approval_percent: u8,
    /// Reward units accrued by the proposer of a finalized round.
    pub proposer_bonus: u128,
    /// Reward units accrued by each supporting voter of a finalized round.
    pub voter_base_reward: u128,
    /// Finished rounds retained per shard for audit.
    pub round_history_capacity: usize,
}

impl Default for ConsensusParams {
    fn default() -> Self {
        Self {
            round_duration_secs: 30,
            approval_percent: 67,
            proposer_bonus: 50,
            voter_base_reward: 10,
            round_history_capacity: 64,
        }
    }
}

/// Shard registry parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardParams {
    /// Minimum validator count for shard creation.
    pub min_validators: usize,
    /// Load/capacity percentage at which rebalancing triggers (default 75).
    pub rebalance_threshold_percent: u8,
    /// Seconds between rebalance attempts on one shard.
    pub rebalance_cooldown_secs: u64,
    /// State roots retained per shard.
    pub root_history_capacity: usize,
}

impl Default for ShardParams {
    fn default() -> Self {
        Self {
            min_validators: 4,
            rebalance_threshold_percent: 75,
            rebalance_cooldown_secs: 300,
            root_history_capacity: 64,
        }
    }
}

/// Cross-shard routing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingParams {
    /// Load/capacity percentage at which a route flips Congested (default 80).
    pub congestion_threshold_percent: u8,
    /// Message time-to-live, seconds.
    pub message_ttl_secs: u64,
    /// Maximum messages per batch.
    pub max_batch_size: usize,
    /// Maximum message payload size in bytes.
    pub max_payload_bytes: usize,
    /// Number of recent delivery outcomes kept per route for the rolling
    /// success rate.
    pub success_window: usize,
}

impl Default for RoutingParams {
    fn default() -> Self {
        Self {
            congestion_threshold_percent: 80,
            message_ttl_secs: 300,
            max_batch_size: 100,
            max_payload_bytes: 16_384,
            success_window: 100,
        }
    }
}

/// Channel bridge parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeParams {
    /// Seconds a dispute must stay open before resolution is permitted.
    pub dispute_window_secs: u64,
}

impl Default for BridgeParams {
    fn default() -> Self {
        Self { dispute_window_secs: 600 }
    }
}

/// Channel ledger parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelParams {
    /// Maximum concurrently pending HTLCs per channel.
    pub max_htlcs_per_channel: usize,
    /// Seconds participants have to confirm a cooperative close.
    pub settle_timeout_secs: u64,
}

impl Default for ChannelParams {
    fn default() -> Self {
        Self {
            max_htlcs_per_channel: 32,
            settle_timeout_secs: 600,
        }
    }
}

/// Parameter validation failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A field that must be positive is zero.
    #[error("{field} must be non-zero")]
    ZeroValue {
        /// Offending field path.
        field: &'static str,
    },
    /// A percentage field is outside 1..=100.
    #[error("{field} must be within 1..=100, got {value}")]
    PercentOutOfRange {
        /// Offending field path.
        field: &'static str,
        /// Supplied value.
        value: u8,
    },
    /// A basis-points field exceeds 10000.
    #[error("{field} must be within 0..=10000, got {value}")]
    BasisPointsOutOfRange {
        /// Offending field path.
        field: &'static str,
        /// Supplied value.
        value: u16,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_validate() {
        assert!(GovernanceParams::default().validate().is_ok());
        assert!(GovernanceParams::for_testing().validate().is_ok());
    }

    #[test]
    fn rejects_zero_round_duration() {
        let mut params = GovernanceParams::default();
        params.consensus.round_duration_secs = 0;
        assert_eq!(
            params.validate(),
            Err(ConfigError::ZeroValue { field: "consensus.round_duration_secs" })
        );
    }

    #[test]
    fn rejects_percent_above_hundred() {
        let mut params = GovernanceParams::default();
        params.routing.congestion_threshold_percent = 101;
        assert!(matches!(
            params.validate(),
            Err(ConfigError::PercentOutOfRange { field: "routing.congestion_threshold_percent", .. })
        ));
    }

    #[test]
    fn rejects_commission_cap_above_hundred_percent() {
        let mut params = GovernanceParams::default();
        params.validators.max_commission_bps = 10_001;
        assert!(matches!(
            params.validate(),
            Err(ConfigError::BasisPointsOutOfRange { .. })
        ));
    }
}
