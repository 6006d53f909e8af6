//! Fabric invariants checked before any state is written.

use sha2::{Digest, Sha256};
use shared_types::{Address, MessageId, ShardId};

use super::errors::{RoutingError, RoutingResult};

/// Routes connect two distinct shards.
pub fn invariant_distinct_pair(source: ShardId, target: ShardId) -> RoutingResult<()> {
    if source == target {
        return Err(RoutingError::SelfRoute(source));
    }
    Ok(())
}

/// Payloads carry at least one byte and stay under the configured maximum.
pub fn invariant_payload_size(payload: &[u8], max: usize) -> RoutingResult<()> {
    if payload.is_empty() {
        return Err(RoutingError::EmptyPayload);
    }
    if payload.len() > max {
        return Err(RoutingError::PayloadTooLarge {
            got: payload.len(),
            max,
        });
    }
    Ok(())
}

/// Batches carry between one and `max` messages.
pub fn invariant_batch_size(count: usize, max: usize) -> RoutingResult<()> {
    if count == 0 {
        return Err(RoutingError::EmptyBatch);
    }
    if count > max {
        return Err(RoutingError::BatchTooLarge { got: count, max });
    }
    Ok(())
}

/// Whether `load` against `capacity` is at or above the congestion threshold.
pub fn crosses_congestion_threshold(load: u64, capacity: u64, threshold_percent: u8) -> bool {
    u128::from(load) * 100 >= u128::from(capacity) * u128::from(threshold_percent)
}

/// Content-derived message id: Sha-256 over the sender, the ordered shard
/// pair, the payload, and the fabric's send nonce. The nonce keeps repeated
/// identical sends distinct.
pub fn derive_message_id(
    sender: &Address,
    source: ShardId,
    target: ShardId,
    payload: &[u8],
    nonce: u64,
) -> MessageId {
    let mut hasher = Sha256::new();
    hasher.update(sender);
    hasher.update(source.to_be_bytes());
    hasher.update(target.to_be_bytes());
    hasher.update(payload);
    hasher.update(nonce.to_be_bytes());
    hasher.finalize().into()
}
