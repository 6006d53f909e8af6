//! # Core Identifier Types
//!
//! Aliases for the natural keys of every persisted entity. All content-derived
//! ids are 32-byte SHA-256 digests; actor identities are 20-byte addresses.
//!
//! ## Clusters
//!
//! - **Actors**: `Address`, `PublicKey`
//! - **Ledger partitions**: `ShardId`, `RoundId`
//! - **Routing**: `MessageId`, `RouteKey`
//! - **Channels**: `ChannelId`, `HtlcId`

// =============================================================================
// CLUSTER A: HASHES AND ACTORS
// =============================================================================

/// A 32-byte hash (SHA-256).
pub type Hash = [u8; 32];

/// A 64-byte signature in wire form. Interpretation belongs to the injected
/// verifier; the core never inspects the bytes.
pub type Signature = [u8; 64];

/// A 32-byte public key.
pub type PublicKey = [u8; 32];

/// A 20-byte address identifying an actor (validator or channel participant).
pub type Address = [u8; 20];

// =============================================================================
// CLUSTER B: LEDGER PARTITIONS
// =============================================================================

/// Identifier of a shard. Shards are numbered sequentially from 0.
pub type ShardId = u16;

/// Identifier of a consensus round, monotonically increasing per shard.
pub type RoundId = u64;

// =============================================================================
// CLUSTER C: ROUTING AND CHANNELS
// =============================================================================

/// Content-derived identifier of a cross-shard message.
pub type MessageId = Hash;

/// Ordered (source, target) shard pair naming a directional route.
pub type RouteKey = (ShardId, ShardId);

/// Content-derived identifier of a payment channel.
pub type ChannelId = Hash;

/// Content-derived identifier of an HTLC.
pub type HtlcId = Hash;

// =============================================================================
// CLUSTER D: VALUE
// =============================================================================

/// Plain ledger units. Custody mechanics live outside the core; these are
/// bookkeeping amounts only.
pub type Amount = u128;

/// Fee or commission rate expressed in basis points (1/100th of a percent).
pub type BasisPoints = u16;

/// Render the leading bytes of a hash for log lines.
pub fn short_hash(hash: &Hash) -> String {
    hash[..4].iter().map(|b| format!("{b:02x}")).collect()
}

/// Render the leading bytes of an address for log lines.
pub fn short_addr(addr: &Address) -> String {
    addr[..4].iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_hash_renders_leading_bytes() {
        let mut h: Hash = [0u8; 32];
        h[0] = 0xde;
        h[1] = 0xad;
        assert_eq!(short_hash(&h), "dead0000");
    }

    #[test]
    fn short_addr_renders_leading_bytes() {
        let mut a: Address = [0u8; 20];
        a[0] = 0xbe;
        a[1] = 0xef;
        assert_eq!(short_addr(&a), "beef0000");
    }
}
