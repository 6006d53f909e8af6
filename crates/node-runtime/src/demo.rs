//! Startup choreography.
//!
//! Drives one pass of every subsystem against the live wiring: a validator
//! committee, two shards, a finalized consensus round whose root lands in
//! the shard registry, a rebalance, a cross-shard batch, and a payment
//! channel taken from opening through an HTLC, a countersigned bridge
//! anchor, and a cooperative close. A second channel is left in dispute so
//! the bridge's arbitration surface shows up in the logs.
//!
//! Everything here goes through the same public APIs the test suites use;
//! the demo exists to prove the wiring on a running node and to give a new
//! deployment a journal worth reading.

use anyhow::{ensure, Context, Result};
use k256::ecdsa::SigningKey;
use tracing::info;

use shared_types::{short_addr, short_hash, Address, PublicKey};
use tl_01_validators::ValidatorRegistryApi;
use tl_02_consensus::ConsensusApi;
use tl_03_shards::ShardRegistryApi;
use tl_04_routing::RoutingFabricApi;
use tl_05_bridge::adapters::recovering_verifier::{address_of, sign_compact};
use tl_05_bridge::domain::invariants::update_digest;
use tl_05_bridge::{ChannelBridgeApi, StateUpdate};
use tl_06_channels::domain::invariants::hash_lock_of;
use tl_06_channels::{ChannelLedgerApi, ChannelSnapshot, Preimage};

use crate::container::SubsystemContainer;

/// Validators registered by the choreography. Matches the default
/// `min_validators` so both shards can form.
const COMMITTEE_SIZE: usize = 4;

/// Run the choreography against a wired container.
pub fn run(container: &SubsystemContainer) -> Result<()> {
    info!("=== startup choreography: begin ===");

    let committee = enroll_committee(container).context("committee enrollment")?;
    let (shard_zero, shard_one) =
        form_shards(container, &committee).context("shard formation")?;
    finalize_round(container, &committee, shard_zero).context("consensus round")?;
    rebalance(container, &committee, shard_zero).context("shard rebalance")?;
    route_batch(container, shard_zero, shard_one).context("cross-shard batch")?;
    settle_channel(container).context("channel settlement")?;
    open_dispute(container).context("channel dispute")?;

    info!(
        events = container.journal.len(),
        "=== startup choreography: complete ==="
    );
    Ok(())
}

/// A fresh secp256k1 keypair and its on-ledger address.
fn keypair() -> (SigningKey, Address) {
    let key = SigningKey::random(&mut rand::thread_rng());
    let address = address_of(key.verifying_key());
    (key, address)
}

/// The registry's 32-byte key form: the x coordinate of the public point.
fn public_key_of(key: &SigningKey) -> PublicKey {
    let point = key.verifying_key().to_encoded_point(true);
    let mut public_key = [0u8; 32];
    public_key.copy_from_slice(&point.as_bytes()[1..33]);
    public_key
}

/// Register, activate, and shard-assign a validator committee.
fn enroll_committee(container: &SubsystemContainer) -> Result<Vec<Address>> {
    let min_stake = container.config.params.validators.min_stake;
    let mut committee = Vec::with_capacity(COMMITTEE_SIZE);

    for index in 0..COMMITTEE_SIZE {
        let (key, identity) = keypair();
        let stake = min_stake * (2 + index as u128);
        container
            .registry
            .register(identity, public_key_of(&key), stake, 500)
            .context("validator registration")?;
        container.registry.activate(&identity)?;
        committee.push(identity);
        info!(
            validator = %short_addr(&identity),
            stake,
            "validator enrolled"
        );
    }

    Ok(committee)
}

/// Create and activate two shards served by the whole committee.
fn form_shards(
    container: &SubsystemContainer,
    committee: &[Address],
) -> Result<(u16, u16)> {
    let operator = container.config.operator;
    let mut ids = Vec::with_capacity(2);

    for _ in 0..2 {
        let shard = container
            .shards
            .create_shard(&operator, 1_000, committee.to_vec())
            .context("shard creation")?;
        container.shards.activate_shard(&operator, shard.id)?;
        for identity in committee {
            container
                .registry
                .assign_to_shard(&operator, identity, shard.id)?;
        }
        info!(shard = shard.id, validators = committee.len(), "shard active");
        ids.push(shard.id);
    }

    Ok((ids[0], ids[1]))
}

/// Run one consensus round to finalization; the root flows through the
/// state-root sink into the shard registry.
fn finalize_round(
    container: &SubsystemContainer,
    committee: &[Address],
    shard_id: u16,
) -> Result<()> {
    let operator = container.config.operator;
    container.consensus.configure_shard(&operator, shard_id)?;

    let round = container.consensus.start_round(shard_id, &committee[0])?;
    info!(
        round = round.round_id,
        proposer = %short_addr(&round.proposer),
        required = round.required,
        "round open"
    );

    let state_root = [0x1d; 32];
    container
        .consensus
        .propose_state(shard_id, round.round_id, state_root, &round.proposer)?;

    let mut finalized = false;
    for identity in committee {
        let receipt = container
            .consensus
            .cast_vote(shard_id, round.round_id, identity, true)?;
        info!(
            votes = receipt.votes_for,
            required = receipt.required,
            "vote cast"
        );
        if receipt.finalized {
            finalized = true;
            break;
        }
    }
    ensure!(finalized, "committee did not reach the approval threshold");

    let mirrored = container
        .shards
        .shard(shard_id)
        .context("finalized shard vanished")?
        .state_root;
    ensure!(
        mirrored == Some(state_root),
        "finalized root did not reach the shard registry"
    );
    info!(root = %short_hash(&state_root), "round finalized, root mirrored");
    Ok(())
}

/// Push one shard over the rebalance threshold and complete the shed.
fn rebalance(
    container: &SubsystemContainer,
    committee: &[Address],
    shard_id: u16,
) -> Result<()> {
    let target = container
        .shards
        .update_load(&committee[0], shard_id, 950)
        .context("load report")?;
    ensure!(target.is_some(), "load at 95% did not trigger a rebalance");
    info!(shard = shard_id, ?target, "rebalance triggered");

    container
        .shards
        .complete_rebalance(&container.config.operator, shard_id, 400)?;
    let cooled = container
        .shards
        .shard(shard_id)
        .context("rebalanced shard vanished")?;
    info!(
        shard = shard_id,
        shed = 400,
        utilization = cooled.utilization_percent(),
        "rebalance complete"
    );
    Ok(())
}

/// Establish a route, send a small batch across it, and acknowledge.
fn route_batch(container: &SubsystemContainer, source: u16, target: u16) -> Result<()> {
    let (_, sender) = keypair();
    let (_, recipient) = keypair();

    container
        .routing
        .establish_route(source, target, 100, 5)
        .context("route establishment")?;

    let mut message_ids = Vec::new();
    for index in 0..3u8 {
        let payload = format!("transfer {index}").into_bytes();
        let message_id = container
            .routing
            .send_message(source, target, sender, recipient, payload)?;
        message_ids.push(message_id);
    }

    let batch_id = container
        .routing
        .create_batch(source, target, message_ids.clone())?;
    container.routing.process_batch(batch_id)?;
    for message_id in &message_ids {
        container
            .routing
            .acknowledge_message(*message_id, &recipient)?;
    }

    if let Some(metrics) = container.routing.route_metrics(source, target) {
        info!(
            source,
            target,
            delivered = message_ids.len(),
            success_rate = ?metrics.success_rate,
            "batch delivered"
        );
    }
    Ok(())
}

/// Open a channel, settle an HTLC, anchor the countersigned state on the
/// bridge, and close cooperatively.
fn settle_channel(container: &SubsystemContainer) -> Result<()> {
    let (alice_key, alice) = keypair();
    let (bob_key, bob) = keypair();

    let channel_id = container
        .channels
        .open(vec![alice, bob], 100, 100)
        .context("channel open")?;
    container.channels.confirm_open(channel_id, alice)?;
    info!(channel = %short_hash(&channel_id), "channel active");

    let preimage: Preimage = [0x5e; 32];
    let timelock = container.time.now() + 120;
    let htlc_id = container
        .channels
        .create_htlc(channel_id, alice, bob, 30, hash_lock_of(&preimage), timelock)
        .context("htlc creation")?;
    container.channels.resolve_htlc(htlc_id, preimage)?;
    info!(htlc = %short_hash(&htlc_id), amount = 30, "htlc settled");

    // Countersign the post-settlement state and anchor it on the bridge.
    let channel = container
        .channels
        .channel(&channel_id)
        .context("settled channel vanished")?;
    let snapshot = ChannelSnapshot {
        channel_id,
        sequence: 1,
        balances: channel.balances.clone(),
    };
    let state_hash = snapshot.digest().context("snapshot digest")?;
    let digest = update_digest(&channel_id, &state_hash, snapshot.sequence);
    let signatures = vec![
        sign_compact(&alice_key, &digest).context("first countersignature")?,
        sign_compact(&bob_key, &digest).context("second countersignature")?,
    ];
    container
        .bridge
        .update_channel_state(StateUpdate {
            channel_id,
            state_hash,
            sequence: snapshot.sequence,
            signatures,
        })
        .context("bridge anchor")?;
    info!(state = %short_hash(&state_hash), "state anchored on bridge");

    container
        .channels
        .initiate_close(channel_id, alice, state_hash)?;
    container.channels.confirm_close(channel_id, bob)?;
    info!(channel = %short_hash(&channel_id), "channel closed cooperatively");
    Ok(())
}

/// Open a second channel and leave it in dispute; resolution waits out the
/// dispute window, which a live node will not reach during startup.
fn open_dispute(container: &SubsystemContainer) -> Result<()> {
    let (_, alice) = keypair();
    let (_, bob) = keypair();

    let channel_id = container
        .channels
        .open(vec![alice, bob], 200, 200)
        .context("second channel open")?;
    container.channels.confirm_open(channel_id, alice)?;
    container
        .channels
        .raise_dispute(channel_id, bob, b"stale state".to_vec())
        .context("dispute escalation")?;

    let window_ends_at = container
        .bridge
        .channel(&channel_id)
        .and_then(|c| c.dispute)
        .map(|d| d.window_ends_at)
        .context("dispute record missing on bridge")?;
    info!(
        channel = %short_hash(&channel_id),
        window_ends_at,
        "dispute open, awaiting arbitration"
    );
    Ok(())
}
