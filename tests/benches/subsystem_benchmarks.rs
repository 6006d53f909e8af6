//! # Trellis Subsystem Benchmarks
//!
//! Performance validation for the hot paths of each subsystem:
//!
//! | Subsystem | Path | Target |
//! |-----------|------|--------|
//! | tl-01 Validator Registry | register + activate | < 1ms |
//! | tl-02 Consensus | round open to finalized root | < 5ms |
//! | tl-03 Shard Registry | load report with threshold check | < 1ms |
//! | tl-04 Routing | 100-message batch drain | < 1ms per message |
//! | tl-05 Bridge | compact signature recovery | < 1ms |
//! | tl-06 Channels | HTLC lock and settle | < 1ms |
//!
//! Every benchmark drives the real services through a wired
//! `SubsystemContainer` on a manual clock, so the numbers include the lock,
//! journal, and event-fanout costs a node pays in production.

use std::time::Duration;

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};

use shared_types::{Address, ChannelId, ManualTimeSource, ShardId};
use tl_01_validators::ValidatorRegistryApi;
use tl_02_consensus::ConsensusApi;
use tl_03_shards::ShardRegistryApi;
use tl_04_routing::RoutingFabricApi;
use tl_05_bridge::adapters::recovering_verifier::{address_of, sign_compact, RecoveringVerifier};
use tl_05_bridge::SignatureVerifier;
use tl_06_channels::domain::invariants::hash_lock_of;
use tl_06_channels::{ChannelLedgerApi, ChannelSnapshot, Preimage};

use node_runtime::{NodeConfig, SubsystemContainer};

const START: u64 = 1_000_000;

// ============================================================================
// Shared fixtures
// ============================================================================

fn fresh_container() -> SubsystemContainer {
    SubsystemContainer::with_clock(
        NodeConfig::default(),
        ManualTimeSource::starting_at(START),
    )
}

/// Deterministic distinct addresses without key generation on the hot path.
fn nth_address(index: usize) -> Address {
    let mut address = [0u8; 20];
    address[..8].copy_from_slice(&(index as u64 + 1).to_be_bytes());
    address
}

/// Four active validators on one configured shard, the smallest electorate
/// the default governance parameters accept.
fn committee_shard(container: &SubsystemContainer) -> (Vec<Address>, ShardId) {
    let operator = container.config.operator;
    let committee: Vec<Address> = (0..4).map(nth_address).collect();
    for identity in &committee {
        container
            .registry
            .register(*identity, [0x0f; 32], 2_000, 500)
            .unwrap();
        container.registry.activate(identity).unwrap();
    }
    let shard = container
        .shards
        .create_shard(&operator, 1_000, committee.clone())
        .unwrap();
    container.shards.activate_shard(&operator, shard.id).unwrap();
    for identity in &committee {
        container
            .registry
            .assign_to_shard(&operator, identity, shard.id)
            .unwrap();
    }
    container.consensus.configure_shard(&operator, shard.id).unwrap();
    (committee, shard.id)
}

fn active_channel(container: &SubsystemContainer) -> (ChannelId, Address, Address) {
    let alice = nth_address(100);
    let bob = nth_address(101);
    let channel_id = container.channels.open(vec![alice, bob], 1_000, 1_000).unwrap();
    container.channels.confirm_open(channel_id, alice).unwrap();
    (channel_id, alice, bob)
}

// ============================================================================
// TL-01: Validator Registry
// Claim: enrollment is a pair of guarded map writes, not a consensus round
// ============================================================================

fn bench_registry_enrollment(c: &mut Criterion) {
    let mut group = c.benchmark_group("tl-01-validator-registry");
    group.measurement_time(Duration::from_secs(10));

    for count in [10usize, 100] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(
            BenchmarkId::new("register_and_activate", count),
            &count,
            |b, &count| {
                b.iter_batched(
                    || {
                        let identities: Vec<Address> = (0..count).map(nth_address).collect();
                        (fresh_container(), identities)
                    },
                    |(container, identities)| {
                        for identity in identities {
                            container
                                .registry
                                .register(identity, [0x0f; 32], 2_000, 500)
                                .unwrap();
                            container.registry.activate(&identity).unwrap();
                        }
                        black_box(container.registry.registered_count())
                    },
                    BatchSize::SmallInput,
                )
            },
        );
    }

    // Point lookup against a populated roll.
    let container = fresh_container();
    for index in 0..100 {
        let identity = nth_address(index);
        container
            .registry
            .register(identity, [0x0f; 32], 2_000, 500)
            .unwrap();
        container.registry.activate(&identity).unwrap();
    }
    let probe = nth_address(57);
    group.bench_function("validator_lookup", |b| {
        b.iter(|| black_box(container.registry.validator(&probe)))
    });

    group.finish();
}

// ============================================================================
// TL-02: Consensus
// Claim: a full round, open through finalized root, stays in single-digit
// milliseconds including the registry reward writes and the root mirror
// ============================================================================

fn bench_consensus_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("tl-02-consensus");
    group.measurement_time(Duration::from_secs(10));

    let container = fresh_container();
    let (committee, shard_id) = committee_shard(&container);

    group.bench_function("round_open_to_finalized_root", |b| {
        b.iter(|| {
            let round = container
                .consensus
                .start_round(shard_id, &committee[0])
                .unwrap();
            container
                .consensus
                .propose_state(shard_id, round.round_id, [0x1d; 32], &round.proposer)
                .unwrap();
            let mut finalized = false;
            for identity in &committee {
                let receipt = container
                    .consensus
                    .cast_vote(shard_id, round.round_id, identity, true)
                    .unwrap();
                if receipt.finalized {
                    finalized = true;
                    break;
                }
            }
            black_box(finalized)
        })
    });

    group.finish();
}

// ============================================================================
// TL-03: Shard Registry
// Claim: a load report is one threshold check on top of the map write
// ============================================================================

fn bench_shard_load_reports(c: &mut Criterion) {
    let mut group = c.benchmark_group("tl-03-shard-registry");
    group.measurement_time(Duration::from_secs(10));

    let container = fresh_container();
    let (committee, shard_id) = committee_shard(&container);

    // 600 of 1000 sits under the 75% trigger, so every report takes the
    // no-rebalance path a healthy shard sees.
    group.bench_function("load_report_below_threshold", |b| {
        b.iter(|| {
            black_box(
                container
                    .shards
                    .update_load(&committee[0], shard_id, 600)
                    .unwrap(),
            )
        })
    });

    // Full-roll read with several shards in play.
    let operator = container.config.operator;
    for _ in 0..7 {
        let shard = container
            .shards
            .create_shard(&operator, 1_000, committee.clone())
            .unwrap();
        container.shards.activate_shard(&operator, shard.id).unwrap();
    }
    group.bench_function("roll_read_eight_shards", |b| {
        b.iter(|| black_box(container.shards.shards().len()))
    });

    group.finish();
}

// ============================================================================
// TL-04: Routing
// Claim: batch drain amortizes to well under a millisecond per message
// ============================================================================

fn bench_routing_batches(c: &mut Criterion) {
    let mut group = c.benchmark_group("tl-04-routing");
    group.measurement_time(Duration::from_secs(10));

    let sender = nth_address(200);
    let recipient = nth_address(201);

    let seeded_route = || {
        let container = fresh_container();
        container.routing.establish_route(0, 1, 1_000, 5).unwrap();
        container
    };

    group.throughput(Throughput::Elements(100));
    group.bench_function("send_100_messages", |b| {
        b.iter_batched(
            seeded_route,
            |container| {
                for index in 0..100u32 {
                    let payload = index.to_be_bytes().to_vec();
                    container
                        .routing
                        .send_message(0, 1, sender, recipient, payload)
                        .unwrap();
                }
            },
            BatchSize::SmallInput,
        )
    });

    group.throughput(Throughput::Elements(100));
    group.bench_function("drain_batch_of_100", |b| {
        b.iter_batched(
            || {
                let container = seeded_route();
                let ids: Vec<_> = (0..100u32)
                    .map(|index| {
                        container
                            .routing
                            .send_message(0, 1, sender, recipient, index.to_be_bytes().to_vec())
                            .unwrap()
                    })
                    .collect();
                let batch_id = container.routing.create_batch(0, 1, ids).unwrap();
                (container, batch_id)
            },
            |(container, batch_id)| container.routing.process_batch(batch_id).unwrap(),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

// ============================================================================
// TL-05: Bridge
// Claim: compact-signature recovery is the dispute path's unit cost
// ============================================================================

fn bench_signature_recovery(c: &mut Criterion) {
    use k256::ecdsa::SigningKey;

    let mut group = c.benchmark_group("tl-05-bridge");
    group.measurement_time(Duration::from_secs(10));

    let verifier = RecoveringVerifier::new();
    let key = SigningKey::random(&mut rand::thread_rng());
    let signer = address_of(key.verifying_key());

    let digest = [0x3c; 32];
    let signature = sign_compact(&key, &digest).unwrap();
    assert_eq!(verifier.recover(&digest, &signature), Some(signer));

    group.bench_function("recover_single", |b| {
        b.iter(|| black_box(verifier.recover(&digest, &signature)))
    });

    for size in [10usize, 50] {
        let digests: Vec<[u8; 32]> = (0..size)
            .map(|index| {
                let mut digest = [0u8; 32];
                digest[..8].copy_from_slice(&(index as u64).to_be_bytes());
                digest
            })
            .collect();
        let signatures: Vec<_> = digests
            .iter()
            .map(|digest| sign_compact(&key, digest).unwrap())
            .collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(
            BenchmarkId::new("recover_batch", size),
            &(digests, signatures),
            |b, (digests, signatures)| {
                b.iter(|| {
                    let mut recovered = 0u32;
                    for (digest, signature) in digests.iter().zip(signatures.iter()) {
                        if verifier.recover(digest, signature) == Some(signer) {
                            recovered += 1;
                        }
                    }
                    black_box(recovered)
                })
            },
        );
    }

    group.finish();
}

// ============================================================================
// TL-06: Channels
// Claim: an HTLC lock-and-settle pair is two guarded balance moves
// ============================================================================

fn bench_htlc_settlement(c: &mut Criterion) {
    let mut group = c.benchmark_group("tl-06-channels");
    group.measurement_time(Duration::from_secs(10));

    let preimage: Preimage = [0x5e; 32];
    let hash_lock = hash_lock_of(&preimage);

    group.bench_function("htlc_lock_and_settle", |b| {
        b.iter_batched(
            || {
                let container = fresh_container();
                let (channel_id, alice, bob) = active_channel(&container);
                (container, channel_id, alice, bob)
            },
            |(container, channel_id, alice, bob)| {
                let htlc_id = container
                    .channels
                    .create_htlc(channel_id, alice, bob, 30, hash_lock, START + 600)
                    .unwrap();
                container.channels.resolve_htlc(htlc_id, preimage).unwrap();
                black_box(htlc_id)
            },
            BatchSize::SmallInput,
        )
    });

    // The digest every countersigned state update commits to.
    for participants in [2usize, 8] {
        let snapshot = ChannelSnapshot {
            channel_id: [0x7a; 32],
            sequence: 42,
            balances: (0..participants)
                .map(|index| (nth_address(index), 1_000u128))
                .collect(),
        };
        group.bench_with_input(
            BenchmarkId::new("snapshot_digest", participants),
            &snapshot,
            |b, snapshot| b.iter(|| black_box(snapshot.digest().unwrap())),
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_registry_enrollment,
    bench_consensus_round,
    bench_shard_load_reports,
    bench_routing_batches,
    bench_signature_recovery,
    bench_htlc_settlement,
);

criterion_main!(benches);
