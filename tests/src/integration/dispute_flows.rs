//! Dispute escalation and validator arbitration, end to end.
//!
//! The disputant raises through the channel ledger, the bridge freezes the
//! channel for the dispute window, registered validators countersign an
//! arbitrated final state, and the resolution flows back into the ledger
//! for an ordinary confirmed close. Validator registration runs through
//! tl-01 because the bridge's census is the live registry.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use k256::ecdsa::SigningKey;

    use shared_types::{Address, ChannelId, Hash, ManualTimeSource, PublicKey, Signature};
    use tl_01_validators::ValidatorRegistryApi;
    use tl_05_bridge::adapters::recovering_verifier::{address_of, sign_compact};
    use tl_05_bridge::domain::invariants::resolution_digest;
    use tl_05_bridge::{BridgeError, ChannelBridgeApi, DisputeStatus};
    use tl_06_channels::{ChannelError, ChannelLedgerApi, ChannelPhase};

    use node_runtime::{NodeConfig, SubsystemContainer};

    const START: u64 = 1_000_000;
    const FINAL_STATE: Hash = [0xfd; 32];

    // =========================================================================
    // FIXTURES
    // =========================================================================

    fn keypair() -> (SigningKey, Address) {
        let key = SigningKey::random(&mut rand::thread_rng());
        let address = address_of(key.verifying_key());
        (key, address)
    }

    fn public_key_of(key: &SigningKey) -> PublicKey {
        let point = key.verifying_key().to_encoded_point(true);
        let mut public_key = [0u8; 32];
        public_key.copy_from_slice(&point.as_bytes()[1..33]);
        public_key
    }

    /// Container with four registered validators (the arbitration census)
    /// and one Disputed channel between two outside participants.
    ///
    /// Returns the validator keys, the channel id, and the clock. The
    /// dispute window ends at `START + 600`.
    fn disputed_channel() -> (
        SubsystemContainer,
        Vec<SigningKey>,
        ChannelId,
        Arc<ManualTimeSource>,
    ) {
        let time = ManualTimeSource::starting_at(START);
        let container = SubsystemContainer::with_clock(NodeConfig::default(), time.clone());

        let mut validator_keys = Vec::new();
        for _ in 0..4 {
            let (key, identity) = keypair();
            container
                .registry
                .register(identity, public_key_of(&key), 2_000, 500)
                .unwrap();
            validator_keys.push(key);
        }

        let (_, alice) = keypair();
        let (_, bob) = keypair();
        let channel_id = container.channels.open(vec![alice, bob], 200, 200).unwrap();
        container.channels.confirm_open(channel_id, alice).unwrap();
        container
            .channels
            .raise_dispute(channel_id, bob, b"stale balance proof".to_vec())
            .unwrap();

        (container, validator_keys, channel_id, time)
    }

    /// Arbitration signatures over the resolution digest, one per key.
    fn arbitration_signatures(keys: &[SigningKey], channel_id: &ChannelId) -> Vec<Signature> {
        let digest = resolution_digest(channel_id, &FINAL_STATE);
        keys.iter()
            .map(|key| sign_compact(key, &digest).unwrap())
            .collect()
    }

    // =========================================================================
    // ESCALATION
    // =========================================================================

    #[test]
    fn test_escalation_freezes_the_channel_on_both_sides() {
        let (container, _, channel_id, _) = disputed_channel();

        // Ledger side: the channel is Disputed.
        assert_eq!(
            container.channels.channel(&channel_id).unwrap().phase,
            ChannelPhase::Disputed
        );

        // Bridge side: the dispute is on record with the full window.
        let anchored = container.bridge.channel(&channel_id).unwrap();
        let dispute = anchored.dispute.unwrap();
        assert_eq!(dispute.status, DisputeStatus::Initiated);
        assert_eq!(dispute.window_ends_at, START + 600);
        assert_eq!(dispute.proof, b"stale balance proof".to_vec());

        // Frozen: no state update lands while the dispute is open.
        let err = container
            .bridge
            .update_channel_state(tl_05_bridge::StateUpdate {
                channel_id,
                state_hash: [0x77; 32],
                sequence: 1,
                signatures: vec![[0u8; 64], [0u8; 64]],
            })
            .unwrap_err();
        assert_eq!(
            err,
            BridgeError::DisputeAlreadyOpen { window_ends_at: START + 600 }
        );
    }

    #[test]
    fn test_second_escalation_is_rejected() {
        let (container, _, channel_id, _) = disputed_channel();
        let participant = container.channels.channel(&channel_id).unwrap().participants[0];

        let err = container
            .channels
            .raise_dispute(channel_id, participant, b"again".to_vec())
            .unwrap_err();
        assert!(matches!(err, ChannelError::InvalidTransition { .. }));
    }

    // =========================================================================
    // ARBITRATION
    // =========================================================================

    #[test]
    fn test_resolution_waits_out_the_window() {
        let (container, keys, channel_id, time) = disputed_channel();
        let signatures = arbitration_signatures(&keys[..3], &channel_id);

        time.advance(599);
        let err = container
            .bridge
            .resolve_dispute(channel_id, FINAL_STATE, signatures.clone())
            .unwrap_err();
        assert_eq!(err, BridgeError::DisputeWindowOpen { ends_at: START + 600 });

        time.advance(2);
        container
            .bridge
            .resolve_dispute(channel_id, FINAL_STATE, signatures)
            .unwrap();
    }

    #[test]
    fn test_resolution_requires_a_supermajority_of_distinct_validators() {
        let (container, keys, channel_id, time) = disputed_channel();
        time.advance(601);

        // Two distinct signers, one of them twice: copies count once, so
        // three signatures still fall short of 3-of-4.
        let digest = resolution_digest(&channel_id, &FINAL_STATE);
        let signatures = vec![
            sign_compact(&keys[0], &digest).unwrap(),
            sign_compact(&keys[1], &digest).unwrap(),
            sign_compact(&keys[0], &digest).unwrap(),
        ];
        let err = container
            .bridge
            .resolve_dispute(channel_id, FINAL_STATE, signatures)
            .unwrap_err();
        assert_eq!(
            err,
            BridgeError::InsufficientValidatorSignatures { got: 2, required: 3 }
        );
    }

    #[test]
    fn test_outside_signers_are_rejected() {
        let (container, keys, channel_id, time) = disputed_channel();
        time.advance(601);

        let digest = resolution_digest(&channel_id, &FINAL_STATE);
        let (outsider, _) = keypair();
        let signatures = vec![
            sign_compact(&keys[0], &digest).unwrap(),
            sign_compact(&keys[1], &digest).unwrap(),
            sign_compact(&outsider, &digest).unwrap(),
        ];
        let err = container
            .bridge
            .resolve_dispute(channel_id, FINAL_STATE, signatures)
            .unwrap_err();
        assert_eq!(err, BridgeError::InvalidSignature { index: 2 });
    }

    // =========================================================================
    // RESOLUTION BACK INTO THE LEDGER
    // =========================================================================

    #[test]
    fn test_arbitrated_state_closes_the_channel() {
        let (container, keys, channel_id, time) = disputed_channel();
        time.advance(601);

        container
            .bridge
            .resolve_dispute(
                channel_id,
                FINAL_STATE,
                arbitration_signatures(&keys[..3], &channel_id),
            )
            .unwrap();

        let anchored = container.bridge.channel(&channel_id).unwrap();
        assert_eq!(anchored.dispute.unwrap().status, DisputeStatus::Resolved);
        assert_eq!(anchored.latest_state_hash, Some(FINAL_STATE));

        // The arbitrated hash re-enters the ledger as a fresh close
        // proposal with no confirmations carried over.
        container.channels.apply_resolution(channel_id, FINAL_STATE).unwrap();
        let channel = container.channels.channel(&channel_id).unwrap();
        assert_eq!(channel.phase, ChannelPhase::Closing);
        assert_eq!(channel.closing_state_hash, Some(FINAL_STATE));
        assert!(channel.confirmations.is_empty());

        let participants = channel.participants.clone();
        for participant in participants {
            container.channels.confirm_close(channel_id, participant).unwrap();
        }
        assert_eq!(
            container.channels.channel(&channel_id).unwrap().phase,
            ChannelPhase::Closed
        );
        assert!(!container.bridge.channel(&channel_id).unwrap().active);
    }
}
