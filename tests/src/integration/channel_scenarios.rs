//! HTLC settlement scenarios through the live channel-to-bridge wiring.
//!
//! Each test opens a real channel: the ledger registers it with the bridge
//! through the runtime gateway, so a bridge refusal would fail these tests
//! the same way it fails on a node.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shared_types::{Address, Amount, ManualTimeSource};
    use tl_05_bridge::ChannelBridgeApi;
    use tl_06_channels::domain::invariants::hash_lock_of;
    use tl_06_channels::{
        Channel, ChannelError, ChannelLedgerApi, ChannelPhase, HtlcState, Preimage,
    };

    use node_runtime::{NodeConfig, SubsystemContainer};

    const START: u64 = 1_000_000;
    const ALICE: Address = [0xa1; 20];
    const BOB: Address = [0xb2; 20];
    const SECRET: Preimage = [0x5e; 32];

    // =========================================================================
    // FIXTURES
    // =========================================================================

    fn live_container() -> (SubsystemContainer, Arc<ManualTimeSource>) {
        let time = ManualTimeSource::starting_at(START);
        let container = SubsystemContainer::with_clock(NodeConfig::default(), time.clone());
        (container, time)
    }

    /// Channel of capacity 100 split 50/50, already Active, with one pending
    /// HTLC of 30 from ALICE to BOB locked until `START + 600`.
    fn channel_with_htlc(
        container: &SubsystemContainer,
    ) -> (shared_types::ChannelId, shared_types::HtlcId) {
        let channel_id = container.channels.open(vec![ALICE, BOB], 100, 100).unwrap();
        container.channels.confirm_open(channel_id, ALICE).unwrap();
        let htlc_id = container
            .channels
            .create_htlc(channel_id, ALICE, BOB, 30, hash_lock_of(&SECRET), START + 600)
            .unwrap();
        (channel_id, htlc_id)
    }

    /// `sum(balances) + total_locked == capacity`, the channel conservation
    /// law. Checked after every mutation below.
    fn assert_conserved(channel: &Channel) {
        let held: Amount = channel.balances.iter().map(|(_, b)| *b).sum();
        assert_eq!(
            held + channel.total_locked,
            channel.capacity,
            "conservation violated: balances {held} + locked {} != capacity {}",
            channel.total_locked,
            channel.capacity
        );
    }

    // =========================================================================
    // SCENARIO: RESOLVE WITH THE CORRECT PREIMAGE
    // =========================================================================

    #[test]
    fn test_htlc_resolves_with_correct_preimage() {
        let (container, _) = live_container();
        let (channel_id, htlc_id) = channel_with_htlc(&container);

        // Creation debited the sender into the locked pool.
        let channel = container.channels.channel(&channel_id).unwrap();
        assert_eq!(channel.balance_of(&ALICE), Some(20));
        assert_eq!(channel.balance_of(&BOB), Some(50));
        assert_eq!(channel.total_locked, 30);
        assert_conserved(&channel);

        container.channels.resolve_htlc(htlc_id, SECRET).unwrap();

        let channel = container.channels.channel(&channel_id).unwrap();
        assert_eq!(channel.balance_of(&ALICE), Some(20));
        assert_eq!(channel.balance_of(&BOB), Some(80));
        assert_eq!(channel.total_locked, 0);
        assert_conserved(&channel);

        let htlc = container.channels.htlc(&htlc_id).unwrap();
        assert_eq!(htlc.state, HtlcState::Completed);
        assert_eq!(htlc.preimage, Some(SECRET));
    }

    // =========================================================================
    // SCENARIO: WRONG PREIMAGE
    // =========================================================================

    #[test]
    fn test_wrong_preimage_leaves_balances_unchanged() {
        let (container, _) = live_container();
        let (channel_id, htlc_id) = channel_with_htlc(&container);

        let err = container
            .channels
            .resolve_htlc(htlc_id, [0xff; 32])
            .unwrap_err();
        assert_eq!(err, ChannelError::InvalidPreimage);

        let channel = container.channels.channel(&channel_id).unwrap();
        assert_eq!(channel.balance_of(&ALICE), Some(20));
        assert_eq!(channel.balance_of(&BOB), Some(50));
        assert_eq!(channel.total_locked, 30);
        assert_conserved(&channel);

        // Still resolvable with the right secret.
        assert_eq!(
            container.channels.htlc(&htlc_id).unwrap().state,
            HtlcState::Pending
        );
        container.channels.resolve_htlc(htlc_id, SECRET).unwrap();
    }

    // =========================================================================
    // SCENARIO: TIMELOCK LAPSE AND REFUND
    // =========================================================================

    #[test]
    fn test_expired_htlc_refuses_resolution_and_refunds() {
        let (container, time) = live_container();
        let (channel_id, htlc_id) = channel_with_htlc(&container);

        time.advance(601);

        // Even the correct preimage cannot unlock a lapsed HTLC.
        let err = container.channels.resolve_htlc(htlc_id, SECRET).unwrap_err();
        assert_eq!(err, ChannelError::HtlcExpired { timelock: START + 600 });

        let channel = container.channels.channel(&channel_id).unwrap();
        assert_eq!(channel.balance_of(&ALICE), Some(20));
        assert_eq!(channel.total_locked, 30);
        assert_conserved(&channel);

        // Only the sender can recover the locked value.
        let err = container.channels.refund_htlc(htlc_id, BOB).unwrap_err();
        assert_eq!(err, ChannelError::NotSender);

        container.channels.refund_htlc(htlc_id, ALICE).unwrap();

        let channel = container.channels.channel(&channel_id).unwrap();
        assert_eq!(channel.balance_of(&ALICE), Some(50));
        assert_eq!(channel.balance_of(&BOB), Some(50));
        assert_eq!(channel.total_locked, 0);
        assert_conserved(&channel);
        assert_eq!(
            container.channels.htlc(&htlc_id).unwrap().state,
            HtlcState::Refunded
        );
    }

    #[test]
    fn test_refund_is_closed_before_the_timelock() {
        let (container, time) = live_container();
        let (_, htlc_id) = channel_with_htlc(&container);

        time.advance(599);

        let err = container.channels.refund_htlc(htlc_id, ALICE).unwrap_err();
        assert_eq!(
            err,
            ChannelError::TimelockNotReached { timelock: START + 600 }
        );
    }

    // =========================================================================
    // CLOSE INTERACTIONS
    // =========================================================================

    #[test]
    fn test_close_waits_for_pending_htlcs() {
        let (container, _) = live_container();
        let (channel_id, htlc_id) = channel_with_htlc(&container);

        container
            .channels
            .initiate_close(channel_id, ALICE, [0xcc; 32])
            .unwrap();

        // The final confirmation is the one that settles, so it is the one
        // that refuses while value is still parked in an HTLC.
        let err = container.channels.confirm_close(channel_id, BOB).unwrap_err();
        assert_eq!(err, ChannelError::OpenHtlcs { count: 1 });

        container.channels.resolve_htlc(htlc_id, SECRET).unwrap();
        container.channels.confirm_close(channel_id, BOB).unwrap();

        let channel = container.channels.channel(&channel_id).unwrap();
        assert_eq!(channel.phase, ChannelPhase::Closed);
        assert_conserved(&channel);

        // Settlement retired the bridge anchor as well.
        let anchored = container.bridge.channel(&channel_id).unwrap();
        assert!(!anchored.active);
    }

    #[test]
    fn test_open_registers_on_the_bridge() {
        let (container, _) = live_container();
        let channel_id = container.channels.open(vec![ALICE, BOB], 100, 100).unwrap();

        let anchored = container.bridge.channel(&channel_id).unwrap();
        assert!(anchored.active);
        assert_eq!(anchored.participants, vec![ALICE, BOB]);
    }
}
