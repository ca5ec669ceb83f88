//! End-to-end vote handling through the quorum cop.
//!
//! Votes arrive one at a time, are pooled, assembled into a state change or
//! checkpoint once enough have been collected, and the assembled result is
//! checked by the same verifiers block validation uses.

use stakevote_node::{CopError, QuorumCop, QuorumStore};
use stakevote_types::test_utils::{test_checkpoint_vote, test_quorum, test_state_change_vote};
use stakevote_types::{
    Block, HardFork, Hash, KeyPair, NewState, PulseInfo, Quorum, QuorumType, QuorumVote,
    Transaction, WireVote,
};
use stakevote_voting::{verify_checkpoint, verify_tx_state_change, VoteVerifyError, VotingConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const HF: HardFork = HardFork(19);
const HEIGHT: u64 = 1000;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

fn setup() -> (Vec<KeyPair>, Arc<Quorum>, QuorumCop) {
    init_tracing();
    let (keys, quorum) = test_quorum(20, 5);
    let quorum = Arc::new(quorum);
    let store = QuorumStore::new();
    store.insert(HEIGHT, QuorumType::Obligations, Arc::clone(&quorum));
    store.insert(HEIGHT, QuorumType::Checkpointing, Arc::clone(&quorum));
    let cop = QuorumCop::new(Arc::new(store), VotingConfig::default());
    (keys, quorum, cop)
}

fn block(height: u64) -> Block {
    Block {
        height,
        hash: Hash::fast_hash(&height.to_le_bytes()),
        major_version: HF,
        pulse: PulseInfo::default(),
        signatures: Vec::new(),
    }
}

#[test]
fn test_votes_to_committed_state_change() {
    let (keys, quorum, cop) = setup();
    let config = cop.config().clone();

    // Votes arrive out of order; the group stays sorted.
    let mut assembled = None;
    for index in [9u16, 4, 0, 7, 2, 5, 1] {
        let vote =
            test_state_change_vote(&keys[index as usize], HEIGHT, index, 3, NewState::Decommission);
        let insertion = cop.handle_vote(&vote, HEIGHT, HF).unwrap();
        assert!(insertion.added);
        assembled = cop.build_state_change(&insertion.votes);
    }

    let state_change = assembled.unwrap();
    let indices: Vec<u32> = state_change.votes.iter().map(|v| v.validator_index).collect();
    assert_eq!(indices, vec![0, 1, 2, 4, 5, 7, 9]);
    assert_eq!(
        verify_tx_state_change(&state_change, HEIGHT + 1, &quorum, HF, &config),
        Ok(())
    );

    let tx = Transaction::state_change(&state_change, HF, config.hard_forks.richer_state_changes)
        .unwrap();
    cop.block_added(&block(HEIGHT + 1), &[tx]);
    assert_eq!(cop.pool().len_obligations(), 0);
}

#[test]
fn test_votes_to_checkpoint() {
    let (keys, quorum, cop) = setup();
    let config = cop.config().clone();
    let hash = Hash::fast_hash(b"checkpointed block");

    let mut checkpoint = None;
    for index in 0..13u16 {
        let vote = test_checkpoint_vote(&keys[index as usize], HEIGHT, index, hash);
        let insertion = cop.handle_vote(&vote, HEIGHT, HF).unwrap();
        checkpoint = cop.build_checkpoint(&insertion.votes);
        if index < 12 {
            assert!(checkpoint.is_none());
        }
    }

    let checkpoint = checkpoint.unwrap();
    assert_eq!(checkpoint.height, HEIGHT);
    assert_eq!(verify_checkpoint(HF, &checkpoint, &quorum, &config), Ok(()));
    assert!(cop.pool().received_checkpoint_vote(HEIGHT, 12));
}

#[test]
fn test_wire_votes() {
    let (keys, _, cop) = setup();
    let vote = test_state_change_vote(&keys[1], HEIGHT, 1, 0, NewState::IpChangePenalty);

    let (decoded, insertion) = cop
        .handle_wire_vote(WireVote::from(&vote), HEIGHT, HF)
        .unwrap();
    assert_eq!(decoded, vote);
    assert!(insertion.added);

    let mut wire = WireVote::from(&vote);
    wire.quorum_type = QuorumType::Pulse as u8;
    let err = cop.handle_wire_vote(wire, HEIGHT, HF).unwrap_err();
    assert_eq!(err, CopError::Vote(VoteVerifyError::InvalidVoteType(3)));
    assert!(err.context().invalid_vote_type);
}

#[test]
fn test_relay_round_trip() {
    let (keys, _, cop) = setup();
    let votes: Vec<QuorumVote> = (0..3u16)
        .map(|i| test_state_change_vote(&keys[i as usize], HEIGHT, i, 4, NewState::Recommission))
        .collect();
    for vote in &votes {
        cop.handle_vote(vote, HEIGHT, HF).unwrap();
    }

    cop.set_time(Duration::from_secs(1_000));
    let relayable = cop.relayable_votes(HEIGHT, HF, false);
    assert_eq!(relayable, votes);
    cop.set_votes_relayed(&relayable);

    cop.set_time(Duration::from_secs(1_060));
    assert!(cop.relayable_votes(HEIGHT, HF, false).is_empty());

    cop.set_time(Duration::from_secs(1_120));
    assert_eq!(cop.relayable_votes(HEIGHT, HF, false), votes);
}

#[test]
fn test_expired_votes_dropped_on_block() {
    let (keys, _, cop) = setup();
    let vote = test_checkpoint_vote(&keys[0], HEIGHT, 0, Hash::fast_hash(b"old"));
    cop.handle_vote(&vote, HEIGHT, HF).unwrap();

    cop.block_added(&block(HEIGHT + 60), &[]);
    assert_eq!(cop.pool().len_checkpoints(), 1);

    cop.block_added(&block(HEIGHT + 61), &[]);
    assert!(cop.pool().is_empty());
}
