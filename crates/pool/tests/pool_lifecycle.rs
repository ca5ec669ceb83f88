//! Voting pool lifecycle tests.
//!
//! Drives a shared pool through insertion, relay, expiry and commit the way
//! the node does, using real signed votes.

use stakevote_pool::VotingPool;
use stakevote_types::test_utils::{test_checkpoint_vote, test_keys, test_state_change_vote};
use stakevote_types::{HardFork, Hash, KeyPair, NewState, QuorumType, QuorumVote};
use stakevote_voting::VotingConfig;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

fn keys() -> Vec<KeyPair> {
    init_tracing();
    test_keys(20, 11)
}

fn obligations_vote(keys: &[KeyPair], height: u64, index: u16) -> QuorumVote {
    test_state_change_vote(&keys[index as usize], height, index, 2, NewState::Decommission)
}

#[test]
fn test_duplicate_vote_stored_once() {
    let keys = keys();
    let pool = VotingPool::default();
    let vote = obligations_vote(&keys, 1000, 3);

    assert!(pool.add_pool_vote_if_unique(&vote).added);
    let again = pool.add_pool_vote_if_unique(&vote);
    assert!(!again.added);
    assert_eq!(again.votes, vec![vote]);
    assert_eq!(pool.votes_for(&vote).len(), 1);
}

#[test]
fn test_group_stays_sorted() {
    let keys = keys();
    let pool = VotingPool::default();

    // A fixed shuffle with repeats.
    let order = [7u16, 2, 9, 0, 2, 5, 1, 9, 8, 3, 6, 4, 0];
    for index in order {
        let insertion = pool.add_pool_vote_if_unique(&obligations_vote(&keys, 1000, index));
        let indices: Vec<u16> = insertion.votes.iter().map(|v| v.index_in_group).collect();
        assert!(
            indices.windows(2).all(|w| w[0] < w[1]),
            "group not strictly ascending: {:?}",
            indices
        );
    }

    let all = pool.votes_for(&obligations_vote(&keys, 1000, 0));
    assert_eq!(all.len(), 10);
}

#[test]
fn test_expiry_window() {
    let keys = keys();
    let pool = VotingPool::default();
    let lifetime = VotingConfig::default().vote_lifetime;
    let h = 1000;

    for height in [h - lifetime - 1, h - lifetime, h - 30, h, h + 1] {
        pool.add_pool_vote_if_unique(&obligations_vote(&keys, height, 0));
        pool.add_pool_vote_if_unique(&test_checkpoint_vote(
            &keys[0],
            height,
            0,
            Hash::fast_hash(&height.to_le_bytes()),
        ));
    }
    assert_eq!(pool.len_obligations(), 5);
    assert_eq!(pool.len_checkpoints(), 5);

    pool.remove_expired_votes(h);

    assert_eq!(pool.len_obligations(), 3);
    assert_eq!(pool.len_checkpoints(), 3);
    for height in [h - lifetime, h - 30, h] {
        assert_eq!(pool.votes_for(&obligations_vote(&keys, height, 0)).len(), 1);
    }
    for height in [h - lifetime - 1, h + 1] {
        assert!(pool.votes_for(&obligations_vote(&keys, height, 0)).is_empty());
    }
}

#[test]
fn test_expiry_near_genesis() {
    let keys = keys();
    let pool = VotingPool::default();
    pool.add_pool_vote_if_unique(&obligations_vote(&keys, 0, 0));
    pool.add_pool_vote_if_unique(&obligations_vote(&keys, 10, 0));

    pool.remove_expired_votes(10);
    assert_eq!(pool.len_obligations(), 2);
}

#[test]
fn test_relay_debounce() {
    let keys = keys();
    let pool = VotingPool::default();
    let hf = HardFork(13);
    let vote = obligations_vote(&keys, 1000, 1);
    pool.add_pool_vote_if_unique(&vote);

    let t0 = Duration::from_secs(10_000);
    pool.set_time(t0);
    assert_eq!(pool.get_relayable_votes(1000, hf, false), vec![vote]);
    pool.set_relayed(&[vote]);

    pool.set_time(t0 + Duration::from_secs(30));
    assert!(pool.get_relayable_votes(1000, hf, false).is_empty());

    pool.set_time(t0 + Duration::from_secs(130));
    assert_eq!(pool.get_relayable_votes(1000, hf, false), vec![vote]);
}

#[test]
fn test_relay_channels_split_at_fork() {
    let keys = keys();
    let pool = VotingPool::default();
    let gates = VotingConfig::default().hard_forks;

    let obligation = obligations_vote(&keys, 1000, 0);
    let checkpoint = test_checkpoint_vote(&keys[1], 1000, 1, Hash::fast_hash(b"block 1000"));
    pool.add_pool_vote_if_unique(&obligation);
    pool.add_pool_vote_if_unique(&checkpoint);

    let types = |votes: Vec<QuorumVote>| -> Vec<QuorumType> {
        votes.iter().map(QuorumVote::quorum_type).collect()
    };

    // Before the fork the flag is ignored and everything goes out together.
    let before = HardFork(gates.split_quorum_relay.0 - 1);
    for quorum_relay in [false, true] {
        assert_eq!(
            types(pool.get_relayable_votes(1000, before, quorum_relay)),
            vec![QuorumType::Obligations, QuorumType::Checkpointing]
        );
    }

    let after = gates.split_quorum_relay;
    assert_eq!(
        types(pool.get_relayable_votes(1000, after, false)),
        vec![QuorumType::Obligations]
    );
    assert_eq!(
        types(pool.get_relayable_votes(1000, after, true)),
        vec![QuorumType::Checkpointing]
    );
}

#[test]
fn test_received_checkpoint_vote_after_expiry() {
    let keys = keys();
    let pool = VotingPool::default();
    pool.add_pool_vote_if_unique(&test_checkpoint_vote(&keys[4], 40, 4, Hash::fast_hash(b"40")));
    assert!(pool.received_checkpoint_vote(40, 4));

    pool.remove_expired_votes(200);
    assert!(!pool.received_checkpoint_vote(40, 4));
    assert!(pool.is_empty());
}
