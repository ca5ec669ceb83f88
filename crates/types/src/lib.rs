//! Core types for service node quorum voting.
//!
//! This crate provides the foundational types used by the voting core:
//!
//! - **Primitives**: Hash, keys and signatures, hard fork versions
//! - **Quorums**: QuorumType, QuorumGroup, Quorum, QuorumManager
//! - **Votes**: QuorumVote and its relay form, state-change payloads
//! - **Chain data**: blocks, checkpoints, transaction extra fields
//!
//! # Signing hashes
//!
//! The bytes a validator signs are fixed by the network: every node must
//! produce the same hash for the same vote or signatures stop verifying across
//! versions. They are defined next to the types they cover, so the verifier
//! and the pool only ever see a [`Hash`] and cannot drift from the layout.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod crypto;
mod error;
mod hard_fork;
mod hash;
mod signing;

mod block;
mod extra;
mod quorum;
mod state_change;
mod vote;

pub use crypto::{KeyPair, PublicKey, Signature};
pub use error::TypesError;
pub use hard_fork::HardFork;
pub use hash::{Hash, HexError};
pub use signing::state_change_vote_hash;

pub use block::{Block, Checkpoint, CheckpointKind, PulseInfo, QuorumSignature, ValidatorBitset};
pub use extra::{
    add_state_change_to_tx_extra, parse_tx_extra, state_change_from_tx_extra, ExtraError,
    Transaction, TxExtraField, TxType,
};
pub use quorum::{find_index_in_quorum_group, Quorum, QuorumGroup, QuorumManager, QuorumType};
pub use state_change::{DeregisterOld, StateChange, StateChangeVoteEntry, STATE_CHANGE_VERSION};
pub use vote::{NewState, QuorumVote, StateChangeVote, VotePayload, WireVote, QUORUM_VOTE_VERSION};

/// Test utilities.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Deterministic key pairs from a seed.
    pub fn test_keys(count: usize, seed: u64) -> Vec<KeyPair> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        (0..count).map(|_| KeyPair::generate(&mut rng)).collect()
    }

    /// A quorum with freshly generated validator and worker keys.
    ///
    /// Returns the validator key pairs so tests can sign as any member.
    pub fn test_quorum(num_validators: usize, num_workers: usize) -> (Vec<KeyPair>, Quorum) {
        let validators = test_keys(num_validators, 1);
        let workers = test_keys(num_workers, 2);
        let quorum = Quorum::new(
            validators.iter().map(KeyPair::public_key).collect(),
            workers.iter().map(KeyPair::public_key).collect(),
        );
        (validators, quorum)
    }

    /// A signed obligations vote.
    pub fn test_state_change_vote(
        keys: &KeyPair,
        block_height: u64,
        index_in_group: u16,
        worker_index: u32,
        state: NewState,
    ) -> QuorumVote {
        let mut vote = QuorumVote {
            version: QUORUM_VOTE_VERSION,
            block_height,
            group: QuorumGroup::Validator,
            index_in_group,
            signature: Signature::zero(),
            payload: VotePayload::Obligations(StateChangeVote {
                worker_index,
                state,
                reason: 0,
            }),
        };
        vote.signature = keys.sign(&vote.signing_hash());
        vote
    }

    /// A signed checkpoint vote.
    pub fn test_checkpoint_vote(
        keys: &KeyPair,
        block_height: u64,
        index_in_group: u16,
        block_hash: Hash,
    ) -> QuorumVote {
        QuorumVote {
            version: QUORUM_VOTE_VERSION,
            block_height,
            group: QuorumGroup::Validator,
            index_in_group,
            signature: keys.sign(&block_hash),
            payload: VotePayload::Checkpoint { block_hash },
        }
    }

    /// A state change signed by the validators at `voter_indices`, in the
    /// order given.
    pub fn test_state_change(
        validators: &[KeyPair],
        block_height: u64,
        worker_index: u32,
        state: NewState,
        voter_indices: &[u32],
    ) -> StateChange {
        let mut sc = StateChange::new(block_height, worker_index, state);
        let hash = sc.signing_hash();
        sc.votes = voter_indices
            .iter()
            .map(|&i| StateChangeVoteEntry {
                validator_index: i,
                signature: validators
                    .get(i as usize)
                    .map(|k| k.sign(&hash))
                    .unwrap_or_default(),
            })
            .collect();
        sc
    }

    /// Quorum signatures over `hash` by the validators at `voter_indices`.
    pub fn test_quorum_signatures(
        validators: &[KeyPair],
        hash: &Hash,
        voter_indices: &[u16],
    ) -> Vec<QuorumSignature> {
        voter_indices
            .iter()
            .map(|&i| QuorumSignature {
                voter_index: i,
                signature: validators
                    .get(i as usize)
                    .map(|k| k.sign(hash))
                    .unwrap_or_default(),
            })
            .collect()
    }
}
