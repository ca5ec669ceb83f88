//! Constructing signed votes.

use stakevote_types::{
    Hash, KeyPair, NewState, QuorumGroup, QuorumVote, Signature, StateChange, StateChangeVote,
    VotePayload, QUORUM_VOTE_VERSION,
};

/// Sign `vote` in place with `keys`.
pub fn sign_vote(vote: &mut QuorumVote, keys: &KeyPair) {
    vote.signature = keys.sign(&vote.signing_hash());
}

/// A signature over `state_change`, for inclusion in its vote list.
pub fn sign_state_change(state_change: &StateChange, keys: &KeyPair) -> Signature {
    keys.sign(&state_change.signing_hash())
}

/// A signed obligations vote from validator `validator_index`.
pub fn make_state_change_vote(
    block_height: u64,
    validator_index: u16,
    worker_index: u32,
    state: NewState,
    reason: u16,
    keys: &KeyPair,
) -> QuorumVote {
    let mut vote = QuorumVote {
        version: QUORUM_VOTE_VERSION,
        block_height,
        group: QuorumGroup::Validator,
        index_in_group: validator_index,
        signature: Signature::zero(),
        payload: VotePayload::Obligations(StateChangeVote {
            worker_index,
            state,
            reason,
        }),
    };
    sign_vote(&mut vote, keys);
    vote
}

/// A signed checkpoint vote for `block_hash`.
pub fn make_checkpointing_vote(
    block_hash: Hash,
    block_height: u64,
    index_in_quorum: u16,
    keys: &KeyPair,
) -> QuorumVote {
    let mut vote = QuorumVote {
        version: QUORUM_VOTE_VERSION,
        block_height,
        group: QuorumGroup::Validator,
        index_in_group: index_in_quorum,
        signature: Signature::zero(),
        payload: VotePayload::Checkpoint { block_hash },
    };
    sign_vote(&mut vote, keys);
    vote
}
