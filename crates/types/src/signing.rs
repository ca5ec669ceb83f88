//! Canonical signing hashes.
//!
//! These preimages are signed by every service node on the network. The byte
//! layout is fixed: little-endian fields, concatenated without padding.

use crate::{Hash, NewState, QuorumVote, StateChange, VotePayload};

/// Hash signed by obligations voters.
///
/// Preimage is `height (u64 LE) || worker_index (u32 LE) || state (u16 LE)`.
/// Deregistrations predate the state field and omit it.
pub fn state_change_vote_hash(height: u64, worker_index: u32, state: NewState) -> Hash {
    state_change_hash_raw(height, worker_index, state.as_u16())
}

pub(crate) fn state_change_hash_raw(height: u64, worker_index: u32, state: u16) -> Hash {
    let mut buf = [0u8; 8 + 4 + 2];
    buf[..8].copy_from_slice(&height.to_le_bytes());
    buf[8..12].copy_from_slice(&worker_index.to_le_bytes());
    buf[12..].copy_from_slice(&state.to_le_bytes());

    let len = if state == NewState::Deregister.as_u16() {
        12
    } else {
        buf.len()
    };
    Hash::fast_hash(&buf[..len])
}

impl QuorumVote {
    /// The hash this vote's signature covers.
    ///
    /// Checkpoint votes sign the block hash directly.
    pub fn signing_hash(&self) -> Hash {
        match self.payload {
            VotePayload::Obligations(sc) => {
                state_change_vote_hash(self.block_height, sc.worker_index, sc.state)
            }
            VotePayload::Checkpoint { block_hash } => block_hash,
        }
    }
}

impl StateChange {
    /// The hash every vote in this state change must sign.
    ///
    /// Uses the raw state value so that transactions carrying unknown states
    /// still hash deterministically; they are rejected elsewhere.
    pub fn signing_hash(&self) -> Hash {
        state_change_hash_raw(self.block_height, self.service_node_index, self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{QuorumGroup, Signature, StateChangeVote};

    #[test]
    fn test_hash_is_deterministic() {
        let a = state_change_vote_hash(1000, 2, NewState::Decommission);
        let b = state_change_vote_hash(1000, 2, NewState::Decommission);
        assert_eq!(a, b);
        assert_ne!(a, state_change_vote_hash(1000, 2, NewState::Recommission));
        assert_ne!(a, state_change_vote_hash(1001, 2, NewState::Decommission));
        assert_ne!(a, state_change_vote_hash(1000, 3, NewState::Decommission));
    }

    #[test]
    fn test_preimage_layout() {
        let mut expected = Vec::new();
        expected.extend_from_slice(&1000u64.to_le_bytes());
        expected.extend_from_slice(&2u32.to_le_bytes());
        expected.extend_from_slice(&1u16.to_le_bytes());

        assert_eq!(
            state_change_vote_hash(1000, 2, NewState::Decommission),
            Hash::fast_hash(&expected)
        );
    }

    #[test]
    fn test_deregister_omits_state() {
        let mut preimage = Vec::new();
        preimage.extend_from_slice(&1000u64.to_le_bytes());
        preimage.extend_from_slice(&2u32.to_le_bytes());

        assert_eq!(
            state_change_vote_hash(1000, 2, NewState::Deregister),
            Hash::fast_hash(&preimage)
        );

        preimage.extend_from_slice(&0u16.to_le_bytes());
        assert_ne!(
            state_change_vote_hash(1000, 2, NewState::Deregister),
            Hash::fast_hash(&preimage)
        );
    }

    #[test]
    fn test_vote_and_state_change_hashes_agree() {
        let vote = QuorumVote {
            version: 0,
            block_height: 500,
            group: QuorumGroup::Validator,
            index_in_group: 0,
            signature: Signature::zero(),
            payload: VotePayload::Obligations(StateChangeVote {
                worker_index: 4,
                state: NewState::IpChangePenalty,
                reason: 0,
            }),
        };
        let sc = StateChange {
            block_height: 500,
            service_node_index: 4,
            state: NewState::IpChangePenalty.as_u16(),
            ..StateChange::default()
        };
        assert_eq!(vote.signing_hash(), sc.signing_hash());
    }

    #[test]
    fn test_checkpoint_vote_signs_block_hash() {
        let block_hash = Hash::fast_hash(b"block 400");
        let vote = QuorumVote {
            version: 0,
            block_height: 400,
            group: QuorumGroup::Validator,
            index_in_group: 1,
            signature: Signature::zero(),
            payload: VotePayload::Checkpoint { block_hash },
        };
        assert_eq!(vote.signing_hash(), block_hash);
    }
}
