//! Single vote verification.

use crate::bounds::{check_worker_index, validator_key};
use crate::{VoteVerifyError, VotingConfig};
use stakevote_types::{HardFork, Quorum, QuorumGroup, QuorumVote, VotePayload, WireVote};
use tracing::{debug, info, instrument};

/// Verify a vote's structure and signature against its quorum.
///
/// Pure: classifies the vote without touching any pool. Checks run in a fixed
/// order and stop at the first failure.
#[instrument(level = "trace", skip(hf, vote, quorum), fields(%hf, height = vote.block_height))]
pub fn verify_vote_signature(
    hf: HardFork,
    vote: &QuorumVote,
    quorum: &Quorum,
) -> Result<(), VoteVerifyError> {
    if vote.group != QuorumGroup::Validator {
        info!(
            group = %vote.group,
            "Vote received specifies incorrect voting group, expected vote from validator"
        );
        return Err(VoteVerifyError::IncorrectVotingGroup(vote.group as u8));
    }

    let key = validator_key(quorum, usize::from(vote.index_in_group))?;

    if let VotePayload::Obligations(sc) = &vote.payload {
        check_worker_index(quorum, sc.worker_index as usize)?;
    }

    if !key.verify(&vote.signing_hash(), &vote.signature) {
        return Err(VoteVerifyError::SignatureNotValid);
    }

    debug!(
        quorum_type = %vote.quorum_type(),
        voter = vote.index_in_group,
        %key,
        worker = vote.state_change().map(|sc| sc.worker_index),
        "Signature accepted"
    );
    Ok(())
}

/// Decode a relayed vote and verify it.
///
/// Unknown vote types and invalid groups are reported the same way as any
/// other structural failure.
pub fn verify_wire_vote(
    hf: HardFork,
    wire: WireVote,
    quorum: &Quorum,
) -> Result<QuorumVote, VoteVerifyError> {
    let vote = QuorumVote::try_from(wire)?;
    verify_vote_signature(hf, &vote, quorum)?;
    Ok(vote)
}

/// Check that a vote is neither expired nor from the future.
///
/// Votes just outside the window (within the height buffer) are rejected but
/// not marked permanent: nodes with slightly different chain tips may still
/// disagree about them.
pub fn verify_vote_age(
    vote: &QuorumVote,
    latest_height: u64,
    config: &VotingConfig,
) -> Result<(), VoteVerifyError> {
    let lifetime = config.vote_lifetime;
    let buffer = config.vote_or_tx_verify_height_buffer;

    let in_buffer = if latest_height > vote.block_height.saturating_add(lifetime) {
        info!(
            height = vote.block_height,
            lifetime, "Received vote is older than the vote lifetime and has been rejected"
        );
        latest_height <= vote.block_height.saturating_add(lifetime + buffer)
    } else if vote.block_height > latest_height {
        info!(
            height = vote.block_height,
            latest_height, "Received vote is newer than the latest block height and has been rejected"
        );
        vote.block_height <= latest_height.saturating_add(buffer)
    } else {
        return Ok(());
    };

    Err(VoteVerifyError::InvalidBlockHeight {
        vote_height: vote.block_height,
        latest_height,
        permanent: !in_buffer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BoundsError;
    use stakevote_types::test_utils::{test_checkpoint_vote, test_quorum, test_state_change_vote};
    use stakevote_types::{Hash, NewState, QuorumType, Signature};

    const HF: HardFork = HardFork(19);

    #[test]
    fn test_valid_obligations_vote() {
        let (keys, quorum) = test_quorum(10, 5);
        let vote = test_state_change_vote(&keys[3], 1000, 3, 2, NewState::Decommission);
        assert_eq!(verify_vote_signature(HF, &vote, &quorum), Ok(()));
    }

    #[test]
    fn test_valid_checkpoint_vote() {
        let (keys, quorum) = test_quorum(20, 0);
        let vote = test_checkpoint_vote(&keys[19], 400, 19, Hash::fast_hash(b"block"));
        assert_eq!(verify_vote_signature(HF, &vote, &quorum), Ok(()));
    }

    #[test]
    fn test_worker_group_rejected() {
        let (keys, quorum) = test_quorum(10, 5);
        let mut vote = test_state_change_vote(&keys[0], 1000, 0, 2, NewState::Decommission);
        vote.group = QuorumGroup::Worker;
        assert_eq!(
            verify_vote_signature(HF, &vote, &quorum),
            Err(VoteVerifyError::IncorrectVotingGroup(2))
        );
    }

    #[test]
    fn test_index_bounds() {
        let (keys, quorum) = test_quorum(10, 5);

        let vote = test_state_change_vote(&keys[0], 1000, 10, 2, NewState::Decommission);
        assert_eq!(
            verify_vote_signature(HF, &vote, &quorum),
            Err(VoteVerifyError::Bounds(
                BoundsError::ValidatorIndexOutOfBounds { index: 10, len: 10 }
            ))
        );

        let vote = test_state_change_vote(&keys[0], 1000, 0, 5, NewState::Decommission);
        assert_eq!(
            verify_vote_signature(HF, &vote, &quorum),
            Err(VoteVerifyError::Bounds(BoundsError::WorkerIndexOutOfBounds {
                index: 5,
                len: 5
            }))
        );
    }

    #[test]
    fn test_signature_checked_against_voter_key() {
        let (keys, quorum) = test_quorum(10, 5);

        // Signed by validator 4 but claims to be validator 3.
        let vote = test_state_change_vote(&keys[4], 1000, 3, 2, NewState::Decommission);
        assert_eq!(
            verify_vote_signature(HF, &vote, &quorum),
            Err(VoteVerifyError::SignatureNotValid)
        );

        let mut vote = test_state_change_vote(&keys[3], 1000, 3, 2, NewState::Decommission);
        vote.signature = Signature::zero();
        assert_eq!(
            verify_vote_signature(HF, &vote, &quorum),
            Err(VoteVerifyError::SignatureNotValid)
        );
    }

    #[test]
    fn test_signature_covers_state() {
        let (keys, quorum) = test_quorum(10, 5);
        let mut vote = test_state_change_vote(&keys[1], 1000, 1, 2, NewState::Decommission);
        if let VotePayload::Obligations(sc) = &mut vote.payload {
            sc.state = NewState::Deregister;
        }
        assert_eq!(
            verify_vote_signature(HF, &vote, &quorum),
            Err(VoteVerifyError::SignatureNotValid)
        );
    }

    #[test]
    fn test_wire_vote_type_rejected() {
        let (keys, quorum) = test_quorum(10, 5);
        let vote = test_state_change_vote(&keys[1], 1000, 1, 2, NewState::Decommission);

        let wire = WireVote::from(&vote);
        assert_eq!(verify_wire_vote(HF, wire.clone(), &quorum), Ok(vote));

        let mut bad = wire.clone();
        bad.quorum_type = QuorumType::Blink as u8;
        assert_eq!(
            verify_wire_vote(HF, bad, &quorum),
            Err(VoteVerifyError::InvalidVoteType(2))
        );

        let mut bad = wire;
        bad.group = 0;
        assert_eq!(
            verify_wire_vote(HF, bad, &quorum),
            Err(VoteVerifyError::IncorrectVotingGroup(0))
        );
    }

    #[test]
    fn test_vote_age() {
        let config = VotingConfig::default();
        let (keys, _) = test_quorum(1, 1);
        let vote = test_state_change_vote(&keys[0], 1000, 0, 0, NewState::Decommission);

        assert!(verify_vote_age(&vote, 1000, &config).is_ok());
        assert!(verify_vote_age(&vote, 1060, &config).is_ok());

        // Expired, inside the buffer.
        let err = verify_vote_age(&vote, 1061, &config).unwrap_err();
        assert!(!err.is_permanent());
        let err = verify_vote_age(&vote, 1065, &config).unwrap_err();
        assert!(!err.is_permanent());

        // Expired, beyond the buffer.
        let err = verify_vote_age(&vote, 1066, &config).unwrap_err();
        assert!(err.is_permanent());

        // From the future.
        let err = verify_vote_age(&vote, 995, &config).unwrap_err();
        assert!(!err.is_permanent());
        let err = verify_vote_age(&vote, 994, &config).unwrap_err();
        assert_eq!(
            err,
            VoteVerifyError::InvalidBlockHeight {
                vote_height: 1000,
                latest_height: 994,
                permanent: true
            }
        );
    }
}
