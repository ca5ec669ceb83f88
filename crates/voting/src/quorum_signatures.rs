//! Checkpoint and pulse signature set verification.

use crate::bounds::validator_key;
use crate::{QuorumSignatureError, VotingConfig};
use stakevote_types::{Block, HardFork, Hash, Quorum, QuorumSignature, QuorumType};
use tracing::{error, warn};

/// Verify the signatures attached to a checkpoint or pulse block.
///
/// All or nothing: any bad signer fails the whole set. Pulse sets need the
/// block so signers can be checked against the round's participation bitset.
#[allow(clippy::too_many_arguments)]
pub fn verify_quorum_signatures(
    quorum: &Quorum,
    quorum_type: QuorumType,
    hf: HardFork,
    height: u64,
    hash: &Hash,
    signatures: &[QuorumSignature],
    block: Option<&Block>,
    config: &VotingConfig,
) -> Result<(), QuorumSignatureError> {
    let count = signatures.len();

    let (enforce_ordering, pulse_block) = match quorum_type {
        QuorumType::Checkpointing => {
            if count < config.checkpoint_min_votes {
                warn!(height, count, "Checkpoint has insufficient signatures");
                return Err(QuorumSignatureError::NotEnoughSignatures {
                    count,
                    min: config.checkpoint_min_votes,
                });
            }
            if count > config.checkpoint_quorum_size {
                warn!(height, count, "Checkpoint has too many signatures");
                return Err(QuorumSignatureError::TooManySignatures {
                    count,
                    max: config.checkpoint_quorum_size,
                });
            }
            (hf.at_least(config.hard_forks.enforce_vote_ordering), None)
        }
        QuorumType::Pulse => {
            if count != config.pulse_block_required_signatures {
                warn!(
                    height,
                    count,
                    required = config.pulse_block_required_signatures,
                    "Pulse block has the wrong number of signatures"
                );
                return Err(QuorumSignatureError::WrongSignatureCount {
                    count,
                    required: config.pulse_block_required_signatures,
                });
            }
            let Some(block) = block else {
                error!(height, "Pulse signature verification called without a block");
                return Err(QuorumSignatureError::MissingBlock);
            };
            let bitset = block.pulse.validator_bitset;
            if !bitset.fits(config.pulse_quorum_num_validators) {
                warn!(
                    height,
                    bitset = bitset.0,
                    "Pulse block specifies validator participation bits out of bounds"
                );
                return Err(QuorumSignatureError::BitsetOutOfRange {
                    bitset: bitset.0,
                    num_validators: config.pulse_quorum_num_validators,
                });
            }
            (true, Some(block))
        }
        other @ (QuorumType::Obligations | QuorumType::Blink) => {
            return Err(QuorumSignatureError::UnsupportedQuorumType(other));
        }
    };

    let mut unique = vec![false; config.max_quorum_size()];

    for (i, sig) in signatures.iter().enumerate() {
        if enforce_ordering {
            if let Some(next) = signatures.get(i + 1) {
                if sig.voter_index >= next.voter_index {
                    warn!(height, "Voters in signatures are not given in ascending order");
                    return Err(QuorumSignatureError::NotSorted {
                        current: sig.voter_index,
                        next: next.voter_index,
                    });
                }
            }
        }

        let key = validator_key(quorum, usize::from(sig.voter_index))?;

        if let Some(block) = pulse_block {
            if !block.pulse.validator_bitset.contains(sig.voter_index) {
                warn!(
                    voter = sig.voter_index,
                    round = block.pulse.round,
                    "Received pulse signature from validator not participating in round"
                );
                return Err(QuorumSignatureError::NotParticipating {
                    voter_index: sig.voter_index,
                    round: block.pulse.round,
                });
            }
        }

        let Some(seen) = unique.get_mut(usize::from(sig.voter_index)) else {
            warn!(
                voter = sig.voter_index,
                size = config.max_quorum_size(),
                "Voter index exceeds the vote set"
            );
            return Err(QuorumSignatureError::VoteSetOverflow {
                index: sig.voter_index,
                size: config.max_quorum_size(),
            });
        };
        if *seen {
            warn!(height, voter = sig.voter_index, %key, "Voter quorum index is duplicated");
            return Err(QuorumSignatureError::DuplicateVoter(sig.voter_index));
        }
        *seen = true;

        if !key.verify(hash, &sig.signature) {
            warn!(height, voter = sig.voter_index, %key, "Incorrect signature for vote");
            return Err(QuorumSignatureError::InvalidSignature(sig.voter_index));
        }
    }

    Ok(())
}

/// Returns true if `quorum` has the shape of a pulse quorum: one block
/// producer and the configured number of validators.
pub fn verify_pulse_quorum_sizes(quorum: &Quorum, config: &VotingConfig) -> bool {
    quorum.workers.len() == 1 && quorum.validators.len() == config.pulse_quorum_num_validators
}
