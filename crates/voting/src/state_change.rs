//! State-change transaction verification.

use crate::bounds::{check_validator_index, check_worker_index, validator_key};
use crate::{TxVerifyError, VotingConfig};
use stakevote_types::{HardFork, NewState, Quorum, StateChange};
use std::collections::HashSet;
use tracing::{info, instrument};

/// Verify the votes embedded in a state-change transaction.
///
/// The whole transaction is rejected on the first failing check. Every vote's
/// index is checked before any signature is verified. Height failures are
/// only permanent once past the height buffer; see
/// [`TxVerifyError::is_permanent`].
#[instrument(
    level = "debug",
    skip(state_change, quorum, hf, config),
    fields(
        height = state_change.block_height,
        worker = state_change.service_node_index,
        %hf,
    )
)]
pub fn verify_tx_state_change(
    state_change: &StateChange,
    latest_height: u64,
    quorum: &Quorum,
    hf: HardFork,
    config: &VotingConfig,
) -> Result<(), TxVerifyError> {
    let gates = &config.hard_forks;

    if !state_change.is_deregister() && !hf.at_least(gates.richer_state_changes) {
        info!(
            state = state_change.state,
            "Non-deregister state changes are invalid before {}", gates.richer_state_changes
        );
        return Err(TxVerifyError::StateNotAllowed {
            state: state_change.state,
            hf,
        });
    }

    if state_change.state >= NewState::COUNT {
        info!(state = state_change.state, "Unknown state change to new state");
        return Err(TxVerifyError::UnknownState(state_change.state));
    }

    let count = state_change.votes.len();
    if count < config.state_change_min_votes {
        info!(count, "Not enough votes");
        return Err(TxVerifyError::NotEnoughVotes {
            count,
            min: config.state_change_min_votes,
        });
    }
    if count > config.state_change_quorum_size {
        info!(count, "Too many votes");
        return Err(TxVerifyError::TooManyVotes {
            count,
            max: config.state_change_quorum_size,
        });
    }

    check_worker_index(quorum, state_change.service_node_index as usize)?;

    check_state_change_height(state_change.block_height, latest_height, config)?;

    let enforce_ordering = hf.at_least(gates.enforce_vote_ordering);
    let mut previous: Option<u32> = None;
    let mut seen = HashSet::with_capacity(count);

    for vote in &state_change.votes {
        let index = vote.validator_index;

        if enforce_ordering {
            if let Some(prev) = previous.filter(|&prev| prev >= index) {
                info!(prev, index, "Vote validator index is not stored in ascending order");
                return Err(TxVerifyError::VotesNotSorted {
                    previous: prev,
                    index,
                });
            }
            previous = Some(index);
        }

        check_validator_index(quorum, index as usize)?;

        if !seen.insert(index) {
            info!(index, "Voter quorum index is duplicated");
            return Err(TxVerifyError::DuplicateVoters(index));
        }
    }

    let hash = state_change.signing_hash();
    for vote in &state_change.votes {
        let index = vote.validator_index;
        let key = validator_key(quorum, index as usize)?;
        if !key.verify(&hash, &vote.signature) {
            info!(index, %key, "Invalid signature for voter");
            return Err(TxVerifyError::SignatureNotValid(index));
        }
    }

    Ok(())
}

/// A state change is acceptable from the block after its height until it is
/// `state_change_tx_lifetime` blocks old.
fn check_state_change_height(
    block_height: u64,
    latest_height: u64,
    config: &VotingConfig,
) -> Result<(), TxVerifyError> {
    let buffer = config.vote_or_tx_verify_height_buffer;
    let lifetime = config.state_change_tx_lifetime;

    let permanent = if block_height >= latest_height {
        info!(
            block_height,
            latest_height, "State change tx is newer than the current height and has been rejected"
        );
        block_height >= latest_height.saturating_add(buffer)
    } else if latest_height >= block_height.saturating_add(lifetime) {
        info!(
            block_height,
            latest_height, lifetime, "State change tx is too old and has been rejected"
        );
        latest_height >= block_height.saturating_add(lifetime + buffer)
    } else {
        return Ok(());
    };

    Err(TxVerifyError::InvalidBlockHeight {
        block_height,
        latest_height,
        permanent,
    })
}
