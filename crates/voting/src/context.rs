//! Flag-style verification results.
//!
//! The mempool and block validation report failures to peers as a set of
//! named flags. These are derived from the typed errors, never set directly
//! by the verifiers.

use crate::{BoundsError, TxVerifyError, VoteVerifyError};
use stakevote_types::QuorumVote;
use std::fmt;

/// Flags describing why a vote (or the votes in a transaction) was rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteVerificationContext {
    pub verification_failed: bool,
    pub invalid_block_height: bool,
    pub duplicate_voters: bool,
    pub validator_index_out_of_bounds: bool,
    pub worker_index_out_of_bounds: bool,
    pub signature_not_valid: bool,
    pub added_to_pool: bool,
    pub not_enough_votes: bool,
    pub incorrect_voting_group: bool,
    pub invalid_vote_type: bool,
    pub votes_not_sorted: bool,
}

impl VoteVerificationContext {
    /// Flags for a rejected vote.
    pub fn from_error(err: &VoteVerifyError) -> Self {
        let mut ctx = Self {
            verification_failed: err.is_permanent(),
            ..Self::default()
        };
        match err {
            VoteVerifyError::InvalidVoteType(_) => ctx.invalid_vote_type = true,
            VoteVerifyError::IncorrectVotingGroup(_) => ctx.incorrect_voting_group = true,
            VoteVerifyError::Bounds(b) => ctx.set_bounds(b),
            VoteVerifyError::SignatureNotValid => ctx.signature_not_valid = true,
            VoteVerifyError::InvalidBlockHeight { .. } => ctx.invalid_block_height = true,
            VoteVerifyError::Malformed(_) => {}
        }
        ctx
    }

    /// Flags for a vote that passed verification and was (or was not) newly pooled.
    pub fn accepted(added_to_pool: bool) -> Self {
        Self {
            added_to_pool,
            ..Self::default()
        }
    }

    fn set_bounds(&mut self, err: &BoundsError) {
        match err {
            BoundsError::ValidatorIndexOutOfBounds { .. } => {
                self.validator_index_out_of_bounds = true
            }
            BoundsError::WorkerIndexOutOfBounds { .. } => self.worker_index_out_of_bounds = true,
        }
    }

    /// Human-readable summary, filling in details from `vote` when given.
    pub fn describe(&self, vote: Option<&QuorumVote>) -> String {
        let unknown = || "??".to_string();
        let mut parts: Vec<String> = Vec::new();

        if self.invalid_block_height {
            let height = vote.map_or_else(unknown, |v| v.block_height.to_string());
            parts.push(format!("Invalid block height: {}", height));
        }
        if self.duplicate_voters {
            let index = vote.map_or_else(unknown, |v| v.index_in_group.to_string());
            parts.push(format!("Index in group was duplicated: {}", index));
        }
        if self.validator_index_out_of_bounds {
            parts.push("Validator index out of bounds".to_string());
        }
        if self.worker_index_out_of_bounds {
            let index = vote
                .and_then(QuorumVote::state_change)
                .map_or_else(unknown, |sc| sc.worker_index.to_string());
            parts.push(format!("Worker index out of bounds: {}", index));
        }
        if self.signature_not_valid {
            parts.push("Signature not valid".to_string());
        }
        if self.added_to_pool {
            parts.push("Added to pool".to_string());
        }
        if self.not_enough_votes {
            parts.push("Not enough votes".to_string());
        }
        if self.incorrect_voting_group {
            match vote {
                Some(v) => parts.push(format!("Incorrect voting group specified: {}", v.group)),
                None => parts.push("Incorrect voting group specified".to_string()),
            }
        }
        if self.invalid_vote_type {
            let t = vote.map_or_else(unknown, |v| (v.quorum_type() as u8).to_string());
            parts.push(format!("Vote type has invalid value: {}", t));
        }
        if self.votes_not_sorted {
            parts.push("Votes are not stored in ascending order".to_string());
        }

        parts.join(", ")
    }
}

impl fmt::Display for VoteVerificationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe(None))
    }
}

/// Flags for a state-change transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxVerificationContext {
    /// The transaction is permanently invalid.
    pub verification_failed: bool,
    pub vote_ctx: VoteVerificationContext,
}

impl TxVerificationContext {
    /// Flags for the outcome of [`crate::verify_tx_state_change`].
    pub fn from_result(result: &Result<(), TxVerifyError>) -> Self {
        let Err(err) = result else {
            return Self::default();
        };

        let mut vote_ctx = VoteVerificationContext::default();
        match err {
            TxVerifyError::NotEnoughVotes { .. } => vote_ctx.not_enough_votes = true,
            TxVerifyError::Bounds(b) => vote_ctx.set_bounds(b),
            TxVerifyError::InvalidBlockHeight { .. } => vote_ctx.invalid_block_height = true,
            TxVerifyError::VotesNotSorted { .. } => vote_ctx.votes_not_sorted = true,
            TxVerifyError::DuplicateVoters(_) => vote_ctx.duplicate_voters = true,
            TxVerifyError::SignatureNotValid(_) => vote_ctx.signature_not_valid = true,
            TxVerifyError::StateNotAllowed { .. }
            | TxVerifyError::UnknownState(_)
            | TxVerifyError::TooManyVotes { .. } => {}
        }

        Self {
            verification_failed: err.is_permanent(),
            vote_ctx,
        }
    }
}

impl fmt::Display for TxVerificationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.verification_failed {
            f.write_str("Verification failed")?;
            if self.vote_ctx != VoteVerificationContext::default() {
                f.write_str(", ")?;
            }
        }
        fmt::Display::fmt(&self.vote_ctx, f)
    }
}
