//! Verification errors.
//!
//! Every check returns one of these instead of mutating a context in place.
//! [`crate::VoteVerificationContext`] and [`crate::TxVerificationContext`]
//! turn them back into the flag sets callers report to peers.

use stakevote_types::{HardFork, QuorumType, TypesError};
use thiserror::Error;

/// An index fell outside a quorum list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoundsError {
    #[error("validator index {index} out of bounds, quorum has {len} validators")]
    ValidatorIndexOutOfBounds { index: usize, len: usize },

    #[error("worker index {index} out of bounds, quorum has {len} workers")]
    WorkerIndexOutOfBounds { index: usize, len: usize },
}

/// Errors from verifying a single quorum vote.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoteVerifyError {
    /// Vote type is not a votable quorum type.
    #[error("invalid vote type: {0}")]
    InvalidVoteType(u8),

    /// Vote does not come from the validator group.
    #[error("incorrect voting group: {0}")]
    IncorrectVotingGroup(u8),

    #[error(transparent)]
    Bounds(#[from] BoundsError),

    /// Vote payload is malformed.
    #[error("malformed vote: {0}")]
    Malformed(String),

    #[error("vote signature not valid")]
    SignatureNotValid,

    /// Vote height is outside the acceptable window.
    #[error("vote for height {vote_height} rejected at height {latest_height}")]
    InvalidBlockHeight {
        vote_height: u64,
        latest_height: u64,
        /// False if the vote may become valid (or was only just valid) and
        /// the peer should not be penalised.
        permanent: bool,
    },
}

impl VoteVerifyError {
    /// Returns true if the vote can never become valid.
    pub fn is_permanent(&self) -> bool {
        match self {
            VoteVerifyError::InvalidBlockHeight { permanent, .. } => *permanent,
            _ => true,
        }
    }
}

impl From<TypesError> for VoteVerifyError {
    fn from(e: TypesError) -> Self {
        match e {
            TypesError::UnknownQuorumType(t) => VoteVerifyError::InvalidVoteType(t),
            TypesError::InvalidQuorumGroup(g) => VoteVerifyError::IncorrectVotingGroup(g),
            other => VoteVerifyError::Malformed(other.to_string()),
        }
    }
}

/// Errors from verifying a state-change transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxVerifyError {
    /// Only deregistrations are valid before richer state changes.
    #[error("state {state} not allowed at {hf}")]
    StateNotAllowed { state: u16, hf: HardFork },

    #[error("unknown state: {0}")]
    UnknownState(u16),

    #[error("not enough votes: {count} < {min}")]
    NotEnoughVotes { count: usize, min: usize },

    #[error("too many votes: {count} > {max}")]
    TooManyVotes { count: usize, max: usize },

    #[error(transparent)]
    Bounds(#[from] BoundsError),

    /// State change height is outside the acceptable window.
    #[error("state change for height {block_height} rejected at height {latest_height}")]
    InvalidBlockHeight {
        block_height: u64,
        latest_height: u64,
        permanent: bool,
    },

    #[error("votes not sorted: {index} follows {previous}")]
    VotesNotSorted { previous: u32, index: u32 },

    #[error("duplicate voter: {0}")]
    DuplicateVoters(u32),

    #[error("signature not valid for voter {0}")]
    SignatureNotValid(u32),
}

impl TxVerifyError {
    /// Returns true if the transaction can never become valid.
    ///
    /// Only height failures inside the buffer zone are retryable.
    pub fn is_permanent(&self) -> bool {
        match self {
            TxVerifyError::InvalidBlockHeight { permanent, .. } => *permanent,
            _ => true,
        }
    }
}

/// Errors from verifying a checkpoint or pulse signature set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuorumSignatureError {
    /// Quorum type has no signature sets.
    #[error("{0} quorums do not carry signature sets")]
    UnsupportedQuorumType(QuorumType),

    #[error("insufficient signatures: {count} < {min}")]
    NotEnoughSignatures { count: usize, min: usize },

    #[error("too many signatures: {count} > {max}")]
    TooManySignatures { count: usize, max: usize },

    #[error("pulse block needs exactly {required} signatures, has {count}")]
    WrongSignatureCount { count: usize, required: usize },

    /// Pulse verification was called without the block. Caller bug.
    #[error("pulse signature verification requires a block")]
    MissingBlock,

    #[error("pulse validator bitset {bitset:#b} exceeds {num_validators} validators")]
    BitsetOutOfRange { bitset: u16, num_validators: usize },

    #[error("voters not in ascending order: {next} follows {current}")]
    NotSorted { current: u16, next: u16 },

    #[error(transparent)]
    Bounds(#[from] BoundsError),

    /// Voter index exceeds the largest possible quorum.
    #[error("voter index {index} exceeds vote set size {size}")]
    VoteSetOverflow { index: u16, size: usize },

    /// Signer did not declare participation in the pulse round.
    #[error("validator {voter_index} not participating in round {round}")]
    NotParticipating { voter_index: u16, round: u8 },

    #[error("duplicate voter: {0}")]
    DuplicateVoter(u16),

    #[error("invalid signature from voter {0}")]
    InvalidSignature(u16),
}

/// Errors from verifying a checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckpointError {
    #[error("no checkpoint expected at height {height} (interval {interval})")]
    UnexpectedHeight { height: u64, interval: u64 },

    #[error("hardcoded checkpoint carries {0} signatures")]
    HardcodedWithSignatures(usize),

    #[error(transparent)]
    Signatures(#[from] QuorumSignatureError),
}
