//! Vote handling errors.

use stakevote_types::QuorumType;
use stakevote_voting::{VoteVerificationContext, VoteVerifyError};
use thiserror::Error;

/// Why a vote handed to the node was not pooled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CopError {
    #[error(transparent)]
    Vote(#[from] VoteVerifyError),

    #[error("no {quorum_type} quorum cached for height {height}")]
    QuorumUnavailable {
        quorum_type: QuorumType,
        height: u64,
    },
}

impl CopError {
    /// Returns true if the sender should be penalised for the vote.
    pub fn is_permanent(&self) -> bool {
        match self {
            CopError::Vote(e) => e.is_permanent(),
            CopError::QuorumUnavailable { .. } => true,
        }
    }

    /// Flag-style summary reported back to peers.
    pub fn context(&self) -> VoteVerificationContext {
        match self {
            CopError::Vote(e) => VoteVerificationContext::from_error(e),
            CopError::QuorumUnavailable { .. } => VoteVerificationContext {
                verification_failed: true,
                invalid_block_height: true,
                ..VoteVerificationContext::default()
            },
        }
    }
}
