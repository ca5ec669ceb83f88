//! Verification of service node quorum votes.
//!
//! This crate implements the stateless half of quorum voting:
//!
//! - **Bounds checks**: quorum indices from untrusted input
//! - **Vote verification**: structure, age and signature of a single vote
//! - **State changes**: the vote batch embedded in a state-change transaction
//! - **Signature sets**: checkpoint and pulse block signatures
//! - **Checkpoints**: interval and signature rules per checkpoint kind
//!
//! Nothing here touches shared state. Every function is safe to call from
//! any thread and returns a typed error on rejection; the flag contexts in
//! [`context`] are derived from those errors for peer reporting.
//!
//! # Usage
//!
//! ```ignore
//! use stakevote_voting::{verify_vote_age, verify_vote_signature, VotingConfig};
//!
//! let config = VotingConfig::default();
//! verify_vote_age(&vote, latest_height, &config)?;
//! verify_vote_signature(hf, &vote, &quorum)?;
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod bounds;
mod checkpoint;
mod config;
pub mod context;
mod error;
mod quorum_signatures;
mod sign;
mod state_change;
mod vote;

pub use bounds::{check_validator_index, check_worker_index};
pub use checkpoint::verify_checkpoint;
pub use config::{HardForkGates, VotingConfig};
pub use context::{TxVerificationContext, VoteVerificationContext};
pub use error::{BoundsError, CheckpointError, QuorumSignatureError, TxVerifyError, VoteVerifyError};
pub use quorum_signatures::{verify_pulse_quorum_sizes, verify_quorum_signatures};
pub use sign::{make_checkpointing_vote, make_state_change_vote, sign_state_change, sign_vote};
pub use state_change::verify_tx_state_change;
pub use vote::{verify_vote_age, verify_vote_signature, verify_wire_vote};
