//! Voting pool.
//!
//! This crate implements the in-memory pool of verified quorum votes that
//! have not yet been consumed by a committed transaction or checkpoint. It
//! handles:
//!
//! - Deduplicated, index-ordered insertion per vote group
//! - Relay debouncing and per-fork relay channel selection
//! - Removal of votes made redundant by committed state changes
//! - Height-based expiry
//!
//! [`PoolState`] is the synchronous state machine; [`VotingPool`] shares it
//! between threads behind a single mutex. Votes must be verified before they
//! are offered to either.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod entry;
mod pool;
mod state;

pub use entry::{CheckpointKey, GroupKey, ObligationsKey, PoolVoteEntry};
pub use pool::VotingPool;
pub use state::{PoolInsertion, PoolState};
