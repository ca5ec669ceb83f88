//! Node-side quorum vote handling.
//!
//! [`QuorumCop`] ties the verifiers and the voting pool together into the
//! entry points a node calls: a vote arrives from a peer, a block is added,
//! the relay timer fires. It also assembles state changes and checkpoints
//! once enough votes have been pooled.
//!
//! Quorums are looked up through [`QuorumProvider`]; [`QuorumStore`] is the
//! in-memory implementation fed by the service node list.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

mod cop;
mod error;
mod provider;

pub use cop::QuorumCop;
pub use error::CopError;
pub use provider::{QuorumProvider, QuorumStore};
