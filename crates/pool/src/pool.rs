//! Thread-safe voting pool.

use crate::{PoolInsertion, PoolState};
use parking_lot::Mutex;
use stakevote_types::{HardFork, QuorumVote, Transaction};
use stakevote_voting::VotingConfig;
use std::time::Duration;
use tracing::instrument;

/// The node's voting pool.
///
/// Wraps [`PoolState`] in a single lock. Every method takes the lock for its
/// whole duration and never calls out while holding it, so operations are
/// linearized and never block on anything but each other.
#[derive(Debug)]
pub struct VotingPool {
    state: Mutex<PoolState>,
}

impl VotingPool {
    /// Create an empty pool.
    pub fn new(config: VotingConfig) -> Self {
        Self {
            state: Mutex::new(PoolState::new(config)),
        }
    }

    /// Set the current time used for relay debouncing.
    pub fn set_time(&self, now: Duration) {
        self.state.lock().set_time(now);
    }

    /// Add a verified vote unless its voter is already pooled for the same
    /// group. See [`PoolState::add_pool_vote_if_unique`].
    #[instrument(level = "debug", skip(self, vote), fields(
        height = vote.block_height,
        index = vote.index_in_group,
        quorum_type = %vote.quorum_type(),
    ))]
    pub fn add_pool_vote_if_unique(&self, vote: &QuorumVote) -> PoolInsertion {
        self.state.lock().add_pool_vote_if_unique(vote)
    }

    /// Stamp `votes` as relayed now.
    pub fn set_relayed(&self, votes: &[QuorumVote]) {
        self.state.lock().set_relayed(votes);
    }

    /// Votes due for relay. See [`PoolState::get_relayable_votes`].
    #[instrument(level = "debug", skip(self, hf), fields(%hf))]
    pub fn get_relayable_votes(
        &self,
        height: u64,
        hf: HardFork,
        quorum_relay: bool,
    ) -> Vec<QuorumVote> {
        self.state
            .lock()
            .get_relayable_votes(height, hf, quorum_relay)
    }

    /// Drop votes made redundant by committed state-change transactions.
    #[instrument(level = "debug", skip(self, txs, hf), fields(tx_count = txs.len(), %hf))]
    pub fn remove_used_votes(&self, txs: &[Transaction], hf: HardFork) {
        self.state.lock().remove_used_votes(txs, hf);
    }

    /// Drop vote groups outside the lifetime window ending at `height`.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_expired_votes(&self, height: u64) {
        self.state.lock().remove_expired_votes(height);
    }

    /// Returns true if a checkpoint vote from `index_in_quorum` at `height`
    /// is pooled.
    pub fn received_checkpoint_vote(&self, height: u64, index_in_quorum: u16) -> bool {
        self.state
            .lock()
            .received_checkpoint_vote(height, index_in_quorum)
    }

    /// Snapshot of the votes in `vote`'s group.
    pub fn votes_for(&self, vote: &QuorumVote) -> Vec<QuorumVote> {
        self.state.lock().votes_for(vote)
    }

    pub fn len_obligations(&self) -> usize {
        self.state.lock().len_obligations()
    }

    pub fn len_checkpoints(&self) -> usize {
        self.state.lock().len_checkpoints()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().is_empty()
    }
}

impl Default for VotingPool {
    fn default() -> Self {
        Self::new(VotingConfig::default())
    }
}
