//! The node's quorum vote handler.

use crate::{CopError, QuorumProvider};
use stakevote_pool::{PoolInsertion, VotingPool};
use stakevote_types::{
    Block, Checkpoint, HardFork, QuorumSignature, QuorumVote, StateChange, StateChangeVoteEntry,
    Transaction, VotePayload, WireVote,
};
use stakevote_voting::{verify_vote_age, verify_vote_signature, VoteVerifyError, VotingConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, instrument};

/// Receives quorum votes, pools the valid ones and turns complete vote
/// groups into state changes and checkpoints.
///
/// All methods take `&self`; the pool does its own locking, so a cop can be
/// shared between the network and block processing threads.
pub struct QuorumCop {
    quorums: Arc<dyn QuorumProvider>,
    pool: VotingPool,
    config: VotingConfig,
}

impl std::fmt::Debug for QuorumCop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuorumCop")
            .field("pool", &self.pool)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl QuorumCop {
    /// Create a cop with an empty pool.
    pub fn new(quorums: Arc<dyn QuorumProvider>, config: VotingConfig) -> Self {
        Self {
            quorums,
            pool: VotingPool::new(config.clone()),
            config,
        }
    }

    pub fn pool(&self) -> &VotingPool {
        &self.pool
    }

    pub fn config(&self) -> &VotingConfig {
        &self.config
    }

    /// Set the current time used for relay debouncing.
    pub fn set_time(&self, now: Duration) {
        self.pool.set_time(now);
    }

    /// Verify a vote from a peer and pool it.
    ///
    /// Checks the vote's age first, then its signature against the quorum
    /// selected for the vote's height and type. On success returns the vote's
    /// group as it stands after insertion.
    #[instrument(level = "debug", skip(self, vote, hf), fields(
        height = vote.block_height,
        index = vote.index_in_group,
        quorum_type = %vote.quorum_type(),
        %hf,
    ))]
    pub fn handle_vote(
        &self,
        vote: &QuorumVote,
        latest_height: u64,
        hf: HardFork,
    ) -> Result<PoolInsertion, CopError> {
        verify_vote_age(vote, latest_height, &self.config)?;

        let quorum_type = vote.quorum_type();
        let Some(quorum) = self.quorums.get_quorum(quorum_type, vote.block_height) else {
            error!(
                height = vote.block_height,
                %quorum_type,
                "Quorum state for height was not cached"
            );
            return Err(CopError::QuorumUnavailable {
                quorum_type,
                height: vote.block_height,
            });
        };

        verify_vote_signature(hf, vote, &quorum)?;

        let insertion = self.pool.add_pool_vote_if_unique(vote);
        debug!(
            added = insertion.added,
            group_size = insertion.votes.len(),
            "Vote accepted"
        );
        Ok(insertion)
    }

    /// Decode a relayed vote, then handle it like [`QuorumCop::handle_vote`].
    pub fn handle_wire_vote(
        &self,
        wire: WireVote,
        latest_height: u64,
        hf: HardFork,
    ) -> Result<(QuorumVote, PoolInsertion), CopError> {
        let vote = QuorumVote::try_from(wire).map_err(VoteVerifyError::from)?;
        let insertion = self.handle_vote(&vote, latest_height, hf)?;
        Ok((vote, insertion))
    }

    /// Drop votes consumed by `block`'s state changes and votes that have
    /// aged out.
    #[instrument(level = "debug", skip(self, block, txs), fields(
        height = block.height,
        tx_count = txs.len(),
    ))]
    pub fn block_added(&self, block: &Block, txs: &[Transaction]) {
        self.pool.remove_used_votes(txs, block.major_version);
        self.pool.remove_expired_votes(block.height);
    }

    /// Pooled votes due for relay. See
    /// [`stakevote_pool::PoolState::get_relayable_votes`].
    pub fn relayable_votes(
        &self,
        height: u64,
        hf: HardFork,
        quorum_relay: bool,
    ) -> Vec<QuorumVote> {
        self.pool.get_relayable_votes(height, hf, quorum_relay)
    }

    /// Record that `votes` were relayed.
    pub fn set_votes_relayed(&self, votes: &[QuorumVote]) {
        self.pool.set_relayed(votes);
    }

    /// Assemble a state change from one obligations group.
    ///
    /// `votes` must all come from the same group and be ascending by index,
    /// as returned in [`PoolInsertion::votes`]. Returns `None` until the group
    /// holds the minimum number of votes. Extra votes past the quorum size
    /// are left out.
    pub fn build_state_change(&self, votes: &[QuorumVote]) -> Option<StateChange> {
        if votes.len() < self.config.state_change_min_votes {
            return None;
        }

        let first = votes.first()?;
        let target = *first.state_change()?;
        let mut state_change =
            StateChange::new(first.block_height, target.worker_index, target.state);
        state_change.reason_consensus_all = u16::MAX;

        for vote in votes.iter().take(self.config.state_change_quorum_size) {
            let VotePayload::Obligations(sc) = vote.payload else {
                return None;
            };
            if vote.block_height != first.block_height
                || sc.worker_index != target.worker_index
                || sc.state != target.state
            {
                return None;
            }
            state_change.reason_consensus_all &= sc.reason;
            state_change.reason_consensus_any |= sc.reason;
            state_change.votes.push(StateChangeVoteEntry {
                validator_index: u32::from(vote.index_in_group),
                signature: vote.signature,
            });
        }

        debug!(
            height = state_change.block_height,
            worker = state_change.service_node_index,
            state = state_change.state,
            votes = state_change.votes.len(),
            "Assembled state change"
        );
        Some(state_change)
    }

    /// Assemble a service-node checkpoint from one checkpoint group.
    ///
    /// Same contract as [`QuorumCop::build_state_change`], using the
    /// checkpoint vote limits.
    pub fn build_checkpoint(&self, votes: &[QuorumVote]) -> Option<Checkpoint> {
        if votes.len() < self.config.checkpoint_min_votes {
            return None;
        }

        let first = votes.first()?;
        let block_hash = first.block_hash()?;
        let mut checkpoint = Checkpoint::empty_service_node(block_hash, first.block_height);

        for vote in votes.iter().take(self.config.checkpoint_quorum_size) {
            if vote.block_height != first.block_height || vote.block_hash() != Some(block_hash) {
                return None;
            }
            checkpoint
                .signatures
                .push(QuorumSignature::new(vote.index_in_group, vote.signature));
        }

        debug!(
            height = checkpoint.height,
            block = %block_hash,
            signatures = checkpoint.signatures.len(),
            "Assembled checkpoint"
        );
        Some(checkpoint)
    }
}
