//! Voting pool state.

use crate::entry::{insert_if_unique, CheckpointKey, GroupKey, ObligationsKey, PoolVoteEntry};
use stakevote_types::{state_change_from_tx_extra, HardFork, QuorumVote, Transaction, TxType};
use stakevote_voting::VotingConfig;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, error, trace};

/// Result of offering a vote to the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolInsertion {
    /// True if the vote was not already pooled.
    pub added: bool,
    /// Every pooled vote in the vote's group, ascending by index.
    pub votes: Vec<QuorumVote>,
}

/// Voting pool state machine.
///
/// Holds verified votes that have not yet made it into a committed state
/// change or checkpoint, grouped by what they sign. Single-threaded; see
/// [`crate::VotingPool`] for the shared form.
#[derive(Debug)]
pub struct PoolState {
    obligations: BTreeMap<ObligationsKey, Vec<PoolVoteEntry>>,
    checkpoints: BTreeMap<CheckpointKey, Vec<PoolVoteEntry>>,

    /// Current time.
    now: Duration,

    config: VotingConfig,
}

impl PoolState {
    /// Create an empty pool.
    pub fn new(config: VotingConfig) -> Self {
        Self {
            obligations: BTreeMap::new(),
            checkpoints: BTreeMap::new(),
            now: Duration::ZERO,
            config,
        }
    }

    /// Set the current time used for relay debouncing.
    pub fn set_time(&mut self, now: Duration) {
        self.now = now;
    }

    /// Current time.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn config(&self) -> &VotingConfig {
        &self.config
    }

    /// The vote list of the group `vote` belongs to, creating an empty group
    /// if `create_if_missing` is set.
    pub fn find_vote_pool(
        &mut self,
        vote: &QuorumVote,
        create_if_missing: bool,
    ) -> Option<&mut Vec<PoolVoteEntry>> {
        match GroupKey::of(vote) {
            GroupKey::Obligations(key) if create_if_missing => {
                Some(self.obligations.entry(key).or_default())
            }
            GroupKey::Obligations(key) => self.obligations.get_mut(&key),
            GroupKey::Checkpoint(key) if create_if_missing => {
                Some(self.checkpoints.entry(key).or_default())
            }
            GroupKey::Checkpoint(key) => self.checkpoints.get_mut(&key),
        }
    }

    fn group(&self, vote: &QuorumVote) -> Option<&Vec<PoolVoteEntry>> {
        match GroupKey::of(vote) {
            GroupKey::Obligations(key) => self.obligations.get(&key),
            GroupKey::Checkpoint(key) => self.checkpoints.get(&key),
        }
    }

    /// Add a verified vote unless a vote from the same index is already in
    /// its group.
    ///
    /// Re-gossiped duplicates are expected and are not errors.
    pub fn add_pool_vote_if_unique(&mut self, vote: &QuorumVote) -> PoolInsertion {
        let votes = match GroupKey::of(vote) {
            GroupKey::Obligations(key) => self.obligations.entry(key).or_default(),
            GroupKey::Checkpoint(key) => self.checkpoints.entry(key).or_default(),
        };

        let added = insert_if_unique(votes, vote);
        let votes: Vec<QuorumVote> = votes.iter().map(|e| e.vote).collect();
        trace!(
            height = vote.block_height,
            index = vote.index_in_group,
            added,
            group_size = votes.len(),
            "Offered vote to pool"
        );
        PoolInsertion { added, votes }
    }

    /// Record that `votes` were just relayed. Votes no longer pooled are
    /// ignored.
    pub fn set_relayed(&mut self, votes: &[QuorumVote]) {
        let now = self.now;
        for vote in votes {
            let Some(group) = self.find_vote_pool(vote, false) else {
                continue;
            };
            if let Some(entry) = group
                .iter_mut()
                .find(|e| e.vote.index_in_group == vote.index_in_group)
            {
                entry.time_last_sent_p2p = Some(now);
            }
        }
    }

    /// Votes due for relay at the current time.
    ///
    /// Before the split relay fork both vote families go out on the normal
    /// channel and `quorum_relay` is ignored. From the fork on, obligations
    /// votes use the normal channel and checkpoint votes the quorum channel.
    pub fn get_relayable_votes(
        &self,
        height: u64,
        hf: HardFork,
        quorum_relay: bool,
    ) -> Vec<QuorumVote> {
        let min_height = height.saturating_sub(self.config.vote_lifetime);
        let interval = self.config.relay_interval;
        let now = self.now;

        let (obligations, checkpoints) = if hf.at_least(self.config.hard_forks.split_quorum_relay) {
            (!quorum_relay, quorum_relay)
        } else {
            (true, true)
        };

        let mut result = Vec::new();
        if obligations {
            append_relayable(&mut result, self.obligations.values(), min_height, now, interval);
        }
        if checkpoints {
            append_relayable(&mut result, self.checkpoints.values(), min_height, now, interval);
        }
        result
    }

    /// Drop obligations groups whose state change was committed in `txs`.
    pub fn remove_used_votes(&mut self, txs: &[Transaction], hf: HardFork) {
        if self.obligations.is_empty() {
            return;
        }

        let richer = self.config.hard_forks.richer_state_changes;
        for tx in txs.iter().filter(|tx| tx.tx_type == TxType::StateChange) {
            let state_change = match state_change_from_tx_extra(&tx.extra, hf, richer) {
                Ok(sc) => sc,
                Err(e) => {
                    error!(error = %e, "Could not get state change from tx, possibly corrupt tx");
                    continue;
                }
            };
            let state = match state_change.new_state() {
                Ok(state) => state,
                Err(e) => {
                    error!(
                        height = state_change.block_height,
                        worker = state_change.service_node_index,
                        error = %e,
                        "Committed state change has an unknown state, possibly corrupt tx"
                    );
                    continue;
                }
            };

            let key = ObligationsKey {
                height: state_change.block_height,
                worker_index: state_change.service_node_index,
                state,
            };
            if self.obligations.remove(&key).is_some() {
                debug!(
                    height = key.height,
                    worker = key.worker_index,
                    %state,
                    "Removed votes for committed state change"
                );
            }
        }
    }

    /// Drop every group whose height is outside `[height - vote_lifetime, height]`.
    pub fn remove_expired_votes(&mut self, height: u64) {
        let min_height = height.saturating_sub(self.config.vote_lifetime);
        let in_window = |h: u64| (min_height..=height).contains(&h);

        let before = self.obligations.len() + self.checkpoints.len();
        self.obligations.retain(|key, _| in_window(key.height));
        self.checkpoints.retain(|key, _| in_window(key.height));
        let removed = before - (self.obligations.len() + self.checkpoints.len());

        if removed > 0 {
            debug!(height, min_height, removed, "Culled expired vote groups");
        }
    }

    /// Returns true if a checkpoint vote from `index_in_quorum` at `height`
    /// is pooled, for any block hash.
    pub fn received_checkpoint_vote(&self, height: u64, index_in_quorum: u16) -> bool {
        self.checkpoints
            .iter()
            .filter(|(key, _)| key.height == height)
            .any(|(_, votes)| {
                votes
                    .iter()
                    .any(|e| e.vote.index_in_group == index_in_quorum)
            })
    }

    /// Snapshot of the votes in `vote`'s group.
    pub fn votes_for(&self, vote: &QuorumVote) -> Vec<QuorumVote> {
        self.group(vote)
            .map(|votes| votes.iter().map(|e| e.vote).collect())
            .unwrap_or_default()
    }

    /// Number of obligations groups.
    pub fn len_obligations(&self) -> usize {
        self.obligations.len()
    }

    /// Number of checkpoint groups.
    pub fn len_checkpoints(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obligations.is_empty() && self.checkpoints.is_empty()
    }
}

fn append_relayable<'a>(
    result: &mut Vec<QuorumVote>,
    groups: impl Iterator<Item = &'a Vec<PoolVoteEntry>>,
    min_height: u64,
    now: Duration,
    relay_interval: Duration,
) {
    result.extend(
        groups
            .flatten()
            .filter(|e| e.vote.block_height >= min_height && e.is_relayable(now, relay_interval))
            .map(|e| e.vote),
    );
}
