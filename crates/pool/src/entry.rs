//! Pool entries.

use stakevote_types::{Hash, NewState, QuorumVote, VotePayload};
use std::time::Duration;

/// A pooled vote and when it was last relayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolVoteEntry {
    pub vote: QuorumVote,
    /// `None` until the vote is first relayed.
    pub time_last_sent_p2p: Option<Duration>,
}

impl PoolVoteEntry {
    pub fn new(vote: QuorumVote) -> Self {
        Self {
            vote,
            time_last_sent_p2p: None,
        }
    }

    /// Returns true if the vote may be relayed again at `now`.
    pub fn is_relayable(&self, now: Duration, relay_interval: Duration) -> bool {
        match self.time_last_sent_p2p {
            None => true,
            Some(sent) => now >= sent.saturating_add(relay_interval),
        }
    }
}

/// Key of an obligations group: votes that sign the same state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObligationsKey {
    pub height: u64,
    pub worker_index: u32,
    pub state: NewState,
}

/// Key of a checkpoint group: votes that sign the same block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CheckpointKey {
    pub height: u64,
    pub block_hash: Hash,
}

/// The group a vote belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Obligations(ObligationsKey),
    Checkpoint(CheckpointKey),
}

impl GroupKey {
    pub fn of(vote: &QuorumVote) -> Self {
        match vote.payload {
            VotePayload::Obligations(sc) => GroupKey::Obligations(ObligationsKey {
                height: vote.block_height,
                worker_index: sc.worker_index,
                state: sc.state,
            }),
            VotePayload::Checkpoint { block_hash } => GroupKey::Checkpoint(CheckpointKey {
                height: vote.block_height,
                block_hash,
            }),
        }
    }
}

/// Insert `vote` into `votes`, keeping ascending `index_in_group` order.
///
/// Returns false if a vote from the same index is already present.
pub(crate) fn insert_if_unique(votes: &mut Vec<PoolVoteEntry>, vote: &QuorumVote) -> bool {
    match votes.binary_search_by_key(&vote.index_in_group, |e| e.vote.index_in_group) {
        Ok(_) => false,
        Err(pos) => {
            votes.insert(pos, PoolVoteEntry::new(*vote));
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakevote_types::test_utils::{test_keys, test_state_change_vote};

    #[test]
    fn test_insert_keeps_order() {
        let keys = test_keys(1, 9);
        let mut votes = Vec::new();
        for index in [5u16, 1, 9, 3, 1, 5] {
            let vote = test_state_change_vote(&keys[0], 10, index, 0, NewState::Decommission);
            insert_if_unique(&mut votes, &vote);
        }
        let indices: Vec<u16> = votes.iter().map(|e| e.vote.index_in_group).collect();
        assert_eq!(indices, vec![1, 3, 5, 9]);
    }

    #[test]
    fn test_relay_window() {
        let keys = test_keys(1, 9);
        let vote = test_state_change_vote(&keys[0], 10, 0, 0, NewState::Decommission);
        let interval = Duration::from_secs(120);

        let mut entry = PoolVoteEntry::new(vote);
        assert!(entry.is_relayable(Duration::ZERO, interval));

        entry.time_last_sent_p2p = Some(Duration::from_secs(1000));
        assert!(!entry.is_relayable(Duration::from_secs(1119), interval));
        assert!(entry.is_relayable(Duration::from_secs(1120), interval));
    }
}
