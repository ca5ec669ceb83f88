//! Voting configuration.

use serde::{Deserialize, Serialize};
use stakevote_types::HardFork;
use std::time::Duration;

/// Hard forks that change voting rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardForkGates {
    /// First fork allowing state changes other than deregistration.
    pub richer_state_changes: HardFork,
    /// First fork requiring strictly ascending voter indices.
    pub enforce_vote_ordering: HardFork,
    /// First fork relaying checkpoint votes on the quorum channel only.
    pub split_quorum_relay: HardFork,
}

impl Default for HardForkGates {
    fn default() -> Self {
        Self {
            richer_state_changes: HardFork(12),
            enforce_vote_ordering: HardFork(13),
            split_quorum_relay: HardFork(14),
        }
    }
}

/// Configuration for vote verification and pooling.
///
/// Every node on a network must agree on these values; the defaults are the
/// main network's. Any field can be overridden from a config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VotingConfig {
    /// Blocks a vote stays valid and pooled.
    pub vote_lifetime: u64,
    /// Blocks past a height limit before a rejection becomes permanent.
    pub vote_or_tx_verify_height_buffer: u64,
    /// Maximum votes in a state change.
    pub state_change_quorum_size: usize,
    /// Minimum votes in a state change.
    pub state_change_min_votes: usize,
    /// Blocks a state-change transaction stays acceptable.
    pub state_change_tx_lifetime: u64,
    /// Maximum signatures on a checkpoint.
    pub checkpoint_quorum_size: usize,
    /// Minimum signatures on a checkpoint.
    pub checkpoint_min_votes: usize,
    /// Service-node checkpoints only exist at multiples of this height.
    pub checkpoint_interval: u64,
    /// Validators in a pulse quorum.
    pub pulse_quorum_num_validators: usize,
    /// Exact number of signatures on a pulse block.
    pub pulse_block_required_signatures: usize,
    /// Minimum time between relays of the same vote.
    pub relay_interval: Duration,
    pub hard_forks: HardForkGates,
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            vote_lifetime: 60,
            vote_or_tx_verify_height_buffer: 5,
            state_change_quorum_size: 10,
            state_change_min_votes: 7,
            state_change_tx_lifetime: 60,
            checkpoint_quorum_size: 20,
            checkpoint_min_votes: 13,
            checkpoint_interval: 4,
            pulse_quorum_num_validators: 11,
            pulse_block_required_signatures: 7,
            relay_interval: Duration::from_secs(120),
            hard_forks: HardForkGates::default(),
        }
    }
}

impl VotingConfig {
    /// Largest validator index any signature set can carry.
    pub fn max_quorum_size(&self) -> usize {
        self.checkpoint_quorum_size
            .max(self.pulse_quorum_num_validators)
    }

    /// Set the vote lifetime in blocks.
    pub fn with_vote_lifetime(mut self, blocks: u64) -> Self {
        self.vote_lifetime = blocks;
        self
    }

    /// Set the height buffer.
    pub fn with_height_buffer(mut self, blocks: u64) -> Self {
        self.vote_or_tx_verify_height_buffer = blocks;
        self
    }

    /// Set state-change vote bounds.
    pub fn with_state_change_votes(mut self, min: usize, max: usize) -> Self {
        self.state_change_min_votes = min;
        self.state_change_quorum_size = max;
        self
    }

    /// Set the state-change transaction lifetime in blocks.
    pub fn with_state_change_tx_lifetime(mut self, blocks: u64) -> Self {
        self.state_change_tx_lifetime = blocks;
        self
    }

    /// Set checkpoint signature bounds.
    pub fn with_checkpoint_votes(mut self, min: usize, max: usize) -> Self {
        self.checkpoint_min_votes = min;
        self.checkpoint_quorum_size = max;
        self
    }

    /// Set the relay debounce interval.
    pub fn with_relay_interval(mut self, interval: Duration) -> Self {
        self.relay_interval = interval;
        self
    }

    /// Set the hard fork gates.
    pub fn with_hard_forks(mut self, hard_forks: HardForkGates) -> Self {
        self.hard_forks = hard_forks;
        self
    }
}
