//! State-change payloads carried by committed transactions.

use crate::{NewState, Signature, TypesError};
use serde::{Deserialize, Serialize};

/// Current state-change payload version.
pub const STATE_CHANGE_VERSION: u8 = 4;

/// One validator's signature within a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChangeVoteEntry {
    /// Position of the signer in the obligations quorum's validator list.
    pub validator_index: u32,
    pub signature: Signature,
}

/// The batch of votes authorising a service node state change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    pub version: u8,
    /// Raw wire value. Use [`StateChange::new_state`] to interpret it.
    pub state: u16,
    pub block_height: u64,
    /// Position of the judged node in the obligations quorum's worker list.
    pub service_node_index: u32,
    /// Reasons every voter agreed on.
    pub reason_consensus_all: u16,
    /// Reasons at least one voter gave.
    pub reason_consensus_any: u16,
    pub votes: Vec<StateChangeVoteEntry>,
}

impl StateChange {
    /// Create an empty state change for `service_node_index` at `block_height`.
    pub fn new(block_height: u64, service_node_index: u32, state: NewState) -> Self {
        Self {
            version: STATE_CHANGE_VERSION,
            state: state.as_u16(),
            block_height,
            service_node_index,
            ..Self::default()
        }
    }

    /// The typed state, if the raw value is known.
    pub fn new_state(&self) -> Result<NewState, TypesError> {
        NewState::try_from(self.state)
    }

    /// Returns true if this is a plain deregistration.
    pub fn is_deregister(&self) -> bool {
        self.state == NewState::Deregister.as_u16()
    }
}

/// Legacy deregistration payload, used before richer state changes existed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeregisterOld {
    pub block_height: u64,
    pub service_node_index: u32,
    pub votes: Vec<StateChangeVoteEntry>,
}

impl From<DeregisterOld> for StateChange {
    fn from(old: DeregisterOld) -> Self {
        StateChange {
            version: 0,
            state: NewState::Deregister.as_u16(),
            block_height: old.block_height,
            service_node_index: old.service_node_index,
            reason_consensus_all: 0,
            reason_consensus_any: 0,
            votes: old.votes,
        }
    }
}
