//! Quorum votes.
//!
//! A [`QuorumVote`] is the typed, validated-shape form used everywhere inside
//! the node. [`WireVote`] is the flat form exchanged with peers; converting
//! from it rejects vote types and groups that cannot be represented.

use crate::{Hash, QuorumGroup, QuorumType, Signature, TypesError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current vote version.
pub const QUORUM_VOTE_VERSION: u8 = 0;

/// The state a service node is voted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u16)]
pub enum NewState {
    /// Permanent removal. Hashes without the state field for compatibility.
    Deregister = 0,
    /// Temporary removal from rewards and quorums.
    Decommission = 1,
    /// Return from decommission.
    Recommission = 2,
    /// Penalise a node for changing its public IP.
    IpChangePenalty = 3,
}

impl NewState {
    /// Number of known states. Raw values at or above this are invalid.
    pub const COUNT: u16 = 4;

    /// Wire value.
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

impl TryFrom<u16> for NewState {
    type Error = TypesError;

    fn try_from(v: u16) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(NewState::Deregister),
            1 => Ok(NewState::Decommission),
            2 => Ok(NewState::Recommission),
            3 => Ok(NewState::IpChangePenalty),
            other => Err(TypesError::UnknownState(other)),
        }
    }
}

impl fmt::Display for NewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NewState::Deregister => write!(f, "deregister"),
            NewState::Decommission => write!(f, "decommission"),
            NewState::Recommission => write!(f, "recommission"),
            NewState::IpChangePenalty => write!(f, "ip change penalty"),
        }
    }
}

/// Payload of an obligations vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateChangeVote {
    /// Position of the judged node in the quorum's worker list.
    pub worker_index: u32,
    pub state: NewState,
    /// Bitmask of failure reasons. Not signed.
    pub reason: u16,
}

/// Type-specific part of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VotePayload {
    Obligations(StateChangeVote),
    Checkpoint { block_hash: Hash },
}

/// A vote cast by a quorum validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuorumVote {
    pub version: u8,
    /// Height the quorum was selected at (for checkpoints, the block height).
    pub block_height: u64,
    pub group: QuorumGroup,
    /// Position of the voter within `group`.
    pub index_in_group: u16,
    pub signature: Signature,
    pub payload: VotePayload,
}

impl QuorumVote {
    /// The quorum type this vote belongs to, derived from its payload.
    pub fn quorum_type(&self) -> QuorumType {
        match self.payload {
            VotePayload::Obligations(_) => QuorumType::Obligations,
            VotePayload::Checkpoint { .. } => QuorumType::Checkpointing,
        }
    }

    /// The obligations payload, if this is an obligations vote.
    pub fn state_change(&self) -> Option<&StateChangeVote> {
        match &self.payload {
            VotePayload::Obligations(sc) => Some(sc),
            VotePayload::Checkpoint { .. } => None,
        }
    }

    /// The voted block hash, if this is a checkpoint vote.
    pub fn block_hash(&self) -> Option<Hash> {
        match self.payload {
            VotePayload::Checkpoint { block_hash } => Some(block_hash),
            VotePayload::Obligations(_) => None,
        }
    }
}

impl fmt::Display for QuorumVote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vote at height {} from {} {}",
            self.quorum_type(),
            self.block_height,
            self.group,
            self.index_in_group
        )?;
        match &self.payload {
            VotePayload::Obligations(sc) => {
                write!(f, ": worker {} -> {}", sc.worker_index, sc.state)
            }
            VotePayload::Checkpoint { block_hash } => write!(f, ": block {}", block_hash),
        }
    }
}

/// Flat vote form relayed between peers.
///
/// Field names are short because every relayed vote carries them. Unused
/// payload fields are still encoded as `None` so the form decodes under
/// bincode as well as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireVote {
    #[serde(rename = "v")]
    pub version: u8,
    #[serde(rename = "t")]
    pub quorum_type: u8,
    #[serde(rename = "h")]
    pub block_height: u64,
    #[serde(rename = "g")]
    pub group: u8,
    #[serde(rename = "i")]
    pub index_in_group: u16,
    #[serde(rename = "s")]
    pub signature: Signature,
    #[serde(rename = "bh", default)]
    pub block_hash: Option<Hash>,
    #[serde(rename = "wi", default)]
    pub worker_index: Option<u32>,
    #[serde(rename = "sc", default)]
    pub state: Option<u16>,
    #[serde(rename = "re", default)]
    pub reason: Option<u16>,
}

impl From<&QuorumVote> for WireVote {
    fn from(vote: &QuorumVote) -> Self {
        let mut wire = WireVote {
            version: vote.version,
            quorum_type: vote.quorum_type() as u8,
            block_height: vote.block_height,
            group: vote.group as u8,
            index_in_group: vote.index_in_group,
            signature: vote.signature,
            block_hash: None,
            worker_index: None,
            state: None,
            reason: None,
        };
        match vote.payload {
            VotePayload::Obligations(sc) => {
                wire.worker_index = Some(sc.worker_index);
                wire.state = Some(sc.state.as_u16());
                wire.reason = Some(sc.reason);
            }
            VotePayload::Checkpoint { block_hash } => wire.block_hash = Some(block_hash),
        }
        wire
    }
}

impl TryFrom<WireVote> for QuorumVote {
    type Error = TypesError;

    fn try_from(wire: WireVote) -> Result<Self, Self::Error> {
        let quorum_type = QuorumType::try_from(wire.quorum_type)?;
        let group = QuorumGroup::try_from(wire.group)?;

        let payload = match quorum_type {
            QuorumType::Obligations => {
                let worker_index = wire
                    .worker_index
                    .ok_or(TypesError::MissingPayloadField("worker_index"))?;
                let state = wire.state.ok_or(TypesError::MissingPayloadField("state"))?;
                VotePayload::Obligations(StateChangeVote {
                    worker_index,
                    state: NewState::try_from(state)?,
                    reason: wire.reason.unwrap_or(0),
                })
            }
            QuorumType::Checkpointing => VotePayload::Checkpoint {
                block_hash: wire
                    .block_hash
                    .ok_or(TypesError::MissingPayloadField("block_hash"))?,
            },
            // Blink and pulse quorums sign through their own messages; they
            // never produce pooled votes.
            QuorumType::Blink | QuorumType::Pulse => {
                return Err(TypesError::UnknownQuorumType(wire.quorum_type))
            }
        };

        Ok(QuorumVote {
            version: wire.version,
            block_height: wire.block_height,
            group,
            index_in_group: wire.index_in_group,
            signature: wire.signature,
            payload,
        })
    }
}
