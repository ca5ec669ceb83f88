//! Quorums: the validator/worker lists a vote is checked against.

use crate::{PublicKey, TypesError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The purpose a quorum was selected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum QuorumType {
    /// Judges other service nodes' liveness and issues state changes.
    Obligations = 0,
    /// Signs periodic finality checkpoints.
    Checkpointing = 1,
    /// Signs instant-confirmation transactions.
    Blink = 2,
    /// Signs round-based block production.
    Pulse = 3,
}

impl QuorumType {
    /// All quorum types, in discriminator order.
    pub const ALL: [QuorumType; 4] = [
        QuorumType::Obligations,
        QuorumType::Checkpointing,
        QuorumType::Blink,
        QuorumType::Pulse,
    ];
}

impl TryFrom<u8> for QuorumType {
    type Error = TypesError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(QuorumType::Obligations),
            1 => Ok(QuorumType::Checkpointing),
            2 => Ok(QuorumType::Blink),
            3 => Ok(QuorumType::Pulse),
            other => Err(TypesError::UnknownQuorumType(other)),
        }
    }
}

impl fmt::Display for QuorumType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuorumType::Obligations => write!(f, "obligation"),
            QuorumType::Checkpointing => write!(f, "checkpointing"),
            QuorumType::Blink => write!(f, "blink"),
            QuorumType::Pulse => write!(f, "pulse"),
        }
    }
}

/// Which list of a quorum an index refers to.
///
/// On the wire `0` means "invalid"; it never decodes into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum QuorumGroup {
    /// Vote-casting members.
    Validator = 1,
    /// Members being judged. Workers never cast votes.
    Worker = 2,
}

impl TryFrom<u8> for QuorumGroup {
    type Error = TypesError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(QuorumGroup::Validator),
            2 => Ok(QuorumGroup::Worker),
            other => Err(TypesError::InvalidQuorumGroup(other)),
        }
    }
}

impl fmt::Display for QuorumGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuorumGroup::Validator => write!(f, "validator"),
            QuorumGroup::Worker => write!(f, "worker"),
        }
    }
}

/// A quorum snapshot for one height and quorum type.
///
/// Indices into either list are positions, not identities: an index is valid
/// only if it is less than the list's length. Quorums are replaced wholesale
/// when the committee changes, so callers should hold indices, not references
/// into the lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quorum {
    /// Keys of the service nodes that validate and sign.
    pub validators: Vec<PublicKey>,
    /// Keys of the service nodes being tested, if applicable.
    pub workers: Vec<PublicKey>,
}

impl Quorum {
    /// Create a quorum from its two lists.
    pub fn new(validators: Vec<PublicKey>, workers: Vec<PublicKey>) -> Self {
        Self {
            validators,
            workers,
        }
    }

    /// Validator key at `index`, if in range.
    pub fn validator(&self, index: usize) -> Option<&PublicKey> {
        self.validators.get(index)
    }

    /// Worker key at `index`, if in range.
    pub fn worker(&self, index: usize) -> Option<&PublicKey> {
        self.workers.get(index)
    }
}

impl fmt::Display for Quorum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "validators:")?;
        for (i, key) in self.validators.iter().enumerate() {
            writeln!(f, "  [{}] {}", i, key)?;
        }
        writeln!(f, "workers:")?;
        for (i, key) in self.workers.iter().enumerate() {
            writeln!(f, "  [{}] {}", i, key)?;
        }
        Ok(())
    }
}

/// The quorums active at one height, one per quorum type.
#[derive(Debug, Clone, Default)]
pub struct QuorumManager {
    pub obligations: Option<Arc<Quorum>>,
    pub checkpointing: Option<Arc<Quorum>>,
    pub blink: Option<Arc<Quorum>>,
    pub pulse: Option<Arc<Quorum>>,
}

impl QuorumManager {
    /// The quorum for `quorum_type`, if one was selected at this height.
    pub fn get(&self, quorum_type: QuorumType) -> Option<Arc<Quorum>> {
        match quorum_type {
            QuorumType::Obligations => self.obligations.clone(),
            QuorumType::Checkpointing => self.checkpointing.clone(),
            QuorumType::Blink => self.blink.clone(),
            QuorumType::Pulse => self.pulse.clone(),
        }
    }

    /// Replace the quorum for `quorum_type`.
    pub fn set(&mut self, quorum_type: QuorumType, quorum: Arc<Quorum>) {
        let slot = match quorum_type {
            QuorumType::Obligations => &mut self.obligations,
            QuorumType::Checkpointing => &mut self.checkpointing,
            QuorumType::Blink => &mut self.blink,
            QuorumType::Pulse => &mut self.pulse,
        };
        *slot = Some(quorum);
    }
}

/// Position of `key` within `group`, if present.
pub fn find_index_in_quorum_group(group: &[PublicKey], key: &PublicKey) -> Option<usize> {
    group.iter().position(|k| k == key)
}
