//! Blocks and checkpoints as seen by quorum signature verification.

use crate::{Hash, HardFork, Signature};
use serde::{Deserialize, Serialize};

/// A signature by a quorum validator over a block or checkpoint hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumSignature {
    /// Position of the signer in the quorum's validator list.
    pub voter_index: u16,
    pub signature: Signature,
}

impl QuorumSignature {
    pub fn new(voter_index: u16, signature: Signature) -> Self {
        Self {
            voter_index,
            signature,
        }
    }
}

/// Which pulse validators declared participation in a round.
///
/// Bit `i` set means validator `i` participated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ValidatorBitset(pub u16);

impl ValidatorBitset {
    /// Bitset with the given validator indices set. Out-of-range indices are
    /// ignored.
    pub fn from_indices(indices: impl IntoIterator<Item = u16>) -> Self {
        let bits = indices
            .into_iter()
            .filter_map(|i| 1u16.checked_shl(u32::from(i)))
            .fold(0u16, |acc, bit| acc | bit);
        ValidatorBitset(bits)
    }

    /// Returns true if validator `index` participated.
    pub fn contains(&self, index: u16) -> bool {
        1u16.checked_shl(u32::from(index))
            .is_some_and(|bit| self.0 & bit != 0)
    }

    /// Returns true if no bit at or above `num_validators` is set.
    pub fn fits(&self, num_validators: usize) -> bool {
        match 1u32.checked_shl(num_validators as u32) {
            Some(limit) => u32::from(self.0) < limit,
            None => true,
        }
    }

    /// Number of participating validators.
    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }
}

/// Pulse round metadata carried in a block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PulseInfo {
    pub round: u8,
    pub validator_bitset: ValidatorBitset,
}

/// The parts of a block relevant to quorum signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub height: u64,
    pub hash: Hash,
    pub major_version: HardFork,
    pub pulse: PulseInfo,
    pub signatures: Vec<QuorumSignature>,
}

/// Origin of a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckpointKind {
    /// Compiled into the node; carries no signatures.
    Hardcoded,
    /// Signed by a checkpointing quorum.
    ServiceNode,
}

/// A finalized block hash at a height.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub kind: CheckpointKind,
    pub height: u64,
    pub block_hash: Hash,
    pub signatures: Vec<QuorumSignature>,
}

impl Checkpoint {
    /// A service-node checkpoint with no signatures yet.
    pub fn empty_service_node(block_hash: Hash, height: u64) -> Self {
        Self {
            kind: CheckpointKind::ServiceNode,
            height,
            block_hash,
            signatures: Vec::new(),
        }
    }

    /// A hardcoded checkpoint.
    pub fn hardcoded(block_hash: Hash, height: u64) -> Self {
        Self {
            kind: CheckpointKind::Hardcoded,
            height,
            block_hash,
            signatures: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitset_membership() {
        let bits = ValidatorBitset::from_indices([0, 2, 10]);
        assert!(bits.contains(0));
        assert!(!bits.contains(1));
        assert!(bits.contains(2));
        assert!(bits.contains(10));
        assert!(!bits.contains(16));
        assert!(!bits.contains(u16::MAX));
        assert_eq!(bits.count(), 3);
    }

    #[test]
    fn test_bitset_range() {
        assert!(ValidatorBitset(0b111_1111_1111).fits(11));
        assert!(!ValidatorBitset(1 << 11).fits(11));
        assert!(ValidatorBitset(u16::MAX).fits(16));
        assert!(ValidatorBitset(u16::MAX).fits(40));
    }

    #[test]
    fn test_empty_service_node_checkpoint() {
        let cp = Checkpoint::empty_service_node(Hash::fast_hash(b"b"), 40);
        assert_eq!(cp.kind, CheckpointKind::ServiceNode);
        assert!(cp.signatures.is_empty());
    }
}
