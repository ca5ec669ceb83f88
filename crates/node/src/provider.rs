//! Quorum lookup.

use parking_lot::RwLock;
use stakevote_types::{Quorum, QuorumManager, QuorumType};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Source of the quorums votes are checked against.
///
/// A quorum is identified by its type and the height it was selected for.
pub trait QuorumProvider: Send + Sync {
    /// The quorum of `quorum_type` for `height`, if it is known.
    fn get_quorum(&self, quorum_type: QuorumType, height: u64) -> Option<Arc<Quorum>>;
}

/// Quorums kept in memory, keyed by height.
#[derive(Debug, Default)]
pub struct QuorumStore {
    by_height: RwLock<BTreeMap<u64, QuorumManager>>,
}

impl QuorumStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the `quorum_type` quorum selected for `height`.
    pub fn insert(&self, height: u64, quorum_type: QuorumType, quorum: Arc<Quorum>) {
        self.by_height
            .write()
            .entry(height)
            .or_default()
            .set(quorum_type, quorum);
    }

    /// Forget every quorum below `height`.
    pub fn prune_below(&self, height: u64) {
        let mut by_height = self.by_height.write();
        *by_height = by_height.split_off(&height);
    }

    /// Number of heights with at least one quorum.
    pub fn len(&self) -> usize {
        self.by_height.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_height.read().is_empty()
    }
}

impl QuorumProvider for QuorumStore {
    fn get_quorum(&self, quorum_type: QuorumType, height: u64) -> Option<Arc<Quorum>> {
        self.by_height.read().get(&height)?.get(quorum_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakevote_types::test_utils::test_quorum;

    #[test]
    fn test_lookup_by_type_and_height() {
        let store = QuorumStore::new();
        let (_, quorum) = test_quorum(10, 5);
        let quorum = Arc::new(quorum);
        store.insert(100, QuorumType::Obligations, Arc::clone(&quorum));

        assert_eq!(
            store.get_quorum(QuorumType::Obligations, 100).as_deref(),
            Some(&*quorum)
        );
        assert!(store.get_quorum(QuorumType::Checkpointing, 100).is_none());
        assert!(store.get_quorum(QuorumType::Obligations, 101).is_none());
    }

    #[test]
    fn test_prune_below() {
        let store = QuorumStore::new();
        let (_, quorum) = test_quorum(3, 0);
        let quorum = Arc::new(quorum);
        for height in [10, 20, 30] {
            store.insert(height, QuorumType::Checkpointing, Arc::clone(&quorum));
        }

        store.prune_below(20);
        assert_eq!(store.len(), 2);
        assert!(store.get_quorum(QuorumType::Checkpointing, 10).is_none());
        assert!(store.get_quorum(QuorumType::Checkpointing, 20).is_some());
    }
}
