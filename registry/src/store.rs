// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Storage of node snapshots

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, info};

use crate::errors::RegistryResult;
use crate::item::NodeId;
use crate::snapshot::{Mutation, Snapshot};

/// Where node snapshots are read from and mutations are committed to
pub trait RegistryStore: Send + Sync {
    /// Load the snapshot of a node under a registration point. Unknown nodes have an empty snapshot.
    fn load(&self, node: NodeId, point: &str) -> RegistryResult<Snapshot>;
    /// Apply a sequence of mutations as a whole: either all of them are applied or none.
    fn commit(&self, node: NodeId, point: &str, mutations: &[Mutation]) -> RegistryResult<()>;
}

/// An in-memory [`RegistryStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshots: DashMap<(NodeId, String), Snapshot>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Replace the stored snapshot of a node
    pub fn store(&self, node: NodeId, point: &str, snapshot: Snapshot) {
        debug!("Storing snapshot of node {node} under '{point}'");
        self.snapshots.insert((node, point.to_owned()), snapshot);
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl RegistryStore for MemoryStore {
    fn load(&self, node: NodeId, point: &str) -> RegistryResult<Snapshot> {
        Ok(self
            .snapshots
            .get(&(node, point.to_owned()))
            .map(|s| s.value().clone())
            .unwrap_or_default())
    }

    fn commit(&self, node: NodeId, point: &str, mutations: &[Mutation]) -> RegistryResult<()> {
        if mutations.is_empty() {
            return Ok(());
        }
        let replay = |stored: &Snapshot| -> RegistryResult<Snapshot> {
            let mut updated = stored.clone();
            for mutation in mutations {
                updated.apply(mutation)?;
            }
            Ok(updated)
        };
        // the entry guard locks the shard, so concurrent commits to a node serialize.
        // A node is only inserted once its mutations have applied.
        match self.snapshots.entry((node, point.to_owned())) {
            Entry::Occupied(mut entry) => {
                let updated = replay(entry.get())?;
                entry.insert(updated);
            }
            Entry::Vacant(entry) => {
                entry.insert(replay(&Snapshot::default())?);
            }
        }
        info!(
            "Committed {} mutation(s) for node {node} under '{point}'",
            mutations.len()
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::{MemoryStore, RegistryStore};
    use crate::{Fields, Mutation, NodeId, RegistryError, RegistryItem, Snapshot};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tracing_test::traced_test;

    const POINT: &str = "node.config";

    #[test]
    fn load_unknown_is_empty() {
        let store = MemoryStore::new();
        assert!(store.load(NodeId::new(), POINT).unwrap().is_empty());
    }

    #[traced_test]
    #[test]
    fn commit_is_all_or_nothing() {
        let store = MemoryStore::new();
        let node = NodeId::from_u128(1);
        let initial = Snapshot::new().with(
            "core.vpn.server",
            RegistryItem::new("VpnServerConfig").with("port", 1194),
        );
        store.store(node, POINT, initial.clone());

        let bad = vec![
            Mutation::Clear {
                path: "core.vpn.server".to_owned(),
            },
            Mutation::Assign {
                path: "core.vpn.server".to_owned(),
                index: 0,
                fields: Fields::new(),
            },
        ];
        assert!(matches!(
            store.commit(node, POINT, &bad),
            Err(RegistryError::NoSuchEntry { .. })
        ));
        assert_eq!(store.load(node, POINT).unwrap(), initial);

        let good = vec![Mutation::Append {
            path: "core.vpn.server".to_owned(),
            item: RegistryItem::new("VpnServerConfig").with("port", 443),
        }];
        store.commit(node, POINT, &good).unwrap();
        assert_eq!(store.load(node, POINT).unwrap().get("core.vpn.server").len(), 2);
        assert!(logs_contain("Committed 1 mutation(s)"));
    }

    #[test]
    fn failed_commit_stores_nothing() {
        let store = MemoryStore::new();
        let node = NodeId::from_u128(3);
        let assign = Mutation::Assign {
            path: "core.general".to_owned(),
            index: 0,
            fields: Fields::new(),
        };
        assert!(matches!(
            store.commit(node, POINT, &[assign]),
            Err(RegistryError::NoSuchEntry { .. })
        ));
        assert!(store.is_empty());
        assert!(store.load(node, POINT).unwrap().is_empty());
    }

    #[test]
    fn concurrent_commits() {
        let store = Arc::new(MemoryStore::new());
        let node = NodeId::from_u128(7);
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let store = store.clone();
                std::thread::spawn(move || {
                    let append = Mutation::Append {
                        path: "core.vpn.server".to_owned(),
                        item: RegistryItem::new("VpnServerConfig").with("port", n),
                    };
                    store.commit(node, POINT, &[append]).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.load(node, POINT).unwrap().get("core.vpn.server").len(), 8);
        assert_eq!(store.len(), 1);
    }
}
