//! Latest committed snapshot per entity.
//!
//! The store is the only shared mutable state of the engine. Every write is a
//! compare-and-swap on the snapshot version, performed while holding the
//! entry's shard lock, so a late response can never roll visible state back.
//! Consumers observe changes through a `watch` channel per entity.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use crate::workflow::entity::WorkflowEntity;
use crate::workflow::types::EntityKey;

/// Latest snapshot as seen by subscribers; `None` once the entry is released.
pub type SnapshotReceiver = watch::Receiver<Option<Arc<WorkflowEntity>>>;

/// Result of a versioned write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    /// The snapshot is now current.
    Applied,
    /// The store already holds this or a newer version.
    Stale {
        /// Version currently held.
        current_version: u64,
    },
    /// No consumer holds the entity any more; nothing was written.
    Detached,
}

struct StoreEntry {
    snapshot: Arc<WorkflowEntity>,
    sender: watch::Sender<Option<Arc<WorkflowEntity>>>,
}

impl StoreEntry {
    fn new(snapshot: Arc<WorkflowEntity>) -> Self {
        let (sender, _) = watch::channel(Some(Arc::clone(&snapshot)));
        Self { snapshot, sender }
    }

    fn swap(&mut self, snapshot: Arc<WorkflowEntity>) -> ReplaceOutcome {
        if snapshot.version <= self.snapshot.version {
            return ReplaceOutcome::Stale {
                current_version: self.snapshot.version,
            };
        }
        self.snapshot = Arc::clone(&snapshot);
        self.sender.send_replace(Some(snapshot));
        ReplaceOutcome::Applied
    }
}

/// Concurrent map from entity key to its latest snapshot.
#[derive(Default)]
pub struct EntityStore {
    entries: DashMap<EntityKey, StoreEntry>,
}

impl EntityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds or refreshes an entity from a fetched snapshot.
    ///
    /// Inserts when the entity is not held; otherwise behaves like
    /// [`replace`](Self::replace).
    pub fn load(&self, snapshot: WorkflowEntity) -> ReplaceOutcome {
        let snapshot = Arc::new(snapshot);
        match self.entries.entry(snapshot.key.clone()) {
            Entry::Vacant(vacant) => {
                vacant.insert(StoreEntry::new(snapshot));
                ReplaceOutcome::Applied
            }
            Entry::Occupied(mut occupied) => occupied.get_mut().swap(snapshot),
        }
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn get(&self, key: &EntityKey) -> Option<Arc<WorkflowEntity>> {
        self.entries
            .get(key)
            .map(|entry| Arc::clone(&entry.snapshot))
    }

    /// Replaces the snapshot if `snapshot.version` is newer than the held one.
    pub fn replace(&self, snapshot: Arc<WorkflowEntity>) -> ReplaceOutcome {
        let Some(mut entry) = self.entries.get_mut(&snapshot.key) else {
            debug!(entity = %snapshot.key, "Dropping snapshot for released entity");
            return ReplaceOutcome::Detached;
        };
        let outcome = entry.swap(snapshot);
        if let ReplaceOutcome::Stale { current_version } = outcome {
            debug!(entity = %entry.snapshot.key, current_version, "Ignoring stale snapshot");
        }
        outcome
    }

    /// Drops the entity, e.g. when its view is torn down or it was deleted.
    ///
    /// Subscribers observe `None`.
    pub fn release(&self, key: &EntityKey) -> Option<Arc<WorkflowEntity>> {
        let (_, entry) = self.entries.remove(key)?;
        entry.sender.send_replace(None);
        Some(entry.snapshot)
    }

    /// Subscribes to snapshot changes of a held entity.
    #[must_use]
    pub fn subscribe(&self, key: &EntityKey) -> Option<SnapshotReceiver> {
        self.entries.get(key).map(|entry| entry.sender.subscribe())
    }

    /// Returns true if the entity is held.
    #[must_use]
    pub fn contains(&self, key: &EntityKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of held entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entity is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
