//! Registry: network key → device set.
//!
//! DashMap shards the map, so announcers on different networks never
//! contend. Each set carries its own lock for the instances inside it.
//!
//! Lock order is always map shard, then set. Nothing holds a set lock while
//! reaching for the map, which keeps `remove` (shard write, then set write)
//! deadlock-free against announcers and the sweeper.

use std::sync::Arc;

use beacon_core::NetworkKey;
use dashmap::DashMap;

use crate::device_set::{DeviceSet, Upsert};
use crate::instance::Instance;

/// Shared between the API handlers and the sweeper. Cloning is cheap.
#[derive(Clone, Default)]
pub struct Registry {
    sets: Arc<DashMap<NetworkKey, Arc<DeviceSet>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            sets: Arc::new(DashMap::new()),
        }
    }

    /// The set for `key`, inserting an empty one if none exists.
    ///
    /// Insert-if-absent runs under the shard lock, so concurrent first
    /// announcements for one key all receive the same set.
    pub fn get_or_create(&self, key: NetworkKey) -> Arc<DeviceSet> {
        Arc::clone(self.sets.entry(key).or_default().value())
    }

    pub fn get(&self, key: &NetworkKey) -> Option<Arc<DeviceSet>> {
        self.sets.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Upsert `instance` into the set for `key`.
    ///
    /// If the sweeper unlinks the set between lookup and upsert, the set
    /// refuses the write and the lookup is repeated, landing on a fresh set.
    pub fn announce(&self, key: NetworkKey, instance: Instance) -> Upsert {
        let mut instance = instance;
        loop {
            match self.get_or_create(key).upsert(instance) {
                Ok(outcome) => return outcome,
                Err(returned) => {
                    tracing::trace!(%key, "device set retired during announce, retrying");
                    instance = returned;
                }
            }
        }
    }

    /// Snapshot of the instances announced under `key`; empty if none.
    pub fn list(&self, key: &NetworkKey) -> Vec<Instance> {
        self.get(key)
            .map(|set| set.snapshot())
            .unwrap_or_default()
    }

    /// Visit every (key, set) pair present when the call starts.
    ///
    /// The pairs are collected up front, so `f` runs without any map lock
    /// held and may call back into the registry.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&NetworkKey, &Arc<DeviceSet>),
    {
        let entries: Vec<(NetworkKey, Arc<DeviceSet>)> = self
            .sets
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();
        for (key, set) in &entries {
            f(key, set);
        }
    }

    /// Unlink `key` if it still maps to `expected` and that set is empty.
    ///
    /// The emptiness check runs under both the shard lock and the set's
    /// exclusive lock, and retires the set in the same step. An announcer
    /// racing this call either lands in the set before the check (and the
    /// set stays) or is refused by the retired set and creates a new one.
    pub fn remove(&self, key: &NetworkKey, expected: &Arc<DeviceSet>) -> bool {
        self.sets
            .remove_if(key, |_, current| {
                Arc::ptr_eq(current, expected) && current.retire_if_empty()
            })
            .is_some()
    }

    pub fn keys(&self) -> Vec<NetworkKey> {
        self.sets.iter().map(|entry| *entry.key()).collect()
    }

    /// Number of networks with at least one announcement.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Total instances across all networks.
    pub fn instance_count(&self) -> usize {
        self.sets.iter().map(|entry| entry.value().len()).sum()
    }
}
