//! Device sets: every instance announced under one network key.
//!
//! Writers (`upsert`, `purge_expired`) take the lock exclusively; readers
//! (`snapshot`) share it. Critical sections never leave the sequence half
//! updated, so a poisoned lock is recovered rather than propagated.
//!
//! A set is *retired* by the registry at the moment it is unlinked for being
//! empty. Upserts into a retired set are refused and handed back, so the
//! caller can retry against whatever set is now addressable for the key.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use crate::instance::Instance;

/// Outcome of a successful upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// The url was new to this set.
    Inserted,
    /// An instance with the same url was replaced.
    Replaced,
}

/// Outcome of a purge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Purged {
    pub removed: usize,
    pub remaining: usize,
}

impl Purged {
    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }
}

#[derive(Debug, Default)]
struct Members {
    /// Insertion order. Urls are unique.
    instances: Vec<Instance>,
    retired: bool,
}

#[derive(Debug, Default)]
pub struct DeviceSet {
    members: RwLock<Members>,
}

impl DeviceSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Members> {
        self.members.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Members> {
        self.members.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Insert `instance`, replacing any instance with the same url.
    ///
    /// The new record goes to the end of the sequence. Its timestamp is
    /// never allowed to fall behind the record it replaces.
    ///
    /// Returns `Err(instance)` if this set has been retired.
    pub fn upsert(&self, instance: Instance) -> Result<Upsert, Instance> {
        let mut members = self.write();
        if members.retired {
            return Err(instance);
        }

        let mut instance = instance;
        let mut outcome = Upsert::Inserted;
        if let Some(pos) = members
            .instances
            .iter()
            .position(|existing| existing.url() == instance.url())
        {
            let previous = members.instances.remove(pos);
            instance = instance.not_earlier_than(previous.registered_at());
            outcome = Upsert::Replaced;
        }
        members.instances.push(instance);
        Ok(outcome)
    }

    /// Copy of the current sequence, safe to serialize without the lock.
    pub fn snapshot(&self) -> Vec<Instance> {
        self.read().instances.clone()
    }

    /// Drop every instance at least `lifetime` old as of `now`.
    pub fn purge_expired(&self, now: Instant, lifetime: Duration) -> Purged {
        let mut members = self.write();
        let before = members.instances.len();
        members
            .instances
            .retain(|instance| !instance.is_expired(now, lifetime));
        let remaining = members.instances.len();
        Purged {
            removed: before - remaining,
            remaining,
        }
    }

    /// Retire the set if it holds no instances. Returns whether it is retired.
    ///
    /// Called by the registry while the map entry is locked, so the empty
    /// check and the unlink happen atomically with respect to announcers.
    pub(crate) fn retire_if_empty(&self) -> bool {
        let mut members = self.write();
        if members.instances.is_empty() {
            members.retired = true;
        }
        members.retired
    }

    pub fn is_retired(&self) -> bool {
        self.read().retired
    }

    pub fn len(&self) -> usize {
        self.read().instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().instances.is_empty()
    }
}
