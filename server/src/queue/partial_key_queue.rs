use std::{
    collections::BTreeSet,
    ops::Bound::{Excluded, Unbounded},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    vec::IntoIter,
};

use arc_swap::ArcSwap;

use uplink_shared::Value;

use super::OutboundQueue;
use crate::KeyedSource;

// DirtyKeys
#[derive(Clone, Default)]
struct DirtyKeys {
    keys: BTreeSet<Value>,
    /// The last key drained, so repeated drains walk the set fairly
    last: Option<Value>,
}

impl DirtyKeys {
    fn next_key(&self) -> Option<&Value> {
        let after_last = self
            .last
            .as_ref()
            .and_then(|last| self.keys.range((Excluded(last), Unbounded)).next());
        after_last.or_else(|| self.keys.iter().next())
    }
}

/// Snapshot-then-incremental delivery for map lanes.
///
/// A sync installs a one-shot iterator over a snapshot of the lane; while it
/// lasts it takes priority over the dirty-key set. Keys cued afterwards are
/// collected into the set, which is replaced wholesale on every change so
/// readers never block writers. Each drained key is re-read from the lane,
/// so a key cued many times between drains yields a single event carrying
/// its latest value.
pub struct PartialKeyQueue {
    source: Arc<dyn KeyedSource>,
    sync: Mutex<Option<IntoIter<(Value, Value)>>>,
    dirty: ArcSwap<DirtyKeys>,
}

impl PartialKeyQueue {
    pub fn new(source: Arc<dyn KeyedSource>) -> Self {
        Self {
            source,
            sync: Mutex::new(None),
            dirty: ArcSwap::from_pointee(DirtyKeys::default()),
        }
    }

    /// Marks `key` for incremental delivery.
    ///
    /// Returns `true` when the dirty set was empty before, i.e. when the
    /// caller must cue the session.
    pub fn cue_key(&self, key: Value) -> bool {
        let previous = self.dirty.rcu(|dirty| {
            let mut next = DirtyKeys::clone(dirty);
            next.keys.insert(key.clone());
            next
        });
        previous.keys.is_empty()
    }

    /// Installs a full snapshot cursor, dropping dirty keys it already covers
    pub fn begin_sync(&self, snapshot: Vec<(Value, Value)>) {
        {
            let covered: BTreeSet<&Value> = snapshot.iter().map(|(key, _)| key).collect();
            self.dirty.rcu(|dirty| {
                let mut next = DirtyKeys::clone(dirty);
                next.keys.retain(|key| !covered.contains(key));
                next
            });
        }
        *self.sync_lock() = Some(snapshot.into_iter());
    }

    pub fn is_syncing(&self) -> bool {
        self.sync_lock()
            .as_ref()
            .is_some_and(|entries| entries.len() > 0)
    }

    pub fn dirty_len(&self) -> usize {
        self.dirty.load().keys.len()
    }

    fn sync_lock(&self) -> MutexGuard<'_, Option<IntoIter<(Value, Value)>>> {
        self.sync.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_synced(&self) -> Option<Value> {
        let mut sync = self.sync_lock();
        let entry = sync.as_mut().and_then(Iterator::next);
        if entry.is_none() {
            *sync = None;
        }
        entry.map(|(key, value)| update_event(key, value))
    }

    fn next_dirty_key(&self) -> Option<Value> {
        if self.dirty.load().keys.is_empty() {
            return None;
        }
        let mut taken = None;
        self.dirty.rcu(|dirty| {
            let mut next = DirtyKeys::clone(dirty);
            taken = dirty.next_key().cloned();
            if let Some(key) = &taken {
                next.keys.remove(key);
                next.last = Some(key.clone());
            }
            next
        });
        taken
    }

    fn next_dirty(&self) -> Option<Value> {
        let key = self.next_dirty_key()?;
        Some(match self.source.get(&key) {
            Some(value) => update_event(key, value),
            None => remove_event(key),
        })
    }
}

impl OutboundQueue for PartialKeyQueue {
    fn dequeue(&self) -> Option<Value> {
        self.next_synced().or_else(|| self.next_dirty())
    }

    fn next_cued(&self) -> Option<Value> {
        self.next_dirty()
    }

    fn has_queued(&self) -> bool {
        self.is_syncing()
    }

    fn has_cued(&self) -> bool {
        !self.dirty.load().keys.is_empty()
    }

    fn will_sync(&self) {
        self.begin_sync(self.source.snapshot());
    }
}

fn update_event(key: Value, value: Value) -> Value {
    Value::tagged("update", vec![("key".to_string(), key)], value)
}

fn remove_event(key: Value) -> Value {
    Value::tagged("remove", vec![("key".to_string(), key)], Value::Absent)
}
