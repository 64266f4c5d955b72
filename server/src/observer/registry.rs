use std::sync::Arc;

use smallvec::SmallVec;

use crate::{
    observer::{
        dispatch::{invoke, DeferredDispatch},
        Capabilities, Capability, Dispatch,
    },
    ObserverError, UplinkError, UplinkObserver,
};

// ObserverEntry
#[derive(Clone)]
pub struct ObserverEntry {
    observer: Arc<dyn UplinkObserver>,
    capabilities: Capabilities,
    preemptive: Capabilities,
}

impl ObserverEntry {
    fn new(observer: Arc<dyn UplinkObserver>) -> Self {
        let capabilities = observer.capabilities();
        let preemptive = observer.preemptive().intersect(capabilities);
        Self {
            observer,
            capabilities,
            preemptive,
        }
    }

    pub fn observer(&self) -> &Arc<dyn UplinkObserver> {
        &self.observer
    }

    pub fn implements(&self, capability: Capability) -> bool {
        self.capabilities.contains(capability)
    }

    pub fn is_preemptive(&self, capability: Capability) -> bool {
        self.preemptive.contains(capability)
    }

    fn is(&self, observer: &Arc<dyn UplinkObserver>) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.observer), Arc::as_ptr(observer))
    }
}

/// Observers attached to one session, keyed by identity.
///
/// A registry is an immutable value: `observe` and `unobserve` return a new
/// registry, which the session swaps in atomically. Capabilities and
/// preemptiveness are read once at registration.
#[derive(Clone, Default)]
pub struct ObserverRegistry {
    entries: SmallVec<[ObserverEntry; 1]>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, observer: &Arc<dyn UplinkObserver>) -> bool {
        self.entries.iter().any(|entry| entry.is(observer))
    }

    pub fn entries(&self) -> impl Iterator<Item = &ObserverEntry> {
        self.entries.iter()
    }

    /// Returns a registry that includes `observer`; registering twice is a no-op
    pub fn observe(&self, observer: Arc<dyn UplinkObserver>) -> Self {
        if self.contains(&observer) {
            return self.clone();
        }
        let mut entries = self.entries.clone();
        entries.push(ObserverEntry::new(observer));
        Self { entries }
    }

    /// Returns a registry without `observer`; unchanged if it was never registered
    pub fn unobserve(&self, observer: &Arc<dyn UplinkObserver>) -> Self {
        if !self.contains(observer) {
            return self.clone();
        }
        let entries = self
            .entries
            .iter()
            .filter(|entry| !entry.is(observer))
            .cloned()
            .collect();
        Self { entries }
    }

    /// Two-phase dispatch of `capability`.
    ///
    /// Preemptive observers run inline, in registration order. Observers that
    /// must not run on the calling thread are collected into a single
    /// [`DeferredDispatch`]. Each failure is handed to `report` and does not
    /// stop the remaining observers.
    pub fn dispatch<F, R>(&self, capability: Capability, call: F, report: R) -> Dispatch
    where
        F: Fn(&dyn UplinkObserver) -> Result<(), ObserverError> + Send + 'static,
        R: Fn(UplinkError) + Send + 'static,
    {
        let mut deferred: SmallVec<[Arc<dyn UplinkObserver>; 1]> = SmallVec::new();
        for entry in self.entries.iter().filter(|entry| entry.implements(capability)) {
            if entry.is_preemptive(capability) {
                invoke(capability, entry.observer.as_ref(), &call, &report);
            } else {
                deferred.push(entry.observer.clone());
            }
        }

        if deferred.is_empty() {
            Dispatch::Complete
        } else {
            Dispatch::Deferred(DeferredDispatch::new(
                capability,
                deferred,
                Box::new(call),
                Box::new(report),
            ))
        }
    }

    /// Runs every observer implementing `capability` on the calling thread.
    ///
    /// Only for callers already running on a worker stage.
    pub fn dispatch_inline<F, R>(&self, capability: Capability, call: F, report: R)
    where
        F: Fn(&dyn UplinkObserver) -> Result<(), ObserverError>,
        R: Fn(UplinkError),
    {
        for entry in self.entries.iter().filter(|entry| entry.implements(capability)) {
            invoke(capability, entry.observer.as_ref(), &call, &report);
        }
    }
}
