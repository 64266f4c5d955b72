use std::sync::Arc;

use smallvec::SmallVec;

use crate::{observer::Capability, ObserverError, UplinkError, UplinkObserver, WorkerStage};

pub(crate) type ObserverCall =
    Box<dyn Fn(&dyn UplinkObserver) -> Result<(), ObserverError> + Send + 'static>;
pub(crate) type FailureReport = Box<dyn Fn(UplinkError) + Send + 'static>;

/// Outcome of the inline phase of an observer dispatch.
///
/// Anything that must not happen before every observer has run is passed
/// as the continuation of [`Dispatch::then`], which runs it inline when the
/// dispatch is already complete and behind the deferred observers otherwise.
#[must_use = "a deferred dispatch only runs once it is scheduled with `then` or `detach`"]
pub enum Dispatch {
    /// Every observer implementing the capability has run
    Complete,
    /// Non-preemptive observers remain to be run on a worker stage
    Deferred(DeferredDispatch),
}

impl Dispatch {
    pub fn is_complete(&self) -> bool {
        matches!(self, Dispatch::Complete)
    }

    /// Runs `continuation` once every observer has been called
    pub fn then<C>(self, stage: &dyn WorkerStage, continuation: C)
    where
        C: FnOnce() + Send + 'static,
    {
        match self {
            Dispatch::Complete => continuation(),
            Dispatch::Deferred(deferred) => stage.execute(Box::new(move || {
                deferred.run();
                continuation();
            })),
        }
    }

    /// Schedules any remaining observers with nothing waiting on them
    pub fn detach(self, stage: &dyn WorkerStage) {
        self.then(stage, || {});
    }
}

/// The non-preemptive remainder of a dispatch
pub struct DeferredDispatch {
    capability: Capability,
    observers: SmallVec<[Arc<dyn UplinkObserver>; 1]>,
    call: ObserverCall,
    report: FailureReport,
}

impl DeferredDispatch {
    pub(crate) fn new(
        capability: Capability,
        observers: SmallVec<[Arc<dyn UplinkObserver>; 1]>,
        call: ObserverCall,
        report: FailureReport,
    ) -> Self {
        Self {
            capability,
            observers,
            call,
            report,
        }
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Calls each remaining observer in registration order
    pub fn run(self) {
        for observer in &self.observers {
            invoke(self.capability, observer.as_ref(), &self.call, &self.report);
        }
    }
}

pub(crate) fn invoke<F, R>(capability: Capability, observer: &dyn UplinkObserver, call: &F, report: &R)
where
    F: Fn(&dyn UplinkObserver) -> Result<(), ObserverError> + ?Sized,
    R: Fn(UplinkError) + ?Sized,
{
    if let Err(source) = call(observer) {
        report(UplinkError::Observer { capability, source });
    }
}
