mod capability;
mod dispatch;
mod registry;

pub use capability::{Capabilities, Capability};
pub use dispatch::{DeferredDispatch, Dispatch};
pub use registry::{ObserverEntry, ObserverRegistry};

use uplink_shared::{
    CommandMessage, EventMessage, LinkRequest, LinkedResponse, SyncRequest, SyncedResponse,
    UnlinkRequest, UnlinkedResponse,
};

use crate::ObserverError;

/// Application callbacks attached to an uplink session.
///
/// An observer advertises which callbacks it implements through
/// [`capabilities`](UplinkObserver::capabilities); the session never calls a
/// callback outside of that set. Callbacks listed in
/// [`preemptive`](UplinkObserver::preemptive) promise not to block and run
/// inline on whichever thread triggered them. Every other callback is
/// deferred to the session's `WorkerStage`.
///
/// Returning an error is reported to the lane and does not stop sibling
/// observers. A panic is treated as fatal and is never caught.
pub trait UplinkObserver: Send + Sync {
    fn capabilities(&self) -> Capabilities;

    fn preemptive(&self) -> Capabilities {
        Capabilities::all()
    }

    fn on_event(&self, _event: &EventMessage) -> Result<(), ObserverError> {
        Ok(())
    }

    fn on_command(&self, _command: &CommandMessage) -> Result<(), ObserverError> {
        Ok(())
    }

    fn on_link(&self, _request: &LinkRequest) -> Result<(), ObserverError> {
        Ok(())
    }

    fn on_linked(&self, _response: &LinkedResponse) -> Result<(), ObserverError> {
        Ok(())
    }

    fn on_sync(&self, _request: &SyncRequest) -> Result<(), ObserverError> {
        Ok(())
    }

    fn on_synced(&self, _response: &SyncedResponse) -> Result<(), ObserverError> {
        Ok(())
    }

    fn on_unlink(&self, _request: &UnlinkRequest) -> Result<(), ObserverError> {
        Ok(())
    }

    fn on_unlinked(&self, _response: &UnlinkedResponse) -> Result<(), ObserverError> {
        Ok(())
    }

    fn on_close(&self) -> Result<(), ObserverError> {
        Ok(())
    }
}
