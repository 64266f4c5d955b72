use std::sync::{Arc, Mutex};

use uplink_server::{
    Capabilities, Capability, CommandMessage, EventMessage, LinkRequest, LinkedResponse,
    ObserverError, SyncRequest, SyncedResponse, UnlinkRequest, UnlinkedResponse, UplinkObserver,
};

/// Observer that records which callbacks ran, in order
pub struct CountingObserver {
    capabilities: Capabilities,
    preemptive: Capabilities,
    fail: bool,
    calls: Mutex<Vec<Capability>>,
}

impl CountingObserver {
    /// Every callback in `capabilities` runs inline
    pub fn new(capabilities: &[Capability]) -> Arc<Self> {
        Self::build(capabilities, Capabilities::all(), false)
    }

    /// Every callback in `capabilities` is deferred to the worker stage
    pub fn deferred(capabilities: &[Capability]) -> Arc<Self> {
        Self::build(capabilities, Capabilities::NONE, false)
    }

    /// Runs inline and rejects every callback
    pub fn failing(capabilities: &[Capability]) -> Arc<Self> {
        Self::build(capabilities, Capabilities::all(), true)
    }

    fn build(capabilities: &[Capability], preemptive: Capabilities, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            capabilities: Capabilities::of(capabilities),
            preemptive,
            fail,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn count(&self, capability: Capability) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| **call == capability)
            .count()
    }

    pub fn calls(&self) -> Vec<Capability> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, capability: Capability) -> Result<(), ObserverError> {
        self.calls.lock().unwrap().push(capability);
        if self.fail {
            return Err(ObserverError::rejected(capability, "refused"));
        }
        Ok(())
    }
}

impl UplinkObserver for CountingObserver {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn preemptive(&self) -> Capabilities {
        self.preemptive
    }

    fn on_event(&self, _event: &EventMessage) -> Result<(), ObserverError> {
        self.record(Capability::OnEvent)
    }

    fn on_command(&self, _command: &CommandMessage) -> Result<(), ObserverError> {
        self.record(Capability::OnCommand)
    }

    fn on_link(&self, _request: &LinkRequest) -> Result<(), ObserverError> {
        self.record(Capability::OnLink)
    }

    fn on_linked(&self, _response: &LinkedResponse) -> Result<(), ObserverError> {
        self.record(Capability::OnLinked)
    }

    fn on_sync(&self, _request: &SyncRequest) -> Result<(), ObserverError> {
        self.record(Capability::OnSync)
    }

    fn on_synced(&self, _response: &SyncedResponse) -> Result<(), ObserverError> {
        self.record(Capability::OnSynced)
    }

    fn on_unlink(&self, _request: &UnlinkRequest) -> Result<(), ObserverError> {
        self.record(Capability::OnUnlink)
    }

    fn on_unlinked(&self, _response: &UnlinkedResponse) -> Result<(), ObserverError> {
        self.record(Capability::OnUnlinked)
    }

    fn on_close(&self) -> Result<(), ObserverError> {
        self.record(Capability::OnClose)
    }
}
