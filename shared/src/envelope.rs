use std::fmt;

use crate::Value;

// LaneAddress
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LaneAddress {
    pub node: String,
    pub lane: String,
}

impl LaneAddress {
    pub fn new(node: impl Into<String>, lane: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            lane: lane.into(),
        }
    }
}

impl fmt::Display for LaneAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.node, self.lane)
    }
}

// Inbound

/// Application command addressed to a lane
#[derive(Clone, Debug, PartialEq)]
pub struct CommandMessage {
    pub address: LaneAddress,
    pub body: Value,
}

impl CommandMessage {
    pub fn new(address: LaneAddress, body: Value) -> Self {
        Self { address, body }
    }
}

/// Subscribe to a lane's events
#[derive(Clone, Debug, PartialEq)]
pub struct LinkRequest {
    pub address: LaneAddress,
    pub prio: f32,
    pub rate: f32,
    pub body: Value,
}

impl LinkRequest {
    pub fn new(address: LaneAddress, prio: f32, rate: f32, body: Value) -> Self {
        Self {
            address,
            prio,
            rate,
            body,
        }
    }
}

/// Subscribe to a lane's events, starting with a snapshot of its state
#[derive(Clone, Debug, PartialEq)]
pub struct SyncRequest {
    pub address: LaneAddress,
    pub prio: f32,
    pub rate: f32,
    pub body: Value,
}

impl SyncRequest {
    pub fn new(address: LaneAddress, prio: f32, rate: f32, body: Value) -> Self {
        Self {
            address,
            prio,
            rate,
            body,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnlinkRequest {
    pub address: LaneAddress,
    pub body: Value,
}

impl UnlinkRequest {
    pub fn new(address: LaneAddress, body: Value) -> Self {
        Self { address, body }
    }
}

// Outbound

#[derive(Clone, Debug, PartialEq)]
pub struct LinkedResponse {
    pub address: LaneAddress,
    pub prio: f32,
    pub rate: f32,
    pub body: Value,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SyncedResponse {
    pub address: LaneAddress,
    pub body: Value,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnlinkedResponse {
    pub address: LaneAddress,
    pub body: Value,
}

/// Lane event delivered to the subscriber
#[derive(Clone, Debug, PartialEq)]
pub struct EventMessage {
    pub address: LaneAddress,
    pub body: Value,
}

impl EventMessage {
    pub fn new(address: LaneAddress, body: Value) -> Self {
        Self { address, body }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnvelopeKind {
    Command,
    LinkRequest,
    SyncRequest,
    UnlinkRequest,
    Linked,
    Synced,
    Unlinked,
    Event,
    Auth,
    Deauth,
}

impl EnvelopeKind {
    /// Whether envelopes of this kind travel from the peer toward the lane
    pub fn is_inbound(self) -> bool {
        matches!(
            self,
            EnvelopeKind::Command
                | EnvelopeKind::LinkRequest
                | EnvelopeKind::SyncRequest
                | EnvelopeKind::UnlinkRequest
                | EnvelopeKind::Auth
                | EnvelopeKind::Deauth
        )
    }
}

/// Every message exchanged between an uplink session and its peer
#[derive(Clone, Debug, PartialEq)]
pub enum Envelope {
    Command(CommandMessage),
    LinkRequest(LinkRequest),
    SyncRequest(SyncRequest),
    UnlinkRequest(UnlinkRequest),
    Linked(LinkedResponse),
    Synced(SyncedResponse),
    Unlinked(UnlinkedResponse),
    Event(EventMessage),
    /// Connection-level credentials; carried by the transport, never acted on by a session
    Auth(Value),
    Deauth(Value),
}

impl Envelope {
    pub fn kind(&self) -> EnvelopeKind {
        match self {
            Envelope::Command(_) => EnvelopeKind::Command,
            Envelope::LinkRequest(_) => EnvelopeKind::LinkRequest,
            Envelope::SyncRequest(_) => EnvelopeKind::SyncRequest,
            Envelope::UnlinkRequest(_) => EnvelopeKind::UnlinkRequest,
            Envelope::Linked(_) => EnvelopeKind::Linked,
            Envelope::Synced(_) => EnvelopeKind::Synced,
            Envelope::Unlinked(_) => EnvelopeKind::Unlinked,
            Envelope::Event(_) => EnvelopeKind::Event,
            Envelope::Auth(_) => EnvelopeKind::Auth,
            Envelope::Deauth(_) => EnvelopeKind::Deauth,
        }
    }

    /// The lane this envelope targets; connection-level kinds have none
    pub fn address(&self) -> Option<&LaneAddress> {
        match self {
            Envelope::Command(message) => Some(&message.address),
            Envelope::LinkRequest(request) => Some(&request.address),
            Envelope::SyncRequest(request) => Some(&request.address),
            Envelope::UnlinkRequest(request) => Some(&request.address),
            Envelope::Linked(response) => Some(&response.address),
            Envelope::Synced(response) => Some(&response.address),
            Envelope::Unlinked(response) => Some(&response.address),
            Envelope::Event(message) => Some(&message.address),
            Envelope::Auth(_) | Envelope::Deauth(_) => None,
        }
    }

    pub fn body(&self) -> &Value {
        match self {
            Envelope::Command(message) => &message.body,
            Envelope::LinkRequest(request) => &request.body,
            Envelope::SyncRequest(request) => &request.body,
            Envelope::UnlinkRequest(request) => &request.body,
            Envelope::Linked(response) => &response.body,
            Envelope::Synced(response) => &response.body,
            Envelope::Unlinked(response) => &response.body,
            Envelope::Event(message) => &message.body,
            Envelope::Auth(body) | Envelope::Deauth(body) => body,
        }
    }
}
