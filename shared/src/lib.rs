//! # Uplink Shared
//! Envelope, value & session-status types shared between an uplink session
//! and the transport and lane it sits between.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod envelope;
mod identity;
mod list_delta;
mod status;
mod value;

pub use envelope::{
    CommandMessage, Envelope, EnvelopeKind, EventMessage, LaneAddress, LinkRequest,
    LinkedResponse, SyncRequest, SyncedResponse, UnlinkRequest, UnlinkedResponse,
};
pub use identity::SessionId;
pub use list_delta::ListDelta;
pub use status::{AtomicStatus, Facet, SessionStatus, StatusError};
pub use value::Value;
