//! # Uplink Server
//! The server side of a lane subscription: a lock-free session state machine
//! that sits between a multiplexing transport and a shared lane, delivering
//! handshake acknowledgements and lane events to one subscriber under
//! credit-based flow control.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

#[macro_use]
extern crate cfg_if;

pub mod observer;
pub mod queue;
pub mod stage;

mod config;
mod error;
mod lane;
mod session;
mod transport;

pub use config::UplinkConfig;
pub use error::{ObserverError, UplinkError};
pub use lane::{KeyedSource, UplinkLane};
pub use observer::{Capabilities, Capability, Dispatch, ObserverRegistry, UplinkObserver};
pub use queue::{EventQueue, OrderedDeltaQueue, OutboundQueue, PartialKeyQueue};
pub use session::{EventUplink, ListUplink, MapUplink, UplinkSession};
pub use stage::{Task, WorkerStage};
pub use transport::{ConnectionInfo, UplinkTransport};

pub use uplink_shared::{
    CommandMessage, Envelope, EnvelopeKind, EventMessage, LaneAddress, LinkRequest,
    LinkedResponse, ListDelta, SessionId, SessionStatus, SyncRequest, SyncedResponse,
    UnlinkRequest, UnlinkedResponse, Value,
};

cfg_if! {
    if #[cfg(feature = "tokio_stage")] {
        pub use stage::TokioStage;
    }
}
