use thiserror::Error;

use crate::observer::Capability;

/// Recoverable failure raised by an application callback
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObserverError {
    /// The callback could not complete its work
    #[error("Observer failed: {reason}")]
    Failed { reason: String },

    /// The callback refused the message it was handed
    #[error("Observer rejected {capability}: {reason}")]
    Rejected {
        capability: &'static str,
        reason: String,
    },
}

impl ObserverError {
    pub fn failed(reason: impl Into<String>) -> Self {
        ObserverError::Failed {
            reason: reason.into(),
        }
    }

    pub fn rejected(capability: Capability, reason: impl Into<String>) -> Self {
        ObserverError::Rejected {
            capability: capability.name(),
            reason: reason.into(),
        }
    }
}

/// Failures an uplink session reports to its lane through `did_fail`
#[derive(Debug, Clone, Error)]
pub enum UplinkError {
    /// An observer callback returned an error; sibling observers still ran
    #[error("{} observer failed: {source}", .capability.name())]
    Observer {
        capability: Capability,
        #[source]
        source: ObserverError,
    },

    /// The transport was dropped while the session still referenced it
    #[error("Transport was dropped before the uplink session closed")]
    TransportGone,

    /// An operation was attempted after the session began unlinking
    #[error("Cannot {operation}: the uplink session is unlinking or closed")]
    Closed { operation: &'static str },
}
