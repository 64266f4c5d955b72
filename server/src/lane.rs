use log::{debug, error, info, trace, warn};

use uplink_shared::{CommandMessage, SessionId, Value};

use crate::UplinkError;

const LANE_TARGET: &str = "uplink::lane";

/// The shared lane a session subscribes its peer to
pub trait UplinkLane: Send + Sync {
    /// Forwards a parsed command from the peer
    fn push_up_command(&self, command: &CommandMessage);

    /// Removes the session from the lane
    fn close_uplink(&self, identity: SessionId);

    fn did_fail(&self, error: UplinkError) {
        error!(target: LANE_TARGET, "{}", error);
    }

    // Logging sinks

    fn trace(&self, message: &str) {
        trace!(target: LANE_TARGET, "{}", message);
    }

    fn debug(&self, message: &str) {
        debug!(target: LANE_TARGET, "{}", message);
    }

    fn info(&self, message: &str) {
        info!(target: LANE_TARGET, "{}", message);
    }

    fn warn(&self, message: &str) {
        warn!(target: LANE_TARGET, "{}", message);
    }

    fn error(&self, message: &str) {
        error!(target: LANE_TARGET, "{}", message);
    }
}

/// Key-addressed view of a map lane, read by a `PartialKeyQueue`
pub trait KeyedSource: Send + Sync {
    /// A point-in-time copy of every entry, in key order
    fn snapshot(&self) -> Vec<(Value, Value)>;

    /// The current value of `key`, or `None` if it has been removed
    fn get(&self, key: &Value) -> Option<Value>;
}
