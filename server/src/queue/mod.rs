mod event_queue;
mod ordered_delta_queue;
mod partial_key_queue;

pub use event_queue::EventQueue;
pub use ordered_delta_queue::OrderedDeltaQueue;
pub use partial_key_queue::PartialKeyQueue;

use uplink_shared::Value;

/// Buffering discipline for events bound to the subscriber.
///
/// Producers may append concurrently; the session drains from at most one
/// `pull_down` at a time. Draining an empty queue is the normal "no work"
/// case, not an error.
pub trait OutboundQueue: Send + Sync {
    /// Pops the next materialized event body
    fn dequeue(&self) -> Option<Value>;

    /// Materializes one cued item, once `dequeue` has nothing left
    fn next_cued(&self) -> Option<Value> {
        None
    }

    /// Materialized events remain
    fn has_queued(&self) -> bool;

    /// Cued items remain that `next_cued` has yet to materialize
    fn has_cued(&self) -> bool {
        false
    }

    /// Called before the session asserts `Syncing` for a sync request
    fn will_sync(&self) {}
}
