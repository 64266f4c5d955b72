use uplink_shared::ListDelta;

use crate::{queue::OrderedDeltaQueue, UplinkError, UplinkSession};

/// Uplink to a list lane
pub type ListUplink = UplinkSession<OrderedDeltaQueue>;

impl UplinkSession<OrderedDeltaQueue> {
    /// Queues a list mutation, delivered in the order it was sent
    pub fn send_delta(&self, delta: ListDelta) -> Result<(), UplinkError> {
        self.ensure_open("send delta")?;
        self.queue().enqueue(delta);
        self.feed_down();
        Ok(())
    }
}
