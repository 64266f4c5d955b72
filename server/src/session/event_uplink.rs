use uplink_shared::Value;

use crate::{queue::EventQueue, UplinkError, UplinkSession};

/// Uplink to a value or event lane
pub type EventUplink = UplinkSession<EventQueue>;

impl UplinkSession<EventQueue> {
    /// Queues `body` for delivery as the next event
    pub fn send_down(&self, body: Value) -> Result<(), UplinkError> {
        self.ensure_open("send down")?;
        self.queue().enqueue(body);
        self.feed_down();
        Ok(())
    }
}
