use uplink_shared::Value;

use crate::{queue::PartialKeyQueue, UplinkError, UplinkSession};

/// Uplink to a map lane
pub type MapUplink = UplinkSession<PartialKeyQueue>;

impl UplinkSession<PartialKeyQueue> {
    /// Marks `key` as changed. The value delivered is whatever the lane
    /// holds for `key` once the key is drained.
    pub fn cue_key(&self, key: Value) -> Result<(), UplinkError> {
        self.ensure_open("cue key")?;
        if self.queue().cue_key(key) {
            self.cue_down();
        }
        Ok(())
    }

    /// Streams `snapshot` to the subscriber ahead of any dirty keys
    pub fn begin_sync(&self, snapshot: Vec<(Value, Value)>) -> Result<(), UplinkError> {
        self.ensure_open("begin sync")?;
        self.queue().begin_sync(snapshot);
        self.feed_down();
        Ok(())
    }
}
